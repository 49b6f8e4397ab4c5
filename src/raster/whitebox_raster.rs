use super::*;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::f64;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq)]
enum CellType {
    F64,
    F32,
    I16,
    U8,
}

impl CellType {
    fn from_header(value: &str) -> Result<CellType> {
        let v = value.trim().to_lowercase();
        if v.contains("double") {
            Ok(CellType::F64)
        } else if v.contains("float") {
            Ok(CellType::F32)
        } else if v.contains("integer") {
            Ok(CellType::I16)
        } else if v.contains("byte") {
            Ok(CellType::U8)
        } else {
            Err(HydroError::InvalidData(format!(
                "Raster data type '{}' is unknown.",
                value.trim()
            )))
        }
    }
}

fn sibling_file(file_name: &str, extension: &str) -> PathBuf {
    let mut p = PathBuf::from(file_name);
    p.set_extension(extension);
    p
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        HydroError::InvalidData(format!("Could not parse the '{}' header value '{}'.", key, value))
    })
}

/// Reads a Whitebox raster: a text `.dep` header plus a binary `.tas` data file.
pub fn read_whitebox(file_name: &str) -> Result<Grid> {
    let f = File::open(sibling_file(file_name, "dep"))?;
    let f = BufReader::new(f);

    let (mut north, mut south, mut east, mut west) = (f64::NAN, f64::NAN, f64::NAN, f64::NAN);
    let mut rows = 0usize;
    let mut columns = 0usize;
    let mut nodata = DEFAULT_NODATA;
    let mut cell_type = CellType::F32;
    let mut little_endian = true;
    let mut projection: Option<String> = None;

    for line in f.lines() {
        let line = line?;
        let vec = line.splitn(2, ':').collect::<Vec<&str>>();
        if vec.len() < 2 {
            continue;
        }
        let key = vec[0].to_lowercase();
        let value = vec[1];
        if key.contains("rows") {
            rows = parse_value(&key, value)?;
        } else if key.contains("col") {
            columns = parse_value(&key, value)?;
        } else if key.contains("north") {
            north = parse_value(&key, value)?;
        } else if key.contains("south") {
            south = parse_value(&key, value)?;
        } else if key.contains("east") {
            east = parse_value(&key, value)?;
        } else if key.contains("west") {
            west = parse_value(&key, value)?;
        } else if key.contains("data type") {
            cell_type = CellType::from_header(value)?;
        } else if key.contains("nodata") {
            nodata = parse_value(&key, value)?;
        } else if key.contains("byte order") {
            let v = value.trim().to_lowercase();
            little_endian = v.contains("little") || v.contains("lsb");
        } else if key.contains("projection") {
            let v = value.trim();
            if !v.is_empty() && v != "not specified" {
                projection = Some(v.to_string());
            }
        }
    }

    let region = Region::new(north, south, east, west, rows, columns)?;

    let f = File::open(sibling_file(file_name, "tas"))?;
    let mut reader = BufReader::new(f);
    let num_cells = region.num_cells();
    let mut data = Vec::with_capacity(num_cells);
    for _ in 0..num_cells {
        let v = match (cell_type, little_endian) {
            (CellType::F64, true) => reader.read_f64::<LittleEndian>()?,
            (CellType::F64, false) => reader.read_f64::<BigEndian>()?,
            (CellType::F32, true) => reader.read_f32::<LittleEndian>()? as f64,
            (CellType::F32, false) => reader.read_f32::<BigEndian>()? as f64,
            (CellType::I16, true) => reader.read_i16::<LittleEndian>()? as f64,
            (CellType::I16, false) => reader.read_i16::<BigEndian>()? as f64,
            (CellType::U8, _) => reader.read_u8()? as f64,
        };
        data.push(v);
    }

    let mut grid = Grid::from_data(region, nodata, data)?;
    grid.coordinate_ref_system_wkt = projection;
    Ok(grid)
}

/// Writes a grid as a 64-bit little-endian Whitebox raster.
pub fn write_whitebox(grid: &Grid, file_name: &str) -> Result<()> {
    let region = grid.region();
    let (min, max) = grid.min_max().unwrap_or((grid.nodata(), grid.nodata()));

    let f = File::create(sibling_file(file_name, "dep"))?;
    let mut writer = BufWriter::new(f);
    writer.write_all(format!("Min:\t{}\n", min).as_bytes())?;
    writer.write_all(format!("Max:\t{}\n", max).as_bytes())?;
    writer.write_all(format!("North:\t{}\n", region.north).as_bytes())?;
    writer.write_all(format!("South:\t{}\n", region.south).as_bytes())?;
    writer.write_all(format!("East:\t{}\n", region.east).as_bytes())?;
    writer.write_all(format!("West:\t{}\n", region.west).as_bytes())?;
    writer.write_all(format!("Cols:\t{}\n", region.columns).as_bytes())?;
    writer.write_all(format!("Rows:\t{}\n", region.rows).as_bytes())?;
    writer.write_all("Stacks:\t1\n".as_bytes())?;
    writer.write_all("Data Type:\tDOUBLE\n".as_bytes())?;
    writer.write_all(
        format!(
            "Projection:\t{}\n",
            grid.coordinate_ref_system_wkt
                .as_deref()
                .unwrap_or("not specified")
        )
        .as_bytes(),
    )?;
    writer.write_all("Data Scale:\tcontinuous\n".as_bytes())?;
    writer.write_all(format!("NoData:\t{}\n", grid.nodata()).as_bytes())?;
    writer.write_all("Byte Order:\tLITTLE_ENDIAN\n".as_bytes())?;
    writer.flush()?;

    let f = File::create(sibling_file(file_name, "tas"))?;
    let mut writer = BufWriter::new(f);
    for &v in grid.values() {
        let v = if grid.is_nodata(v) { grid.nodata() } else { v };
        writer.write_f64::<LittleEndian>(v)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_whitebox_write_then_read() {
        let region = Region::new(10.0, 0.0, 15.0, 0.0, 2, 3).unwrap();
        let mut grid = Grid::from_data(
            region,
            -32768.0,
            vec![0.1, 0.2, 0.3, -32768.0, 1.0e6, -4.5],
        )
        .unwrap();
        grid.coordinate_ref_system_wkt = Some("EPSG:32617".to_string());
        let path = env::temp_dir().join("hydro_tools_wb_test.dep");
        let file_name = path.to_str().unwrap();
        write_whitebox(&grid, file_name).unwrap();
        let back = read_whitebox(file_name).unwrap();
        fs::remove_file(&path).ok();
        fs::remove_file(sibling_file(file_name, "tas")).ok();

        assert_eq!(back.values(), grid.values());
        assert_eq!(back.region(), grid.region());
        assert_eq!(back.coordinate_ref_system_wkt.as_deref(), Some("EPSG:32617"));
    }

    #[test]
    fn test_whitebox_truncated_data() {
        let region = Region::new(2.0, 0.0, 2.0, 0.0, 2, 2).unwrap();
        let grid = Grid::new(region, 1.0);
        let path = env::temp_dir().join("hydro_tools_wb_truncated.dep");
        let file_name = path.to_str().unwrap();
        write_whitebox(&grid, file_name).unwrap();
        let tas = sibling_file(file_name, "tas");
        fs::write(&tas, [0u8; 12]).unwrap();
        let result = read_whitebox(file_name);
        fs::remove_file(&path).ok();
        fs::remove_file(&tas).ok();
        assert!(matches!(result, Err(HydroError::Io(_))));
    }
}
