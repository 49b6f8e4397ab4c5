use super::*;
use std::f64;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::io::BufWriter;

fn parse_header_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        HydroError::InvalidData(format!("Could not parse the '{}' header value '{}'.", key, value))
    })
}

pub fn read_arcascii(file_name: &str) -> Result<Grid> {
    let f = File::open(file_name)?;
    let f = BufReader::new(f);

    let mut rows = 0usize;
    let mut columns = 0usize;
    let mut cell_size_x = f64::NAN;
    let mut cell_size_y = f64::NAN;
    let mut nodata = DEFAULT_NODATA;
    let mut xllcenter: f64 = f64::NEG_INFINITY;
    let mut yllcenter: f64 = f64::NEG_INFINITY;
    let mut xllcorner: f64 = f64::NEG_INFINITY;
    let mut yllcorner: f64 = f64::NEG_INFINITY;
    let mut data: Vec<f64> = vec![];
    for line in f.lines() {
        let line = line?;
        let vec = line.split_whitespace().collect::<Vec<&str>>();
        if vec.is_empty() {
            continue;
        }
        let key = vec[0].to_lowercase();
        let last = vec[vec.len() - 1];
        if key.contains("nrows") {
            rows = parse_header_value::<f64>(&key, last)? as usize;
            if columns > 0 {
                data.reserve(rows * columns);
            }
        } else if key.contains("ncols") {
            columns = parse_header_value::<f64>(&key, last)? as usize;
            if rows > 0 {
                data.reserve(rows * columns);
            }
        } else if key.contains("xllcorner") {
            xllcorner = parse_header_value(&key, last)?;
        } else if key.contains("yllcorner") {
            yllcorner = parse_header_value(&key, last)?;
        } else if key.contains("xllcenter") {
            xllcenter = parse_header_value(&key, last)?;
        } else if key.contains("yllcenter") {
            yllcenter = parse_header_value(&key, last)?;
        } else if key.contains("cellsize") {
            cell_size_x = parse_header_value(&key, last)?;
            cell_size_y = cell_size_x;
        } else if key == "dx" {
            cell_size_x = parse_header_value(&key, last)?;
        } else if key == "dy" {
            cell_size_y = parse_header_value(&key, last)?;
        } else if key.contains("nodata_value") {
            nodata = parse_header_value(&key, last)?;
        } else {
            // it's a data line
            for val in vec {
                data.push(parse_header_value("data", val)?);
            }
        }
    }

    let (west, south) = if xllcorner != f64::NEG_INFINITY {
        (xllcorner, yllcorner)
    } else {
        (xllcenter - 0.5 * cell_size_x, yllcenter - 0.5 * cell_size_y)
    };
    if !west.is_finite() || !south.is_finite() {
        return Err(HydroError::InvalidData(format!(
            "{} is missing its lower-left corner coordinates.",
            file_name
        )));
    }
    let region = Region::from_resolution(west, south, cell_size_x, cell_size_y, rows, columns)?;
    Grid::from_data(region, nodata, data)
}

pub fn write_arcascii(grid: &Grid, file_name: &str) -> Result<()> {
    let f = File::create(file_name)?;
    let mut writer = BufWriter::new(f);
    let region = grid.region();

    writer.write_all(format!("NCOLS {}\n", region.columns).as_bytes())?;
    writer.write_all(format!("NROWS {}\n", region.rows).as_bytes())?;
    writer.write_all(format!("XLLCORNER {}\n", region.west).as_bytes())?;
    writer.write_all(format!("YLLCORNER {}\n", region.south).as_bytes())?;
    // non-square cells use the DX/DY extension
    if region.resolution_x == region.resolution_y {
        writer.write_all(format!("CELLSIZE {}\n", region.resolution_x).as_bytes())?;
    } else {
        writer.write_all(format!("DX {}\n", region.resolution_x).as_bytes())?;
        writer.write_all(format!("DY {}\n", region.resolution_y).as_bytes())?;
    }
    writer.write_all(format!("NODATA_VALUE {}\n", grid.nodata()).as_bytes())?;

    for row in 0..region.rows {
        let line = grid
            .get_row_data(row)
            .iter()
            .map(|v| {
                if grid.is_nodata(*v) {
                    format!("{}", grid.nodata())
                } else {
                    format!("{}", v)
                }
            })
            .collect::<Vec<String>>()
            .join(" ");
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
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
    fn test_arcascii_write_then_read() {
        let region = Region::from_resolution(100.0, 200.0, 30.0, 30.0, 2, 3).unwrap();
        let grid = Grid::from_data(
            region,
            -9999.0,
            vec![1.5, 2.25, -9999.0, 4.0, 5.125, f64::NAN],
        )
        .unwrap();
        let path = env::temp_dir().join("hydro_tools_arcascii_test.asc");
        let file_name = path.to_str().unwrap();
        write_arcascii(&grid, file_name).unwrap();
        let back = read_arcascii(file_name).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(back.rows(), 2);
        assert_eq!(back.columns(), 3);
        assert_eq!(back.region().west, 100.0);
        assert_eq!(back.region().north, 260.0);
        assert_eq!(back.get(0, 1).unwrap(), 2.25);
        assert!(back.is_nodata(back.get(0, 2).unwrap()));
        // NaN cells are stored as the sentinel
        assert_eq!(back.get(1, 2).unwrap(), -9999.0);
    }

    #[test]
    fn test_arcascii_non_square_cells() {
        let region = Region::from_resolution(0.0, 0.0, 2.0, 5.0, 2, 3).unwrap();
        let grid = Grid::from_data(region, -9999.0, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let path = env::temp_dir().join("hydro_tools_arcascii_dxdy.asc");
        let file_name = path.to_str().unwrap();
        write_arcascii(&grid, file_name).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let back = read_arcascii(file_name).unwrap();
        fs::remove_file(&path).ok();

        assert!(text.contains("DX 2\n") && text.contains("DY 5\n"));
        assert!(!text.contains("CELLSIZE"));
        assert_eq!(back.region().resolution_x, 2.0);
        assert_eq!(back.region().resolution_y, 5.0);
        assert_eq!(back.region().east, 6.0);
        assert_eq!(back.region().north, 10.0);
        assert_eq!(back.values(), grid.values());
    }

    #[test]
    fn test_arcascii_center_registration() {
        let path = env::temp_dir().join("hydro_tools_arcascii_center.asc");
        fs::write(
            &path,
            "ncols 2\nnrows 2\nxllcenter 0.5\nyllcenter 0.5\ncellsize 1\nNODATA_value -1\n1 2\n3 -1\n",
        )
        .unwrap();
        let grid = read_arcascii(path.to_str().unwrap()).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(grid.region().west, 0.0);
        assert_eq!(grid.region().north, 2.0);
        assert_eq!(grid.num_valid_cells(), 3);
    }

    #[test]
    fn test_arcascii_bad_value() {
        let path = env::temp_dir().join("hydro_tools_arcascii_bad.asc");
        fs::write(
            &path,
            "ncols 2\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\nNODATA_value -1\n1 x\n",
        )
        .unwrap();
        let result = read_arcascii(path.to_str().unwrap());
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(HydroError::InvalidData(_))));
    }

    #[test]
    fn test_arcascii_missing_file() {
        let result = read_arcascii("/this/path/does/not/exist.asc");
        assert!(matches!(result, Err(HydroError::Io(_))));
    }
}
