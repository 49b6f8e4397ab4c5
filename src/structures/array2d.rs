//////////////////////////////////////////////////
// A generic 2-dimensional array for scratch data //
//////////////////////////////////////////////////
use crate::error::{HydroError, Result};
use std::ops::{AddAssign, Index, IndexMut, SubAssign};

/// A typed row-major matrix used for per-cell working state (flow codes,
/// inflow counters, visited flags). Reads outside the array return `nodata`;
/// writes outside the array are ignored.
#[derive(Debug, Clone)]
pub struct Array2D<T: Copy + AddAssign + SubAssign> {
    pub columns: isize,
    pub rows: isize,
    data: Vec<T>,
    pub nodata: T,
}

impl<T> Array2D<T>
where
    T: Copy + AddAssign + SubAssign,
{
    pub fn new(rows: isize, columns: isize, initial_value: T, nodata: T) -> Result<Array2D<T>> {
        if rows < 0 || columns < 0 {
            return Err(HydroError::Configuration(
                "Only non-negative rows and columns values accepted.".to_string(),
            ));
        }
        Ok(Array2D {
            columns,
            rows,
            nodata,
            data: vec![initial_value; (rows * columns) as usize],
        })
    }

    #[inline]
    fn offset(&self, row: isize, column: isize) -> Option<usize> {
        if row < 0 || column < 0 || row >= self.rows || column >= self.columns {
            return None;
        }
        Some((row * self.columns + column) as usize)
    }

    pub fn set_value(&mut self, row: isize, column: isize, value: T) {
        if let Some(idx) = self.offset(row, column) {
            self.data[idx] = value;
        }
    }

    pub fn get_value(&self, row: isize, column: isize) -> T {
        match self.offset(row, column) {
            Some(idx) => self.data[idx],
            None => self.nodata,
        }
    }

    pub fn increment(&mut self, row: isize, column: isize, value: T) {
        if let Some(idx) = self.offset(row, column) {
            self.data[idx] += value;
        }
    }

    pub fn decrement(&mut self, row: isize, column: isize, value: T) {
        if let Some(idx) = self.offset(row, column) {
            self.data[idx] -= value;
        }
    }

    pub fn columns(&self) -> isize {
        self.columns
    }

    pub fn rows(&self) -> isize {
        self.rows
    }

    pub fn nodata(&self) -> T {
        self.nodata
    }
}

impl<T> Index<(isize, isize)> for Array2D<T>
where
    T: Copy + AddAssign + SubAssign,
{
    type Output = T;

    fn index(&self, index: (isize, isize)) -> &T {
        match self.offset(index.0, index.1) {
            Some(idx) => &self.data[idx],
            None => &self.nodata,
        }
    }
}

impl<T> IndexMut<(isize, isize)> for Array2D<T>
where
    T: Copy + AddAssign + SubAssign,
{
    /// Panics when the index lies outside the array.
    fn index_mut(&mut self, index: (isize, isize)) -> &mut T {
        let (rows, columns) = (self.rows, self.columns);
        match self.offset(index.0, index.1) {
            Some(idx) => &mut self.data[idx],
            None => panic!(
                "Array2D index ({}, {}) out of bounds for ({}, {})",
                index.0, index.1, rows, columns
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Array2D;

    #[test]
    fn test_array2d_off_grid_reads_nodata() {
        let a: Array2D<i8> = Array2D::new(2, 3, 0, -1).unwrap();
        assert_eq!(a.get_value(-1, 0), -1);
        assert_eq!(a[(2, 0)], -1);
        assert_eq!(a[(1, 2)], 0);
    }

    #[test]
    fn test_array2d_increment_decrement() {
        let mut a: Array2D<i8> = Array2D::new(2, 2, 0, -1).unwrap();
        a.increment(1, 1, 3);
        a.decrement(1, 1, 1);
        a.increment(5, 5, 3); // ignored
        assert_eq!(a.get_value(1, 1), 2);
        a[(0, 1)] = 7;
        assert_eq!(a.get_value(0, 1), 7);
    }

    #[test]
    #[should_panic]
    fn test_array2d_index_mut_out_of_bounds() {
        let mut a: Array2D<u8> = Array2D::new(1, 1, 0, 0).unwrap();
        a[(1, 0)] = 1;
    }

    #[test]
    fn test_array2d_negative_size() {
        assert!(Array2D::<i8>::new(-1, 2, 0, 0).is_err());
    }
}
