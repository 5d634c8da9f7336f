//! Matrices over GF(2^8)
//!
//! Dense row-major storage of [`Galois8`] elements. Everything here runs at
//! engine construction time or once per decode on a K×K submatrix, never in
//! the per-byte loop.

use super::error::{RsError, RsResult};
use super::galois::Galois8;
use std::fmt;
use std::ops::Range;

/// Dense matrix over GF(2^8)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Galois8>,
}

impl Matrix {
    /// Create a zero matrix
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![Galois8::ZERO; rows * cols],
        }
    }

    /// Create a matrix from explicit rows of bytes
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> RsResult<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);

        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(RsError::InconsistentRowLength {
                    row: index,
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend(row.iter().copied().map(Galois8::new));
        }

        Ok(Matrix {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::new(size, size);
        for i in 0..size {
            matrix.data[i * size + i] = Galois8::ONE;
        }
        matrix
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn check_index(&self, row: usize, col: usize) -> RsResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(RsError::IndexOutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> RsResult<Galois8> {
        self.check_index(row, col)?;
        Ok(self.data[row * self.cols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: Galois8) -> RsResult<()> {
        self.check_index(row, col)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// Borrow one row
    pub fn row(&self, row: usize) -> RsResult<&[Galois8]> {
        if row >= self.rows {
            return Err(RsError::IndexOutOfRange {
                row,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(&self.data[row * self.cols..(row + 1) * self.cols])
    }

    /// Copy one row out as bytes
    pub fn row_bytes(&self, row: usize) -> RsResult<Vec<u8>> {
        Ok(self.row(row)?.iter().map(|e| e.value()).collect())
    }

    /// Copy the rectangle `rows × cols` into a new matrix
    pub fn submatrix(&self, rows: Range<usize>, cols: Range<usize>) -> RsResult<Matrix> {
        if rows.start > rows.end || rows.end > self.rows {
            return Err(RsError::IndexOutOfRange {
                row: rows.end,
                col: cols.start,
                rows: self.rows,
                cols: self.cols,
            });
        }
        if cols.start > cols.end || cols.end > self.cols {
            return Err(RsError::IndexOutOfRange {
                row: rows.start,
                col: cols.end,
                rows: self.rows,
                cols: self.cols,
            });
        }

        let width = cols.end - cols.start;
        let mut result = Matrix::new(rows.end - rows.start, width);
        for (dst, src) in rows.enumerate() {
            let start = src * self.cols + cols.start;
            result.data[dst * width..(dst + 1) * width]
                .copy_from_slice(&self.data[start..start + width]);
        }
        Ok(result)
    }

    /// Horizontal concatenation `[self | right]`
    pub fn augment(&self, right: &Matrix) -> RsResult<Matrix> {
        if self.rows != right.rows {
            return Err(RsError::RowCountMismatch {
                left: self.rows,
                right: right.rows,
            });
        }

        let cols = self.cols + right.cols;
        let mut data = Vec::with_capacity(self.rows * cols);
        for r in 0..self.rows {
            data.extend_from_slice(&self.data[r * self.cols..(r + 1) * self.cols]);
            data.extend_from_slice(&right.data[r * right.cols..(r + 1) * right.cols]);
        }

        Ok(Matrix {
            rows: self.rows,
            cols,
            data,
        })
    }

    pub fn swap_rows(&mut self, r1: usize, r2: usize) -> RsResult<()> {
        if r1 >= self.rows || r2 >= self.rows {
            return Err(RsError::IndexOutOfRange {
                row: r1.max(r2),
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        if r1 != r2 {
            for c in 0..self.cols {
                self.data.swap(r1 * self.cols + c, r2 * self.cols + c);
            }
        }
        Ok(())
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> Galois8 {
        self.data[row * self.cols + col]
    }

    /// `row[target] -= scale * row[pivot]` across every column
    fn subtract_scaled_row(&mut self, target: usize, pivot: usize, scale: Galois8) {
        for c in 0..self.cols {
            let value = self.at(pivot, c) * scale;
            self.data[target * self.cols + c] -= value;
        }
    }

    /// Reduce the left square block to the identity
    ///
    /// Forward elimination with row swaps on zero pivots, then
    /// back-substitution. Fails with [`RsError::SingularMatrix`] when a
    /// column has no nonzero pivot.
    pub fn gaussian_elimination(&mut self) -> RsResult<()> {
        let n = self.rows.min(self.cols);

        for r in 0..n {
            if self.at(r, r) == Galois8::ZERO {
                if let Some(below) = (r + 1..self.rows).find(|&b| self.at(b, r) != Galois8::ZERO) {
                    self.swap_rows(r, below)?;
                }
            }

            let pivot = self.at(r, r);
            if pivot == Galois8::ZERO {
                return Err(RsError::SingularMatrix);
            }

            if pivot != Galois8::ONE {
                let scale = Galois8::ONE.checked_div(pivot)?;
                for c in 0..self.cols {
                    self.data[r * self.cols + c] *= scale;
                }
            }

            for below in r + 1..self.rows {
                let scale = self.at(below, r);
                if scale != Galois8::ZERO {
                    self.subtract_scaled_row(below, r, scale);
                }
            }
        }

        for d in 0..n {
            for above in 0..d {
                let scale = self.at(above, d);
                if scale != Galois8::ZERO {
                    self.subtract_scaled_row(above, d, scale);
                }
            }
        }

        Ok(())
    }

    /// Invert a square matrix
    pub fn invert(&self) -> RsResult<Matrix> {
        if self.rows != self.cols {
            return Err(RsError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let mut work = self.augment(&Matrix::identity(self.rows))?;
        work.gaussian_elimination()?;
        work.submatrix(0..self.rows, self.cols..self.cols * 2)
    }

    /// Matrix product `self × right`
    pub fn times(&self, right: &Matrix) -> RsResult<Matrix> {
        if self.cols != right.rows {
            return Err(RsError::DimensionMismatch {
                left_cols: self.cols,
                right_rows: right.rows,
            });
        }

        let mut result = Matrix::new(self.rows, right.cols);
        for r in 0..self.rows {
            for c in 0..right.cols {
                let mut value = Galois8::ZERO;
                for i in 0..self.cols {
                    value += self.at(r, i) * right.at(i, c);
                }
                result.data[r * right.cols + c] = value;
            }
        }
        Ok(result)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for r in 0..self.rows {
            if r > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for c in 0..self.cols {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.at(r, c))?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}
