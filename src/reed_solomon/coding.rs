//! Systematic coding matrix construction
//!
//! A `total × data` Vandermonde matrix is multiplied by the inverse of its
//! top square block. The result keeps the "any `data` rows are invertible"
//! property of the Vandermonde matrix while its first `data` rows become the
//! identity, so encoding leaves data shards untouched.

use super::error::RsResult;
use super::galois::{exp, Galois8};
use super::matrix::Matrix;

/// Vandermonde matrix with `V[r][c] = r^c`
pub fn vandermonde(rows: usize, cols: usize) -> RsResult<Matrix> {
    let mut result = Matrix::new(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            result.set(r, c, Galois8::new(exp(r as u8, c)))?;
        }
    }
    Ok(result)
}

/// Build the `total_shards × data_shards` coding matrix
pub fn build_matrix(data_shards: usize, total_shards: usize) -> RsResult<Matrix> {
    let vandermonde = vandermonde(total_shards, data_shards)?;
    let top = vandermonde.submatrix(0..data_shards, 0..data_shards)?;
    vandermonde.times(&top.invert()?)
}
