//! Matrix algebra and coding matrix tests

use rs256::reed_solomon::{build_matrix, Galois8, Matrix, RsError};

fn m<const C: usize>(rows: &[[u8; C]]) -> Matrix {
    Matrix::from_rows(rows).unwrap()
}

#[test]
fn test_identity_format() {
    assert_eq!(
        Matrix::identity(3).to_string(),
        "[[1, 0, 0], [0, 1, 0], [0, 0, 1]]"
    );
}

#[test]
fn test_product_reference() {
    let product = m(&[[1, 2], [3, 4]]).times(&m(&[[5, 6], [7, 8]])).unwrap();
    assert_eq!(product, m(&[[11, 22], [19, 42]]));
}

#[test]
fn test_inverse_reference() {
    let inverse = m(&[[56, 23, 98], [3, 100, 200], [45, 201, 123]])
        .invert()
        .unwrap();
    assert_eq!(inverse, m(&[[175, 133, 33], [130, 13, 245], [112, 35, 126]]));
}

#[test]
fn test_inverse_reference_with_pivot_swap() {
    let inverse = m(&[
        [1, 0, 0, 0, 0],
        [0, 1, 0, 0, 0],
        [0, 0, 0, 1, 0],
        [0, 0, 0, 0, 1],
        [7, 7, 6, 6, 1],
    ])
    .invert()
    .unwrap();
    assert_eq!(
        inverse,
        m(&[
            [1, 0, 0, 0, 0],
            [0, 1, 0, 0, 0],
            [123, 123, 1, 122, 122],
            [0, 0, 1, 0, 0],
            [0, 0, 0, 1, 0],
        ])
    );
}

#[test]
fn test_singular_matrix_propagates() {
    let mut zero_column = Matrix::new(2, 4);
    zero_column.set(0, 1, Galois8::ONE).unwrap();
    zero_column.set(1, 1, Galois8::new(3)).unwrap();
    assert_eq!(zero_column.gaussian_elimination(), Err(RsError::SingularMatrix));
}

#[test]
fn test_coding_matrix_identity_top() {
    for data in 1..=24 {
        for parity in 1..=6 {
            let matrix = build_matrix(data, data + parity).unwrap();
            let top = matrix.submatrix(0..data, 0..data).unwrap();
            assert_eq!(top, Matrix::identity(data), "data={data} parity={parity}");
        }
    }
}

#[test]
fn test_submatrix_inverse_times_submatrix_is_identity() {
    let (data, parity) = (6, 4);
    let matrix = build_matrix(data, data + parity).unwrap();
    // sliding windows of consecutive rows mixing data and parity rows
    for start in 0..=parity {
        let sub = matrix.submatrix(start..start + data, 0..data).unwrap();
        let inverse = sub.invert().unwrap();
        assert_eq!(inverse.times(&sub).unwrap(), Matrix::identity(data));
        assert_eq!(sub.times(&inverse).unwrap(), Matrix::identity(data));
    }
}
