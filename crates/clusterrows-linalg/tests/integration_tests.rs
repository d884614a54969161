//! Integration tests for the linear-algebra primitives
//!
//! Cross-checks the Jacobi SVD against `scirs2_linalg` and exercises the
//! covariance-style workloads the mixture model relies on.

use clusterrows_linalg::{DiagonalMatrix, LinalgError, Matrix, Svd};
use scirs2_core::random::{Rng, SeedableRng, StdRng};

fn random_matrix(rows: usize, cols: usize, seed: u64) -> Matrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..rows * cols)
        .map(|_| rng.random::<f64>() * 2.0 - 1.0)
        .collect();
    Matrix::from_vec(rows, cols, values).unwrap()
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(|a, b| b.total_cmp(a));
    values
}

#[test]
fn test_singular_values_match_reference() -> anyhow::Result<()> {
    for (rows, cols, seed) in [(6, 4, 1), (5, 5, 2), (12, 3, 3), (8, 8, 4)] {
        let a = random_matrix(rows, cols, seed);
        let ours = sorted(Svd::new(&a)?.s().as_array().to_vec());

        let (_u, reference, _vt) = scirs2_linalg::svd(&a.as_array().view(), false, None)?;
        let reference = sorted(reference.to_vec());

        assert_eq!(ours.len(), reference.len());
        for (got, want) in ours.iter().zip(reference.iter()) {
            assert!(
                (got - want).abs() < 1e-3 * want.max(1.0),
                "{}x{}: singular values {:?} vs reference {:?}",
                rows,
                cols,
                ours,
                reference
            );
        }
    }
    Ok(())
}

#[test]
fn test_covariance_inverse_and_determinant() -> anyhow::Result<()> {
    // Sample covariance of random data is symmetric positive definite
    let x = random_matrix(40, 4, 7);
    let n = x.rows() as f64;
    let cov = x.transpose_dot(&x)?.dot_inverse(&DiagonalMatrix::from_vec(vec![n; 4]))?;

    let svd = Svd::new(&cov)?;
    let inv = svd.inverse()?;
    assert!(cov.dot(&inv)?.approx_eq(&Matrix::identity(4), 1e-4));
    assert!(inv.dot(&cov)?.approx_eq(&Matrix::identity(4), 1e-4));

    // Determinant of an SPD matrix equals the product of its eigenvalues,
    // which the singular values are here.
    let det = svd.determinant();
    assert!(det > 0.0);
    assert!((cov.determinant()? - det).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_reconstruction_of_rectangular_input() -> anyhow::Result<()> {
    let a = random_matrix(9, 5, 11);
    let svd = Svd::new(&a)?;

    let recon = svd.u().dot(&svd.s().to_matrix())?.dot_transpose(svd.v())?;
    assert!(recon.approx_eq(&a, 1e-4));
    assert!(svd
        .v()
        .transpose_dot(svd.v())?
        .approx_eq(&Matrix::identity(5), 1e-4));
    Ok(())
}

#[test]
fn test_errors_do_not_panic() {
    let a = Matrix::new(3, 2);
    assert!(matches!(
        a.at(3, 0),
        Err(LinalgError::OutOfBounds { row: 3, .. })
    ));
    assert!(matches!(
        a.dot(&Matrix::new(3, 2)),
        Err(LinalgError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        a.inverse(),
        Err(LinalgError::NotSquare { .. })
    ));

    let rank_one = Matrix::from_rows(&[vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();
    assert!(matches!(
        rank_one.inverse(),
        Err(LinalgError::Singular { .. })
    ));
}
