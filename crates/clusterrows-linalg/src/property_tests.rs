//! Property-based tests for the linear-algebra primitives
//!
//! These tests use proptest to verify algebraic identities that must hold
//! for any conformable input.

#[cfg(test)]
mod tests {
    use crate::{DiagonalMatrix, Matrix, Svd};
    use proptest::prelude::*;

    fn proptest_config() -> ProptestConfig {
        ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        }
    }

    /// `rows × cols` matrix with entries in `[-10, 10]`
    fn any_matrix(rows: usize, cols: usize) -> impl Strategy<Value = Matrix> {
        prop::collection::vec(-10.0f64..10.0, rows * cols)
            .prop_map(move |values| Matrix::from_vec(rows, cols, values).unwrap())
    }

    /// Tall matrix with a dominant, well-spread leading diagonal
    fn well_conditioned() -> impl Strategy<Value = Matrix> {
        (1usize..6, 0usize..3).prop_flat_map(|(cols, extra)| {
            let rows = cols + extra;
            prop::collection::vec(-0.5f64..0.5, rows * cols).prop_map(move |mut values| {
                for i in 0..cols {
                    values[i * cols + i] += 5.0 + 3.0 * i as f64;
                }
                Matrix::from_vec(rows, cols, values).unwrap()
            })
        })
    }

    fn nonsingular_diagonal(n: usize) -> impl Strategy<Value = DiagonalMatrix> {
        prop::collection::vec(
            prop_oneof![0.1f64..10.0, -10.0f64..-0.1],
            n,
        )
        .prop_map(DiagonalMatrix::from_vec)
    }

    // ========================================================================
    // Matrix identities
    // ========================================================================

    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn dot_identity_is_noop(a in (1usize..7).prop_flat_map(|n| any_matrix(n, n))) {
            let n = a.cols();
            let prod = a.dot(&Matrix::identity(n)).unwrap();
            prop_assert_eq!(prod, a);
        }
    }

    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn diagonal_scaling_roundtrip(
            (a, d) in (1usize..6, 1usize..6).prop_flat_map(|(r, c)| {
                (any_matrix(r, c), nonsingular_diagonal(c))
            })
        ) {
            let back = a.dot_diagonal(&d).unwrap().dot_inverse(&d).unwrap();
            prop_assert!(back.approx_eq(&a, 1e-4));
        }
    }

    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn givens_rotation_preserves_frobenius_norm(
            a in (2usize..6).prop_flat_map(|n| any_matrix(n + 1, n)),
            theta in -3.2f64..3.2,
        ) {
            let rotated = a.givens_rot(0, a.cols() - 1, theta).unwrap();
            let before = a.sum_of_squares();
            let after = rotated.sum_of_squares();
            prop_assert!((before - after).abs() <= 1e-9 * before.max(1.0));
        }
    }

    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn bounds_violations_fail(
            rows in 1usize..5,
            cols in 1usize..5,
            dr in 0usize..3,
            dc in 0usize..3,
        ) {
            let m = Matrix::new(rows, cols);
            prop_assert!(m.at(rows + dr, 0).is_err());
            prop_assert!(m.at(0, cols + dc).is_err());
            prop_assert!(m.at(rows - 1, cols - 1).is_ok());
        }
    }

    // ========================================================================
    // SVD properties
    // ========================================================================

    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn svd_reconstructs_input(a in well_conditioned()) {
            let svd = Svd::new(&a).unwrap();
            let recon = svd.u().dot_diagonal(svd.s()).unwrap().dot_transpose(svd.v()).unwrap();
            prop_assert!(recon.approx_eq(&a, 1e-4));
        }
    }

    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn svd_factors_are_orthonormal(a in well_conditioned()) {
            let svd = Svd::new(&a).unwrap();
            let n = a.cols();

            let utu = svd.u().transpose_dot(svd.u()).unwrap();
            prop_assert!(utu.approx_eq(&Matrix::identity(n), 1e-4));

            let vvt = svd.v().dot_transpose(svd.v()).unwrap();
            prop_assert!(vvt.approx_eq(&Matrix::identity(n), 1e-4));
        }
    }

    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn svd_inverse_is_inverse(a in (1usize..6).prop_flat_map(|n| {
            prop::collection::vec(-0.5f64..0.5, n * n).prop_map(move |mut values| {
                for i in 0..n {
                    values[i * n + i] += 5.0 + 3.0 * i as f64;
                }
                Matrix::from_vec(n, n, values).unwrap()
            })
        })) {
            let inv = a.inverse().unwrap();
            let n = a.rows();
            prop_assert!(a.dot(&inv).unwrap().approx_eq(&Matrix::identity(n), 1e-4));
        }
    }

    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn diagonal_determinant_is_product(values in prop::collection::vec(0.1f64..3.0, 1..8)) {
            let expected: f64 = values.iter().product();
            let d = DiagonalMatrix::from_vec(values);
            prop_assert!((d.determinant() - expected).abs() <= 1e-12 * expected.abs().max(1.0));
            prop_assert!(!d.is_singular());
        }
    }
}
