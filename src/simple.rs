//! Lagged triple collocation when the lagged series has independent errors.
//!
//! If the errors of the third (lagged) series are uncorrelated with those of the first, the
//! covariances of the third series with the other two fix the scale of the second product and the
//! whole error model follows in closed form. The error cross-covariance `e12` is zero by
//! assumption.

use ndarray::{Array2, ArrayView2};
use num_traits::Float;

use crate::config::{Config, MissingPolicy};
use crate::covariance::{complete_rows, covariance_matrix, validate_triple};
use crate::estimate::{truth_correlations, CollocationEstimate, ErrorCovariances, ScaleParameters};
use crate::math::checked_div;
use crate::Result;

/// Estimate the error model of an `N x 3` observation triple whose third series is a lagged copy
/// of the first with independent errors
///
/// ```
/// use lagged_collocation::config::Config;
/// use lagged_collocation::simple::simple_lagged_triple_collocation;
/// use ndarray::arr2;
///
/// let x = arr2(&[
///     [1.0, 2.1, 0.9],
///     [2.0, 3.9, 2.2],
///     [3.1, 6.0, 2.8],
///     [3.9, 8.2, 4.1],
///     [5.0, 9.8, 5.0],
/// ]);
/// let estimate = simple_lagged_triple_collocation(&x.view(), &Config::default()).unwrap();
///
/// assert_eq!(estimate.error_covariances.e12, 0.);
/// assert!(estimate.regression.is_none());
/// ```
///
/// # Errors
/// - [`crate::CollocationError::ShapeMismatch`] if `x` does not have three columns.
/// - [`crate::CollocationError::DegenerateInput`] if a series is empty, too few samples are
///   available, or a divisor or radicand in the derivation is zero or negative.
pub fn simple_lagged_triple_collocation<E: Float>(
    x: &ArrayView2<E>,
    config: &Config,
) -> Result<CollocationEstimate<E>> {
    validate_triple(x)?;
    let complete = complete_rows(x);
    let c = match config.missing {
        MissingPolicy::Listwise => covariance_matrix(&complete.view(), MissingPolicy::Listwise)?,
        MissingPolicy::Pairwise => covariance_matrix(x, MissingPolicy::Pairwise)?,
    };

    let mut estimate = from_covariance(&c)?;
    estimate.sample_size = complete.nrows();
    Ok(estimate)
}

fn from_covariance<E: Float>(c: &Array2<E>) -> Result<CollocationEstimate<E>> {
    let beta2 = checked_div(c[[1, 2]], c[[0, 2]], "beta2")?;
    let truth_variance = checked_div(c[[0, 1]], beta2, "truth variance")?;
    let lagged_truth_covariance = checked_div(c[[1, 2]], beta2, "lagged truth covariance")?;

    let error_covariances = ErrorCovariances {
        e11: c[[0, 0]] - truth_variance,
        e22: c[[1, 1]] - beta2 * beta2 * truth_variance,
        e12: E::zero(),
    };
    let scale = ScaleParameters {
        lagged_truth_covariance,
        truth_variance,
        beta2,
    };

    Ok(CollocationEstimate {
        error_covariances,
        scale,
        truth_correlations: truth_correlations(c, truth_variance, beta2)?,
        sample_size: 0,
        regression: None,
    })
}

#[cfg(test)]
mod tests {
    use ndarray::arr2;

    use super::{from_covariance, simple_lagged_triple_collocation};
    use crate::config::{Config, MissingPolicy};
    use crate::error::{CollocationError, Degeneracy};
    use crate::Result;

    #[test]
    fn derivation_matches_closed_form() -> Result<()> {
        let c = arr2(&[[2.0, 1.5, 0.8], [1.5, 3.0, 1.2], [0.8, 1.2, 2.0]]);

        let estimate = from_covariance(&c)?;

        let beta2 = 1.2 / 0.8;
        let tt = 1.5 / beta2;
        approx::assert_relative_eq!(estimate.scale.beta2, beta2);
        approx::assert_relative_eq!(estimate.scale.truth_variance, tt);
        approx::assert_relative_eq!(estimate.scale.lagged_truth_covariance, 1.2 / beta2);
        approx::assert_relative_eq!(estimate.error_covariances.e11, 2.0 - tt);
        approx::assert_relative_eq!(estimate.error_covariances.e22, 3.0 - beta2 * beta2 * tt);
        assert_eq!(estimate.error_covariances.e12, 0.);
        approx::assert_relative_eq!(estimate.truth_correlations.product1, (tt / 2.0_f64).sqrt());
        Ok(())
    }

    #[test]
    fn zero_first_third_covariance_is_degenerate() {
        let c = arr2(&[[2.0, 1.5, 0.0], [1.5, 3.0, 1.2], [0.0, 1.2, 2.0]]);
        let result = from_covariance(&c);
        assert!(matches!(
            result,
            Err(CollocationError::DegenerateInput(Degeneracy::ZeroDivisor {
                quantity: "beta2"
            }))
        ));
    }

    #[test]
    fn zero_second_third_covariance_is_degenerate() {
        let c = arr2(&[[2.0, 1.5, 0.8], [1.5, 3.0, 0.0], [0.8, 0.0, 2.0]]);
        let result = from_covariance(&c);
        assert!(matches!(
            result,
            Err(CollocationError::DegenerateInput(Degeneracy::ZeroDivisor {
                quantity: "truth variance"
            }))
        ));
    }

    #[test]
    fn negative_truth_variance_is_degenerate() {
        // Product 2 anti-correlates with product 1 but correlates with the lagged series
        let c = arr2(&[[2.0, -1.5, 0.8], [-1.5, 3.0, 1.2], [0.8, 1.2, 2.0]]);
        let result = from_covariance(&c);
        assert!(matches!(
            result,
            Err(CollocationError::DegenerateInput(Degeneracy::NegativeRadicand { .. }))
        ));
    }

    #[test]
    fn pairwise_policy_uses_rows_missing_other_series() -> Result<()> {
        let x = arr2(&[
            [1.0, 2.1, 0.9],
            [2.0, 3.9, f64::NAN],
            [3.1, 6.0, 2.8],
            [3.9, 8.2, 4.1],
            [5.0, 9.8, 5.0],
            [f64::NAN, 1.0, 1.2],
        ]);
        let config = Config {
            missing: MissingPolicy::Pairwise,
            ..Config::default()
        };

        let estimate = simple_lagged_triple_collocation(&x.view(), &config)?;
        let listwise = simple_lagged_triple_collocation(&x.view(), &Config::default())?;

        assert_eq!(estimate.sample_size, 4);
        assert_eq!(listwise.sample_size, 4);
        assert_ne!(estimate.scale.truth_variance, listwise.scale.truth_variance);
        Ok(())
    }
}
