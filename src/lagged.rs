//! Correlated-error lagged triple collocation.
//!
//! The third series is a lagged copy of the first, and its errors may be correlated with those of
//! the first. The covariance matrix alone then does not pin down the truth variance, so it is
//! recovered from a York regression of the third series on the first.
//!
//! Konings, A. G., McColl, K. A., Alemohammad, S. H., Su, C.-H. and Entekhabi, D. (2014), "Error
//! characterization of similar products: correlated-error triple collocation".

use std::fmt::Debug;

use ndarray::{Array2, ArrayView2};
use num_traits::Float;

use crate::config::{Config, MissingPolicy};
use crate::covariance::{complete_rows, covariance_matrix, validate_triple};
use crate::estimate::{truth_correlations, CollocationEstimate, ErrorCovariances, ScaleParameters};
use crate::math::checked_div;
use crate::regression::{regress_weighted_orthogonal, Weights};
use crate::Result;

/// Estimate the error model of an `N x 3` observation triple whose first and third series may
/// have correlated errors
///
/// The regression step always runs on the rows where all three series are present. With the
/// default [`MissingPolicy::Listwise`] the covariance matrix is built from the same rows.
///
/// # Errors
/// - [`crate::CollocationError::ShapeMismatch`] if `x` does not have three columns.
/// - [`crate::CollocationError::NonConvergence`] if the regression step does not converge.
/// - [`crate::CollocationError::DegenerateInput`] if a series is empty, too few rows are
///   complete, or a divisor or radicand in the derivation is zero or negative.
pub fn lagged_triple_collocation<E: Float + Debug>(
    x: &ArrayView2<E>,
    config: &Config,
) -> Result<CollocationEstimate<E>> {
    validate_triple(x)?;
    let complete = complete_rows(x);
    let c = match config.missing {
        MissingPolicy::Listwise => covariance_matrix(&complete.view(), MissingPolicy::Listwise)?,
        MissingPolicy::Pairwise => covariance_matrix(x, MissingPolicy::Pairwise)?,
    };

    let fit = regress_weighted_orthogonal(
        &complete.column(0),
        &complete.column(2),
        E::zero(),
        Weights::unit(),
        Weights::unit(),
        &config.regression,
    )?;

    let mut estimate = from_covariance(&c, fit.slope)?;
    estimate.sample_size = complete.nrows();
    estimate.regression = Some(fit);
    Ok(estimate)
}

/// Derive the error model from covariance matrix `c` and the slope `m31` relating the third
/// series to the first
fn from_covariance<E: Float>(c: &Array2<E>, m31: E) -> Result<CollocationEstimate<E>> {
    let truth_variance = checked_div(c[[0, 2]], m31, "truth variance")?;
    let beta2 = checked_div(c[[1, 2]], c[[0, 2]], "beta2")?;

    let error_covariances = ErrorCovariances {
        e11: c[[0, 0]] - truth_variance,
        e22: c[[1, 1]] - beta2 * beta2 * truth_variance,
        e12: c[[0, 1]] - beta2 * truth_variance,
    };
    let scale = ScaleParameters {
        lagged_truth_covariance: c[[0, 2]],
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
