//! Sample covariance of an observation triple.
//!
//! Observations arrive as an `N x 3` matrix, one row per sample and one column per series, with
//! `NaN` marking a missing value. Covariances use the unbiased `n - 1` denominator.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use num_traits::Float;

use crate::config::MissingPolicy;
use crate::error::{CollocationError, Degeneracy};
use crate::math::{count, nan_mean};
use crate::Result;

/// The number of series in a triple
pub const SERIES: usize = 3;

/// Covariances need at least two samples
const MIN_SAMPLES: usize = 2;

/// Check that `x` is an `N x 3` matrix and that no series is entirely missing
///
/// # Errors
/// [`CollocationError::ShapeMismatch`] for the wrong number of columns and
/// [`Degeneracy::EmptySeries`] for a column with no observations.
pub fn validate_triple<E: Float>(x: &ArrayView2<E>) -> Result<()> {
    if x.ncols() != SERIES {
        return Err(CollocationError::shape(
            format!("N x {SERIES} observations"),
            format!("{} x {}", x.nrows(), x.ncols()),
        ));
    }
    for (column, series) in x.columns().into_iter().enumerate() {
        if series.iter().all(|value| value.is_nan()) {
            return Err(Degeneracy::EmptySeries { column }.into());
        }
    }
    Ok(())
}

/// The rows of `x` in which every series is present
pub fn complete_rows<E: Float>(x: &ArrayView2<E>) -> Array2<E> {
    let kept = x
        .rows()
        .into_iter()
        .enumerate()
        .filter(|(_, row)| row.iter().all(|value| !value.is_nan()))
        .map(|(ii, _)| ii)
        .collect::<Vec<_>>();

    tracing::debug!(
        kept = kept.len(),
        dropped = x.nrows() - kept.len(),
        "listwise deletion"
    );
    x.select(Axis(0), &kept)
}

/// Build the symmetric covariance matrix of the columns of `x`
///
/// With [`MissingPolicy::Listwise`] only complete rows contribute. With
/// [`MissingPolicy::Pairwise`] every element uses the rows where its own two columns are present.
///
/// ```
/// use lagged_collocation::config::MissingPolicy;
/// use lagged_collocation::covariance::covariance_matrix;
/// use ndarray::arr2;
///
/// let x = arr2(&[[1., 2., 0.], [2., 4., 0.5], [3., 6., 1.]]);
/// let c = covariance_matrix(&x.view(), MissingPolicy::Listwise).unwrap();
///
/// approx::assert_relative_eq!(c[[0, 0]], 1.);
/// approx::assert_relative_eq!(c[[0, 1]], 2.);
/// approx::assert_relative_eq!(c[[2, 1]], 1.);
/// ```
///
/// # Errors
/// Returns an error if `x` is not `N x 3`, if a series has no observations, or if fewer than two
/// samples are available for any element.
pub fn covariance_matrix<E: Float>(x: &ArrayView2<E>, policy: MissingPolicy) -> Result<Array2<E>> {
    validate_triple(x)?;
    match policy {
        MissingPolicy::Listwise => {
            let complete = complete_rows(x);
            pairwise_matrix(&complete.view())
        }
        MissingPolicy::Pairwise => pairwise_matrix(x),
    }
}

fn pairwise_matrix<E: Float>(x: &ArrayView2<E>) -> Result<Array2<E>> {
    let n = x.ncols();
    let mut covariance = Array2::zeros((n, n));
    for ii in 0..n {
        for jj in ii..n {
            let value = sample_covariance(&x.column(ii), &x.column(jj))?;
            covariance[[ii, jj]] = value;
            covariance[[jj, ii]] = value;
        }
    }
    Ok(covariance)
}

/// Unbiased sample covariance of `a` and `b` over the samples where both are present
fn sample_covariance<E: Float>(a: &ArrayView1<E>, b: &ArrayView1<E>) -> Result<E> {
    let (a, b): (Vec<E>, Vec<E>) = a
        .iter()
        .zip(b.iter())
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(&a, &b)| (a, b))
        .unzip();

    if a.len() < MIN_SAMPLES {
        return Err(Degeneracy::InsufficientData {
            available: a.len(),
            required: MIN_SAMPLES,
        }
        .into());
    }

    // Both vectors hold at least `MIN_SAMPLES` values, so the means exist
    let mean_a = nan_mean(a.iter()).unwrap_or_else(E::nan);
    let mean_b = nan_mean(b.iter()).unwrap_or_else(E::nan);
    let sum = a
        .iter()
        .zip(b.iter())
        .fold(E::zero(), |acc, (&a, &b)| acc + (a - mean_a) * (b - mean_b));

    Ok(sum / count::<E>(a.len() - 1)?)
}
