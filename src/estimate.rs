//! The error model recovered by the collocation estimators.

use ndarray::Array2;
use num_traits::Float;
use serde::Serialize;

use crate::math::{checked_div, checked_sqrt};
use crate::regression::YorkFit;
use crate::Result;

/// Error (co)variances of the products
///
/// `e11` is the error variance of the first (and lagged third) product, `e22` that of the
/// second product, and `e12` the covariance between the errors of the first two.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ErrorCovariances<E> {
    pub e11: E,
    pub e22: E,
    pub e12: E,
}

/// Scale parameters of the truth
///
/// The first product is taken to have unit scale, so only `beta2` is estimated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScaleParameters<E> {
    /// Covariance between the truth and the lagged truth
    pub lagged_truth_covariance: E,
    pub truth_variance: E,
    /// Scale of the second product relative to the truth
    pub beta2: E,
}

/// Correlation of each of the first two products with the truth
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TruthCorrelations<E> {
    pub product1: E,
    pub product2: E,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CollocationEstimate<E> {
    pub error_covariances: ErrorCovariances<E>,
    pub scale: ScaleParameters<E>,
    pub truth_correlations: TruthCorrelations<E>,
    /// Number of rows in which all three series were present
    pub sample_size: usize,
    /// The slope fit used to recover the truth variance, where one was needed
    pub regression: Option<YorkFit<E>>,
}

impl<E: Copy> CollocationEstimate<E> {
    /// `[e11, e22, e12]`
    pub const fn var_vec(&self) -> [E; 3] {
        let e = self.error_covariances;
        [e.e11, e.e22, e.e12]
    }

    /// `[lagged truth covariance, truth variance, beta2]`
    pub const fn scale_vec(&self) -> [E; 3] {
        let s = self.scale;
        [s.lagged_truth_covariance, s.truth_variance, s.beta2]
    }

    pub const fn corr_truth(&self) -> [E; 2] {
        [self.truth_correlations.product1, self.truth_correlations.product2]
    }
}

/// Correlations of the first two products with the truth, given the covariance matrix `c`
pub(crate) fn truth_correlations<E: Float>(
    c: &Array2<E>,
    truth_variance: E,
    beta2: E,
) -> Result<TruthCorrelations<E>> {
    let truth_std = checked_sqrt(truth_variance, "truth standard deviation")?;
    let product1 = checked_div(
        truth_std,
        checked_sqrt(c[[0, 0]], "product 1 standard deviation")?,
        "product 1 truth correlation",
    )?;
    let product2 = checked_div(
        beta2 * truth_std,
        checked_sqrt(c[[1, 1]], "product 2 standard deviation")?,
        "product 2 truth correlation",
    )?;
    Ok(TruthCorrelations { product1, product2 })
}

#[cfg(test)]
mod tests {
    use ndarray::arr2;

    use super::{
        truth_correlations, CollocationEstimate, ErrorCovariances, ScaleParameters,
        TruthCorrelations,
    };
    use crate::error::{CollocationError, Degeneracy};

    #[test]
    fn truth_correlations_follow_from_truth_variance() {
        let c = arr2(&[[4., 0., 0.], [0., 9., 0.], [0., 0., 1.]]);
        let correlations = truth_correlations(&c, 1., 2.).unwrap();
        approx::assert_relative_eq!(correlations.product1, 0.5);
        approx::assert_relative_eq!(correlations.product2, 2. / 3.);
    }

    #[test]
    fn negative_truth_variance_is_degenerate() {
        let c = arr2(&[[4., 0., 0.], [0., 9., 0.], [0., 0., 1.]]);
        let result = truth_correlations(&c, -1., 2.);
        assert!(matches!(
            result,
            Err(CollocationError::DegenerateInput(Degeneracy::NegativeRadicand { .. }))
        ));
    }

    #[test]
    fn constant_product_is_degenerate() {
        let c = arr2(&[[0., 0., 0.], [0., 9., 0.], [0., 0., 1.]]);
        let result = truth_correlations(&c, 1., 2.);
        assert!(matches!(
            result,
            Err(CollocationError::DegenerateInput(Degeneracy::ZeroDivisor { .. }))
        ));
    }

    #[test]
    fn array_views_keep_the_conventional_ordering() {
        let estimate = CollocationEstimate {
            error_covariances: ErrorCovariances {
                e11: 1.,
                e22: 2.,
                e12: 3.,
            },
            scale: ScaleParameters {
                lagged_truth_covariance: 4.,
                truth_variance: 5.,
                beta2: 6.,
            },
            truth_correlations: TruthCorrelations {
                product1: 0.7,
                product2: 0.8,
            },
            sample_size: 10,
            regression: None,
        };
        assert_eq!(estimate.var_vec(), [1., 2., 3.]);
        assert_eq!(estimate.scale_vec(), [4., 5., 6.]);
        assert_eq!(estimate.corr_truth(), [0.7, 0.8]);
    }
}
