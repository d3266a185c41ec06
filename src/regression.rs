//! Williamson-York regression with (possibly correlated) errors on both axes.
//!
//! For a review of the method see Cantrell, C. A. (2008), "Technical note: Review of methods for
//! linear least-squares fitting of data and application to atmospheric chemistry problems",
//! Atmospheric Chemistry and Physics 8, 5477-5487.

use std::fmt::Debug;

use itertools::izip;
use ndarray::{Array1, ArrayView1};
use num_traits::Float;
use serde::Serialize;

use crate::config::RegressionConfig;
use crate::error::{CollocationError, Degeneracy};
use crate::math::{checked_div, checked_sqrt, nan_mean, nan_median};
use crate::Result;

/// Inverse-variance weights for one axis of the regression
///
/// If the error variances are known `1 / var(error)` is the natural choice. Otherwise
/// `1 / var(x)` tends to work well.
#[derive(Clone, Copy, Debug)]
pub enum Weights<'a, E> {
    /// One weight shared by every point
    Uniform(E),
    /// A weight per point, the same length as the data
    PerPoint(ArrayView1<'a, E>),
}

impl<'a, E: Float> Weights<'a, E> {
    /// Unit weights on every point
    pub fn unit() -> Self {
        Self::Uniform(E::one())
    }

    fn validate(&self, len: usize, name: &'static str) -> Result<()> {
        let invalid = |w: E| !(w.is_finite() && w > E::zero());
        match self {
            Self::Uniform(w) => {
                if invalid(*w) {
                    return Err(CollocationError::InvalidParameter {
                        name,
                        value: w.to_f64().unwrap_or(f64::NAN),
                    });
                }
            }
            Self::PerPoint(w) => {
                if w.len() != len {
                    return Err(CollocationError::shape(
                        format!("{len} weights in `{name}`"),
                        format!("{}", w.len()),
                    ));
                }
                if let Some(&bad) = w.iter().find(|&&w| invalid(w)) {
                    return Err(CollocationError::InvalidParameter {
                        name,
                        value: bad.to_f64().unwrap_or(f64::NAN),
                    });
                }
            }
        }
        Ok(())
    }

    /// Expand to one weight per retained point
    fn select(&self, kept: &[usize]) -> Array1<E> {
        match self {
            Self::Uniform(w) => Array1::from_elem(kept.len(), *w),
            Self::PerPoint(w) => kept.iter().map(|&ii| w[ii]).collect(),
        }
    }
}

/// A converged straight-line fit `y = slope * x + intercept`
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct YorkFit<E> {
    pub slope: E,
    pub intercept: E,
    /// Number of slope updates performed before the tolerance was met
    pub iterations: usize,
}

/// Fit a straight line to `(x, y)` when both axes carry noise
///
/// `r` is the correlation between the errors in `x` and `y` and must lie in `[-1, 1]`. Pairs
/// where either coordinate is `NaN` are ignored, along with their weights.
///
/// The slope is seeded with the median of `y / x` (pairs with `x == 0` are skipped) and refined
/// until successive estimates differ by less than `config.tolerance`.
///
/// ```
/// use lagged_collocation::config::RegressionConfig;
/// use lagged_collocation::regression::{regress_weighted_orthogonal, Weights};
/// use ndarray::{arr1, Array1};
///
/// let x = arr1(&[1., 2., 3., 4., 5.]);
/// let y: Array1<f64> = x.mapv(|x| 2. * x + 1.);
///
/// let fit = regress_weighted_orthogonal(
///     &x.view(),
///     &y.view(),
///     0.,
///     Weights::unit(),
///     Weights::unit(),
///     &RegressionConfig::default(),
/// )
/// .unwrap();
///
/// approx::assert_relative_eq!(fit.slope, 2., max_relative = 1e-10);
/// approx::assert_relative_eq!(fit.intercept, 1., max_relative = 1e-10);
/// ```
///
/// # Errors
/// - [`CollocationError::ShapeMismatch`] if `x`, `y` or per-point weights differ in length.
/// - [`CollocationError::InvalidParameter`] for `r` outside `[-1, 1]`, non-positive weights or an
///   unusable `config`.
/// - [`CollocationError::DegenerateInput`] if no starting slope can be formed or an update
///   divides by zero.
/// - [`CollocationError::NonConvergence`] if the slope has not settled after
///   `config.max_iterations` updates.
pub fn regress_weighted_orthogonal<E: Float + Debug>(
    x: &ArrayView1<E>,
    y: &ArrayView1<E>,
    r: E,
    wx: Weights<E>,
    wy: Weights<E>,
    config: &RegressionConfig,
) -> Result<YorkFit<E>> {
    config.validate()?;
    if x.len() != y.len() {
        return Err(CollocationError::shape(
            format!("{} values in `y`", x.len()),
            format!("{}", y.len()),
        ));
    }
    if r.is_nan() || r.abs() > E::one() {
        return Err(CollocationError::InvalidParameter {
            name: "r",
            value: r.to_f64().unwrap_or(f64::NAN),
        });
    }
    wx.validate(x.len(), "wx")?;
    wy.validate(x.len(), "wy")?;

    let tolerance = E::from(config.tolerance).ok_or(CollocationError::InvalidParameter {
        name: "tolerance",
        value: config.tolerance,
    })?;

    let kept = (0..x.len())
        .filter(|&ii| !x[ii].is_nan() && !y[ii].is_nan())
        .collect::<Vec<_>>();
    if kept.len() < 2 {
        return Err(Degeneracy::InsufficientData {
            available: kept.len(),
            required: 2,
        }
        .into());
    }
    let x: Array1<E> = kept.iter().map(|&ii| x[ii]).collect();
    let y: Array1<E> = kept.iter().map(|&ii| y[ii]).collect();
    let wx = wx.select(&kept);
    let wy = wy.select(&kept);

    // `kept` is non-empty so both means exist
    let x_mean = nan_mean(x.iter()).unwrap_or_else(E::nan);
    let y_mean = nan_mean(y.iter()).unwrap_or_else(E::nan);
    let u = x.mapv(|x| x - x_mean);
    let v = y.mapv(|y| y - y_mean);
    let alpha = izip!(wx.iter(), wy.iter())
        .map(|(&wx, &wy)| checked_sqrt(wx * wy, "alpha"))
        .collect::<Result<Array1<E>>>()?;

    let mut slope = nan_median(
        izip!(x.iter(), y.iter())
            .filter(|(x, _)| !x.is_zero())
            .map(|(&x, &y)| y / x),
    )
    .ok_or(Degeneracy::ZeroDivisor {
        quantity: "initial slope",
    })?;

    let two = E::one() + E::one();
    let mut step = E::infinity();

    for iteration in 1..=config.max_iterations {
        let mut numerator = E::zero();
        let mut denominator = E::zero();
        for (&u, &v, &wx, &wy, &alpha) in
            izip!(u.iter(), v.iter(), wx.iter(), wy.iter(), alpha.iter())
        {
            let w = checked_div(
                wx * wy,
                slope * slope * wy + wx - two * slope * r * alpha,
                "combined weight",
            )?;
            let beta = w * (u / wy + slope * v / wx - (slope * u + v) * r / alpha);
            numerator = numerator + w * beta * v;
            denominator = denominator + w * beta * u;
        }

        let updated = checked_div(numerator, denominator, "slope")?;
        step = (updated - slope).abs();
        slope = updated;
        tracing::trace!(iteration, ?slope, ?step, "york iteration");

        if step < tolerance {
            let intercept = y_mean - slope * x_mean;
            tracing::debug!(iterations = iteration, ?slope, ?intercept, "york regression converged");
            return Ok(YorkFit {
                slope,
                intercept,
                iterations: iteration,
            });
        }
    }

    tracing::warn!(
        iterations = config.max_iterations,
        ?slope,
        ?step,
        "york regression failed to converge"
    );
    Err(CollocationError::NonConvergence {
        iterations: config.max_iterations,
        last_slope: slope.to_f64().unwrap_or(f64::NAN),
        last_step: step.to_f64().unwrap_or(f64::NAN),
    })
}
