use std::cmp::Ordering;

use itertools::Itertools;
use num_traits::Float;

use crate::error::Degeneracy;
use crate::Result;

/// Convert an observation count into the working float type
pub(crate) fn count<E: Float>(n: usize) -> Result<E> {
    E::from(n).ok_or_else(|| {
        Degeneracy::NonFinite {
            quantity: "observation count",
        }
        .into()
    })
}

/// Arithmetic mean of the values which are not `NaN`
///
/// Returns `None` when every value is missing.
pub(crate) fn nan_mean<'a, E: Float + 'a>(values: impl IntoIterator<Item = &'a E>) -> Option<E> {
    let (sum, n) = values
        .into_iter()
        .filter(|value| !value.is_nan())
        .fold((E::zero(), 0usize), |(sum, n), &value| (sum + value, n + 1));

    if n == 0 {
        None
    } else {
        E::from(n).map(|n| sum / n)
    }
}

/// Median of the values which are not `NaN`
///
/// An even number of values yields the mean of the two central values. Returns `None` when every
/// value is missing.
pub(crate) fn nan_median<E: Float>(values: impl IntoIterator<Item = E>) -> Option<E> {
    let sorted = values
        .into_iter()
        .filter(|value| !value.is_nan())
        .sorted_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .collect_vec();

    let n = sorted.len();
    match n {
        0 => None,
        n if n % 2 == 1 => Some(sorted[n / 2]),
        n => {
            let two = E::one() + E::one();
            Some((sorted[n / 2 - 1] + sorted[n / 2]) / two)
        }
    }
}

/// Divide `numerator` by `denominator`, rejecting a zero divisor or a non-finite quotient
pub(crate) fn checked_div<E: Float>(
    numerator: E,
    denominator: E,
    quantity: &'static str,
) -> Result<E> {
    if denominator.is_zero() {
        return Err(Degeneracy::ZeroDivisor { quantity }.into());
    }
    finite(numerator / denominator, quantity)
}

/// Square root of `value`, rejecting negative or non-finite radicands
pub(crate) fn checked_sqrt<E: Float>(value: E, quantity: &'static str) -> Result<E> {
    if value < E::zero() {
        return Err(Degeneracy::NegativeRadicand {
            quantity,
            value: value.to_f64().unwrap_or(f64::NAN),
        }
        .into());
    }
    finite(value.sqrt(), quantity)
}

/// Pass `value` through if it is finite
pub(crate) fn finite<E: Float>(value: E, quantity: &'static str) -> Result<E> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Degeneracy::NonFinite { quantity }.into())
    }
}
