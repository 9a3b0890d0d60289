use ratesync_types::{ExclusionPolicy, ExclusionReason};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Decide whether a fetched row must be excluded from a write.
///
/// - every value absent (or no values at all): `AllAbsent`
/// - absent fraction strictly above `policy.threshold`: `Sparse`
/// - absolute mean and population variance of the present values both below
///   `policy.flat_epsilon`: `Flat`
///
/// Returns `None` for rows that should be written. The result depends only on
/// `values` and `policy`.
#[must_use]
pub fn evaluate_row(values: &[Option<Decimal>], policy: &ExclusionPolicy) -> Option<ExclusionReason> {
    let present: Vec<f64> = values.iter().flatten().filter_map(ToPrimitive::to_f64).collect();
    if values.iter().all(Option::is_none) {
        return Some(ExclusionReason::AllAbsent);
    }

    #[allow(clippy::cast_precision_loss)]
    let absent_fraction = (values.len() - values.iter().flatten().count()) as f64 / values.len() as f64;
    if absent_fraction > policy.threshold {
        return Some(ExclusionReason::Sparse { absent_fraction });
    }

    if let Some(eps) = policy.flat_epsilon
        && !present.is_empty()
    {
        #[allow(clippy::cast_precision_loss)]
        let n = present.len() as f64;
        let mean = present.iter().sum::<f64>() / n;
        let variance = present.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        if mean.abs() < eps && variance < eps {
            return Some(ExclusionReason::Flat);
        }
    }
    None
}
