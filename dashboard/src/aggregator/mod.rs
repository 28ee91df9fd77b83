//! Aggregator: pure functions from fetched collections to view state
//!
//! Nothing here holds state or performs I/O. Every function tolerates empty
//! input (zeroed totals, empty subsets) and treats missing numeric fields
//! as zero, so the same input always yields the same view.

pub mod filters;
pub mod panel;
pub mod views;

pub use filters::{AgentFilter, LogFilter, SearchFilter, SessionFilter, SkillFilter, StatusFilter};
pub use panel::{aggregate, PanelView, ViewQuery};
pub use views::{
    agents_view, health_view, logs_view, overview, sessions_view, skills_view, tokens_view,
    AgentsView, HealthView, LogsView, OverviewView, SessionsView, ShareRow, SkillsView,
    SourceTokens, TokenRow, TokensView,
};

/// Saturating sum where a missing value counts as zero
pub(crate) fn sum_u64<I>(values: I) -> u64
where
    I: IntoIterator<Item = Option<u64>>,
{
    values
        .into_iter()
        .fold(0u64, |acc, v| acc.saturating_add(v.unwrap_or(0)))
}

/// Sum where missing or non-finite values count as zero. Saturates at
/// `±f64::MAX` so the result always serializes as a number.
pub(crate) fn sum_f64<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let total: f64 = values
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
        .sum();
    total.clamp(f64::MIN, f64::MAX)
}

/// Mean over present, finite values; `None` when there are none
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(sum, count), x| (sum + x, count + 1));
    if count == 0 {
        None
    } else {
        Some((sum / count as f64).clamp(f64::MIN, f64::MAX))
    }
}

/// Percentage of `part` in `whole`, zero when `whole` is zero
pub(crate) fn pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_sum_as_zero() {
        assert_eq!(sum_u64([Some(3), None, Some(4)]), 7);
        assert_eq!(sum_u64(std::iter::empty()), 0);
        assert_eq!(sum_f64([Some(1.5), None, Some(f64::NAN)]), 1.5);
    }

    #[test]
    fn sum_saturates_instead_of_overflowing() {
        assert_eq!(sum_u64([Some(u64::MAX), Some(1)]), u64::MAX);
        assert_eq!(sum_f64([Some(f64::MAX), Some(f64::MAX)]), f64::MAX);
        assert_eq!(sum_f64([Some(f64::MIN), Some(f64::MIN)]), f64::MIN);
        assert_eq!(mean([Some(f64::MAX), Some(f64::MAX)]), Some(f64::MAX));
    }

    #[test]
    fn mean_ignores_missing() {
        assert_eq!(mean([Some(10.0), None, Some(20.0)]), Some(15.0));
        assert_eq!(mean([None, None]), None);
        assert_eq!(pct(1.0, 0.0), 0.0);
        assert_eq!(pct(1.0, 4.0), 25.0);
    }
}
