// ============================================================
// DASHBOARD VIEW
// ============================================================
// Which panel a request wants rendered. Passed explicitly with every
// request instead of living in session-wide toggles.

use serde::{Deserialize, Serialize};

use crate::domain::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardView {
    /// The typed table itself
    Data,
    /// Per-column summary statistics
    Statistics,
    Autocorrelation,
    CrossCorrelation,
    /// Counts by year, month, half-year and season
    TemporalAggregation,
    /// Principal components of the numeric columns
    Pca,
    /// Coordinate points for the map
    Map,
}

impl Default for DashboardView {
    fn default() -> Self {
        DashboardView::Data
    }
}

impl std::str::FromStr for DashboardView {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "data" => Ok(DashboardView::Data),
            "statistics" | "stats" => Ok(DashboardView::Statistics),
            "autocorrelation" => Ok(DashboardView::Autocorrelation),
            "cross_correlation" => Ok(DashboardView::CrossCorrelation),
            "temporal_aggregation" | "temporal" => Ok(DashboardView::TemporalAggregation),
            "pca" => Ok(DashboardView::Pca),
            "map" => Ok(DashboardView::Map),
            other => Err(AppError::NotFound(format!("unknown view '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view() {
        assert_eq!("map".parse::<DashboardView>().unwrap(), DashboardView::Map);
        assert_eq!(
            "cross-correlation".parse::<DashboardView>().unwrap(),
            DashboardView::CrossCorrelation
        );
        assert_eq!("PCA".parse::<DashboardView>().unwrap(), DashboardView::Pca);
        assert!("pie".parse::<DashboardView>().is_err());
    }
}
