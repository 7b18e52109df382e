// ============================================================
// DASHBOARD VIEWS
// ============================================================
// Dispatch an explicit view request to the matching computation and
// return a serialisable payload for whatever renders it

use serde::{Deserialize, Serialize};

use super::correlation::{autocorrelation, cross_correlation, LagCorrelation, DEFAULT_MAX_LAG};
use super::map_points::{extract_map_points, MapPoints};
use super::pca::{principal_components, PcaResult, DEFAULT_COMPONENTS};
use super::statistics::{describe, ColumnSummary};
use super::temporal_aggregation::{temporal_aggregation, TemporalAggregation};
use crate::domain::dataset::{
    ColumnKind, CoordinatePair, DashboardView, IngestReport, RowLengthMismatch, Table,
};
use crate::domain::error::{AppError, Result};

/// Optional arguments a view may need
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewParams {
    /// Primary column (autocorrelation series, cross-correlation left side,
    /// aggregation time column, map latitude)
    pub column: Option<String>,
    /// Secondary column (cross-correlation right side, map longitude)
    pub other: Option<String>,
    /// Value column for temporal aggregation
    pub value: Option<String>,
    pub max_lag: Option<usize>,
    /// Number of principal components (default 2)
    pub components: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewPayload<'a> {
    Data {
        table: &'a Table,
        diagnostics: &'a [RowLengthMismatch],
    },
    Statistics {
        summaries: Vec<ColumnSummary>,
    },
    Autocorrelation {
        column: String,
        lags: Vec<LagCorrelation>,
    },
    CrossCorrelation {
        column: String,
        other: String,
        lags: Vec<LagCorrelation>,
    },
    TemporalAggregation {
        aggregation: TemporalAggregation,
    },
    Pca {
        pca: PcaResult,
    },
    /// `points` is `None` when no coordinate columns could be resolved
    Map {
        points: Option<MapPoints>,
    },
}

pub fn render_view<'a>(
    report: &'a IngestReport,
    view: DashboardView,
    params: &ViewParams,
) -> Result<ViewPayload<'a>> {
    let table = &report.table;
    let max_lag = params.max_lag.unwrap_or(DEFAULT_MAX_LAG);

    let payload = match view {
        DashboardView::Data => ViewPayload::Data {
            table,
            diagnostics: &report.diagnostics,
        },
        DashboardView::Statistics => ViewPayload::Statistics {
            summaries: describe(table),
        },
        DashboardView::Autocorrelation => {
            let column = required(&params.column, "column")?;
            ViewPayload::Autocorrelation {
                lags: autocorrelation(table, column, max_lag)?,
                column: column.to_string(),
            }
        }
        DashboardView::CrossCorrelation => {
            let column = required(&params.column, "column")?;
            let other = required(&params.other, "other")?;
            ViewPayload::CrossCorrelation {
                lags: cross_correlation(table, column, other, max_lag)?,
                column: column.to_string(),
                other: other.to_string(),
            }
        }
        DashboardView::TemporalAggregation => {
            let time_column = match params.column.as_deref() {
                Some(name) => name,
                None => first_timestamp_column(table)?,
            };
            ViewPayload::TemporalAggregation {
                aggregation: temporal_aggregation(table, time_column, params.value.as_deref())?,
            }
        }
        DashboardView::Pca => ViewPayload::Pca {
            pca: principal_components(table, params.components.unwrap_or(DEFAULT_COMPONENTS))?,
        },
        DashboardView::Map => {
            let pair = match (&params.column, &params.other) {
                (Some(lat), Some(lon)) => Some(CoordinatePair::new(lat.as_str(), lon.as_str())),
                _ => report.coordinates.clone(),
            };
            ViewPayload::Map {
                points: pair
                    .map(|pair| extract_map_points(table, &pair))
                    .transpose()?,
            }
        }
    };

    Ok(payload)
}

fn required<'p>(value: &'p Option<String>, name: &str) -> Result<&'p str> {
    value
        .as_deref()
        .ok_or_else(|| AppError::ValidationError(format!("'{}' parameter is required", name)))
}

fn first_timestamp_column(table: &Table) -> Result<&str> {
    table
        .columns()
        .iter()
        .find(|c| matches!(c.kind(), ColumnKind::Timestamp(_)))
        .map(|c| c.name())
        .ok_or_else(|| AppError::ValidationError("table has no timestamp column".to_string()))
}
