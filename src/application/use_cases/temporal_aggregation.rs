// ============================================================
// TEMPORAL AGGREGATION
// ============================================================
// Count (and sum, for numeric values) rows by year, month, half-year
// and meteorological season

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::dataset::{CellValue, Table};
use crate::domain::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];

    /// Meteorological season of a month (1-12); December belongs to Winter
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodCount {
    /// `2024`, `2024-03`, `2024-H1` or a season name
    pub period: String,
    pub count: usize,
    /// Only set when the value column is numeric
    pub sum: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalAggregation {
    pub time_column: String,
    pub value_column: Option<String>,
    pub yearly: Vec<PeriodCount>,
    pub monthly: Vec<PeriodCount>,
    pub half_yearly: Vec<PeriodCount>,
    pub seasonal: Vec<PeriodCount>,
}

/// Aggregate rows with a present timestamp (and a present value, when a
/// value column is given). Year, month and half-year periods are
/// contiguous between the first and last observation, empty ones included.
pub fn temporal_aggregation(
    table: &Table,
    time_column: &str,
    value_column: Option<&str>,
) -> Result<TemporalAggregation> {
    let time = table.column(time_column)?;
    let timestamps = time.timestamp_values().ok_or_else(|| {
        AppError::ValidationError(format!(
            "column '{}' is {}, a timestamp column is required",
            time_column,
            time.kind()
        ))
    })?;

    let value = value_column.map(|name| table.column(name)).transpose()?;
    let numeric = value.map_or(false, |c| c.kind().is_numeric());

    let entries: Vec<(NaiveDateTime, f64)> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(row, ts)| {
            let ts = (*ts)?;
            match value.and_then(|c| c.value(row)) {
                None if value.is_none() => Some((ts, 0.0)),
                Some(CellValue::Integer(v)) => Some((ts, v as f64)),
                Some(CellValue::Float(v)) => Some((ts, v)),
                Some(CellValue::Missing) | None => None,
                Some(_) => Some((ts, 0.0)),
            }
        })
        .collect();

    let yearly = contiguous(
        &entries,
        |ts| ts.year() as i64,
        |k| k.to_string(),
        numeric,
    );
    let monthly = contiguous(
        &entries,
        |ts| ts.year() as i64 * 12 + ts.month0() as i64,
        |k| format!("{:04}-{:02}", k.div_euclid(12), k.rem_euclid(12) + 1),
        numeric,
    );
    let half_yearly = contiguous(
        &entries,
        |ts| ts.year() as i64 * 2 + (ts.month0() / 6) as i64,
        |k| format!("{}-H{}", k.div_euclid(2), k.rem_euclid(2) + 1),
        numeric,
    );

    let seasonal = Season::ALL
        .iter()
        .map(|season| {
            let matching = entries
                .iter()
                .filter(|(ts, _)| Season::from_month(ts.month()) == *season);
            let (count, sum) = matching.fold((0, 0.0), |(c, s), (_, v)| (c + 1, s + v));
            PeriodCount {
                period: season.to_string(),
                count,
                sum: numeric.then_some(sum),
            }
        })
        .collect();

    Ok(TemporalAggregation {
        time_column: time_column.to_string(),
        value_column: value_column.map(str::to_string),
        yearly,
        monthly,
        half_yearly,
        seasonal,
    })
}

fn contiguous(
    entries: &[(NaiveDateTime, f64)],
    key: impl Fn(&NaiveDateTime) -> i64,
    label: impl Fn(i64) -> String,
    numeric: bool,
) -> Vec<PeriodCount> {
    let mut buckets: BTreeMap<i64, (usize, f64)> = BTreeMap::new();
    for (ts, v) in entries {
        let slot = buckets.entry(key(ts)).or_default();
        slot.0 += 1;
        slot.1 += v;
    }

    let (first, last) = match (buckets.keys().next(), buckets.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Vec::new(),
    };

    (first..=last)
        .map(|k| {
            let (count, sum) = buckets.get(&k).copied().unwrap_or_default();
            PeriodCount {
                period: label(k),
                count,
                sum: numeric.then_some(sum),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::{Column, TimestampSource};
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(12, 0, 0))
    }

    fn table() -> Table {
        Table::new(vec![
            Column::timestamp(
                "when",
                TimestampSource::EpochSeconds,
                vec![day(2023, 12, 5), day(2024, 1, 10), None, day(2024, 4, 1), day(2024, 7, 20)],
            ),
            Column::integer("rain", vec![Some(3), Some(4), Some(9), None, Some(1)]),
            Column::text("note", vec![None; 5]),
        ])
        .unwrap()
    }

    fn counts(periods: &[PeriodCount]) -> Vec<(&str, usize)> {
        periods.iter().map(|p| (p.period.as_str(), p.count)).collect()
    }

    #[test]
    fn test_counts_without_value_column() {
        let agg = temporal_aggregation(&table(), "when", None).unwrap();

        assert_eq!(counts(&agg.yearly), vec![("2023", 1), ("2024", 3)]);
        assert_eq!(
            counts(&agg.half_yearly),
            vec![("2023-H2", 1), ("2024-H1", 2), ("2024-H2", 1)]
        );
        assert_eq!(agg.monthly.len(), 8);
        assert_eq!(agg.monthly[0].period, "2023-12");
        assert_eq!(agg.monthly[2].count, 0);
        assert_eq!(
            counts(&agg.seasonal),
            vec![("Winter", 2), ("Spring", 1), ("Summer", 1), ("Autumn", 0)]
        );
        assert_eq!(agg.yearly[0].sum, None);
    }

    #[test]
    fn test_numeric_value_column_sums_present_values() {
        let agg = temporal_aggregation(&table(), "when", Some("rain")).unwrap();

        assert_eq!(counts(&agg.yearly), vec![("2023", 1), ("2024", 2)]);
        assert_eq!(agg.yearly[1].sum, Some(5.0));
        assert_eq!(agg.seasonal[0].sum, Some(7.0));
    }

    #[test]
    fn test_all_missing_values_leave_seasons_listed() {
        let agg = temporal_aggregation(&table(), "when", Some("note")).unwrap();
        assert!(agg.yearly.is_empty());
        assert_eq!(agg.seasonal.len(), 4);
        assert!(agg.seasonal.iter().all(|p| p.count == 0));
    }

    #[test]
    fn test_requires_timestamp_column() {
        assert!(matches!(
            temporal_aggregation(&table(), "rain", None),
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(
            temporal_aggregation(&table(), "when", Some("nope")),
            Err(AppError::ColumnNotFound("nope".to_string()))
        );
    }
}
