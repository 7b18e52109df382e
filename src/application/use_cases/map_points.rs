// ============================================================
// MAP POINTS
// ============================================================
// Turn a coordinate column pair into plottable points

use serde::Serialize;
use tracing::debug;

use crate::domain::dataset::{CellValue, CoordinatePair, DecimalSeparator, IngestReport, Table};
use crate::domain::error::Result;
use crate::infrastructure::dataset::parse_number;

/// Where the map centres when no valid point exists (Italy)
pub const DEFAULT_MAP_CENTER: GeoPoint = GeoPoint {
    lat: 41.8719,
    lon: 12.5674,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapPoint {
    /// Row index in the table
    pub row: usize,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoints {
    pub latitude_column: String,
    pub longitude_column: String,
    pub points: Vec<MapPoint>,
    /// Rows skipped for a missing, unparseable or out-of-range coordinate
    pub dropped_rows: Vec<usize>,
    pub center: GeoPoint,
}

/// Collect every row with a valid coordinate pair
pub fn extract_map_points(table: &Table, pair: &CoordinatePair) -> Result<MapPoints> {
    let lat_column = table.column(&pair.latitude)?;
    let lon_column = table.column(&pair.longitude)?;

    let mut points = Vec::new();
    let mut dropped_rows = Vec::new();

    for row in 0..table.row_count() {
        let lat = lat_column.value(row).and_then(coerce);
        let lon = lon_column.value(row).and_then(coerce);

        match (lat, lon) {
            (Some(lat), Some(lon)) if lat.abs() <= 90.0 && lon.abs() <= 180.0 => {
                points.push(MapPoint { row, lat, lon });
            }
            _ => dropped_rows.push(row),
        }
    }

    if !dropped_rows.is_empty() {
        debug!(
            latitude = %pair.latitude,
            longitude = %pair.longitude,
            dropped = dropped_rows.len(),
            "Rows without a usable coordinate"
        );
    }

    let center = points
        .first()
        .map(|p| GeoPoint { lat: p.lat, lon: p.lon })
        .unwrap_or(DEFAULT_MAP_CENTER);

    Ok(MapPoints {
        latitude_column: pair.latitude.clone(),
        longitude_column: pair.longitude.clone(),
        points,
        dropped_rows,
        center,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetPoints {
    pub filename: String,
    /// `None` when the file has no resolvable coordinate columns
    pub points: Option<MapPoints>,
}

/// Every dataset of a session on one map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedMap {
    pub datasets: Vec<DatasetPoints>,
    /// First valid point across the datasets, in order
    pub center: GeoPoint,
}

pub fn combine_map_points<R: AsRef<IngestReport>>(reports: &[R]) -> Result<CombinedMap> {
    let datasets = reports
        .iter()
        .map(|report| {
            let report = report.as_ref();
            let points = report
                .coordinates
                .as_ref()
                .map(|pair| extract_map_points(&report.table, pair))
                .transpose()?;
            Ok(DatasetPoints {
                filename: report.filename.clone(),
                points,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let center = datasets
        .iter()
        .filter_map(|d| d.points.as_ref())
        .find_map(|m| m.points.first())
        .map(|p| GeoPoint { lat: p.lat, lon: p.lon })
        .unwrap_or(DEFAULT_MAP_CENTER);

    Ok(CombinedMap { datasets, center })
}

// Text cells get a second chance under either decimal mark
fn coerce(cell: CellValue) -> Option<f64> {
    match cell {
        CellValue::Integer(v) => Some(v as f64),
        CellValue::Float(v) => Some(v),
        CellValue::Text(v) => parse_number(&v, DecimalSeparator::Dot)
            .or_else(|| parse_number(&v, DecimalSeparator::Comma)),
        CellValue::Missing | CellValue::Timestamp(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::Column;
    use crate::domain::error::AppError;

    fn table() -> Table {
        Table::new(vec![
            Column::text(
                "lat",
                vec![
                    Some("41,89".to_string()),
                    None,
                    Some("95".to_string()),
                    Some("45.07".to_string()),
                    Some("north".to_string()),
                ],
            ),
            Column::float("lon", vec![Some(12.48), Some(9.0), Some(10.0), Some(7.68), Some(1.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_extracts_valid_rows_and_drops_the_rest() {
        let map = extract_map_points(&table(), &CoordinatePair::new("lat", "lon")).unwrap();

        assert_eq!(
            map.points,
            vec![
                MapPoint { row: 0, lat: 41.89, lon: 12.48 },
                MapPoint { row: 3, lat: 45.07, lon: 7.68 },
            ]
        );
        assert_eq!(map.dropped_rows, vec![1, 2, 4]);
        assert_eq!(map.center, GeoPoint { lat: 41.89, lon: 12.48 });
    }

    #[test]
    fn test_default_center_without_points() {
        let table = Table::new(vec![
            Column::integer("lat", vec![None]),
            Column::integer("lon", vec![Some(500)]),
        ])
        .unwrap();
        let map = extract_map_points(&table, &CoordinatePair::new("lat", "lon")).unwrap();

        assert!(map.points.is_empty());
        assert_eq!(map.center, DEFAULT_MAP_CENTER);
    }

    #[test]
    fn test_unknown_column() {
        let err = extract_map_points(&table(), &CoordinatePair::new("lat", "lng")).unwrap_err();
        assert_eq!(err, AppError::ColumnNotFound("lng".to_string()));
    }

    #[test]
    fn test_combined_map_shares_first_valid_center() {
        use crate::application::use_cases::IngestionUseCase;
        use std::sync::Arc;

        let use_case = IngestionUseCase::default();
        let reports: Vec<Arc<IngestReport>> = vec![
            use_case.ingest_text("notes.csv", "note\nhello").unwrap(),
            use_case.ingest_text("empty.csv", "lat,lon\n,\n95,10").unwrap(),
            use_case.ingest_text("rome.csv", "latitude,longitude\n41.9,12.5").unwrap(),
            use_case.ingest_text("turin.csv", "lat,lon\n45.07,7.68").unwrap(),
        ]
        .into_iter()
        .map(Arc::new)
        .collect();

        let map = combine_map_points(&reports).unwrap();

        let names: Vec<_> = map.datasets.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["notes.csv", "empty.csv", "rome.csv", "turin.csv"]);
        assert!(map.datasets[0].points.is_none());
        assert_eq!(map.datasets[1].points.as_ref().unwrap().dropped_rows, vec![0, 1]);
        assert_eq!(map.center, GeoPoint { lat: 41.9, lon: 12.5 });

        let none: Vec<Arc<IngestReport>> = Vec::new();
        assert_eq!(combine_map_points(&none).unwrap().center, DEFAULT_MAP_CENTER);
    }
}
