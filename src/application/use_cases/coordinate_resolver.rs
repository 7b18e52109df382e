// ============================================================
// COORDINATE COLUMN RESOLVER
// ============================================================
// Guess latitude/longitude columns from header names

use crate::domain::dataset::CoordinatePair;

/// Latitude keywords, highest priority first
pub const LATITUDE_KEYWORDS: [&str; 3] = ["lat", "latitude", "y"];

/// Longitude keywords, highest priority first
pub const LONGITUDE_KEYWORDS: [&str; 3] = ["lon", "longitude", "x"];

/// Pick a latitude and a longitude column by keyword.
///
/// Keywords are tried in priority order; for each keyword the first column
/// whose trimmed, lowercased name contains it is taken. Both must resolve,
/// and to different columns, or nothing is returned.
pub fn resolve_coordinates<S: AsRef<str>>(names: &[S]) -> Option<CoordinatePair> {
    let lowered: Vec<String> = names
        .iter()
        .map(|n| n.as_ref().trim().to_lowercase())
        .collect();

    let lat = find_column(&lowered, &LATITUDE_KEYWORDS, None)?;
    let lon = find_column(&lowered, &LONGITUDE_KEYWORDS, Some(lat))?;

    Some(CoordinatePair::new(names[lat].as_ref(), names[lon].as_ref()))
}

fn find_column(lowered: &[String], keywords: &[&str], exclude: Option<usize>) -> Option<usize> {
    keywords.iter().find_map(|keyword| {
        lowered
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != exclude)
            .find(|(_, name)| name.contains(keyword))
            .map(|(idx, _)| idx)
    })
}
