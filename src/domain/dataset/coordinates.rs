use serde::{Deserialize, Serialize};

/// Latitude/longitude column association for one table.
/// Derived on demand, never stored with the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatePair {
    pub latitude: String,
    pub longitude: String,
}

impl CoordinatePair {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}
