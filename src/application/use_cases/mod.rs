pub mod coordinate_resolver;
pub mod correlation;
pub mod dashboard;
pub mod ingestion;
pub mod map_points;
pub mod pca;
pub mod session;
pub mod statistics;
pub mod temporal_aggregation;

pub use coordinate_resolver::resolve_coordinates;
pub use dashboard::{render_view, ViewParams, ViewPayload};
pub use ingestion::IngestionUseCase;
pub use map_points::combine_map_points;
pub use session::SessionStore;
