//! # robinson-map
//!
//! Static world maps of study sites in the Robinson projection.
//!
//! This library projects site coordinates, country outlines and a graticule
//! into one planar coordinate system and composes them into SVG and PNG
//! figures with readable edge labels.
//!
//! ## Key Features
//!
//! - **Robinson projection**: Native forward and inverse transforms driven by
//!   PROJ-style projection strings
//! - **Label placement**: Meridian labels pulled along the short pole lines by
//!   a keyed shift table, then nudged clear of the map edge
//! - **Input handling**: CSV sites with missing-value sentinels and GeoJSON
//!   basemaps
//!
//! ## Architecture
//!
//! - **Data Layer**: Loads sites and basemap outlines
//! - **Projection**: Resolves projection strings to [`projection::Projector`]s
//! - **Pipeline**: Projects everything with one shared context and writes the map

pub mod config;
pub mod data_loader;
pub mod error;
pub mod geo;
pub mod graticule;
pub mod logging;
pub mod pipeline;
pub mod projection;
pub mod render;

pub use config::Config;
pub use error::{MapError, Result};
pub use geo::{GeoPoint, ProjectedPoint};
pub use graticule::{Axis, GraticuleLabel, ProjectedLabel, ShiftTable};
pub use logging::{
    generate_run_id, init_tracing, log_error, log_load_stats, log_operation_end,
    log_operation_start, log_timed_operation,
};
pub use pipeline::{run, CoordinateProjectionPipeline, RunSummary};
pub use projection::{get_projector, project_points, NudgeOffset, Projector, Robinson};
