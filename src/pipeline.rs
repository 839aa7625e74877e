//! The coordinate projection pipeline and a complete map run.
//!
//! [`CoordinateProjectionPipeline`] owns everything that stays fixed for a
//! run (projector, shift table, nudge offset) and projects sites, basemap
//! layers and graticule labels with it. [`run`] drives a whole map from a
//! [`Config`]: load, project, compose, write.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{Config, OutputFormat};
use crate::data_loader::{load_basemap, load_sites, SkippedRow};
use crate::error::{MapError, Result};
use crate::geo::{validate_points, GeoPoint, Layer, ProjectedPoint};
use crate::graticule::{
    apply_label_nudge_about, apply_longitude_shift_about, bounding_box, graticule_labels,
    graticule_lines, meridian_offsets, project_labels, Axis, GraticuleLabel, GraticuleSpec,
    ProjectedLabel, ShiftTable,
};
use crate::logging::{generate_run_id, log_operation_end, log_operation_start, log_timed_operation};
use crate::projection::{
    get_projector, project_coord, project_offset, project_points_with, NudgeOffset, Projector,
};
use crate::render::{encode_png, render_png, render_svg, Scene, Viewport};

/// Projects sites, layers and labels into one planar system
pub struct CoordinateProjectionPipeline {
    projector: Box<dyn Projector>,
    shift_table: ShiftTable,
    nudge: NudgeOffset,
}

impl CoordinateProjectionPipeline {
    /// Build a pipeline; the nudge is the planar size of `nudge_degrees`
    pub fn new(
        projector: Box<dyn Projector>,
        shift_table: ShiftTable,
        nudge_degrees: (f64, f64),
    ) -> Result<Self> {
        let nudge = project_offset(projector.as_ref(), nudge_degrees.0, nudge_degrees.1)?;
        debug!(
            projection = projector.name(),
            nudge_x = nudge.x,
            nudge_y = nudge.y,
            "Computed label nudge"
        );
        Ok(Self {
            projector,
            shift_table,
            nudge,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            get_projector(&config.projection.spec)?,
            config.graticule.shift_table()?,
            (config.projection.nudge_lon, config.projection.nudge_lat),
        )
    }

    pub fn projector(&self) -> &dyn Projector {
        self.projector.as_ref()
    }

    pub fn nudge(&self) -> NudgeOffset {
        self.nudge
    }

    pub fn shift_table(&self) -> &ShiftTable {
        &self.shift_table
    }

    /// `spec` laid out around this pipeline's central meridian
    pub fn graticule_spec(&self, spec: GraticuleSpec) -> GraticuleSpec {
        spec.centred_on(self.projector.central_meridian())
    }

    /// Validate then project points; nothing is projected if any point is invalid
    pub fn project_points(&self, points: &[GeoPoint]) -> Result<Vec<ProjectedPoint>> {
        validate_points(points)?;
        project_points_with(points, self.projector())
    }

    /// Project every geometry of a layer
    pub fn project_layer(&self, layer: &Layer) -> Result<Layer> {
        layer
            .try_map_coords(|coord| project_coord(self.projector(), coord))
            .map_err(|e| MapError::projection(format!("layer {}: {}", layer.name, e)))
    }

    /// Shift, project and nudge graticule labels.
    ///
    /// Shifts are looked up by each meridian's distance from the central
    /// meridian, and parallel labels are pushed away from it.
    pub fn project_labels(&self, labels: &[GraticuleLabel]) -> Result<Vec<ProjectedLabel>> {
        let lon_0 = self.projector.central_meridian();
        self.shift_table.validate_covers(&meridian_offsets(labels, lon_0))?;

        let meridian_values: Vec<f64> = labels
            .iter()
            .filter(|l| l.axis == Axis::Longitude)
            .map(|l| l.value)
            .collect();
        report_cardinality(&meridian_values);

        let shifted = apply_longitude_shift_about(labels, &self.shift_table, lon_0)?;
        let projected = project_labels(&shifted, self.projector())?;
        let projected = apply_label_nudge_about(projected, Axis::Longitude, self.nudge, lon_0);
        Ok(apply_label_nudge_about(projected, Axis::Latitude, self.nudge, lon_0))
    }
}

/// Shifts are keyed by value, so any count works; unusual counts are still
/// worth a warning because they usually mean a malformed label set.
fn report_cardinality(meridian_values: &[f64]) {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for value in meridian_values {
        *counts.entry(value.round() as i64).or_default() += 1;
    }

    let unusual: Vec<String> = counts
        .iter()
        .filter(|&(_, &count)| count != 2)
        .map(|(value, count)| format!("{}°x{}", value, count))
        .collect();

    if unusual.is_empty() {
        debug!(values = counts.len(), "Two meridian labels per value");
    } else {
        warn!(
            values = %unusual.join(", "),
            "Meridian labels do not come in pairs"
        );
    }
}

/// Projected data written next to the map for downstream tools
#[derive(Debug, Serialize)]
pub struct ProjectedData<'a> {
    pub projection: &'a str,
    pub nudge: NudgeOffset,
    pub sites: &'a [ProjectedPoint],
    pub labels: &'a [ProjectedLabel],
    pub skipped: &'a [SkippedRow],
}

/// What a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub sites_read: usize,
    pub sites_projected: usize,
    pub sites_skipped: usize,
    pub labels: usize,
    pub files: Vec<PathBuf>,
}

/// A composed scene plus what loading left out
#[derive(Debug, Clone)]
pub struct MapBuild {
    pub scene: Scene,
    pub nudge: NudgeOffset,
    pub skipped: Vec<SkippedRow>,
    pub rows_read: usize,
}

/// Load inputs and project everything, without writing anything
pub fn build_scene(config: &Config) -> Result<MapBuild> {
    let pipeline = CoordinateProjectionPipeline::from_config(config)?;

    let sites_path = config.input.sites_path.as_ref().ok_or_else(|| MapError::Config {
        message: "No sites file given".to_string(),
    })?;
    let table = load_sites(sites_path, &config.input)?;

    let sites = log_timed_operation("project_sites", || pipeline.project_points(&table.points))?;

    let spec = pipeline.graticule_spec(config.graticule.spec());
    let mut geographic_layers = vec![bounding_box(&spec), graticule_lines(&spec)];
    if let Some(path) = &config.input.basemap_path {
        geographic_layers.push(load_basemap(path)?);
    }

    let layers = log_timed_operation("project_layers", || {
        geographic_layers
            .iter()
            .map(|layer| pipeline.project_layer(layer))
            .collect::<Result<Vec<_>>>()
    })?;

    let labels = pipeline.project_labels(&graticule_labels(&spec))?;

    Ok(MapBuild {
        scene: Scene {
            layers,
            sites,
            labels,
        },
        nudge: pipeline.nudge(),
        skipped: table.skipped,
        rows_read: table.rows_read,
    })
}

/// Run the whole map: load, project, compose and write every output
pub fn run(config: &Config) -> Result<RunSummary> {
    let run_id = generate_run_id();
    let start = Instant::now();
    log_operation_start("render_map", Some(&run_id));

    let build = build_scene(config)?;
    let scene = &build.scene;
    let extent = scene.extent().ok_or_else(|| MapError::Render {
        message: "Nothing to draw".to_string(),
    })?;

    let output = &config.output;
    let (width, height) = output.pixel_size();
    let viewport = Viewport::fit(extent, width, height, output.dpi as f64);

    std::fs::create_dir_all(&output.dir)?;
    let mut files = Vec::new();

    for &format in &output.formats {
        let path = output.path_for(format);
        match format {
            OutputFormat::Svg => {
                let svg = render_svg(scene, &viewport, &config.style, output.width_in, output.height_in);
                std::fs::write(&path, svg)?;
            }
            OutputFormat::Png => {
                let img = log_timed_operation("rasterise", || {
                    render_png(scene, &viewport, &config.style)
                })?;
                std::fs::write(&path, encode_png(&img)?)?;
            }
        }
        info!(path = %path.display(), "Wrote map");
        files.push(path);
    }

    if output.write_json {
        let path = output.json_path();
        let data = ProjectedData {
            projection: &config.projection.spec,
            nudge: build.nudge,
            sites: &scene.sites,
            labels: &scene.labels,
            skipped: &build.skipped,
        };
        std::fs::write(&path, serde_json::to_string_pretty(&data)?)?;
        info!(path = %path.display(), "Wrote projected data");
        files.push(path);
    }

    let summary = RunSummary {
        run_id,
        sites_read: build.rows_read,
        sites_projected: scene.sites.len(),
        sites_skipped: build.skipped.len(),
        labels: scene.labels.len(),
        files,
    };

    log_operation_end("render_map", start, summary.sites_skipped == 0);
    Ok(summary)
}
