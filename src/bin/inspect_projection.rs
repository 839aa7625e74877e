use anyhow::{bail, Context};
use clap::Parser;

use robinson_map::geo::wrap_longitude;
use robinson_map::graticule::{Axis, GraticuleLabel, ShiftTable};
use robinson_map::projection::{get_projector, project_offset, DEFAULT_PROJECTION};

/// Print where a coordinate lands under a projection
#[derive(Parser, Debug)]
#[command(name = "inspect-projection", version, about)]
struct Args {
    /// Longitude in degrees, or planar x with --inverse
    #[arg(allow_negative_numbers = true)]
    lon: f64,

    /// Latitude in degrees, or planar y with --inverse
    #[arg(allow_negative_numbers = true)]
    lat: f64,

    /// Projection string
    #[arg(short, long, default_value = DEFAULT_PROJECTION)]
    projection: String,

    /// Convert planar coordinates back to degrees
    #[arg(long)]
    inverse: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let projector = get_projector(&args.projection)
        .with_context(|| format!("resolving projection '{}'", args.projection))?;

    println!("Projection: {} ({})", projector.name(), args.projection);

    if args.inverse {
        let (lon, lat) = projector
            .inverse(args.lon, args.lat)
            .context("inverse projection failed")?;
        println!("x = {:.4}, y = {:.4}", args.lon, args.lat);
        println!("lon = {:.8}, lat = {:.8}", lon, lat);
        return Ok(());
    }

    if !(-180.0..=180.0).contains(&args.lon) || !(-90.0..=90.0).contains(&args.lat) {
        bail!("({}, {}) is outside the geographic range", args.lon, args.lat);
    }

    let (x, y) = projector.forward(args.lon, args.lat)?;
    println!("lon = {}, lat = {}", args.lon, args.lat);
    println!("x = {:.4}, y = {:.4}", x, y);

    let (back_lon, back_lat) = projector.inverse(x, y)?;
    println!(
        "round trip error: {:.3e}°, {:.3e}°",
        (back_lon - args.lon).abs(),
        (back_lat - args.lat).abs()
    );

    let nudge = project_offset(projector.as_ref(), 10.0, 4.0)?;
    println!("label nudge: x = {:.4}, y = {:.4}", nudge.x, nudge.y);

    // Show the meridian label this longitude would carry, if it is a grid value
    let offset = wrap_longitude(args.lon - projector.central_meridian());
    if let Ok(shift) = ShiftTable::standard().get(offset) {
        let label = GraticuleLabel::new(Axis::Longitude, args.lon, args.lon - shift, 90.0);
        println!(
            "meridian label {} is placed at lon {} (shift {})",
            label.text, label.lon, shift
        );
    }

    Ok(())
}
