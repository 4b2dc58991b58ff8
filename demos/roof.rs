//! Roof-line demo: prints the straight skeleton of a few sample footprints.
//!
//! Usage:
//! ```text
//! cargo run --example roof                      # all footprints
//! cargo run --example roof -- chevron           # one footprint
//! cargo run --example roof -- chevron 1.0       # inset outline at 1.0
//! ```

use wavefront_skeleton::math::Point2;
use wavefront_skeleton::operations::offset::SkeletonInset2D;
use wavefront_skeleton::operations::skeleton::{EdgeKind, StraightSkeleton2D};
use wavefront_skeleton::Result;

fn footprints() -> Vec<(&'static str, Vec<Point2<f64>>)> {
    vec![
        (
            "rectangle",
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(8.0, 0.0),
                Point2::new(8.0, 4.0),
                Point2::new(0.0, 4.0),
            ],
        ),
        (
            "chevron",
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(6.0, 0.0),
                Point2::new(6.0, 4.0),
                Point2::new(3.0, 3.0),
                Point2::new(0.0, 4.0),
            ],
        ),
        (
            "l-shape",
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(6.0, 0.0),
                Point2::new(6.0, 2.0),
                Point2::new(2.0, 2.0),
                Point2::new(2.0, 5.0),
                Point2::new(0.0, 5.0),
            ],
        ),
    ]
}

fn print_roof(name: &str, points: Vec<Point2<f64>>) -> Result<()> {
    let skeleton = StraightSkeleton2D::new(points).execute()?;
    println!("== {name}");
    for e in &skeleton.edges {
        let (Some(a), Some(b)) = (skeleton.position(e.tail), skeleton.position(e.head)) else {
            continue;
        };
        let kind = match e.kind {
            EdgeKind::Wavefront => "ridge",
            EdgeKind::VertexPath => "hip",
        };
        println!(
            "  {kind:5} ({:.3}, {:.3}, h={:.3}) -> ({:.3}, {:.3}, h={:.3})",
            a.x, a.y, a.z, b.x, b.y, b.z
        );
    }
    Ok(())
}

fn print_inset(name: &str, points: Vec<Point2<f64>>, distance: f64) -> Result<()> {
    println!("== {name} inset {distance}");
    for (i, outline) in SkeletonInset2D::new(points, distance).execute()?.iter().enumerate() {
        let coords: Vec<String> = outline
            .iter()
            .map(|p| format!("({:.3}, {:.3})", p.x, p.y))
            .collect();
        println!("  loop {i}: {}", coords.join(" "));
    }
    Ok(())
}

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for the skeleton crate.
    // Override with RUST_LOG (e.g. RUST_LOG=wavefront_skeleton=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("wavefront_skeleton=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let selected = args.first().map(String::as_str);
    let inset = args.get(1).and_then(|s| s.parse::<f64>().ok());

    for (name, points) in footprints() {
        if selected.is_some_and(|s| s != name) {
            continue;
        }
        match inset {
            Some(distance) => print_inset(name, points, distance)?,
            None => print_roof(name, points)?,
        }
    }
    Ok(())
}
