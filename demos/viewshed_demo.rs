//! Demonstration of quadrant-split viewsheds
//!
//! Runs on synthetic hills by default. Pass a directory of SRTM3 `.hgt`
//! tiles plus an observer latitude and longitude to use real terrain:
//!
//! ```text
//! RUST_LOG=debug cargo run --example viewshed_demo -- ./hgt 36.35 -112.1
//! ```

use std::time::Instant;

use fog_viewshed::terrain::generate_matrix;
use fog_viewshed::{
    AxisOrientedBoundingBox, ElevationDataGrid, GeoCoord, HeightField, HillsTerrain, Observer,
    Resolution, Viewshed, Visibility,
};

fn report<H: HeightField + Sync + ?Sized>(field: &H, observer: Observer) {
    println!("{:-<60}", "");
    for quadrants in [1u8, 2, 4] {
        let start = Instant::now();
        match Viewshed::compute(field, observer, quadrants) {
            Ok(viewshed) => {
                let grid = viewshed.grid();
                println!(
                    "{} quadrant(s): {:6} visible, {:6} occluded  ({:.2?})",
                    quadrants,
                    grid.count(Visibility::Visible),
                    grid.count(Visibility::Occluded),
                    start.elapsed()
                );
            }
            Err(e) => println!("{} quadrant(s): failed: {}", quadrants, e),
        }
    }
    println!("{:-<60}", "");
}

fn main() {
    env_logger::init();
    println!("Viewshed Demo\n");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [dir, lat, lon] = args.as_slice() {
        let (Ok(lat), Ok(lon)) = (lat.parse::<f64>(), lon.parse::<f64>()) else {
            eprintln!("latitude and longitude must be numbers");
            std::process::exit(1);
        };
        let radius = 150;
        let margin = (radius as f64 + 1.0) * Resolution::Srtm3.cell_size();
        let bbox = match AxisOrientedBoundingBox::new(
            GeoCoord::new(lat - margin, lon - margin),
            GeoCoord::new(lat + margin, lon + margin),
        ) {
            Ok(bbox) => bbox,
            Err(e) => {
                eprintln!("bad region: {}", e);
                std::process::exit(1);
            }
        };

        let grid = match ElevationDataGrid::assemble_from_directory(dir, &bbox, Resolution::Srtm3) {
            Ok(grid) => grid,
            Err(e) => {
                eprintln!("could not assemble grid: {}", e);
                std::process::exit(1);
            }
        };
        println!(
            "Assembled {}x{} grid ({} void cells)",
            grid.rows(),
            grid.cols(),
            grid.void_count()
        );

        match Observer::at_coordinate(&grid, GeoCoord::new(lat, lon), 20.0, radius) {
            Ok(observer) => report(&grid, observer),
            Err(e) => eprintln!("bad observer: {}", e),
        }
        return;
    }

    let size = 200;
    let field = generate_matrix(size, size, &HillsTerrain::new(42, size, size, 30, 250.0));
    println!("Synthetic {}x{} hills, seed 42", size, size);

    let observer = match Observer::new(100, 100, 20.0, 80) {
        Ok(observer) => observer,
        Err(e) => {
            eprintln!("bad observer: {}", e);
            return;
        }
    };
    report(&field, observer);

    // Small enough to print
    let close = Observer { radius: 12, ..observer };
    if let Ok(viewshed) = Viewshed::compute(&field, close, 4) {
        println!("Radius 12 around (100, 100), '*' visible, '.' hidden:\n");
        print!("{}", viewshed.grid());
    }
}
