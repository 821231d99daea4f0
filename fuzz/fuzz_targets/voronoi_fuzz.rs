#![no_main]
mod fuzz_shared;
use fortune_voronoi::VoronoiDiagram;
use fuzz_shared::FuzzPoint;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: Vec<FuzzPoint>| {
    for p in &data {
        if fortune_voronoi::validate_coordinate(p.x).is_err()
            || fortune_voronoi::validate_coordinate(p.y).is_err()
        {
            return;
        }
        if p.x.abs() > 20.0 || p.y.abs() > 20.0 {
            return;
        }
    }
    let diagram = VoronoiDiagram::new(&data).unwrap();
    diagram.validate().unwrap();
});
