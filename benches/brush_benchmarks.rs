//! Benchmarks for `brush_brep` construction and rebuild operations.
//!
//! Run with: `cargo bench --bench brush_benchmarks`
//!
//! These benchmarks test:
//! - Full builds from plane lists of increasing size
//! - The editor hot path: re-evaluating a dirtied brush every frame
//! - Chopping (clip-plane insertion) into an existing solid
//! - Grid snapping
//! - Selection-mirror synchronization

use brush_brep::{Brush, BrushEvent, FaceIdx, Plane, SelectionMirror};
use divan::{Bencher, black_box};
use glam::{DMat4, DVec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() {
    divan::main();
}

// ============================================================================
// Test Data Generators
// ============================================================================

const BOX_EXTENT: f64 = 64.0;

/// A 128-unit cube centered at the origin
fn cube_brush() -> Brush {
    Brush::cuboid(
        DVec3::splat(-BOX_EXTENT),
        DVec3::splat(BOX_EXTENT),
        "bench/solid",
    )
    .unwrap()
}

/// Octahedron planes (8 diagonal normals)
fn octahedron_planes() -> Vec<(DVec3, f64)> {
    let s = 1.0 / 3.0_f64.sqrt();
    vec![
        (DVec3::new(s, s, s), BOX_EXTENT),
        (DVec3::new(s, s, -s), BOX_EXTENT),
        (DVec3::new(s, -s, s), BOX_EXTENT),
        (DVec3::new(s, -s, -s), BOX_EXTENT),
        (DVec3::new(-s, s, s), BOX_EXTENT),
        (DVec3::new(-s, s, -s), BOX_EXTENT),
        (DVec3::new(-s, -s, s), BOX_EXTENT),
        (DVec3::new(-s, -s, -s), BOX_EXTENT),
    ]
}

/// Sphere-like brush planes using a Fibonacci normal distribution
#[expect(clippy::cast_precision_loss)]
fn fibonacci_sphere_planes(n: usize) -> Vec<(DVec3, f64)> {
    let golden = f64::midpoint(1.0, 5.0_f64.sqrt());

    (0..n)
        .map(|i| {
            let theta = std::f64::consts::TAU * (i as f64) / golden;
            let phi = (1.0 - 2.0 * (i as f64 + 0.5) / n as f64).acos();

            let x = phi.sin() * theta.cos();
            let y = phi.sin() * theta.sin();
            let z = phi.cos();

            (DVec3::new(x, y, z), BOX_EXTENT)
        })
        .collect()
}

/// Random chop planes that actually intersect the benchmark cube
fn random_chop_planes(count: usize, seed: u64) -> Vec<(DVec3, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut planes = Vec::with_capacity(count);

    while planes.len() < count {
        let x: f64 = rng.random_range(-1.0..1.0);
        let y: f64 = rng.random_range(-1.0..1.0);
        let z: f64 = rng.random_range(-1.0..1.0);

        let normal = DVec3::new(x, y, z);
        if normal.length() > 0.1 {
            let normal = normal.normalize();
            let offset = rng.random_range(BOX_EXTENT * 0.3..BOX_EXTENT * 0.8);
            planes.push((normal, offset));
        }
    }

    planes
}

fn brush_from_planes(planes: &[(DVec3, f64)]) -> Brush {
    let mut brush = Brush::new();
    for &(normal, dist) in planes {
        brush
            .chop_with_plane(Plane::new(normal, dist), "bench/solid")
            .unwrap();
    }
    brush
}

// ============================================================================
// Full Build Benchmarks
// ============================================================================

#[divan::bench]
fn build_cuboid(bencher: Bencher) {
    bencher.bench_local(|| {
        let mut brush = cube_brush();
        black_box(brush.unique_vertex_points().len())
    });
}

#[divan::bench]
fn build_octahedron(bencher: Bencher) {
    let planes = octahedron_planes();

    bencher.bench_local(|| {
        let mut brush = brush_from_planes(&planes);
        black_box(brush.unique_vertex_points().len())
    });
}

#[divan::bench(args = [8, 12, 16, 20, 30, 50])]
fn build_fibonacci(bencher: Bencher, n: usize) {
    let planes = fibonacci_sphere_planes(n);

    bencher.bench_local(|| {
        let mut brush = brush_from_planes(&planes);
        black_box(brush.unique_vertex_points().len())
    });
}

// ============================================================================
// Rebuild Benchmarks (the editor hot path)
// ============================================================================

#[divan::bench]
fn rebuild_dirty_cube(bencher: Bencher) {
    let mut brush = cube_brush();
    brush.evaluate_brep();

    bencher.bench_local(move || {
        brush.mark_planes_changed();
        brush.evaluate_brep();
        black_box(brush.drain_events().len())
    });
}

#[divan::bench(args = [12, 20, 30, 50])]
fn rebuild_dirty_fibonacci(bencher: Bencher, n: usize) {
    let mut brush = brush_from_planes(&fibonacci_sphere_planes(n));
    brush.evaluate_brep();

    bencher.bench_local(move || {
        brush.mark_planes_changed();
        brush.evaluate_brep();
        black_box(brush.drain_events().len())
    });
}

#[divan::bench]
fn rebuild_after_plane_edit(bencher: Bencher) {
    let mut template = cube_brush();
    template.evaluate_brep();
    let nudged = Plane::new(DVec3::X, BOX_EXTENT - 1.0);

    bencher.bench_local(|| {
        let mut brush = template.clone();
        brush.set_face_plane(FaceIdx(0), nudged).unwrap();
        brush.evaluate_brep();
        black_box(brush.contributing_face_count())
    });
}

#[divan::bench]
fn rebuild_after_transform(bencher: Bencher) {
    let mut template = cube_brush();
    template.evaluate_brep();
    let shift = DMat4::from_translation(DVec3::new(8.0, 0.0, 0.0));

    bencher.bench_local(|| {
        let mut brush = template.clone();
        brush.transform(&shift);
        black_box(brush.local_aabb().maxs.x)
    });
}

// ============================================================================
// Chop Benchmarks
// ============================================================================

#[divan::bench]
fn chop_single_diagonal(bencher: Bencher) {
    let mut template = cube_brush();
    template.evaluate_brep();
    let diagonal = DVec3::ONE.normalize();

    bencher.bench_local(|| {
        let mut brush = template.clone();
        brush
            .chop_with_plane(Plane::new(diagonal, BOX_EXTENT), "bench/cut")
            .unwrap();
        black_box(brush.unique_vertex_points().len())
    });
}

#[divan::bench(args = [2, 4, 6, 8])]
fn chop_multiple(bencher: Bencher, extra_planes: usize) {
    let mut template = cube_brush();
    template.evaluate_brep();
    let chops = random_chop_planes(extra_planes, 12345);

    bencher.bench_local(|| {
        let mut brush = template.clone();
        for &(normal, dist) in &chops {
            brush
                .chop_with_plane(Plane::new(normal, dist), "bench/cut")
                .unwrap();
        }
        black_box(brush.unique_vertex_points().len())
    });
}

// ============================================================================
// Snap Benchmarks
// ============================================================================

#[divan::bench]
fn snap_rough_box(bencher: Bencher) {
    let mut template = Brush::cuboid(
        DVec3::new(-63.7, -64.2, -63.9),
        DVec3::new(64.3, 63.8, 64.1),
        "bench/rough",
    )
    .unwrap();
    template.evaluate_brep();

    bencher.bench_local(|| {
        let mut brush = template.clone();
        brush.snap_to_grid(8.0);
        black_box(brush.local_aabb().maxs.x)
    });
}

// ============================================================================
// Selection Mirror Benchmarks
// ============================================================================

#[divan::bench]
fn selection_sync_after_rebuild(bencher: Bencher) {
    let mut brush = cube_brush();
    let mut mirror = SelectionMirror::new();
    mirror.sync(&mut brush);

    bencher.bench_local(move || {
        brush.mark_planes_changed();
        let events = mirror.sync(&mut brush);
        black_box((events.len(), mirror.vertices().len()))
    });
}

#[divan::bench]
fn selection_sync_clean(bencher: Bencher) {
    let mut brush = cube_brush();
    let mut mirror = SelectionMirror::new();
    mirror.sync(&mut brush);

    bencher.bench_local(move || {
        let events = mirror.sync(&mut brush);
        debug_assert!(!events.contains(&BrushEvent::BRepRebuilt));
        black_box(events.len())
    });
}

// ============================================================================
// Cached Accessor Benchmarks
// ============================================================================

#[divan::bench]
fn cached_vertex_access(bencher: Bencher) {
    let mut brush = cube_brush();
    brush.evaluate_brep();

    bencher.bench_local(move || black_box(brush.unique_vertex_points().len()));
}
