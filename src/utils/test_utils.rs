use nalgebra::Point3;

use crate::mesh::TaggedSurface;
use crate::ostia::VolumeImage;

/// Row of unit quads along x. Column `i` holds vertex `2i` at y=0 and
/// `2i + 1` at y=1; quad `k` is split into faces `2k` and `2k + 1`.
pub fn strip_geometry(n_quads: usize) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut vertices = Vec::with_capacity(2 * (n_quads + 1));
    for i in 0..=n_quads {
        vertices.push(Point3::new(i as f64, 0.0, 0.0));
        vertices.push(Point3::new(i as f64, 1.0, 0.0));
    }
    let mut faces = Vec::with_capacity(2 * n_quads);
    for k in 0..n_quads {
        let (b, t) = (2 * k, 2 * k + 1);
        faces.push([b, b + 2, t]);
        faces.push([t, b + 2, t + 2]);
    }
    (vertices, faces)
}

/// Ten-quad strip with vertex labels: columns 0-2 and 6-7 carry 11,
/// columns 3-5 carry 1, columns 8-10 carry 13.
pub fn vertex_islands_surface() -> TaggedSurface {
    let (vertices, faces) = strip_geometry(10);
    let labels = (0..vertices.len())
        .map(|v| match v / 2 {
            0..=2 => 11,
            3..=5 => 1,
            6..=7 => 11,
            _ => 13,
        })
        .collect();
    TaggedSurface::with_vertex_labels(vertices, faces, labels).unwrap()
}

/// Ten-quad strip with cell labels: quads 0-1 and 5 carry 11, quads 2-4
/// carry 1, quads 6-9 carry 13.
pub fn cell_islands_surface() -> TaggedSurface {
    let (vertices, faces) = strip_geometry(10);
    let labels = (0..faces.len())
        .map(|f| match f / 2 {
            0..=1 => 11,
            2..=4 => 1,
            5 => 11,
            _ => 13,
        })
        .collect();
    TaggedSurface::with_cell_labels(vertices, faces, labels).unwrap()
}

/// 20^3 volume (1mm spacing, origin 0) with 2x2x2 blocks of value
/// `code` whose lower corner sits at each given voxel index.
pub fn blocks_volume(blocks: &[(u16, [usize; 3])]) -> VolumeImage {
    let dims = [20, 20, 20];
    let mut image = VolumeImage::new(
        dims,
        [1.0, 1.0, 1.0],
        [0.0, 0.0, 0.0],
        vec![0; dims[0] * dims[1] * dims[2]],
    )
    .unwrap();
    for &(code, [i, j, k]) in blocks {
        for dk in 0..2 {
            for dj in 0..2 {
                for di in 0..2 {
                    image.set(i + di, j + dj, k + dk, code).unwrap();
                }
            }
        }
    }
    image
}

/// Unique path in the system temp dir.
pub fn temp_path(stem: &str, extension: &str) -> std::path::PathBuf {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "{}_{}_{}.{}",
        stem,
        std::process::id(),
        n,
        extension
    ))
}
