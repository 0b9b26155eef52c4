pub mod classes;

use nalgebra::Point3;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::LabelError;
use crate::labels;
use crate::mesh::connectivity::check_labels;
use crate::mesh::repair::{fix_label_with, RepairParams};
use crate::mesh::{LabelLocation, TaggedSurface};
use classes::PyLandmarkSet;

impl From<LabelError> for PyErr {
    fn from(err: LabelError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

fn build_surface(
    vertices: Vec<(f64, f64, f64)>,
    faces: Vec<(usize, usize, usize)>,
    labels: Vec<i32>,
    cell_labels: bool,
) -> PyResult<TaggedSurface> {
    let location = if cell_labels {
        LabelLocation::Cell
    } else {
        LabelLocation::Vertex
    };
    Ok(TaggedSurface::new(
        vertices
            .into_iter()
            .map(|(x, y, z)| Point3::new(x, y, z))
            .collect(),
        faces.into_iter().map(|(a, b, c)| [a, b, c]).collect(),
        labels,
        location,
    )?)
}

/// Checks that every label forms one connected region.
///
/// Arguments:
///
/// - ``vertices`` – list of (x, y, z)
/// - ``faces`` – list of vertex index triples
/// - ``labels`` – one label per vertex, or per face if ``cell_labels``
/// - ``check`` – label codes to test
///
/// Returns:
///
/// ``(any_invalid, invalid_labels)`` with invalid labels in input order.
#[pyfunction]
#[pyo3(signature = (vertices, faces, labels, check, cell_labels = false))]
pub fn check_label_connectivity(
    vertices: Vec<(f64, f64, f64)>,
    faces: Vec<(usize, usize, usize)>,
    labels: Vec<i32>,
    check: Vec<i32>,
    cell_labels: bool,
) -> PyResult<(bool, Vec<i32>)> {
    let surface = build_surface(vertices, faces, labels, cell_labels)?;
    Ok(check_labels(&surface, &check))
}

/// Keeps the largest region of ``wrong_label`` and relabels the others.
///
/// Returns the repaired label array.
#[pyfunction]
#[pyo3(signature = (vertices, faces, labels, wrong_label, cell_labels = false, background_label = 1))]
pub fn fix_label_connectivity(
    vertices: Vec<(f64, f64, f64)>,
    faces: Vec<(usize, usize, usize)>,
    labels: Vec<i32>,
    wrong_label: i32,
    cell_labels: bool,
    background_label: i32,
) -> PyResult<Vec<i32>> {
    let mut surface = build_surface(vertices, faces, labels, cell_labels)?;
    let params = RepairParams {
        background_label,
        ..RepairParams::default()
    };
    fix_label_with(&mut surface, wrong_label, &params)?;
    Ok(surface.labels().to_vec())
}

/// Region of one label as its own mesh, for display or export.
///
/// Returns:
///
/// ``(vertices, faces)`` with faces indexing the returned vertices.
#[pyfunction]
#[pyo3(signature = (vertices, faces, labels, code, cell_labels = false))]
pub fn extract_label_region(
    vertices: Vec<(f64, f64, f64)>,
    faces: Vec<(usize, usize, usize)>,
    labels: Vec<i32>,
    code: i32,
    cell_labels: bool,
) -> PyResult<(Vec<(f64, f64, f64)>, Vec<(usize, usize, usize)>)> {
    let region = build_surface(vertices, faces, labels, cell_labels)?.extract_label(code);
    Ok((
        region.vertices().iter().map(|p| (p.x, p.y, p.z)).collect(),
        region.faces().iter().map(|f| (f[0], f[1], f[2])).collect(),
    ))
}

/// Default (name, code) pairs for "LA" or "RA".
#[pyfunction]
pub fn load_labels(region: &str) -> PyResult<Vec<(String, i32)>> {
    Ok(labels::load_labels(region)?
        .into_iter()
        .map(|l| (l.name, l.code))
        .collect())
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(check_label_connectivity, m)?)?;
    m.add_function(wrap_pyfunction!(fix_label_connectivity, m)?)?;
    m.add_function(wrap_pyfunction!(extract_label_region, m)?)?;
    m.add_function(wrap_pyfunction!(load_labels, m)?)?;
    m.add_class::<PyLandmarkSet>()?;
    Ok(())
}
