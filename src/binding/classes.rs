use nalgebra::Point3;
use pyo3::prelude::*;

use crate::labels::{Label, LabelRegistry};
use crate::landmarks::{LandmarkSet, SerializeFormat};

/// Python representation of a landmark set
///
/// Slots are created unset; picks are bound by label code and can be
/// undone in reverse order.
///
/// Example:
///     >>> lm = PyLandmarkSet.for_region("LA")
///     >>> lm.bind_pick(7, 11, 1.0, 2.0, 3.0)
///     2
///     >>> lm.serialize_selection(["LSPV"], "vtx")
///     '1\nextra\n7\n'
#[pyclass]
#[derive(Debug, Clone)]
pub struct PyLandmarkSet {
    pub inner: LandmarkSet,
}

#[pymethods]
impl PyLandmarkSet {
    /// Args:
    ///     names (list[str]): One slot name per label.
    ///     labels (list[tuple[str, int]]): (name, code) pairs, codes unique.
    #[new]
    fn new(names: Vec<String>, labels: Vec<(String, i32)>) -> PyResult<Self> {
        let labels: Vec<Label> = labels
            .into_iter()
            .map(|(name, code)| Label::new(name, code))
            .collect();
        Ok(Self {
            inner: LandmarkSet::with_labels(&names, &labels)?,
        })
    }

    /// Slots for the default labels of "LA" or "RA".
    #[staticmethod]
    fn for_region(region: &str) -> PyResult<Self> {
        Ok(Self {
            inner: LandmarkSet::from_registry(&LabelRegistry::for_region(region)?)?,
        })
    }

    fn initialize(&mut self, names: Vec<String>, labels: Vec<(String, i32)>) -> PyResult<()> {
        let labels: Vec<Label> = labels
            .into_iter()
            .map(|(name, code)| Label::new(name, code))
            .collect();
        self.inner.initialize(&names, &labels)?;
        Ok(())
    }

    /// Returns the index of the bound slot.
    fn bind_pick(&mut self, vertex_id: usize, code: i32, x: f64, y: f64, z: f64) -> PyResult<usize> {
        Ok(self.inner.bind_pick(vertex_id, code, Point3::new(x, y, z))?)
    }

    /// Returns the (name, code) of the cleared label, or None.
    fn undo_last(&mut self) -> Option<(String, i32)> {
        self.inner.undo_last().map(|l| (l.name, l.code))
    }

    fn all_set(&self) -> bool {
        self.inner.all_set()
    }

    fn none_picked(&self) -> bool {
        self.inner.none_picked()
    }

    fn find_vertex_id(&self, name: &str) -> Option<usize> {
        self.inner.find_vertex_id(name)
    }

    fn point_cloud(&self) -> Vec<(f64, f64, f64)> {
        self.inner
            .point_cloud()
            .iter()
            .map(|p| (p.x, p.y, p.z))
            .collect()
    }

    /// Args:
    ///     names (list[str]): Landmarks to write, in output order.
    ///     format (str): "vtx" or "coord".
    #[pyo3(signature = (names, format = "vtx", strict = false))]
    fn serialize_selection(&self, names: Vec<String>, format: &str, strict: bool) -> PyResult<String> {
        let format: SerializeFormat = format.parse()?;
        if strict {
            Ok(self.inner.serialize_selection_strict(&names, format)?)
        } else {
            Ok(self.inner.serialize_selection(&names, format))
        }
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "LandmarkSet(slots={}, set={})",
            self.inner.len(),
            self.inner.set_count()
        )
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }
}
