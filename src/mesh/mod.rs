pub mod adjacency;
pub mod connectivity;
pub mod repair;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

use crate::error::{LabelError, LabelResult};

/// Whether the label field is attached to vertices or to triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelLocation {
    Vertex,
    Cell,
}

/// Triangle surface carrying one integer label per vertex or per cell.
///
/// Loading and saving are left to the host; the labelling core only reads
/// and rewrites the label field.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedSurface {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
    labels: Vec<i32>,
    location: LabelLocation,
}

impl TaggedSurface {
    pub fn new(
        vertices: Vec<Point3<f64>>,
        faces: Vec<[usize; 3]>,
        labels: Vec<i32>,
        location: LabelLocation,
    ) -> LabelResult<Self> {
        if let Some(face) = faces.iter().find(|f| f.iter().any(|&v| v >= vertices.len())) {
            return Err(LabelError::InvalidSurface {
                reason: format!(
                    "face {:?} references a vertex beyond {}",
                    face,
                    vertices.len()
                ),
            });
        }

        let expected = match location {
            LabelLocation::Vertex => vertices.len(),
            LabelLocation::Cell => faces.len(),
        };
        if labels.len() != expected {
            return Err(LabelError::InvalidSurface {
                reason: format!(
                    "{} labels for {} {:?} elements",
                    labels.len(),
                    expected,
                    location
                ),
            });
        }

        Ok(Self {
            vertices,
            faces,
            labels,
            location,
        })
    }

    pub fn with_vertex_labels(
        vertices: Vec<Point3<f64>>,
        faces: Vec<[usize; 3]>,
        labels: Vec<i32>,
    ) -> LabelResult<Self> {
        Self::new(vertices, faces, labels, LabelLocation::Vertex)
    }

    pub fn with_cell_labels(
        vertices: Vec<Point3<f64>>,
        faces: Vec<[usize; 3]>,
        labels: Vec<i32>,
    ) -> LabelResult<Self> {
        Self::new(vertices, faces, labels, LabelLocation::Cell)
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    pub fn location(&self) -> LabelLocation {
        self.location
    }

    /// Number of labelled elements (vertices or cells).
    pub fn element_count(&self) -> usize {
        self.labels.len()
    }

    pub fn point(&self, vertex_id: usize) -> LabelResult<Point3<f64>> {
        self.vertices
            .get(vertex_id)
            .copied()
            .ok_or(LabelError::InvalidVertexIndex {
                index: vertex_id,
                vertex_count: self.vertices.len(),
            })
    }

    pub fn label(&self, element: usize) -> Option<i32> {
        self.labels.get(element).copied()
    }

    pub fn set_label(&mut self, element: usize, code: i32) -> LabelResult<()> {
        let count = self.labels.len();
        match self.labels.get_mut(element) {
            Some(slot) => {
                *slot = code;
                Ok(())
            }
            None => {
                warn!("label element {} out of bounds ({})", element, count);
                Err(LabelError::InvalidSurface {
                    reason: format!("element {} out of bounds ({})", element, count),
                })
            }
        }
    }

    pub fn count_label(&self, code: i32) -> usize {
        self.labels.iter().filter(|&&l| l == code).count()
    }

    pub fn elements_with_label(&self, code: i32) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, &l)| if l == code { Some(i) } else { None })
            .collect()
    }

    /// Distinct label codes on the surface, ascending.
    pub fn label_codes(&self) -> Vec<i32> {
        self.labels
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn closest_vertex(&self, point: &Point3<f64>) -> Option<usize> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (i, nalgebra::distance_squared(v, point)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
    }

    /// Sub-surface made of the elements carrying `code`, with compacted
    /// vertex indices. Host-facing: the connectivity passes never build
    /// sub-surfaces, this is for showing or exporting one label region. With vertex labels a face survives only when all
    /// three corners carry the label; labelled vertices are kept even if
    /// no face survives.
    pub fn extract_label(&self, code: i32) -> TaggedSurface {
        let keep_vertex: Vec<bool> = match self.location {
            LabelLocation::Vertex => self.labels.iter().map(|&l| l == code).collect(),
            LabelLocation::Cell => {
                let mut used = vec![false; self.vertices.len()];
                for (face, &l) in self.faces.iter().zip(&self.labels) {
                    if l == code {
                        face.iter().for_each(|&v| used[v] = true);
                    }
                }
                used
            }
        };

        let mut remap = vec![usize::MAX; self.vertices.len()];
        let mut vertices = Vec::new();
        for (i, v) in self.vertices.iter().enumerate() {
            if keep_vertex[i] {
                remap[i] = vertices.len();
                vertices.push(*v);
            }
        }

        let kept_faces: Vec<usize> = (0..self.faces.len())
            .filter(|&f| match self.location {
                LabelLocation::Vertex => self.faces[f].iter().all(|&v| keep_vertex[v]),
                LabelLocation::Cell => self.labels[f] == code,
            })
            .collect();
        let faces = kept_faces
            .iter()
            .map(|&f| {
                let [a, b, c] = self.faces[f];
                [remap[a], remap[b], remap[c]]
            })
            .collect();

        let labels = match self.location {
            LabelLocation::Vertex => vec![code; vertices.len()],
            LabelLocation::Cell => vec![code; kept_faces.len()],
        };

        TaggedSurface {
            vertices,
            faces,
            labels,
            location: self.location,
        }
    }
}
