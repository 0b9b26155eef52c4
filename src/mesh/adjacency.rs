//! Neighbourhood lookups between labelled elements.
//!
//! Vertices are neighbours when they share a triangle edge. Cells are
//! neighbours when they share at least one vertex, the same rule a
//! point-based connectivity filter uses.

use super::{LabelLocation, TaggedSurface};

#[derive(Debug, Clone)]
pub struct ElementAdjacency {
    neighbours: Vec<Vec<usize>>,
}

impl ElementAdjacency {
    pub fn build(surface: &TaggedSurface) -> Self {
        let neighbours = match surface.location() {
            LabelLocation::Vertex => vertex_neighbours(surface),
            LabelLocation::Cell => cell_neighbours(surface),
        };
        Self { neighbours }
    }

    /// Sorted, duplicate-free neighbours of one element.
    pub fn neighbours(&self, element: usize) -> &[usize] {
        self.neighbours.get(element).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }
}

fn vertex_neighbours(surface: &TaggedSurface) -> Vec<Vec<usize>> {
    let mut neighbours = vec![Vec::new(); surface.vertices().len()];
    for &[a, b, c] in surface.faces() {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            if u != v {
                neighbours[u].push(v);
                neighbours[v].push(u);
            }
        }
    }
    finish(neighbours)
}

fn cell_neighbours(surface: &TaggedSurface) -> Vec<Vec<usize>> {
    let mut vertex_to_faces: Vec<Vec<usize>> = vec![Vec::new(); surface.vertices().len()];
    for (face_idx, face) in surface.faces().iter().enumerate() {
        for &v in face {
            vertex_to_faces[v].push(face_idx);
        }
    }

    let neighbours = surface
        .faces()
        .iter()
        .enumerate()
        .map(|(face_idx, face)| {
            face.iter()
                .flat_map(|&v| vertex_to_faces[v].iter().copied())
                .filter(|&other| other != face_idx)
                .collect()
        })
        .collect();
    finish(neighbours)
}

fn finish(mut neighbours: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    for list in &mut neighbours {
        list.sort_unstable();
        list.dedup();
    }
    neighbours
}
