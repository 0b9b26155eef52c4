//! Connected-component analysis of single labels on a tagged surface.
//!
//! A label is anatomically valid when all elements carrying it form at
//! most one connected region.

use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info};

use super::adjacency::ElementAdjacency;
use super::TaggedSurface;

/// Connected regions of one label, in traversal order.
///
/// Traversal starts from the lowest unvisited element index, so the order
/// is stable for a given surface.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelComponents {
    pub label: i32,
    /// Element indices of each region, ascending within a region.
    pub components: Vec<Vec<usize>>,
}

impl LabelComponents {
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn is_connected(&self) -> bool {
        self.components.len() <= 1
    }

    pub fn total_elements(&self) -> usize {
        self.components.iter().map(Vec::len).sum()
    }

    /// Index of the largest region; the first one found wins ties.
    pub fn largest_index(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (i, comp) in self.components.iter().enumerate() {
            match best {
                Some((_, size)) if comp.len() <= size => {}
                _ => best = Some((i, comp.len())),
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn largest(&self) -> &[usize] {
        self.largest_index()
            .map_or(&[], |i| self.components[i].as_slice())
    }

    /// Region id per element (`None` for elements without this label).
    pub fn region_ids(&self, element_count: usize) -> Vec<Option<usize>> {
        let mut ids = vec![None; element_count];
        for (region, comp) in self.components.iter().enumerate() {
            for &e in comp {
                if let Some(slot) = ids.get_mut(e) {
                    *slot = Some(region);
                }
            }
        }
        ids
    }
}

/// Outcome of checking one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub label: i32,
    pub component_count: usize,
    pub is_valid: bool,
}

impl fmt::Display for ConnectivityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "label {}: {} region(s), {}",
            self.label,
            self.component_count,
            if self.is_valid { "valid" } else { "fragmented" }
        )
    }
}

pub fn label_components(surface: &TaggedSurface, label: i32) -> LabelComponents {
    let adjacency = ElementAdjacency::build(surface);
    components_with(surface, &adjacency, label)
}

pub(crate) fn components_with(
    surface: &TaggedSurface,
    adjacency: &ElementAdjacency,
    label: i32,
) -> LabelComponents {
    let labels = surface.labels();
    let mut visited = vec![false; labels.len()];
    let mut components = Vec::new();

    for start in 0..labels.len() {
        if visited[start] || labels[start] != label {
            continue;
        }

        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(element) = queue.pop_front() {
            component.push(element);
            for &n in adjacency.neighbours(element) {
                if !visited[n] && labels[n] == label {
                    visited[n] = true;
                    queue.push_back(n);
                }
            }
        }

        component.sort_unstable();
        components.push(component);
    }

    if components.len() > 1 {
        debug!(
            "label {} region sizes: {:?}",
            label,
            components.iter().map(Vec::len).collect::<Vec<_>>()
        );
    }

    LabelComponents { label, components }
}

/// One report per requested label, in input order.
pub fn analyze_labels(surface: &TaggedSurface, labels: &[i32]) -> Vec<ConnectivityReport> {
    let adjacency = ElementAdjacency::build(surface);
    labels
        .iter()
        .map(|&label| {
            let components = components_with(surface, &adjacency, label);
            let report = ConnectivityReport {
                label,
                component_count: components.component_count(),
                is_valid: components.is_connected(),
            };
            info!("{}", report);
            report
        })
        .collect()
}

/// Returns whether any label is fragmented, and which ones (input order).
pub fn check_labels(surface: &TaggedSurface, labels: &[i32]) -> (bool, Vec<i32>) {
    let invalid: Vec<i32> = analyze_labels(surface, labels)
        .into_iter()
        .filter(|r| !r.is_valid)
        .map(|r| r.label)
        .collect();
    (!invalid.is_empty(), invalid)
}

#[cfg(test)]
mod connectivity_tests {
    use super::*;
    use crate::utils::test_utils::{cell_islands_surface, strip_geometry, vertex_islands_surface};

    #[test]
    fn test_two_islands_are_flagged() {
        let surface = vertex_islands_surface();
        let components = label_components(&surface, 11);

        assert_eq!(components.component_count(), 2);
        assert_eq!(components.components[0], vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(components.components[1], vec![12, 13, 14, 15]);
        assert_eq!(components.largest_index(), Some(0));
        assert_eq!(components.total_elements(), 10);

        let (any_invalid, invalid) = check_labels(&surface, &[11]);
        assert!(any_invalid);
        assert_eq!(invalid, vec![11]);
    }

    #[test]
    fn test_invalid_labels_keep_input_order() {
        let surface = cell_islands_surface();
        let (any_invalid, invalid) = check_labels(&surface, &[13, 1, 11]);
        assert!(any_invalid);
        assert_eq!(invalid, vec![11]);

        let reports = analyze_labels(&surface, &[13, 11, 42]);
        assert_eq!(
            reports,
            vec![
                ConnectivityReport {
                    label: 13,
                    component_count: 1,
                    is_valid: true
                },
                ConnectivityReport {
                    label: 11,
                    component_count: 2,
                    is_valid: false
                },
                ConnectivityReport {
                    label: 42,
                    component_count: 0,
                    is_valid: true
                },
            ]
        );
    }

    #[test]
    fn test_clean_surface_reports_nothing() {
        let (vertices, faces) = strip_geometry(4);
        let labels = vec![1, 1, 1, 1, 11, 11, 11, 11, 19, 19];
        let surface = TaggedSurface::with_vertex_labels(vertices, faces, labels).unwrap();
        assert_eq!(check_labels(&surface, &[1, 11, 19]), (false, vec![]));
    }

    #[test]
    fn test_largest_tie_goes_to_first_region() {
        let components = LabelComponents {
            label: 5,
            components: vec![vec![0, 1], vec![4], vec![7, 8]],
        };
        assert_eq!(components.largest_index(), Some(0));
        assert_eq!(components.largest(), &[0, 1]);

        let empty = LabelComponents {
            label: 5,
            components: vec![],
        };
        assert_eq!(empty.largest_index(), None);
        assert!(empty.largest().is_empty());
        assert!(empty.is_connected());
    }

    #[test]
    fn test_region_ids() {
        let surface = vertex_islands_surface();
        let components = label_components(&surface, 11);
        let ids = components.region_ids(surface.element_count());

        assert_eq!(ids[0], Some(0));
        assert_eq!(ids[6], None);
        assert_eq!(ids[13], Some(1));
    }
}
