//! Repair of fragmented labels.
//!
//! The largest region of a label keeps it. Every other region takes the
//! label most common among its neighbouring elements, or the background
//! label when it touches nothing.

use std::collections::HashSet;
use tracing::{info, warn};

use super::adjacency::ElementAdjacency;
use super::connectivity::{analyze_labels, components_with};
use super::TaggedSurface;
use crate::config::RepairConfig;
use crate::error::{LabelError, LabelResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairParams {
    pub background_label: i32,
    pub max_passes: usize,
}

impl Default for RepairParams {
    fn default() -> Self {
        RepairConfig::default().into()
    }
}

impl From<RepairConfig> for RepairParams {
    fn from(config: RepairConfig) -> Self {
        Self {
            background_label: config.background_label,
            max_passes: config.max_passes,
        }
    }
}

/// What `fix_label` did to one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixSummary {
    pub label: i32,
    pub components_before: usize,
    /// Size of the region that kept the label.
    pub kept: usize,
    /// (new label, element count) per reassigned region, in traversal order.
    pub reassigned: Vec<(i32, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairReport {
    pub passes: usize,
    pub fixes: Vec<FixSummary>,
    /// Labels still fragmented when the pass budget ran out.
    pub remaining: Vec<i32>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.remaining.is_empty()
    }
}

pub fn fix_label(surface: &mut TaggedSurface, wrong_label: i32) -> LabelResult<FixSummary> {
    fix_label_with(surface, wrong_label, &RepairParams::default())
}

/// Make `wrong_label` a single connected region, rewriting the label field
/// in place. Targets for all stray regions are resolved before anything is
/// rewritten, so on error the surface is unchanged.
pub fn fix_label_with(
    surface: &mut TaggedSurface,
    wrong_label: i32,
    params: &RepairParams,
) -> LabelResult<FixSummary> {
    let adjacency = ElementAdjacency::build(surface);
    let components = components_with(surface, &adjacency, wrong_label);

    let keep = components
        .largest_index()
        .ok_or(LabelError::Unfixable { label: wrong_label })?;

    let mut summary = FixSummary {
        label: wrong_label,
        components_before: components.component_count(),
        kept: components.components[keep].len(),
        reassigned: Vec::new(),
    };

    let mut plan = Vec::with_capacity(components.component_count().saturating_sub(1));
    for (i, region) in components.components.iter().enumerate() {
        if i == keep {
            continue;
        }
        let target = neighbour_majority(surface, &adjacency, region, wrong_label)
            .unwrap_or(params.background_label);
        if target == wrong_label {
            warn!(
                "isolated region of label {} has no neighbours and background is the same label",
                wrong_label
            );
            return Err(LabelError::NoReassignTarget {
                label: wrong_label,
                size: region.len(),
            });
        }
        plan.push((region, target));
    }

    for (region, target) in plan {
        for &element in region {
            surface.set_label(element, target)?;
        }
        summary.reassigned.push((target, region.len()));
    }

    if !summary.reassigned.is_empty() {
        info!(
            "label {}: kept region of {} elements, reassigned {:?}",
            wrong_label, summary.kept, summary.reassigned
        );
    }
    Ok(summary)
}

// Most frequent label over the distinct elements bordering `region`;
// ties go to the label met first while walking the region in order.
fn neighbour_majority(
    surface: &TaggedSurface,
    adjacency: &ElementAdjacency,
    region: &[usize],
    wrong_label: i32,
) -> Option<i32> {
    let labels = surface.labels();
    let mut seen: HashSet<usize> = HashSet::new();
    let mut tally: Vec<(i32, usize)> = Vec::new();

    for &element in region {
        for &n in adjacency.neighbours(element) {
            if labels[n] == wrong_label || !seen.insert(n) {
                continue;
            }
            match tally.iter_mut().find(|(l, _)| *l == labels[n]) {
                Some((_, count)) => *count += 1,
                None => tally.push((labels[n], 1)),
            }
        }
    }

    let mut best: Option<(i32, usize)> = None;
    for (label, count) in tally {
        match best {
            Some((_, c)) if count <= c => {}
            _ => best = Some((label, count)),
        }
    }
    best.map(|(label, _)| label)
}

/// Check `labels` and fix every fragmented one until the surface is clean
/// or `params.max_passes` rounds have run.
pub fn repair_surface(
    surface: &mut TaggedSurface,
    labels: &[i32],
    params: &RepairParams,
) -> LabelResult<RepairReport> {
    let mut fixes = Vec::new();
    let mut passes = 0;

    loop {
        let invalid: Vec<i32> = analyze_labels(surface, labels)
            .into_iter()
            .filter(|r| !r.is_valid)
            .map(|r| r.label)
            .collect();

        if invalid.is_empty() || passes >= params.max_passes {
            if !invalid.is_empty() {
                warn!("labels {:?} still fragmented after {} passes", invalid, passes);
            }
            return Ok(RepairReport {
                passes,
                fixes,
                remaining: invalid,
            });
        }

        for label in invalid {
            fixes.push(fix_label_with(surface, label, params)?);
        }
        passes += 1;
    }
}

#[cfg(test)]
mod repair_tests {
    use super::*;
    use crate::mesh::connectivity::{check_labels, label_components};
    use crate::utils::test_utils::{cell_islands_surface, strip_geometry, vertex_islands_surface};

    #[test]
    fn test_fix_keeps_largest_island() {
        let mut surface = vertex_islands_surface();
        let largest = label_components(&surface, 11).largest().len();

        let summary = fix_label(&mut surface, 11).unwrap();

        assert_eq!(summary.components_before, 2);
        assert_eq!(summary.kept, 6);
        // tie between 1 and 13 on the border, 1 is met first
        assert_eq!(summary.reassigned, vec![(1, 4)]);
        assert_eq!(check_labels(&surface, &[11]), (false, vec![]));
        assert_eq!(surface.count_label(11), largest);
        assert_eq!(surface.elements_with_label(11), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_fix_uses_neighbour_majority() {
        let (vertices, faces) = strip_geometry(4);
        // small island in column 1, large one in columns 3-4
        let labels = vec![1, 13, 11, 11, 13, 13, 11, 11, 11, 11];
        let mut surface = TaggedSurface::with_vertex_labels(vertices, faces, labels).unwrap();

        let summary = fix_label(&mut surface, 11).unwrap();

        assert_eq!(summary.kept, 4);
        assert_eq!(summary.reassigned, vec![(13, 2)]);
        assert_eq!(surface.label(2), Some(13));
        assert_eq!(surface.label(3), Some(13));
        assert_eq!(check_labels(&surface, &[11, 13]), (false, vec![]));
    }

    #[test]
    fn test_fix_cell_labels() {
        let mut surface = cell_islands_surface();
        let summary = fix_label(&mut surface, 11).unwrap();

        assert_eq!(summary.kept, 4);
        assert_eq!(summary.reassigned, vec![(1, 2)]);
        assert_eq!(surface.label(10), Some(1));
        assert_eq!(surface.label(11), Some(1));
        assert_eq!(surface.count_label(11), 4);
    }

    #[test]
    fn test_isolated_island_takes_background() {
        let mut surface = two_piece_surface(vec![11; 7]);

        let params = RepairParams {
            background_label: 3,
            max_passes: 1,
        };
        let summary = fix_label_with(&mut surface, 11, &params).unwrap();

        assert_eq!(summary.kept, 4);
        assert_eq!(summary.reassigned, vec![(3, 3)]);
        assert_eq!(surface.count_label(3), 3);
        assert_eq!(check_labels(&surface, &[11]), (false, vec![]));
    }

    // strip of one quad plus a detached triangle
    fn two_piece_surface(labels: Vec<i32>) -> TaggedSurface {
        let (mut vertices, mut faces) = strip_geometry(1);
        let offset = vertices.len();
        vertices.extend(
            [(10.0, 0.0), (11.0, 0.0), (10.0, 1.0)]
                .iter()
                .map(|&(x, y)| nalgebra::Point3::new(x, y, 0.0)),
        );
        faces.push([offset, offset + 1, offset + 2]);
        TaggedSurface::with_vertex_labels(vertices, faces, labels).unwrap()
    }

    #[test]
    fn test_isolated_island_of_background_label_is_an_error() {
        let mut surface = two_piece_surface(vec![1; 7]);
        let before = surface.clone();

        assert_eq!(
            fix_label(&mut surface, 1),
            Err(LabelError::NoReassignTarget { label: 1, size: 3 })
        );
        assert_eq!(surface, before);
        assert_eq!(check_labels(&surface, &[1]), (true, vec![1]));

        let report = repair_surface(&mut surface, &[1], &RepairParams::default());
        assert!(matches!(report, Err(LabelError::NoReassignTarget { .. })));
    }

    #[test]
    fn test_fix_background_label_with_neighbours_rechecks_valid() {
        let (vertices, faces) = strip_geometry(4);
        // label 1 in columns 0-1 and column 4, split by 13
        let labels = vec![1, 1, 1, 1, 13, 13, 13, 13, 1, 1];
        let mut surface = TaggedSurface::with_vertex_labels(vertices, faces, labels).unwrap();
        assert_eq!(check_labels(&surface, &[1]), (true, vec![1]));

        let summary = fix_label(&mut surface, 1).unwrap();
        assert_eq!(summary.kept, 4);
        assert_eq!(summary.reassigned, vec![(13, 2)]);
        assert_eq!(check_labels(&surface, &[1, 13]), (false, vec![]));
    }

    #[test]
    fn test_fix_absent_label_is_unfixable() {
        let mut surface = vertex_islands_surface();
        assert_eq!(
            fix_label(&mut surface, 42),
            Err(LabelError::Unfixable { label: 42 })
        );
    }

    #[test]
    fn test_fix_connected_label_is_noop() {
        let mut surface = vertex_islands_surface();
        let before = surface.clone();
        let summary = fix_label(&mut surface, 13).unwrap();

        assert_eq!(summary.components_before, 1);
        assert!(summary.reassigned.is_empty());
        assert_eq!(surface, before);
    }

    #[test]
    fn test_single_vertex_label_is_trivially_valid() {
        let (vertices, faces) = strip_geometry(1);
        let labels = vec![1, 1, 1, 7];
        let mut surface = TaggedSurface::with_vertex_labels(vertices, faces, labels).unwrap();

        assert_eq!(check_labels(&surface, &[7]), (false, vec![]));
        let summary = fix_label(&mut surface, 7).unwrap();
        assert_eq!(summary.kept, 1);
        assert_eq!(surface.count_label(7), 1);
    }

    #[test]
    fn test_repair_surface_loop() {
        let mut surface = cell_islands_surface();
        let report = repair_surface(&mut surface, &[11, 13, 1], &RepairParams::default()).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.passes, 1);
        assert_eq!(report.fixes.len(), 1);
        assert_eq!(report.fixes[0].label, 11);

        let again = repair_surface(&mut surface, &[11, 13, 1], &RepairParams::default()).unwrap();
        assert_eq!(again.passes, 0);
        assert!(again.fixes.is_empty());
    }

    #[test]
    fn test_repair_surface_zero_budget_reports_remaining() {
        let mut surface = vertex_islands_surface();
        let params = RepairParams {
            background_label: 1,
            max_passes: 0,
        };
        let report = repair_surface(&mut surface, &[11], &params).unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.remaining, vec![11]);
    }
}
