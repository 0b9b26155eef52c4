pub mod format;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

use crate::error::{LabelError, LabelResult};
use crate::labels::{Label, LabelRegistry};
use crate::mesh::TaggedSurface;

pub use format::SerializeFormat;

/// One named landmark, optionally bound to a picked surface vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSlot {
    pub name: String,
    pub label: Label,
    vertex_id: Option<usize>,
    coordinates: Point3<f64>,
    insertion_order: Option<usize>,
}

impl LandmarkSlot {
    fn new(name: String, label: Label) -> Self {
        Self {
            name,
            label,
            vertex_id: None,
            coordinates: Point3::origin(),
            insertion_order: None,
        }
    }

    pub fn is_set(&self) -> bool {
        self.vertex_id.is_some()
    }

    pub fn vertex_id(&self) -> Option<usize> {
        self.vertex_id
    }

    pub fn coordinates(&self) -> Point3<f64> {
        self.coordinates
    }

    pub fn insertion_order(&self) -> Option<usize> {
        self.insertion_order
    }

    fn unset(&mut self) {
        self.vertex_id = None;
        self.coordinates = Point3::origin();
        self.insertion_order = None;
    }
}

/// Ordered landmark slots plus the picked points in pick order.
///
/// The point cloud mirrors the set slots: its i-th point belongs to the
/// slot with the i-th smallest insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    slots: Vec<LandmarkSlot>,
    points: Vec<Point3<f64>>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels<S: AsRef<str>>(names: &[S], labels: &[Label]) -> LabelResult<Self> {
        let mut set = Self::new();
        set.initialize(names, labels)?;
        Ok(set)
    }

    /// One slot per registry label, named after the label. Fails with
    /// `DuplicateLabel` when overrides gave two labels the same code.
    pub fn from_registry(registry: &LabelRegistry) -> LabelResult<Self> {
        Self::with_labels(&registry.names(), registry.labels())
    }

    /// Replace all slots with fresh, unset ones. On error the set is left
    /// untouched.
    pub fn initialize<S: AsRef<str>>(&mut self, names: &[S], labels: &[Label]) -> LabelResult<()> {
        if names.len() != labels.len() {
            return Err(LabelError::LengthMismatch {
                names: names.len(),
                labels: labels.len(),
            });
        }
        let mut seen = HashSet::new();
        if let Some(dup) = labels.iter().find(|l| !seen.insert(l.code)) {
            return Err(LabelError::DuplicateLabel { code: dup.code });
        }

        self.slots = names
            .iter()
            .zip(labels)
            .map(|(n, l)| LandmarkSlot::new(n.as_ref().to_string(), l.clone()))
            .collect();
        self.points.clear();
        Ok(())
    }

    pub fn slots(&self) -> &[LandmarkSlot] {
        &self.slots
    }

    pub fn point_cloud(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the set has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True when no slot holds a pick.
    pub fn none_picked(&self) -> bool {
        self.last_order().is_none()
    }

    pub fn all_set(&self) -> bool {
        !self.slots.is_empty() && self.slots.iter().all(LandmarkSlot::is_set)
    }

    pub fn set_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_set()).count()
    }

    fn last_order(&self) -> Option<usize> {
        self.slots.iter().filter_map(|s| s.insertion_order).max()
    }

    /// Bind a picked vertex to the slot of `code`. Returns the slot index.
    pub fn bind_pick(
        &mut self,
        vertex_id: usize,
        code: i32,
        coordinates: Point3<f64>,
    ) -> LabelResult<usize> {
        let next_order = self.last_order().map_or(0, |o| o + 1);
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.label.code == code)
            .ok_or_else(|| {
                info!("Label {} not found", code);
                LabelError::LabelNotFound { code }
            })?;

        if slot.is_set() {
            info!("Label {} already set!", code);
            return Err(LabelError::AlreadySet { code });
        }

        slot.vertex_id = Some(vertex_id);
        slot.coordinates = coordinates;
        slot.insertion_order = Some(next_order);
        self.points.push(coordinates);
        debug!("bound vertex {} to {} (slot {})", vertex_id, slot.name, index);
        Ok(index)
    }

    /// `bind_pick` with the coordinate looked up on the picked surface.
    pub fn bind_pick_from_surface(
        &mut self,
        surface: &TaggedSurface,
        vertex_id: usize,
        code: i32,
    ) -> LabelResult<usize> {
        let point = surface.point(vertex_id)?;
        self.bind_pick(vertex_id, code, point)
    }

    /// Clear the most recent pick. Returns its label, or `None` if nothing
    /// was set.
    pub fn undo_last(&mut self) -> Option<Label> {
        let last = self.last_order()?;
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.insertion_order == Some(last))?;
        slot.unset();
        self.points.pop();
        debug!("removed pick for {}", slot.name);
        Some(slot.label.clone())
    }

    /// Drop all slots and picked points.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.points.clear();
    }

    pub fn find_by_name(&self, name: &str) -> LabelResult<&LandmarkSlot> {
        self.slots
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| LabelError::NameNotFound {
                name: name.to_string(),
            })
    }

    pub fn find_label(&self, name: &str) -> Option<i32> {
        self.find_by_name(name).ok().map(|s| s.label.code)
    }

    pub fn find_vertex_id(&self, name: &str) -> Option<usize> {
        self.find_by_name(name).ok().and_then(|s| s.vertex_id)
    }

    pub fn find_point(&self, name: &str) -> Option<Point3<f64>> {
        self.find_by_name(name)
            .ok()
            .filter(|s| s.is_set())
            .map(|s| s.coordinates)
    }

    /// Re-resolve the vertex ids of the named set slots against another
    /// mesh by closest vertex to the stored coordinate. Coordinates and the
    /// point cloud are unchanged. Returns how many slots were updated.
    pub fn remap_vertex_ids<S: AsRef<str>>(&mut self, names: &[S], target: &TaggedSurface) -> usize {
        let mut updated = 0;
        for name in names {
            let Some(slot) = self
                .slots
                .iter_mut()
                .find(|s| s.name == name.as_ref() && s.is_set())
            else {
                debug!("skipping remap of '{}', not found or unset", name.as_ref());
                continue;
            };
            if let Some(closest) = target.closest_vertex(&slot.coordinates) {
                debug!(
                    "{}: vertex {:?} -> {}",
                    slot.name, slot.vertex_id, closest
                );
                slot.vertex_id = Some(closest);
                updated += 1;
            }
        }
        updated
    }

    /// Structural check used after deserializing a stored set.
    pub fn validate(&self) -> LabelResult<()> {
        let mut codes = HashSet::new();
        for slot in &self.slots {
            if !codes.insert(slot.label.code) {
                return Err(LabelError::DuplicateLabel {
                    code: slot.label.code,
                });
            }
            if slot.vertex_id.is_some() != slot.insertion_order.is_some() {
                return Err(LabelError::InvalidLandmarks {
                    reason: format!("slot {} is half set", slot.name),
                });
            }
        }

        let mut ordered: Vec<&LandmarkSlot> = self.slots.iter().filter(|s| s.is_set()).collect();
        ordered.sort_by_key(|s| s.insertion_order);
        let consistent = ordered.len() == self.points.len()
            && ordered
                .iter()
                .zip(&self.points)
                .all(|(s, p)| s.coordinates == *p);
        if !consistent {
            return Err(LabelError::InvalidLandmarks {
                reason: format!(
                    "{} set slots but {} picked points",
                    ordered.len(),
                    self.points.len()
                ),
            });
        }
        Ok(())
    }
}

impl fmt::Display for LandmarkSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ix, slot) in self.slots.iter().enumerate() {
            writeln!(f, "Point {}:", ix)?;
            writeln!(f, "Name: {}", slot.name)?;
            writeln!(f, "Label: {}", slot.label.code)?;
            writeln!(f, "Label set: {}", u8::from(slot.is_set()))?;
            writeln!(
                f,
                "VTK ID: {}",
                slot.vertex_id.map_or(-1, |v| v as i64)
            )?;
            writeln!(
                f,
                "Coordinates: ({:.6}, {:.6}, {:.6})",
                slot.coordinates.x, slot.coordinates.y, slot.coordinates.z
            )?;
        }
        Ok(())
    }
}
