//! Mapping of automatically detected vein/appendage seeds to canonical
//! labels.
//!
//! Each canonical label gets a reference centroid from a template (naive)
//! labelling. Seeds are then visited in the order they were detected and
//! each takes the closest label nobody has claimed yet. This greedy match
//! is not globally optimal and is kept that way so existing labellings
//! reproduce.

pub mod image;

use nalgebra::Point3;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::{LabelError, LabelResult};
use crate::labels::{Label, LabelRegistry};

pub use image::VolumeImage;

#[derive(Debug, Clone, PartialEq)]
pub struct OstiaLabelAssigner {
    references: Vec<(Label, Point3<f64>)>,
}

impl OstiaLabelAssigner {
    pub fn from_references(references: Vec<(Label, Point3<f64>)>) -> Self {
        Self { references }
    }

    /// Reference centroids from a template labelling. A label is looked up
    /// by its naive tag when the registry has one, else by its own code.
    pub fn from_template(
        template: &VolumeImage,
        labels: &[Label],
        registry: &LabelRegistry,
    ) -> LabelResult<Self> {
        let references = labels
            .iter()
            .map(|label| -> LabelResult<(Label, Point3<f64>)> {
                let tag = registry.naive_code(label).unwrap_or(label.code);
                let centroid = u16::try_from(tag)
                    .ok()
                    .and_then(|value| template.centroid(value))
                    .ok_or(LabelError::MissingReference { label: label.code })?;
                debug!("reference for {} (tag {}) at {:?}", label, tag, centroid);
                Ok((label.clone(), centroid))
            })
            .collect::<LabelResult<Vec<_>>>()?;
        Ok(Self { references })
    }

    pub fn references(&self) -> &[(Label, Point3<f64>)] {
        &self.references
    }

    /// Seed index -> label. Seeds beyond the number of labels stay
    /// unassigned.
    pub fn assign(&self, seeds: &[Point3<f64>]) -> LabelResult<BTreeMap<usize, Label>> {
        if seeds.len() < self.references.len() {
            return Err(LabelError::InsufficientSeeds {
                seeds: seeds.len(),
                labels: self.references.len(),
            });
        }

        let mut taken = vec![false; self.references.len()];
        let mut assignment = BTreeMap::new();

        for (seed_idx, seed) in seeds.iter().enumerate() {
            let nearest = self
                .references
                .iter()
                .enumerate()
                .filter(|(i, _)| !taken[*i])
                .map(|(i, (_, centroid))| (i, nalgebra::distance(seed, centroid)))
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            let Some((label_idx, distance)) = nearest else {
                debug!("seed {} left unassigned, all labels taken", seed_idx);
                continue;
            };
            taken[label_idx] = true;
            let label = self.references[label_idx].0.clone();
            debug!("seed {} -> {} ({:.2})", seed_idx, label, distance);
            assignment.insert(seed_idx, label);
        }

        info!(
            "assigned {} of {} seeds to canonical labels",
            assignment.len(),
            seeds.len()
        );
        Ok(assignment)
    }
}

pub fn assign_vein_labels(
    template: &VolumeImage,
    seeds: &[Point3<f64>],
    labels: &[Label],
    registry: &LabelRegistry,
) -> LabelResult<BTreeMap<usize, Label>> {
    if seeds.len() < labels.len() {
        return Err(LabelError::InsufficientSeeds {
            seeds: seeds.len(),
            labels: labels.len(),
        });
    }
    OstiaLabelAssigner::from_template(template, labels, registry)?.assign(seeds)
}
