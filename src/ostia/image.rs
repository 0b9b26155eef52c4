use nalgebra::{Point3, Vector3};
use std::collections::BTreeSet;

use crate::error::{LabelError, LabelResult};

/// Labelled volume: u16 voxels stored x fastest, then y, then z.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeImage {
    dims: [usize; 3],
    spacing: [f64; 3],
    origin: [f64; 3],
    voxels: Vec<u16>,
}

impl VolumeImage {
    pub fn new(
        dims: [usize; 3],
        spacing: [f64; 3],
        origin: [f64; 3],
        voxels: Vec<u16>,
    ) -> LabelResult<Self> {
        let expected = dims[0]
            .checked_mul(dims[1])
            .and_then(|n| n.checked_mul(dims[2]))
            .ok_or_else(|| LabelError::InvalidImage {
                reason: format!("voxel count of dimensions {:?} overflows", dims),
            })?;
        if voxels.len() != expected {
            return Err(LabelError::InvalidImage {
                reason: format!("{} voxels for dimensions {:?}", voxels.len(), dims),
            });
        }
        if spacing.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(LabelError::InvalidImage {
                reason: format!("non-positive spacing {:?}", spacing),
            });
        }
        Ok(Self {
            dims,
            spacing,
            origin,
            voxels,
        })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    fn index(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        let [nx, ny, nz] = self.dims;
        if i < nx && j < ny && k < nz {
            Some(i + nx * (j + ny * k))
        } else {
            None
        }
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<u16> {
        self.index(i, j, k).map(|idx| self.voxels[idx])
    }

    pub fn set(&mut self, i: usize, j: usize, k: usize, value: u16) -> LabelResult<()> {
        let idx = self.index(i, j, k).ok_or_else(|| LabelError::InvalidImage {
            reason: format!("voxel ({}, {}, {}) outside {:?}", i, j, k, self.dims),
        })?;
        self.voxels[idx] = value;
        Ok(())
    }

    /// Physical position of a voxel centre.
    pub fn world(&self, i: usize, j: usize, k: usize) -> Point3<f64> {
        Point3::from(Vector3::from(self.origin))
            + Vector3::new(
                i as f64 * self.spacing[0],
                j as f64 * self.spacing[1],
                k as f64 * self.spacing[2],
            )
    }

    /// Distinct non-zero voxel values, ascending.
    pub fn labels_present(&self) -> BTreeSet<u16> {
        self.voxels.iter().copied().filter(|&v| v != 0).collect()
    }

    /// Physical centroid of all voxels equal to `value`.
    pub fn centroid(&self, value: u16) -> Option<Point3<f64>> {
        let [nx, ny, _] = self.dims;
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for (idx, _) in self.voxels.iter().enumerate().filter(|&(_, &v)| v == value) {
            let i = idx % nx;
            let j = (idx / nx) % ny;
            let k = idx / (nx * ny);
            sum += self.world(i, j, k).coords;
            count += 1;
        }
        if count == 0 {
            None
        } else {
            Some(Point3::from(sum / count as f64))
        }
    }
}
