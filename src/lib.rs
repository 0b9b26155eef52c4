//! Anatomical landmark labelling for atrial surface meshes.
//!
//! Landmarks are picked on a surface and bound to a fixed per-region label
//! list, then written out in the vtx/coord formats the mesher consumes.
//! Labelled surfaces are checked for fragmented labels and repaired so each
//! label is one connected region. Automatically detected ostia seeds are
//! mapped to canonical vein labels by proximity to a template labelling.

pub mod config;
pub mod error;
pub mod io;
pub mod labels;
pub mod landmarks;
pub mod mesh;
pub mod ostia;
pub mod session;
mod utils;

#[cfg(feature = "python")]
mod binding;

pub use config::LabelConfig;
pub use error::{LabelError, LabelResult};
pub use labels::{load_labels, Label, LabelRegistry, Region};
pub use landmarks::{LandmarkSet, LandmarkSlot, SerializeFormat};
pub use mesh::connectivity::{analyze_labels, check_labels, label_components};
pub use mesh::repair::{fix_label, fix_label_with, repair_surface, RepairParams, RepairReport};
pub use mesh::{LabelLocation, TaggedSurface};
pub use ostia::{assign_vein_labels, OstiaLabelAssigner, VolumeImage};
pub use session::{LabellingSession, SessionState};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// This is the module importable from Python:
///
/// ```python
/// import atrialmesh as am
/// am.check_label_connectivity(verts, faces, labels, [11, 13])
/// ```
#[cfg(feature = "python")]
#[pymodule]
fn atrialmesh(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    binding::register(m)
}
