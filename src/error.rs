//! Error types for labelling, connectivity and ostia assignment.

use thiserror::Error;

/// Result type for labelling operations.
pub type LabelResult<T> = Result<T, LabelError>;

/// Errors raised by the labelling core.
///
/// All of them are recoverable: the host shows a message and lets the user
/// retry or cancel.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum LabelError {
    /// Region name is neither "LA" nor "RA".
    #[error("unknown region '{region}' (expected LA or RA)")]
    UnknownRegion {
        /// The rejected region name.
        region: String,
    },

    /// Names and labels passed to a landmark set differ in length.
    #[error("{names} names given for {labels} labels")]
    LengthMismatch {
        /// Number of names.
        names: usize,
        /// Number of labels.
        labels: usize,
    },

    /// The same label code appears twice in one landmark set.
    #[error("label {code} appears more than once")]
    DuplicateLabel {
        /// The repeated code.
        code: i32,
    },

    /// The slot for this label already holds a pick.
    #[error("label {code} already set")]
    AlreadySet {
        /// The label that is taken.
        code: i32,
    },

    /// No slot or registry entry carries this label code.
    #[error("label {code} not found")]
    LabelNotFound {
        /// The missing code.
        code: i32,
    },

    /// No slot or registry entry carries this name, or it is unset.
    #[error("'{name}' not found or not set")]
    NameNotFound {
        /// The missing name.
        name: String,
    },

    /// The label to repair does not occur on the surface.
    #[error("label {label} is not present on the surface")]
    Unfixable {
        /// The absent label.
        label: i32,
    },

    /// A stray region of the label touches no other label and the
    /// background label is the label itself, so it has nowhere to go.
    #[error("region of {size} elements of label {label} has no neighbouring label to take")]
    NoReassignTarget {
        /// The label being repaired.
        label: i32,
        /// Size of the stranded region.
        size: usize,
    },

    /// Fewer detected seeds than canonical labels.
    #[error("found {seeds} seeds for {labels} labels")]
    InsufficientSeeds {
        /// Seeds supplied.
        seeds: usize,
        /// Labels that need a seed.
        labels: usize,
    },

    /// A label code override falls outside the permitted domain.
    #[error("label code {code} outside permitted range {min}..={max}")]
    CodeOutOfRange {
        /// The rejected code.
        code: i32,
        /// Lower bound (inclusive).
        min: i32,
        /// Upper bound (inclusive).
        max: i32,
    },

    /// A vertex index outside the surface.
    #[error("invalid vertex index {index} (surface has {vertex_count} vertices)")]
    InvalidVertexIndex {
        /// The invalid index.
        index: usize,
        /// Number of vertices on the surface.
        vertex_count: usize,
    },

    /// Surface arrays are inconsistent.
    #[error("invalid surface: {reason}")]
    InvalidSurface {
        /// What is wrong.
        reason: String,
    },

    /// Volume image dimensions and voxel buffer disagree.
    #[error("invalid image: {reason}")]
    InvalidImage {
        /// What is wrong.
        reason: String,
    },

    /// The template labelling has no voxel for a canonical label.
    #[error("template labelling has no voxels for label {label}")]
    MissingReference {
        /// The canonical label without a reference.
        label: i32,
    },

    /// A stored landmark set breaks the slot/point-cloud invariants.
    #[error("inconsistent landmark set: {reason}")]
    InvalidLandmarks {
        /// What is wrong.
        reason: String,
    },

    /// Serialization format string is not "vtx" or "coord".
    #[error("unknown point format '{format}' (expected vtx or coord)")]
    UnknownFormat {
        /// The rejected format.
        format: String,
    },
}
