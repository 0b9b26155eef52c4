pub mod input;
pub mod output;

pub use input::{
    read_clipper_spheres, read_coords, read_landmarks_json, read_vtx, seed_positions,
    ClipperSphere,
};
pub use output::{write_landmarks_csv, write_landmarks_json, write_selection};
