//! A labelling session: one working directory, one region registry and
//! the landmarks picked so far.

use anyhow::{Context, Result};
use nalgebra::Point3;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::LabelConfig;
use crate::error::LabelResult;
use crate::io::{read_landmarks_json, write_landmarks_json, write_selection};
use crate::labels::{Label, LabelRegistry};
use crate::landmarks::{LandmarkSet, SerializeFormat};
use crate::mesh::TaggedSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Picking,
    Ready,
}

#[derive(Debug, Clone)]
pub struct LabellingSession {
    directory: PathBuf,
    registry: Option<LabelRegistry>,
    landmarks: LandmarkSet,
}

impl LabellingSession {
    /// Session over the labels of `region`, with overrides from `config`
    /// applied when given.
    pub fn for_region<P: AsRef<Path>>(
        directory: P,
        region: &str,
        config: Option<&LabelConfig>,
    ) -> LabelResult<Self> {
        let mut registry = LabelRegistry::for_region(region)?;
        if let Some(config) = config {
            registry.apply_config(config)?;
        }
        let landmarks = LandmarkSet::from_registry(&registry)?;
        Ok(Self {
            directory: directory.as_ref().to_path_buf(),
            registry: Some(registry),
            landmarks,
        })
    }

    /// Session over the four-chamber apex and septum guide points. Slots are
    /// named after the files they are saved to.
    pub fn four_chamber<P: AsRef<Path>>(directory: P) -> LabelResult<Self> {
        let (names, labels) = LabelRegistry::four_chamber_guide_points();
        Ok(Self {
            directory: directory.as_ref().to_path_buf(),
            registry: None,
            landmarks: LandmarkSet::with_labels(&names, &labels)?,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn registry(&self) -> Option<&LabelRegistry> {
        self.registry.as_ref()
    }

    pub fn landmarks(&self) -> &LandmarkSet {
        &self.landmarks
    }

    pub fn state(&self) -> SessionState {
        if self.landmarks.all_set() {
            SessionState::Ready
        } else if self.landmarks.none_picked() {
            SessionState::Empty
        } else {
            SessionState::Picking
        }
    }

    pub fn pick(&mut self, vertex_id: usize, code: i32, coordinates: Point3<f64>) -> LabelResult<usize> {
        self.landmarks.bind_pick(vertex_id, code, coordinates)
    }

    pub fn pick_on_surface(
        &mut self,
        surface: &TaggedSurface,
        vertex_id: usize,
        code: i32,
    ) -> LabelResult<usize> {
        self.landmarks.bind_pick_from_surface(surface, vertex_id, code)
    }

    pub fn undo(&mut self) -> Option<Label> {
        self.landmarks.undo_last()
    }

    /// Serialize the named landmarks into `file_name` inside the session
    /// directory and return the written path. Saving before every landmark
    /// is picked is allowed but logged.
    pub fn save_selection<S: AsRef<str>>(
        &self,
        file_name: &str,
        names: &[S],
        format: SerializeFormat,
    ) -> Result<PathBuf> {
        if self.state() != SessionState::Ready {
            warn!(
                "saving {} with {} of {} landmarks picked",
                file_name,
                self.landmarks.set_count(),
                self.landmarks.len()
            );
        }
        let path = self.directory.join(file_name);
        let text = self.landmarks.serialize_selection(names, format);
        write_selection(&path, &text)
            .with_context(|| format!("failed to save selection {}", file_name))?;
        info!("saved {} landmark(s) to {:?}", names.len(), path);
        Ok(path)
    }

    /// Write every picked slot to a file named after the slot: vtx when the
    /// name mentions `vtx`, coordinates otherwise.
    pub fn save_guide_points(&self) -> Result<Vec<PathBuf>> {
        self.landmarks
            .slots()
            .iter()
            .filter(|slot| slot.is_set())
            .map(|slot| {
                let format = if slot.name.contains("vtx") {
                    SerializeFormat::Vtx
                } else {
                    SerializeFormat::Coord
                };
                self.save_selection(&slot.name, &[slot.name.as_str()], format)
            })
            .collect()
    }

    pub fn save_json(&self, file_name: &str) -> Result<PathBuf> {
        let path = self.directory.join(file_name);
        write_landmarks_json(&path, &self.landmarks)?;
        Ok(path)
    }

    /// Replace the current landmarks with ones stored by `save_json`. The
    /// stored slots must carry the same labels as this session.
    pub fn load_json(&mut self, file_name: &str) -> Result<()> {
        let path = self.directory.join(file_name);
        let loaded = read_landmarks_json(&path)?;
        let expected: Vec<&Label> = self.landmarks.slots().iter().map(|s| &s.label).collect();
        let found: Vec<&Label> = loaded.slots().iter().map(|s| &s.label).collect();
        if expected != found {
            anyhow::bail!("{:?} holds landmarks for different labels", path);
        }
        self.landmarks = loaded;
        Ok(())
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;
    use crate::error::LabelError;
    use crate::io::{read_coords, read_vtx};
    use crate::utils::test_utils::temp_path;
    use std::fs;

    fn temp_dir() -> PathBuf {
        let dir = temp_path("session", "d");
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_state_machine() {
        let mut session = LabellingSession::for_region(temp_dir(), "ra", None).unwrap();
        assert_eq!(session.state(), SessionState::Empty);

        for (i, code) in [1, 2, 6, 7].iter().enumerate() {
            session.pick(i, *code, Point3::new(i as f64, 0.0, 0.0)).unwrap();
            assert_eq!(session.state(), SessionState::Picking);
        }
        session.pick(9, 5, Point3::new(9.0, 0.0, 0.0)).unwrap();
        assert_eq!(session.state(), SessionState::Ready);

        assert_eq!(session.undo().map(|l| l.code), Some(5));
        assert_eq!(session.state(), SessionState::Picking);
    }

    #[test]
    fn test_config_overrides_reach_slots() {
        let config = LabelConfig::from_toml_str("[la]\nripv = 21\n").unwrap();
        let session = LabellingSession::for_region(temp_dir(), "LA", Some(&config)).unwrap();
        assert_eq!(session.landmarks().find_label("RIPV"), Some(21));
        assert_eq!(session.landmarks().find_label("LSPV"), Some(11));

        let bad = LabelConfig::from_toml_str("[domain]\nmin = 1\nmax = 10\n[la]\nlaa = 12\n").unwrap();
        assert!(matches!(
            LabellingSession::for_region(temp_dir(), "LA", Some(&bad)),
            Err(LabelError::CodeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_shared_code_override_is_rejected() {
        let config = LabelConfig::from_toml_str("[la]\nlaa = 11\n").unwrap();
        assert_eq!(
            LabellingSession::for_region(temp_dir(), "LA", Some(&config)).map(|_| ()),
            Err(LabelError::DuplicateLabel { code: 11 })
        );

        // every distinct slot can still be picked to Ready
        let config = LabelConfig::from_toml_str("[la]\nlaa = 21\n").unwrap();
        let mut session = LabellingSession::for_region(temp_dir(), "LA", Some(&config)).unwrap();
        for (i, code) in [1, 21, 11, 13, 15, 17].iter().enumerate() {
            session.pick(i, *code, Point3::new(i as f64, 0.0, 0.0)).unwrap();
        }
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_save_selection_into_directory() {
        let dir = temp_dir();
        let mut session = LabellingSession::for_region(&dir, "LA", None).unwrap();
        session.pick(7, 11, Point3::new(1.0, 1.0, 1.0)).unwrap();
        session.pick(42, 13, Point3::new(2.0, 2.0, 2.0)).unwrap();

        let path = session
            .save_selection("pvs.vtx", &["LSPV", "LIPV"], SerializeFormat::Vtx)
            .unwrap();
        assert_eq!(path, dir.join("pvs.vtx"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "2\nextra\n7\n42\n");
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_guide_points() {
        let dir = temp_dir();
        let mut session = LabellingSession::four_chamber(&dir).unwrap();
        assert!(session.registry().is_none());
        session.pick(100, 11, Point3::new(1.0, 2.0, 3.0)).unwrap();
        session.pick(200, 19, Point3::new(4.0, 5.0, 6.0)).unwrap();

        let written = session.save_guide_points().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(read_vtx(dir.join("la.lvapex.vtx")).unwrap(), vec![100]);
        assert_eq!(
            read_coords(dir.join("raa_apex.txt")).unwrap(),
            vec![Point3::new(4.0, 5.0, 6.0)]
        );
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_json_round_trip() {
        let dir = temp_dir();
        let mut session = LabellingSession::for_region(&dir, "LA", None).unwrap();
        session.pick(3, 19, Point3::new(0.5, 0.5, 0.5)).unwrap();
        session.save_json("landmarks.json").unwrap();

        let mut restored = LabellingSession::for_region(&dir, "LA", None).unwrap();
        restored.load_json("landmarks.json").unwrap();
        assert_eq!(restored.landmarks(), session.landmarks());
        assert_eq!(restored.state(), SessionState::Picking);

        let mut other = LabellingSession::for_region(&dir, "RA", None).unwrap();
        assert!(other.load_json("landmarks.json").is_err());
        fs::remove_dir_all(dir).ok();
    }
}
