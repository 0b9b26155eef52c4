use std::fmt::Write;
use std::str::FromStr;
use tracing::warn;

use super::{LandmarkSet, LandmarkSlot};
use crate::error::{LabelError, LabelResult};

/// On-disk form of a landmark selection.
///
/// `Vtx` is the carp vertex list: count, the literal `extra`, then one id
/// per line. `Coord` writes one `x y z` line per landmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializeFormat {
    Vtx,
    Coord,
}

impl FromStr for SerializeFormat {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vtx" => Ok(SerializeFormat::Vtx),
            "coord" => Ok(SerializeFormat::Coord),
            _ => Err(LabelError::UnknownFormat {
                format: s.to_string(),
            }),
        }
    }
}

impl LandmarkSet {
    /// Text for the named landmarks in the order given. Names that are
    /// unknown or not yet picked are skipped with a warning.
    pub fn serialize_selection<S: AsRef<str>>(&self, names: &[S], format: SerializeFormat) -> String {
        let selected: Vec<&LandmarkSlot> = names
            .iter()
            .filter_map(|name| match self.find_by_name(name.as_ref()) {
                Ok(slot) if slot.is_set() => Some(slot),
                Ok(_) => {
                    warn!("landmark '{}' not picked, skipped", name.as_ref());
                    None
                }
                Err(_) => {
                    warn!("landmark '{}' not found, skipped", name.as_ref());
                    None
                }
            })
            .collect();
        render(&selected, format)
    }

    /// Like `serialize_selection`, but any unknown or unpicked name is an
    /// error.
    pub fn serialize_selection_strict<S: AsRef<str>>(
        &self,
        names: &[S],
        format: SerializeFormat,
    ) -> LabelResult<String> {
        let selected = names
            .iter()
            .map(|name| {
                self.find_by_name(name.as_ref())
                    .ok()
                    .filter(|slot| slot.is_set())
                    .ok_or_else(|| LabelError::NameNotFound {
                        name: name.as_ref().to_string(),
                    })
            })
            .collect::<LabelResult<Vec<_>>>()?;
        Ok(render(&selected, format))
    }
}

fn render(slots: &[&LandmarkSlot], format: SerializeFormat) -> String {
    let mut out = String::new();
    match format {
        SerializeFormat::Vtx => {
            if slots.is_empty() {
                return out;
            }
            // writing into a String cannot fail
            let _ = writeln!(out, "{}\nextra", slots.len());
            for slot in slots {
                if let Some(id) = slot.vertex_id() {
                    let _ = writeln!(out, "{}", id);
                }
            }
        }
        SerializeFormat::Coord => {
            for slot in slots {
                let p = slot.coordinates();
                let _ = writeln!(out, "{:.6} {:.6} {:.6}", p.x, p.y, p.z);
            }
        }
    }
    out
}

#[cfg(test)]
mod format_tests {
    use super::*;
    use crate::labels::Label;
    use nalgebra::Point3;

    fn picked() -> LandmarkSet {
        let labels = vec![
            Label::new("LSPV", 11),
            Label::new("LIPV", 13),
            Label::new("LAA", 19),
        ];
        let mut set = LandmarkSet::with_labels(&["LSPV", "LIPV", "LAA"], &labels).unwrap();
        set.bind_pick(7, 11, Point3::new(1.0, 2.0, 3.0)).unwrap();
        set.bind_pick(42, 13, Point3::new(-0.5, 0.25, 10.0)).unwrap();
        set
    }

    #[test]
    fn test_vtx_selection() {
        let set = picked();
        assert_eq!(
            set.serialize_selection(&["LSPV", "LIPV"], SerializeFormat::Vtx),
            "2\nextra\n7\n42\n"
        );
        // order follows the request, not the slots
        assert_eq!(
            set.serialize_selection(&["LIPV", "LSPV"], SerializeFormat::Vtx),
            "2\nextra\n42\n7\n"
        );
    }

    #[test]
    fn test_coord_selection() {
        let set = picked();
        assert_eq!(
            set.serialize_selection(&["LIPV"], SerializeFormat::Coord),
            "-0.500000 0.250000 10.000000\n"
        );
    }

    #[test]
    fn test_skips_unknown_and_unpicked() {
        let set = picked();
        assert_eq!(
            set.serialize_selection(&["LAA", "PV", "LSPV"], SerializeFormat::Vtx),
            "1\nextra\n7\n"
        );
        assert_eq!(
            set.serialize_selection(&["LAA"], SerializeFormat::Vtx),
            ""
        );
        assert_eq!(
            set.serialize_selection::<&str>(&[], SerializeFormat::Coord),
            ""
        );
    }

    #[test]
    fn test_strict_selection() {
        let set = picked();
        assert_eq!(
            set.serialize_selection_strict(&["LSPV"], SerializeFormat::Vtx)
                .unwrap(),
            "1\nextra\n7\n"
        );
        assert_eq!(
            set.serialize_selection_strict(&["LSPV", "LAA"], SerializeFormat::Vtx),
            Err(LabelError::NameNotFound {
                name: "LAA".to_string()
            })
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("VTX".parse::<SerializeFormat>(), Ok(SerializeFormat::Vtx));
        assert_eq!(" coord".parse::<SerializeFormat>(), Ok(SerializeFormat::Coord));
        assert!(matches!(
            "ply".parse::<SerializeFormat>(),
            Err(LabelError::UnknownFormat { .. })
        ));
        // file extensions are not format names
        for name in ["txt", "coords"] {
            assert_eq!(
                name.parse::<SerializeFormat>(),
                Err(LabelError::UnknownFormat {
                    format: name.to_string()
                })
            );
        }
    }
}
