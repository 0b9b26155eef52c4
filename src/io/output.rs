use anyhow::{Context, Result};
use csv::Writer;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::landmarks::LandmarkSet;

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create output directory: {:?}", parent))?;
    }
    Ok(())
}

/// Write serialized selection text (vtx or coord) as-is.
pub fn write_selection<P: AsRef<Path>>(path: P, text: &str) -> Result<()> {
    let path = path.as_ref();
    create_parent(path)?;
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(text.as_bytes())
        .with_context(|| format!("failed to write {:?}", path))?;
    writer.flush()?;
    Ok(())
}

/// One row per slot, set or not, in slot order.
pub fn write_landmarks_csv<P: AsRef<Path>>(path: P, landmarks: &LandmarkSet) -> Result<()> {
    let path = path.as_ref();
    create_parent(path)?;
    let mut wtr =
        Writer::from_path(path).with_context(|| format!("failed to create {:?}", path))?;

    wtr.write_record([
        "name",
        "label_name",
        "label",
        "is_set",
        "vertex_id",
        "x",
        "y",
        "z",
        "order",
    ])?;

    for slot in landmarks.slots() {
        let p = slot.coordinates();
        wtr.write_record(&[
            slot.name.clone(),
            slot.label.name.clone(),
            slot.label.code.to_string(),
            slot.is_set().to_string(),
            slot.vertex_id().map_or("-1".to_string(), |v| v.to_string()),
            p.x.to_string(),
            p.y.to_string(),
            p.z.to_string(),
            slot.insertion_order().map_or("-1".to_string(), |o| o.to_string()),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("failed to flush {:?}", path))?;
    Ok(())
}

pub fn write_landmarks_json<P: AsRef<Path>>(path: P, landmarks: &LandmarkSet) -> Result<()> {
    let path = path.as_ref();
    create_parent(path)?;
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, landmarks)
        .with_context(|| format!("failed to write landmarks to {:?}", path))?;
    writer.flush()?;
    Ok(())
}
