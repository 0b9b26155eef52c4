use anyhow::{anyhow, bail, Context, Result};
use nalgebra::Point3;
use std::fs;
use std::path::Path;

use crate::landmarks::LandmarkSet;

/// One entry of a clipper sphere file.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipperSphere {
    pub id: usize,
    pub center: Point3<f64>,
    pub radius: f64,
}

fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    fs::read_to_string(&path).with_context(|| format!("failed to read {:?}", path.as_ref()))
}

fn parse_token<T: std::str::FromStr>(token: Option<&str>, what: &str, line: usize) -> Result<T> {
    let token = token.ok_or_else(|| anyhow!("line {}: missing {}", line, what))?;
    token
        .parse()
        .map_err(|_| anyhow!("line {}: '{}' is not a valid {}", line, token, what))
}

fn next_field<'a, T: std::str::FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    what: &str,
    sphere: usize,
) -> Result<T> {
    let token = tokens
        .next()
        .ok_or_else(|| anyhow!("sphere {}: missing {}", sphere, what))?;
    token
        .parse()
        .map_err(|_| anyhow!("sphere {}: '{}' is not a valid {}", sphere, token, what))
}

/// Clipper metadata: `numPts`, then `id x y z radius` per sphere. Values
/// are read as one whitespace-separated stream, so line breaks inside or
/// between records carry no meaning.
pub fn parse_clipper_spheres(text: &str) -> Result<Vec<ClipperSphere>> {
    let mut tokens = text.split_whitespace();

    let header = tokens
        .next()
        .ok_or_else(|| anyhow!("clipper file is empty, point count is required"))?;
    let count: usize = header
        .parse()
        .map_err(|_| anyhow!("'{}' is not a valid point count", header))?;

    let mut spheres = Vec::with_capacity(count);
    for sphere in 0..count {
        let id = next_field(&mut tokens, "point id", sphere)?;
        let x: f64 = next_field(&mut tokens, "coordinate", sphere)?;
        let y: f64 = next_field(&mut tokens, "coordinate", sphere)?;
        let z: f64 = next_field(&mut tokens, "coordinate", sphere)?;
        let radius: f64 = next_field(&mut tokens, "radius", sphere)?;
        if !(radius.is_finite() && radius > 0.0) {
            bail!("sphere {}: radius must be positive, got {}", sphere, radius);
        }
        spheres.push(ClipperSphere {
            id,
            center: Point3::new(x, y, z),
            radius,
        });
    }

    let trailing = tokens.count();
    if trailing > 0 {
        bail!(
            "clipper file announces {} points but has {} values left over",
            count,
            trailing
        );
    }
    Ok(spheres)
}

pub fn read_clipper_spheres<P: AsRef<Path>>(path: P) -> Result<Vec<ClipperSphere>> {
    let text = read_text(&path)?;
    parse_clipper_spheres(&text)
        .with_context(|| format!("malformed clipper file {:?}", path.as_ref()))
}

/// Sphere centres in file order, ready to be used as ostia seeds.
pub fn seed_positions(spheres: &[ClipperSphere]) -> Vec<Point3<f64>> {
    spheres.iter().map(|s| s.center).collect()
}

/// Vertex list: count, a tag line (`extra` or `intra`), one id per line.
/// An empty file is an empty list.
pub fn parse_vtx(text: &str) -> Result<Vec<usize>> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let Some((count_line, count)) = lines.next() else {
        return Ok(Vec::new());
    };
    let count: usize = parse_token(Some(count), "vertex count", count_line)?;

    match lines.next() {
        Some((_, "extra" | "intra")) => {}
        Some((n, other)) => bail!("line {}: expected 'extra' or 'intra', found '{}'", n, other),
        None if count == 0 => return Ok(Vec::new()),
        None => bail!("vtx file ends before its tag line"),
    }

    let ids = lines
        .map(|(n, l)| parse_token(Some(l), "vertex id", n))
        .collect::<Result<Vec<usize>>>()?;
    if ids.len() != count {
        bail!("vtx file announces {} ids but holds {}", count, ids.len());
    }
    Ok(ids)
}

pub fn read_vtx<P: AsRef<Path>>(path: P) -> Result<Vec<usize>> {
    let text = read_text(&path)?;
    parse_vtx(&text).with_context(|| format!("malformed vtx file {:?}", path.as_ref()))
}

/// One `x y z` point per line.
pub fn parse_coords(text: &str) -> Result<Vec<Point3<f64>>> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .map(|(n, line)| -> Result<Point3<f64>> {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != 3 {
                bail!("line {}: expected 3 coordinates, found {}", n, tokens.len());
            }
            Ok(Point3::new(
                parse_token::<f64>(Some(tokens[0]), "coordinate", n)?,
                parse_token::<f64>(Some(tokens[1]), "coordinate", n)?,
                parse_token::<f64>(Some(tokens[2]), "coordinate", n)?,
            ))
        })
        .collect()
}

pub fn read_coords<P: AsRef<Path>>(path: P) -> Result<Vec<Point3<f64>>> {
    let text = read_text(&path)?;
    parse_coords(&text).with_context(|| format!("malformed coordinate file {:?}", path.as_ref()))
}

/// Landmark set stored by `write_landmarks_json`, checked for consistency.
pub fn read_landmarks_json<P: AsRef<Path>>(path: P) -> Result<LandmarkSet> {
    let text = read_text(&path)?;
    let set: LandmarkSet = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse landmarks from {:?}", path.as_ref()))?;
    set.validate()
        .with_context(|| format!("inconsistent landmarks in {:?}", path.as_ref()))?;
    Ok(set)
}
