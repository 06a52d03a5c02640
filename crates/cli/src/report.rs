use anyhow::{Context, Result};
use polydecomp::decomp::{EntityMaps, Indices, NodeSet, Overlay};
use polydecomp::{DecompCfg, Decomposition};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::Command;

/// Read a node-set JSON file and rebuild its decomposition.
pub fn load(path: &Path, cfg: DecompCfg) -> Result<Decomposition> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let nodes: NodeSet =
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    let (decomp, _) = Decomposition::import(&nodes, cfg)
        .with_context(|| format!("importing {}", path.display()))?;
    Ok(decomp)
}

/// Write `doc` as pretty JSON, creating parent directories.
pub fn write_json(path: &Path, doc: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(doc)?)
        .with_context(|| format!("writing {}", path.display()))
}

/// Entity counts and per-polygon nesting summary.
pub fn summary(d: &Decomposition) -> Result<Value> {
    let mut polygons = Vec::with_capacity(d.polygons().len());
    for (id, poly) in d.polygons().iter() {
        let area = if id == d.outer_polygon() {
            Value::Null
        } else {
            json!(d.wire_area(poly.outer_wire)?)
        };
        polygons.push(json!({
            "id": id.0,
            "depth": d.depth(id)?,
            "area": area,
            "holes": d.holes(id)?.len(),
            "free_points": poly.free_points.len(),
        }));
    }
    Ok(json!({
        "tolerance": d.tolerance(),
        "points": d.points().len(),
        "segments": d.segments().len(),
        "wires": d.wires().len(),
        "polygons": polygons,
    }))
}

/// Correspondence maps as dense result index → dense input index (or null).
fn maps_json(maps: &EntityMaps, result: &Indices, input: &Indices) -> Value {
    let points: Vec<Option<usize>> = maps
        .points
        .iter()
        .map(|(_, orig)| orig.map(|o| input.points[&o]))
        .collect();
    let segments: Vec<Option<usize>> = maps
        .segments
        .iter()
        .map(|(_, orig)| orig.map(|o| input.segments[&o]))
        .collect();
    let polygons: Vec<Option<usize>> = maps
        .polygons
        .iter()
        .map(|(_, orig)| orig.map(|o| input.polygons[&o]))
        .collect();
    debug_assert_eq!(points.len(), result.points.len());
    json!({ "points": points, "segments": segments, "polygons": polygons })
}

/// Overlay result as a node set plus the maps back to both inputs.
pub fn overlay_doc(overlay: &Overlay, a: &Decomposition, b: &Decomposition) -> Result<Value> {
    let result = overlay.decomp.make_indices();
    Ok(json!({
        "nodes": serde_json::to_value(overlay.decomp.export())?,
        "maps_a": maps_json(&overlay.maps_a, &result, &a.make_indices()),
        "maps_b": maps_json(&overlay.maps_b, &result, &b.make_indices()),
    }))
}

pub fn current_git_rev() -> String {
    if let Some(from_env) = option_env!("GIT_COMMIT") {
        if !from_env.is_empty() {
            return from_env.to_string();
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
