//! Minimal OBJ parser producing flat, non-indexed triangle streams.
//!
//! Only fully specified triangles (`f v/vt/vn v/vt/vn v/vt/vn`) are accepted.
//! Any other face layout rejects the whole file.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::error::{AssetError, AssetResult};
use crate::mesh::RenderObject;

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> AssetResult<RenderObject> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AssetError::io(path, e))?;
    let label = path.display().to_string();
    let object = parse_obj(BufReader::new(file), &label)?;
    log::info!(
        "Loaded OBJ {}: {} triangles ({} vertices)",
        label,
        object.triangle_count(),
        object.vertex_count()
    );
    Ok(object)
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> AssetResult<RenderObject> {
    parse_obj(reader, "<reader>")
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> AssetResult<RenderObject> {
    parse_obj(io::Cursor::new(contents), "<str>")
}

/// Raw attribute tables as they appear in the file, before face expansion.
#[derive(Default)]
struct Tables {
    positions: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
}

fn parse_obj<R: BufRead>(reader: R, label: &str) -> AssetResult<RenderObject> {
    let mut tables = Tables::default();
    let mut out = RenderObject::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line.map_err(|e| AssetError::io(label, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        let err = |msg: String| AssetError::format(label, format!("line {line_no}: {msg}"));

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), "x coordinate").map_err(err)?;
                let y = parse_f32(parts.next(), "y coordinate").map_err(err)?;
                let z = parse_f32(parts.next(), "z coordinate").map_err(err)?;
                tables.positions.push([x, y, z]);
            }
            "vt" => {
                // optional third (w) component is ignored
                let u = parse_f32(parts.next(), "u coordinate").map_err(err)?;
                let v = parse_f32(parts.next(), "v coordinate").map_err(err)?;
                tables.texcoords.push([u, v]);
            }
            "vn" => {
                let nx = parse_f32(parts.next(), "nx coordinate").map_err(err)?;
                let ny = parse_f32(parts.next(), "ny coordinate").map_err(err)?;
                let nz = parse_f32(parts.next(), "nz coordinate").map_err(err)?;
                tables.normals.push([nx, ny, nz]);
            }
            "f" => {
                let corners: Vec<&str> = parts.collect();
                if corners.len() != 3 {
                    return Err(err(format!(
                        "expected a triangle with 3 vertices, found {}",
                        corners.len()
                    )));
                }
                let mut resolved = [(0usize, 0usize, 0usize); 3];
                for (slot, corner) in resolved.iter_mut().zip(&corners) {
                    *slot = parse_face_vertex(corner, &tables).map_err(err)?;
                }
                for (vi, ti, ni) in resolved {
                    out.positions.push(tables.positions[vi]);
                    out.uvs.push(tables.texcoords[ti]);
                    out.normals.push(tables.normals[ni]);
                }
            }
            _ => {
                // Ignore other directives (o/g/s/usemtl/mtllib/etc.)
            }
        }
    }

    debug_assert!(out.is_consistent());
    Ok(out)
}

fn parse_f32(value: Option<&str>, what: &str) -> Result<f32, String> {
    let token = value.ok_or_else(|| format!("missing {what}"))?;
    token
        .parse::<f32>()
        .map_err(|e| format!("failed to parse {what} '{token}': {e}"))
}

/// Resolve one `v/vt/vn` corner into zero-based table indices.
fn parse_face_vertex(token: &str, tables: &Tables) -> Result<(usize, usize, usize), String> {
    let fields: Vec<&str> = token.split('/').collect();
    if fields.len() != 3 || fields.iter().any(|f| f.is_empty()) {
        return Err(format!(
            "unsupported face vertex '{token}', expected position/uv/normal"
        ));
    }

    let pos = resolve_index(fields[0], tables.positions.len())?;
    let tex = resolve_index(fields[1], tables.texcoords.len())?;
    let norm = resolve_index(fields[2], tables.normals.len())?;
    Ok((pos, tex, norm))
}

fn resolve_index(token: &str, len: usize) -> Result<usize, String> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| format!("invalid index '{token}'"))?;
    if raw == 0 {
        return Err("OBJ indices are 1-based; found 0".to_string());
    }

    let idx = if raw > 0 { raw - 1 } else { len as i64 + raw };

    if idx < 0 || idx as usize >= len {
        return Err(format!("index {raw} out of bounds (len={len})"));
    }

    Ok(idx as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE: &str = r#"
        # unit cube, 8 corners, 12 triangles
        o Cube
        v -1.0 -1.0  1.0
        v  1.0 -1.0  1.0
        v  1.0  1.0  1.0
        v -1.0  1.0  1.0
        v -1.0 -1.0 -1.0
        v  1.0 -1.0 -1.0
        v  1.0  1.0 -1.0
        v -1.0  1.0 -1.0
        vt 0.0 0.0
        vt 1.0 0.0
        vt 1.0 1.0
        vt 0.0 1.0
        vn  0.0  0.0  1.0
        vn  0.0  0.0 -1.0
        vn  0.0  1.0  0.0
        vn  0.0 -1.0  0.0
        vn  1.0  0.0  0.0
        vn -1.0  0.0  0.0
        s off
        f 1/1/1 2/2/1 3/3/1
        f 1/1/1 3/3/1 4/4/1
        f 6/1/2 5/2/2 8/3/2
        f 6/1/2 8/3/2 7/4/2
        f 4/1/3 3/2/3 7/3/3
        f 4/1/3 7/3/3 8/4/3
        f 5/1/4 6/2/4 2/3/4
        f 5/1/4 2/3/4 1/4/4
        f 2/1/5 6/2/5 7/3/5
        f 2/1/5 7/3/5 3/4/5
        f 5/1/6 1/2/6 4/3/6
        f 5/1/6 4/3/6 8/4/6
    "#;

    #[test]
    fn parse_simple_triangle() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            vn 0.0 0.0 1.0
            vt 0.0 0.0
            vt 1.0 0.0
            vt 0.0 1.0
            f 1/1/1 2/2/1 3/3/1
        "#;
        let mesh = load_obj_from_str(src).expect("parse triangle");
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.positions[1], [1.0, 0.0, 0.0]);
        assert_eq!(mesh.uvs[2], [0.0, 1.0]);
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 3]);
        assert!(mesh.is_consistent());
    }

    #[test]
    fn cube_expands_to_36_vertices() {
        let mesh = load_obj_from_str(CUBE).expect("parse cube");
        assert_eq!(mesh.positions.len(), 36);
        assert_eq!(mesh.uvs.len(), 36);
        assert_eq!(mesh.normals.len(), 36);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn expansion_matches_face_indices() {
        let mesh = load_obj_from_str(CUBE).expect("parse cube");
        // third face: 6/1/2 5/2/2 8/3/2
        assert_eq!(mesh.positions[6], [1.0, -1.0, -1.0]);
        assert_eq!(mesh.positions[7], [-1.0, -1.0, -1.0]);
        assert_eq!(mesh.positions[8], [-1.0, 1.0, -1.0]);
        assert_eq!(mesh.uvs[6..9], [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        assert_eq!(mesh.normals[6..9], [[0.0, 0.0, -1.0]; 3]);
    }

    #[test]
    fn negative_indices_count_from_end() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf -3/-1/-1 -2/1/1 -1/1/1\n";
        let mesh = load_obj_from_str(src).expect("relative indices");
        assert_eq!(mesh.positions, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    }

    #[test]
    fn three_component_texcoords_are_accepted() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 0.25 0\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\n";
        let mesh = load_obj_from_str(src).expect("vt with w");
        assert_eq!(mesh.uvs[0], [0.5, 0.25]);
    }

    #[test]
    fn no_faces_yields_empty_object() {
        let mesh = load_obj_from_str("v 0 0 0\n# nothing else\n").expect("no faces");
        assert!(mesh.is_empty());
    }

    #[test]
    fn missing_uv_layout_is_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let err = load_obj_from_str(src).unwrap_err();
        assert!(matches!(err, AssetError::Format { .. }), "{err}");
        assert!(err.to_string().contains("line 5"), "{err}");
    }

    #[test]
    fn position_only_layout_is_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        assert!(matches!(
            load_obj_from_str(src),
            Err(AssetError::Format { .. })
        ));
    }

    #[test]
    fn quads_are_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\n\
                   f 1/1/1 2/1/1 3/1/1 4/1/1\n";
        let err = load_obj_from_str(src).unwrap_err();
        assert!(err.to_string().contains("found 4"), "{err}");
    }

    #[test]
    fn zero_and_out_of_range_indices_are_rejected() {
        let base = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\n";
        assert!(load_obj_from_str(&format!("{base}f 0/1/1 2/1/1 3/1/1\n")).is_err());
        assert!(load_obj_from_str(&format!("{base}f 1/1/1 2/1/1 9/1/1\n")).is_err());
        assert!(load_obj_from_str(&format!("{base}f 1/2/1 2/1/1 3/1/1\n")).is_err());
    }

    #[test]
    fn bad_number_is_rejected() {
        let err = load_obj_from_str("v 0 zero 0\n").unwrap_err();
        assert!(err.to_string().contains("y coordinate"), "{err}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_obj_from_path("definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
