//! PLY (Stanford polygon) format support.
//!
//! Vertex `x`/`y`/`z` become positions and every other scalar vertex
//! property becomes an `f64` vertex attribute of the same name. Faces are
//! kept as polygons.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::import::SurfaceImport;
use crate::map::{to_face_vertex, CMap2, MeshIndex};

const COORDINATES: [&str; 3] = ["x", "y", "z"];

/// Read a PLY file into an import buffer.
///
/// # Example
///
/// ```no_run
/// use darn::io::ply;
/// use darn::map::CMap2;
///
/// let mut import = ply::load_import("scan.ply").unwrap();
/// let mut map: CMap2 = CMap2::new();
/// let report = import.create_map(&mut map);
/// println!("{} hole(s) closed", report.holes_closed);
/// ```
pub fn load_import<P: AsRef<Path>>(path: P) -> Result<SurfaceImport> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let load_error = |message: String| MeshError::LoadError {
        path: path.to_path_buf(),
        message,
    };

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| load_error(e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element".to_string()))?;

    let mut positions: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let mut coords = [0.0; 3];
        for (c, name) in coords.iter_mut().zip(COORDINATES) {
            *c = get_float_property(vertex, name)
                .ok_or_else(|| load_error(format!("vertex missing {} coordinate", name)))?;
        }
        positions.push(Point3::new(coords[0], coords[1], coords[2]));
    }

    let mut import = SurfaceImport::new();
    import.set_positions(positions)?;

    let extra: Vec<&String> = ply
        .header
        .elements
        .get("vertex")
        .map(|element| {
            element
                .properties
                .keys()
                .filter(|name| !COORDINATES.contains(&name.as_str()))
                .collect()
        })
        .unwrap_or_default();
    for name in extra {
        let values: Option<Vec<f64>> = vertex_element
            .iter()
            .map(|vertex| get_float_property(vertex, name))
            .collect();
        // list properties have no scalar value
        if let Some(values) = values {
            import.add_vertex_attribute(name, values)?;
        }
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error("PLY file has no face element".to_string()))?;

    import.reserve(face_element.len());
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| load_error("face missing vertex_indices property".to_string()))?;
        import.add_face(&indices);
    }

    log::debug!(
        "read {} vertices and {} faces from {}",
        import.nb_vertices(),
        import.nb_faces(),
        path.display()
    );
    Ok(import)
}

/// Load a map from a PLY file.
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<CMap2<I>> {
    super::load(path)
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

/// Negative indices map to `u32::MAX` and are rejected by validation.
fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<u32>> {
    let to_index = |x: i64| u32::try_from(x).unwrap_or(u32::MAX);
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| to_index(x as i64)).collect()),
        Property::ListUInt(v) => Some(v.clone()),
        Property::ListShort(v) => Some(v.iter().map(|&x| to_index(x as i64)).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as u32).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| to_index(x as i64)).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as u32).collect()),
        _ => None,
    }
}

/// Save a map to a PLY file (ASCII format).
///
/// Faces are written as polygons; cap faces are not written.
pub fn save<P: AsRef<Path>, I: MeshIndex>(map: &CMap2<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_face_vertex(map);

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by darn")?;
    writeln!(writer, "element vertex {}", vertices.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "element face {}", faces.len())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for v in &vertices {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }

    for f in &faces {
        if f.len() > u8::MAX as usize {
            return Err(MeshError::SaveError {
                path: path.to_path_buf(),
                message: format!("face with {} vertices does not fit a uchar count", f.len()),
            });
        }
        write!(writer, "{}", f.len())?;
        for v in f {
            write!(writer, " {}", v)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::test_util::temp_path;

    const QUAD_AND_TRIANGLE: &str = "ply
format ascii 1.0
element vertex 5
property float x
property float y
property float z
property float quality
element face 2
property list uchar int vertex_indices
end_header
0 0 0 0.5
1 0 0 1.5
1 1 0 2.5
0 1 0 3.5
2 0.5 0 4.5
4 0 1 2 3
3 2 1 4
";

    #[test]
    fn test_load_polygons_and_attributes() {
        let path = temp_path("quad-and-triangle.ply");
        std::fs::write(&path, QUAD_AND_TRIANGLE).unwrap();

        let map: CMap2 = load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(map.nb_faces(), 2);
        assert_eq!(map.nb_boundary_faces(), 1);
        let degrees: Vec<usize> = map.faces().map(|f| map.face_degree(f)).collect();
        assert_eq!(degrees, vec![4, 3]);

        let quality = map.vertex_attributes().get_column::<f64>("quality").unwrap();
        assert_eq!(quality.as_slice(), &[0.5, 1.5, 2.5, 3.5, 4.5]);
        assert_eq!(map.positions().unwrap()[4], Point3::new(2.0, 0.5, 0.0));
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let path = temp_path("bad-index.ply");
        let text = QUAD_AND_TRIANGLE.replace("3 2 1 4", "3 2 1 9");
        std::fs::write(&path, text).unwrap();

        let result = load::<_, u32>(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 1, vertex: 9, nb_vertices: 5 })
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let mut import = SurfaceImport::new();
        import
            .set_positions(vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.5, 0.5, 1.0),
            ])
            .unwrap();
        import.add_quad(0, 3, 2, 1);
        import.add_triangle(0, 1, 4);
        import.add_triangle(1, 2, 4);
        import.add_triangle(2, 3, 4);
        import.add_triangle(3, 0, 4);
        let mut map: CMap2 = CMap2::new();
        import.create_map(&mut map);

        let path = temp_path("pyramid.ply");
        save(&map, &path).unwrap();
        let reloaded: CMap2 = load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(to_face_vertex(&reloaded), to_face_vertex(&map));
        assert!(reloaded.is_valid());
        assert_eq!(reloaded.nb_boundary_faces(), 0);
    }
}
