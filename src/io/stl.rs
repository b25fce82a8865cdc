//! STL (stereolithography) format support.
//!
//! STL stores each triangle with its own corner coordinates; corners are
//! merged into shared vertices while reading. Both binary and ASCII files
//! are read, and files are written as binary STL.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::import::SurfaceImport;
use crate::map::{to_face_vertex, CMap2, MeshIndex};

/// Read an STL file into an import buffer.
///
/// Triangles whose corners collapse onto fewer than three vertices are kept
/// in the buffer and dropped as degenerate at build time.
pub fn load_import<P: AsRef<Path>>(path: P) -> Result<SurfaceImport> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let positions: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();

    let mut import = SurfaceImport::new();
    import.set_positions(positions)?;
    import.reserve(stl.faces.len());
    for tri in &stl.faces {
        let [a, b, c] = tri.vertices;
        import.add_triangle(a as u32, b as u32, c as u32);
    }

    log::debug!(
        "read {} triangles over {} vertices from {}",
        import.nb_faces(),
        import.nb_vertices(),
        path.display()
    );
    Ok(import)
}

/// Load a map from an STL file.
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<CMap2<I>> {
    super::load(path)
}

/// Save a map to a binary STL file.
///
/// Polygons are split into triangle fans around their first vertex.
pub fn save<P: AsRef<Path>, I: MeshIndex>(map: &CMap2<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_face_vertex(map);

    let vertex = |p: &Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);
    let mut triangles: Vec<stl_io::Triangle> = Vec::with_capacity(faces.len());
    for f in &faces {
        for i in 1..f.len().saturating_sub(1) {
            let p0 = &vertices[f[0]];
            let p1 = &vertices[f[i]];
            let p2 = &vertices[f[i + 1]];

            let n = (p1 - p0)
                .cross(&(p2 - p0))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);

            triangles.push(stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [vertex(p0), vertex(p1), vertex(p2)],
            });
        }
    }

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}
