//! Conversion back to a face-vertex representation.

use nalgebra::Point3;

use super::cmap2::CMap2;
use super::index::MeshIndex;

/// Convert a map back to a face-vertex representation.
///
/// Returns one position per vertex row (the origin when the map has no
/// position attribute) and one index list per face, caps excluded. Indices
/// are vertex embeddings, so vertices split by non-manifold repair appear as
/// distinct entries.
pub fn to_face_vertex<I: MeshIndex>(map: &CMap2<I>) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let vertices: Vec<Point3<f64>> = match map.positions() {
        Some(column) => column.as_slice().to_vec(),
        None => vec![Point3::origin(); map.vertex_attributes().nb_rows()],
    };

    let faces: Vec<Vec<usize>> = map
        .faces()
        .map(|f| map.face_vertices(f).map(|v| v.index()).collect())
        .collect();

    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::SurfaceImport;

    #[test]
    fn test_roundtrip() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.5, 0.0),
        ];
        let mut import = SurfaceImport::new();
        import.set_positions(vertices.clone()).unwrap();
        import.add_quad(0, 1, 2, 3);
        import.add_triangle(2, 1, 4);

        let mut map: CMap2 = CMap2::new();
        import.create_map(&mut map);

        let (out_verts, out_faces) = to_face_vertex(&map);
        assert_eq!(out_verts, vertices);
        assert_eq!(out_faces, vec![vec![0, 1, 2, 3], vec![2, 1, 4]]);
    }

    #[test]
    fn test_without_positions() {
        let mut import = SurfaceImport::new();
        import.insert_vertex_rows(3);
        import.add_triangle(0, 1, 2);

        let mut map: CMap2 = CMap2::new();
        import.create_map(&mut map);

        let (out_verts, out_faces) = to_face_vertex(&map);
        assert_eq!(out_verts.len(), 3);
        assert_eq!(out_faces.len(), 1);
    }
}
