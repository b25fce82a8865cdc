//! # Darn
//!
//! Assemble polygon soups into two-dimensional combinatorial maps.
//!
//! Real-world meshes arrive as flat lists of faces referencing shared
//! vertices, and they are rarely clean: faces repeat a vertex, edges are
//! claimed by three faces, surfaces have holes, or faces meet at a single
//! vertex. Darn turns such input into a [`CMap2`](map::CMap2), a dart-based
//! surface with constant-time `phi1` (next dart in face), `phi2` (opposite
//! dart across the edge) and vertex orbit traversal, repairing what it can:
//!
//! - **Degenerate faces** (fewer than three distinct vertices) are dropped
//! - **Holes** are closed with boundary-flagged cap faces
//! - **Non-manifold vertices** are split so each vertex orbit owns one vertex row
//! - **Attributes** of any type travel with vertices and faces, in columnar storage
//! - **File formats**: PLY and STL
//!
//! ## Quick Start
//!
//! ```no_run
//! use darn::prelude::*;
//!
//! let map: CMap2 = darn::io::load("scan.ply").unwrap();
//! println!("Faces: {}", map.nb_faces());
//! println!("Holes: {}", map.nb_boundary_faces());
//! darn::io::save(&map, "repaired.stl").unwrap();
//! ```
//!
//! ## Building Maps Programmatically
//!
//! ```
//! use darn::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut import = SurfaceImport::new();
//! import.set_positions(vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ]).unwrap();
//! import.add_triangle(0, 2, 1); // bottom
//! import.add_triangle(0, 1, 3); // front
//! import.add_triangle(1, 2, 3); // right
//! import.add_triangle(2, 0, 3); // left
//!
//! let mut map: CMap2 = CMap2::new();
//! let report = import.create_map(&mut map);
//! assert_eq!(report.holes_closed, 0);
//! assert_eq!(map.nb_vertices(), 4);
//! assert_eq!(map.nb_faces(), 4);
//! ```
//!
//! ## Traversal
//!
//! ```
//! use darn::prelude::*;
//! # use nalgebra::Point3;
//! # let mut import = SurfaceImport::new();
//! # import.set_positions(vec![Point3::origin(); 3]).unwrap();
//! # import.add_triangle(0, 1, 2);
//! # let mut map: CMap2 = CMap2::new();
//! # import.create_map(&mut map);
//! for f in map.faces() {
//!     let corners: Vec<VertexId> = map.face_vertices(f).collect();
//!     println!("face {:?}: {:?}", f, corners);
//! }
//!
//! for v in map.vertices() {
//!     println!("vertex {:?} has degree {}", map.vertex_embedding(v), map.vertex_degree(v));
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod import;
pub mod io;
pub mod map;

/// Prelude module for convenient imports.
///
/// ```
/// use darn::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::import::{ImportOptions, ImportReport, SurfaceImport, VertexRepair};
    pub use crate::map::{
        to_face_vertex, AttributeContainer, CMap2, ColumnHandle, Dart, FaceId, MeshIndex,
        VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron() {
        let mut import = SurfaceImport::new();
        import
            .set_positions(vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 1.0, 0.0),
                Point3::new(0.5, 0.5, 1.0),
            ])
            .unwrap();
        import.add_triangle(0, 2, 1);
        import.add_triangle(0, 1, 3);
        import.add_triangle(1, 2, 3);
        import.add_triangle(2, 0, 3);

        let mut map: CMap2 = CMap2::new();
        let report = import.create_map(&mut map);

        assert_eq!(report, ImportReport { faces: 4, ..ImportReport::default() });
        assert_eq!(map.nb_vertices(), 4);
        assert_eq!(map.nb_faces(), 4);
        assert_eq!(map.nb_darts(), 12);
        assert!(map.is_valid());

        for v in map.vertices() {
            assert!(!map.is_boundary_vertex(v), "vertex {:?} should not be on boundary", v);
        }
    }

    #[test]
    fn test_open_fan_with_defects() {
        // a fan of four triangles around vertex 0, plus a degenerate record
        // and a triangle hanging off a shared edge
        let mut import = SurfaceImport::new();
        import
            .set_positions((0..7).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect())
            .unwrap();
        import.add_triangle(0, 1, 2);
        import.add_triangle(0, 2, 3);
        import.add_triangle(0, 3, 4);
        import.add_triangle(0, 4, 5);
        import.add_triangle(6, 6, 6);
        import.add_triangle(0, 2, 6);

        let mut map: CMap2 = CMap2::new();
        let options = ImportOptions::checked().with_vertex_repair(VertexRepair::Always);
        let report = import.create_map_with_options(&mut map, &options).unwrap();

        assert_eq!(report.faces, 5);
        assert_eq!(report.degenerate_faces, 1);
        assert!(report.non_manifold_detected);
        assert!(report.vertices_split > 0);
        assert!(map.has_unique_vertex_embeddings());

        let (vertices, faces) = to_face_vertex(&map);
        assert_eq!(faces.len(), 5);
        assert_eq!(vertices.len(), map.vertex_attributes().nb_rows());
    }
}
