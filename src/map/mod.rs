//! Combinatorial map data structures.
//!
//! This module provides the dart-based surface representation produced by
//! the import pipeline, together with the attribute storage it embeds into.
//!
//! # Overview
//!
//! The primary type is [`CMap2`], a two-dimensional combinatorial map. Each
//! face is a `phi1` cycle of darts and each edge pairs two darts with the
//! `phi2` involution, which gives O(1) traversal of faces, edges, and the
//! darts around a vertex.
//!
//! Per-vertex and per-face data live in two [`AttributeContainer`]s, indexed
//! by the vertex and face embeddings stored on the darts.
//!
//! # Index Types
//!
//! - [`Dart`] - Identifies a dart
//! - [`VertexId`] - Identifies a vertex row
//! - [`FaceId`] - Identifies a face row
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! Maps are built from a [`SurfaceImport`](crate::import::SurfaceImport):
//!
//! ```
//! use darn::import::SurfaceImport;
//! use darn::map::CMap2;
//! use nalgebra::Point3;
//!
//! let mut import = SurfaceImport::new();
//! import.set_positions(vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ]).unwrap();
//! import.add_triangle(0, 1, 2);
//!
//! let mut map: CMap2 = CMap2::new();
//! let report = import.create_map(&mut map);
//! assert_eq!(map.nb_faces(), 1);
//! assert_eq!(report.holes_closed, 1);
//! ```

mod attribute;
pub(crate) mod builder;
mod cmap2;
mod export;
mod index;

pub use attribute::{AttributeContainer, AttributeValue, Column, ColumnData, ColumnHandle};
pub use cmap2::{CMap2, FaceDartIter, VertexDartIter, POSITION_ATTRIBUTE};
pub use export::to_face_vertex;
pub use index::{Dart, FaceId, MeshIndex, VertexId};
