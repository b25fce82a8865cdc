//! Two-dimensional combinatorial map.
//!
//! A [`CMap2`] represents a surface with darts, each dart being one side of
//! one edge inside one face. Connectivity is stored as two permutations over
//! the dart arena:
//!
//! - `phi1` links the darts of a face into a cycle, in winding order
//!   (`phi_1` is its inverse and is kept up to date alongside)
//! - `phi2` is an involution pairing the two darts of an edge; a dart with
//!   `phi2(d) == d` is unpaired
//!
//! Every dart carries a vertex embedding (a row of the vertex attribute
//! container) and, when face attributes exist, a face embedding.
//!
//! # Boundary Handling
//!
//! Maps produced by [`SurfaceImport`](crate::import::SurfaceImport) are
//! closed: every hole of the input is filled by a cap face whose darts are
//! flagged as boundary. Caps are not counted by [`CMap2::nb_faces`] and are
//! skipped by [`CMap2::faces`].

use nalgebra::Point3;
use rayon::prelude::*;

use super::attribute::{AttributeContainer, Column};
use super::builder::MapBuilder;
use super::index::{Dart, FaceId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Name of the vertex position attribute.
pub const POSITION_ATTRIBUTE: &str = "position";

/// A two-dimensional combinatorial map with vertex and face attributes.
#[derive(Debug, Default)]
pub struct CMap2<I: MeshIndex = u32> {
    pub(crate) phi1: Vec<Dart<I>>,
    pub(crate) phi_1: Vec<Dart<I>>,
    pub(crate) phi2: Vec<Dart<I>>,
    pub(crate) vertex_emb: Vec<VertexId<I>>,
    pub(crate) face_emb: Vec<FaceId<I>>,
    pub(crate) boundary: Vec<bool>,

    /// First dart of every face loop, caps included, in creation order.
    pub(crate) face_starts: Vec<Dart<I>>,

    pub(crate) vertex_attributes: AttributeContainer,
    pub(crate) face_attributes: AttributeContainer,
}

impl<I: MeshIndex> CMap2<I> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            phi1: Vec::new(),
            phi_1: Vec::new(),
            phi2: Vec::new(),
            vertex_emb: Vec::new(),
            face_emb: Vec::new(),
            boundary: Vec::new(),
            face_starts: Vec::new(),
            vertex_attributes: AttributeContainer::new(),
            face_attributes: AttributeContainer::new(),
        }
    }

    /// Remove all darts and all attributes.
    pub fn clear(&mut self) {
        self.phi1.clear();
        self.phi_1.clear();
        self.phi2.clear();
        self.vertex_emb.clear();
        self.face_emb.clear();
        self.boundary.clear();
        self.face_starts.clear();
        self.vertex_attributes.remove_columns();
        self.face_attributes.remove_columns();
    }

    // ==================== Counts ====================

    /// Number of darts, cap darts included.
    #[inline]
    pub fn nb_darts(&self) -> usize {
        self.phi1.len()
    }

    /// Whether the map has no darts.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.phi1.is_empty()
    }

    /// Number of faces, caps excluded.
    pub fn nb_faces(&self) -> usize {
        self.faces().count()
    }

    /// Number of cap faces closing holes.
    pub fn nb_boundary_faces(&self) -> usize {
        self.face_starts
            .iter()
            .filter(|&&d| self.is_boundary(d))
            .count()
    }

    /// Number of edges (pairs of darts, unpaired darts count as one edge).
    pub fn nb_edges(&self) -> usize {
        self.darts().filter(|&d| d <= self.phi2(d)).count()
    }

    /// Number of vertex orbits.
    pub fn nb_vertices(&self) -> usize {
        self.vertices().len()
    }

    // ==================== Topology ====================

    /// Next dart in the face.
    #[inline]
    pub fn phi1(&self, d: Dart<I>) -> Dart<I> {
        self.phi1[d.index()]
    }

    /// Previous dart in the face.
    #[inline]
    pub fn phi_1(&self, d: Dart<I>) -> Dart<I> {
        self.phi_1[d.index()]
    }

    /// Opposite dart across the edge, or `d` itself if unpaired.
    #[inline]
    pub fn phi2(&self, d: Dart<I>) -> Dart<I> {
        self.phi2[d.index()]
    }

    /// Vertex embedding of a dart (the vertex the dart starts from).
    #[inline]
    pub fn vertex_embedding(&self, d: Dart<I>) -> VertexId<I> {
        self.vertex_emb[d.index()]
    }

    /// Face embedding of a dart; invalid for caps and when no face
    /// attributes were imported.
    #[inline]
    pub fn face_embedding(&self, d: Dart<I>) -> FaceId<I> {
        self.face_emb[d.index()]
    }

    /// Whether the dart belongs to a cap face.
    #[inline]
    pub fn is_boundary(&self, d: Dart<I>) -> bool {
        self.boundary[d.index()]
    }

    /// Whether every dart is paired.
    pub fn is_closed(&self) -> bool {
        self.darts().all(|d| self.phi2(d) != d)
    }

    /// Whether any dart around the vertex of `d` belongs to a cap.
    pub fn is_boundary_vertex(&self, d: Dart<I>) -> bool {
        self.vertex_darts(d).any(|e| self.is_boundary(e))
    }

    /// Number of darts in the face of `d`.
    pub fn face_degree(&self, d: Dart<I>) -> usize {
        self.face_darts(d).count()
    }

    /// Number of edges incident to the vertex of `d`, caps included.
    pub fn vertex_degree(&self, d: Dart<I>) -> usize {
        self.vertex_darts(d).count()
    }

    // ==================== Iteration ====================

    /// Iterate over all darts.
    pub fn darts(&self) -> impl Iterator<Item = Dart<I>> + '_ {
        (0..self.phi1.len()).map(Dart::new)
    }

    /// One dart per face, caps excluded, in creation order.
    pub fn faces(&self) -> impl Iterator<Item = Dart<I>> + '_ {
        self.face_starts
            .iter()
            .copied()
            .filter(move |&d| !self.is_boundary(d))
    }

    /// One dart per vertex orbit, in dart order.
    pub fn vertices(&self) -> Vec<Dart<I>> {
        let mut marked = vec![false; self.nb_darts()];
        let mut reps = Vec::new();
        for d in self.darts() {
            if marked[d.index()] {
                continue;
            }
            reps.push(d);
            for e in self.vertex_darts(d) {
                marked[e.index()] = true;
            }
        }
        reps
    }

    /// Iterate over the darts of the face of `d`, starting at `d`.
    pub fn face_darts(&self, d: Dart<I>) -> FaceDartIter<'_, I> {
        FaceDartIter::new(self, d)
    }

    /// Iterate over the darts leaving the vertex of `d`, starting at `d`.
    pub fn vertex_darts(&self, d: Dart<I>) -> VertexDartIter<'_, I> {
        VertexDartIter::new(self, d)
    }

    /// Vertex embeddings of the face of `d`, in winding order.
    pub fn face_vertices(&self, d: Dart<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_darts(d).map(|e| self.vertex_embedding(e))
    }

    // ==================== Attributes ====================

    /// Vertex attribute container.
    pub fn vertex_attributes(&self) -> &AttributeContainer {
        &self.vertex_attributes
    }

    /// Mutable vertex attribute container.
    pub fn vertex_attributes_mut(&mut self) -> &mut AttributeContainer {
        &mut self.vertex_attributes
    }

    /// Face attribute container.
    pub fn face_attributes(&self) -> &AttributeContainer {
        &self.face_attributes
    }

    /// Mutable face attribute container.
    pub fn face_attributes_mut(&mut self) -> &mut AttributeContainer {
        &mut self.face_attributes
    }

    /// The position column, if one was imported.
    pub fn positions(&self) -> Option<&Column<Point3<f64>>> {
        self.vertex_attributes
            .get_column::<Point3<f64>>(POSITION_ATTRIBUTE)
            .ok()
    }

    /// Position of the vertex of `d`, if positions were imported.
    pub fn position(&self, d: Dart<I>) -> Option<&Point3<f64>> {
        let v = self.vertex_embedding(d);
        self.positions().map(|p| p.get(v.index()))
    }

    // ==================== Repair ====================

    /// Fill every hole with a cap face and return how many were closed.
    ///
    /// A map that is already closed is left untouched and reports zero.
    pub fn close_map(&mut self) -> usize {
        MapBuilder::new(self).close_map()
    }

    /// Give every vertex orbit its own vertex embedding.
    ///
    /// Orbits sharing an embedding with an earlier orbit receive a fresh row
    /// in the vertex container, initialised as a copy of the shared row.
    /// Returns the number of orbits that were re-embedded.
    pub fn enforce_unique_vertex_embedding(&mut self) -> usize {
        MapBuilder::new(self).enforce_unique_vertex_embedding()
    }

    // ==================== Validation ====================

    /// Check if the map is valid (see [`CMap2::check_integrity`]).
    pub fn is_valid(&self) -> bool {
        self.check_integrity(false).is_ok()
    }

    /// Verify the structural invariants of a closed map.
    ///
    /// Checks that `phi_1` inverts `phi1`, that `phi2` is a fixed-point free
    /// involution, that every dart has a vertex embedding inside the vertex
    /// container, and that all darts of a vertex orbit share one embedding.
    /// With `parallel`, the per-dart checks run on the rayon pool.
    pub fn check_integrity(&self, parallel: bool) -> Result<()> {
        let n = self.nb_darts();
        let nb_rows = self.vertex_attributes.nb_rows();
        let check_dart = |i: usize| -> std::result::Result<(), String> {
            let d = Dart::<I>::new(i);
            if self.phi_1(self.phi1(d)) != d || self.phi1(self.phi_1(d)) != d {
                return Err(format!("phi1/phi_1 mismatch at {:?}", d));
            }
            let e = self.phi2(d);
            if e == d {
                return Err(format!("{:?} is not sewn", d));
            }
            if self.phi2(e) != d {
                return Err(format!("phi2 is not an involution at {:?}", d));
            }
            let v = self.vertex_embedding(d);
            if !v.is_valid() || v.index() >= nb_rows {
                return Err(format!("{:?} has vertex embedding {:?}", d, v));
            }
            Ok(())
        };

        let checked = if parallel {
            (0..n).into_par_iter().try_for_each(check_dart)
        } else {
            (0..n).try_for_each(check_dart)
        };
        checked.map_err(MeshError::InvalidState)?;

        for rep in self.vertices() {
            let v = self.vertex_embedding(rep);
            if let Some(e) = self.vertex_darts(rep).find(|&e| self.vertex_embedding(e) != v) {
                return Err(MeshError::InvalidState(format!(
                    "vertex orbit of {:?} mixes embeddings {:?} and {:?}",
                    rep,
                    v,
                    self.vertex_embedding(e)
                )));
            }
        }

        Ok(())
    }

    /// Whether no two vertex orbits share a vertex embedding.
    ///
    /// An unset or out-of-range embedding counts as not unique.
    pub fn has_unique_vertex_embeddings(&self) -> bool {
        let mut seen = vec![false; self.vertex_attributes.nb_rows()];
        for rep in self.vertices() {
            match seen.get_mut(self.vertex_embedding(rep).index()) {
                Some(claimed) if !*claimed => *claimed = true,
                _ => return false,
            }
        }
        true
    }
}

/// Iterator over the darts of a face.
pub struct FaceDartIter<'a, I: MeshIndex = u32> {
    map: &'a CMap2<I>,
    start: Dart<I>,
    current: Dart<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceDartIter<'a, I> {
    fn new(map: &'a CMap2<I>, d: Dart<I>) -> Self {
        Self {
            map,
            start: d,
            current: d,
            done: !d.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceDartIter<'a, I> {
    type Item = Dart<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.map.phi1(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over the darts leaving a vertex.
///
/// Turns with `phi1 ∘ phi2`. On a map that is not closed the walk stops at
/// the first unpaired dart.
pub struct VertexDartIter<'a, I: MeshIndex = u32> {
    map: &'a CMap2<I>,
    start: Dart<I>,
    current: Dart<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexDartIter<'a, I> {
    fn new(map: &'a CMap2<I>, d: Dart<I>) -> Self {
        Self {
            map,
            start: d,
            current: d,
            done: !d.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexDartIter<'a, I> {
    type Item = Dart<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // If d leaves v, phi2(d) arrives at v and the dart after it leaves v.
        let opposite = self.map.phi2(self.current);
        if opposite == self.current {
            self.done = true;
            return Some(result);
        }
        self.current = self.map.phi1(opposite);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::SurfaceImport;

    fn tetrahedron() -> CMap2 {
        let mut import = SurfaceImport::new();
        import.set_positions(vec![
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

        let mut map = CMap2::new();
        import.create_map(&mut map);
        map
    }

    #[test]
    fn test_empty_map() {
        let map = CMap2::<u32>::new();
        assert_eq!(map.nb_darts(), 0);
        assert_eq!(map.nb_faces(), 0);
        assert_eq!(map.nb_vertices(), 0);
        assert!(map.is_valid());
        assert!(map.is_closed());
    }

    #[test]
    fn test_tetrahedron_counts() {
        let map = tetrahedron();
        assert_eq!(map.nb_darts(), 12);
        assert_eq!(map.nb_faces(), 4);
        assert_eq!(map.nb_boundary_faces(), 0);
        assert_eq!(map.nb_edges(), 6);
        assert_eq!(map.nb_vertices(), 4);
        assert!(map.is_valid());
        assert!(map.check_integrity(true).is_ok());
        assert!(map.has_unique_vertex_embeddings());
    }

    #[test]
    fn test_orbits() {
        let map = tetrahedron();
        for f in map.faces() {
            assert_eq!(map.face_degree(f), 3);
        }
        for v in map.vertices() {
            assert_eq!(map.vertex_degree(v), 3);
            assert!(!map.is_boundary_vertex(v));
            let emb = map.vertex_embedding(v);
            assert!(map.vertex_darts(v).all(|d| map.vertex_embedding(d) == emb));
        }
    }

    #[test]
    fn test_position_lookup() {
        let map = tetrahedron();
        let d = map.faces().next().unwrap();
        assert_eq!(map.position(d), Some(&Point3::new(0.0, 0.0, 0.0)));
        assert_eq!(
            map.face_vertices(d).map(|v| v.index()).collect::<Vec<_>>(),
            vec![0, 2, 1]
        );
    }

    #[test]
    fn test_clear() {
        let mut map = tetrahedron();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.vertex_attributes().nb_rows(), 0);
        assert!(map.positions().is_none());
    }

    #[test]
    fn test_uniqueness_with_bad_embeddings() {
        let mut map = tetrahedron();
        map.vertex_emb[0] = VertexId::invalid();
        assert!(!map.has_unique_vertex_embeddings());
        assert!(map.check_integrity(false).is_err());

        let mut map = tetrahedron();
        map.vertex_emb[0] = VertexId::new(4);
        assert!(!map.has_unique_vertex_embeddings());
        assert!(map.check_integrity(false).is_err());
    }

    #[test]
    fn test_integrity_detects_broken_involution() {
        let mut map = tetrahedron();
        let d = Dart::new(0);
        let e = map.phi2(d);
        map.phi2[e.index()] = e;
        assert!(matches!(
            map.check_integrity(false),
            Err(MeshError::InvalidState(_))
        ));
        assert!(!map.is_valid());
    }
}
