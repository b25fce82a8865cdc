//! Low-level map construction.
//!
//! [`MapBuilder`] is the only place that writes the dart arena of a
//! [`CMap2`]: it allocates darts and face loops, sews them with `phi1` and
//! `phi2`, sets embeddings, closes holes and re-derives vertex embeddings.
//! The import pipeline drives it; it is not part of the public API.

use super::attribute::AttributeContainer;
use super::cmap2::CMap2;
use super::index::{Dart, FaceId, MeshIndex, VertexId};

pub(crate) struct MapBuilder<'a, I: MeshIndex> {
    map: &'a mut CMap2<I>,
}

impl<'a, I: MeshIndex> MapBuilder<'a, I> {
    pub(crate) fn new(map: &'a mut CMap2<I>) -> Self {
        Self { map }
    }

    pub(crate) fn map(&self) -> &CMap2<I> {
        &*self.map
    }

    /// Allocate a dart that is its own face loop and unpaired.
    pub(crate) fn add_dart(&mut self) -> Dart<I> {
        let d = Dart::new(self.map.phi1.len());
        self.map.phi1.push(d);
        self.map.phi_1.push(d);
        self.map.phi2.push(d);
        self.map.vertex_emb.push(VertexId::invalid());
        self.map.face_emb.push(FaceId::invalid());
        self.map.boundary.push(false);
        d
    }

    /// Allocate a face loop of `nb_edges` darts and return its first dart.
    ///
    /// The darts are consecutive in the arena and `phi1` follows that order.
    pub(crate) fn add_face_topo(&mut self, nb_edges: usize) -> Dart<I> {
        debug_assert!(nb_edges > 0);
        let first = self.add_dart();
        let mut prev = first;
        for _ in 1..nb_edges {
            let d = self.add_dart();
            self.phi1_sew(prev, d);
            prev = d;
        }
        self.map.face_starts.push(first);
        first
    }

    /// Insert the single-dart loop `e` right after `d` in `d`'s face.
    pub(crate) fn phi1_sew(&mut self, d: Dart<I>, e: Dart<I>) {
        let next = self.map.phi1[d.index()];
        let e_prev = self.map.phi_1[e.index()];
        debug_assert_eq!(e_prev, e);
        self.map.phi1[d.index()] = e;
        self.map.phi_1[e.index()] = d;
        self.map.phi1[e.index()] = next;
        self.map.phi_1[next.index()] = e;
    }

    pub(crate) fn phi2_sew(&mut self, d: Dart<I>, e: Dart<I>) {
        debug_assert_eq!(self.map.phi2(d), d);
        debug_assert_eq!(self.map.phi2(e), e);
        self.map.phi2[d.index()] = e;
        self.map.phi2[e.index()] = d;
    }

    #[inline]
    pub(crate) fn set_vertex_embedding(&mut self, d: Dart<I>, v: VertexId<I>) {
        self.map.vertex_emb[d.index()] = v;
    }

    /// Embed every dart of the face of `d` on `f`.
    pub(crate) fn set_face_embedding(&mut self, d: Dart<I>, f: FaceId<I>) {
        let mut e = d;
        loop {
            self.map.face_emb[e.index()] = f;
            e = self.map.phi1(e);
            if e == d {
                break;
            }
        }
    }

    pub(crate) fn swap_vertex_attributes(&mut self, container: &mut AttributeContainer) {
        self.map.vertex_attributes.swap(container);
    }

    pub(crate) fn swap_face_attributes(&mut self, container: &mut AttributeContainer) {
        self.map.face_attributes.swap(container);
    }

    /// Build a cap face along the hole that contains the unpaired dart `d`.
    ///
    /// The walk follows the hole in the winding of its incident faces: from
    /// a hole dart it moves to the next dart of the face and turns around
    /// the vertex (`phi1 ∘ phi2`) until it finds the next unpaired dart. Each
    /// new cap dart is inserted right after the first one, so the cap runs
    /// against the hole and every cap dart can be `phi2`-sewn to its hole
    /// dart. The walk ends when it comes back to `d`.
    fn close_hole(&mut self, d: Dart<I>) -> Dart<I> {
        let first = self.add_dart();
        self.phi2_sew(d, first);

        let mut d_next = d;
        loop {
            let mut d_phi1;
            loop {
                d_phi1 = self.map.phi1(d_next);
                d_next = self.map.phi2(d_phi1);
                if d_next == d_phi1 || d_phi1 == d {
                    break;
                }
            }

            if d_phi1 == d {
                break;
            }

            let next = self.add_dart();
            self.phi1_sew(first, next);
            self.phi2_sew(d_next, next);
        }

        self.map.face_starts.push(first);
        first
    }

    /// Close every hole of the map and return the number of caps created.
    ///
    /// Cap darts are flagged as boundary, carry no face embedding, and take
    /// the vertex embedding of the hole vertex they start from.
    pub(crate) fn close_map(&mut self) -> usize {
        let mut nb_holes = 0;
        for i in 0..self.map.nb_darts() {
            let d = Dart::new(i);
            if self.map.phi2(d) != d {
                continue;
            }

            let cap = self.close_hole(d);
            nb_holes += 1;

            let mut c = cap;
            loop {
                let v = self.map.vertex_embedding(self.map.phi1(self.map.phi2(c)));
                self.set_vertex_embedding(c, v);
                self.map.boundary[c.index()] = true;
                c = self.map.phi1(c);
                if c == cap {
                    break;
                }
            }
        }
        nb_holes
    }

    /// Give each vertex orbit an embedding no other orbit uses.
    ///
    /// Orbits are visited in dart order. An orbit keeps the embedding of its
    /// first dart unless an earlier orbit already claimed it, in which case a
    /// new vertex row is minted as a copy of the claimed one. All darts of the
    /// orbit are then set to the chosen embedding.
    pub(crate) fn enforce_unique_vertex_embedding(&mut self) -> usize {
        let nb_darts = self.map.nb_darts();
        let mut marked = vec![false; nb_darts];
        let mut claimed = vec![false; self.map.vertex_attributes.nb_rows()];
        let mut nb_split = 0;

        for i in 0..nb_darts {
            if marked[i] {
                continue;
            }
            let d = Dart::new(i);
            let orbit: Vec<Dart<I>> = self.map.vertex_darts(d).collect();
            for e in &orbit {
                marked[e.index()] = true;
            }

            let v = self.map.vertex_embedding(d);
            if !v.is_valid() {
                continue;
            }

            let emb = if claimed[v.index()] {
                let row = self.map.vertex_attributes.reserve_rows(1);
                self.map.vertex_attributes.copy_row(row, v.index());
                claimed.push(true);
                nb_split += 1;
                VertexId::new(row)
            } else {
                claimed[v.index()] = true;
                v
            };

            for e in orbit {
                self.set_vertex_embedding(e, emb);
            }
        }

        nb_split
    }
}
