//! Edge sewing.

use crate::map::builder::MapBuilder;
use crate::map::{CMap2, Dart, MeshIndex};

/// Result of [`sew_faces`].
pub(super) struct SewingPass {
    /// Darts left unpaired.
    pub boundary_edges: usize,
    /// Whether an edge was claimed by more than two faces.
    pub non_manifold: bool,
}

/// Pair every dart with an opposite dart on the same edge.
///
/// For an unpaired dart `d` running from `a` to `b`, the darts starting at
/// `b` are scanned in creation order and the first unpaired one running back
/// to `a` is sewn to `d`. Matching darts met before it that are already
/// paired mean a third face on the same edge.
pub(super) fn sew_faces<I: MeshIndex>(
    map: &mut CMap2<I>,
    darts_per_vertex: &[Vec<Dart<I>>],
) -> SewingPass {
    let mut builder = MapBuilder::new(map);
    let mut boundary_edges = 0;
    let mut non_manifold = false;

    for i in 0..builder.map().nb_darts() {
        let d = Dart::new(i);
        let m = builder.map();
        if m.phi2(d) != d {
            continue;
        }

        let v_self = m.vertex_embedding(d);
        let v_next = m.vertex_embedding(m.phi1(d));

        let mut opposite = None;
        for &c in &darts_per_vertex[v_next.index()] {
            if m.vertex_embedding(m.phi1(c)) != v_self {
                continue;
            }
            if m.phi2(c) == c {
                opposite = Some(c);
                break;
            }
            non_manifold = true;
        }

        match opposite {
            Some(c) => builder.phi2_sew(d, c),
            None => boundary_edges += 1,
        }
    }

    SewingPass {
        boundary_edges,
        non_manifold,
    }
}

#[cfg(test)]
mod tests {
    use super::super::topology::build_faces;
    use super::*;

    fn sewn(nb_edges: &[u32], indices: &[u32], nb_vertices: usize) -> (CMap2, SewingPass) {
        let mut map = CMap2::<u32>::new();
        map.vertex_attributes_mut().reserve_rows(nb_vertices);
        let pass = build_faces(&mut map, nb_edges, indices, false);
        let sewing = sew_faces(&mut map, &pass.darts_per_vertex);
        (map, sewing)
    }

    #[test]
    fn test_sew_shared_edge() {
        let (map, sewing) = sewn(&[3, 3], &[0, 1, 2, 1, 0, 3], 4);
        assert_eq!(map.phi2(Dart::new(0)), Dart::new(3));
        assert_eq!(map.phi2(Dart::new(3)), Dart::new(0));
        assert_eq!(sewing.boundary_edges, 4);
        assert!(!sewing.non_manifold);
    }

    #[test]
    fn test_same_orientation_is_not_sewn() {
        // both faces run 0 -> 1
        let (map, sewing) = sewn(&[3, 3], &[0, 1, 2, 0, 1, 3], 4);
        assert!(map.darts().all(|d| map.phi2(d) == d));
        assert_eq!(sewing.boundary_edges, 6);
        assert!(!sewing.non_manifold);
    }

    #[test]
    fn test_third_face_raises_flag() {
        let (map, sewing) = sewn(&[3, 3, 3], &[0, 1, 2, 1, 0, 3, 0, 1, 4], 5);
        assert_eq!(map.phi2(Dart::new(0)), Dart::new(3));
        assert_eq!(map.phi2(Dart::new(6)), Dart::new(6));
        assert_eq!(sewing.boundary_edges, 7);
        assert!(sewing.non_manifold);
    }
}
