//! Face loop construction.

use crate::map::builder::MapBuilder;
use crate::map::{CMap2, Dart, FaceId, MeshIndex, VertexId};

/// Result of [`build_faces`].
pub(super) struct TopologyPass<I: MeshIndex> {
    /// For every vertex row, the darts that start from it, in creation order.
    pub darts_per_vertex: Vec<Vec<Dart<I>>>,
    pub nb_faces: usize,
    pub nb_degenerate: usize,
}

/// Copy the vertex run of one face record into `buffer`, dropping repeated
/// consecutive indices and a last index equal to the first.
fn retain_face_vertices(run: &[u32], buffer: &mut Vec<u32>) {
    buffer.clear();
    for &v in run {
        if buffer.last() != Some(&v) {
            buffer.push(v);
        }
    }
    if buffer.len() > 1 && buffer.first() == buffer.last() {
        buffer.pop();
    }
}

/// Create one `phi1` loop per face record and embed its darts.
///
/// Records with fewer than three distinct vertices are skipped and counted.
/// When `embed_faces` is set, the n-th kept face is embedded on face row n.
pub(super) fn build_faces<I: MeshIndex>(
    map: &mut CMap2<I>,
    faces_nb_edges: &[u32],
    faces_vertex_indices: &[u32],
    embed_faces: bool,
) -> TopologyPass<I> {
    let nb_vertices = map.vertex_attributes().nb_rows();
    let mut darts_per_vertex: Vec<Vec<Dart<I>>> = vec![Vec::new(); nb_vertices];
    let mut nb_faces = 0;
    let mut nb_degenerate = 0;

    let mut builder = MapBuilder::new(map);
    let mut vertices = Vec::with_capacity(8);
    let mut offset = 0;

    for &nb_edges in faces_nb_edges {
        let end = offset + nb_edges as usize;
        retain_face_vertices(&faces_vertex_indices[offset..end], &mut vertices);
        offset = end;

        if vertices.len() < 3 {
            nb_degenerate += 1;
            continue;
        }

        let first = builder.add_face_topo(vertices.len());
        // add_face_topo hands out consecutive darts
        for (i, &v) in vertices.iter().enumerate() {
            let d = Dart::new(first.index() + i);
            builder.set_vertex_embedding(d, VertexId::new(v as usize));
            darts_per_vertex[v as usize].push(d);
        }
        if embed_faces {
            builder.set_face_embedding(first, FaceId::new(nb_faces));
        }
        nb_faces += 1;
    }

    if nb_degenerate > 0 {
        log::debug!("{} degenerate face(s) skipped", nb_degenerate);
    }

    TopologyPass {
        darts_per_vertex,
        nb_faces,
        nb_degenerate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retained(run: &[u32]) -> Vec<u32> {
        let mut buffer = Vec::new();
        retain_face_vertices(run, &mut buffer);
        buffer
    }

    #[test]
    fn test_retain_face_vertices() {
        assert_eq!(retained(&[0, 1, 2]), vec![0, 1, 2]);
        assert_eq!(retained(&[0, 0, 1, 2, 2]), vec![0, 1, 2]);
        assert_eq!(retained(&[0, 1, 2, 0]), vec![0, 1, 2]);
        assert_eq!(retained(&[5, 5, 5]), vec![5]);
        assert_eq!(retained(&[3, 4, 3]), vec![3, 4]);
        assert!(retained(&[]).is_empty());
    }

    #[test]
    fn test_build_faces() {
        let mut map = CMap2::<u32>::new();
        map.vertex_attributes_mut().reserve_rows(4);

        let pass = build_faces(&mut map, &[3, 3, 4], &[0, 1, 2, 1, 1, 1, 0, 2, 3, 3], true);

        assert_eq!(pass.nb_faces, 2);
        assert_eq!(pass.nb_degenerate, 1);
        assert_eq!(map.nb_darts(), 6);
        assert_eq!(pass.darts_per_vertex[0], vec![Dart::new(0), Dart::new(3)]);
        assert_eq!(pass.darts_per_vertex[3], vec![Dart::new(5)]);

        let second = Dart::new(3);
        assert_eq!(
            map.face_vertices(second).map(|v| v.index()).collect::<Vec<_>>(),
            vec![0, 2, 3]
        );
        assert!(map.face_darts(second).all(|d| map.face_embedding(d) == FaceId::new(1)));
        assert!(map.darts().all(|d| map.phi2(d) == d));
    }
}
