// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local read-only walks over the mesh: adjacency enumeration, valence,
//! `get_edge`, boundary/isolation tests, and non-manifold vertex sectors.

use super::*;

impl<T: MeshTypes> Mesh<T> {
    /// The half-edges of `f`'s face loop, in the face's intrinsic orientation.
    pub fn face_adj_edges(&self, f: FaceId) -> SVec<HalfEdgeId> {
        let mut out = SVec::new();
        let start = self.faces[f].edge.expect("face has no edge");
        let mut e = start;
        let mut iters = 0;
        loop {
            out.push(e);
            e = self.edges[e].next.expect("half-edge has no next");
            iters += 1;
            if e == start {
                break;
            }
            assert!(iters < MAX_LOOP_ITERATIONS, "face loop does not close");
        }
        out
    }

    /// The vertices of `f`'s face loop, aligned with `face_adj_edges`.
    pub fn face_adj_verts(&self, f: FaceId) -> SVec<VertexId> {
        self.face_adj_edges(f)
            .into_iter()
            .map(|e| self.edges[e].vert.expect("half-edge has no vert"))
            .collect()
    }

    /// The faces across each edge of `f`'s loop (excludes boundary neighbours).
    pub fn face_adj_faces(&self, f: FaceId) -> SVec<FaceId> {
        self.face_adj_edges(f)
            .into_iter()
            .filter_map(|e| {
                let oppo = self.edges[e].oppo.expect("half-edge has no oppo");
                self.edges[oppo].face
            })
            .collect()
    }

    /// The (up to two) faces incident to the undirected edge `e` belongs to.
    pub fn edge_adj_faces(&self, e: HalfEdgeId) -> SVec<FaceId> {
        let mut out = SVec::new();
        if let Some(f) = self.edges[e].face {
            out.push(f);
        }
        let oppo = self.edges[e].oppo.expect("half-edge has no oppo");
        if let Some(f) = self.edges[oppo].face {
            out.push(f);
        }
        out
    }

    /// Rotate the incoming edges of `v`, emitting the incident face of each
    /// (skipping boundary gaps).
    pub fn vert_adj_faces(&self, v: VertexId) -> SVec<FaceId> {
        let mut out = SVec::new();
        let start = match self.verts[v].edge {
            Some(e) => e,
            None => return out,
        };
        let mut e = start;
        let mut iters = 0;
        loop {
            if let Some(f) = self.edges[e].face {
                out.push(f);
            }
            e = self.rotate_in(e);
            iters += 1;
            if e == start {
                break;
            }
            assert!(iters < MAX_LOOP_ITERATIONS, "vertex rotation does not close");
        }
        out
    }

    /// Rotate the incoming edges of `v`, emitting the tail vertex of each.
    pub fn vert_adj_verts(&self, v: VertexId) -> SVec<VertexId> {
        let mut out = SVec::new();
        let start = match self.verts[v].edge {
            Some(e) => e,
            None => return out,
        };
        let mut e = start;
        let mut iters = 0;
        loop {
            let oppo = self.edges[e].oppo.expect("half-edge has no oppo");
            out.push(self.edges[oppo].vert.expect("half-edge has no vert"));
            e = self.rotate_in(e);
            iters += 1;
            if e == start {
                break;
            }
            assert!(iters < MAX_LOOP_ITERATIONS, "vertex rotation does not close");
        }
        out
    }

    /// The edges leaving `v`, obtained by rotating the opposites of the
    /// incoming fan.
    pub fn vert_adj_out_edges(&self, v: VertexId) -> SVec<HalfEdgeId> {
        let mut out = SVec::new();
        let in_edge = match self.verts[v].edge {
            Some(e) => e,
            None => return out,
        };
        let start = self.edges[in_edge].oppo.expect("half-edge has no oppo");
        let mut e = start;
        let mut iters = 0;
        loop {
            out.push(e);
            e = self.rotate_out(e);
            iters += 1;
            if e == start {
                break;
            }
            assert!(iters < MAX_LOOP_ITERATIONS, "vertex rotation does not close");
        }
        out
    }

    /// `e -> oppo(next(e))`: steps to the next incoming half-edge in the
    /// rotation around `vert(e)`.
    fn rotate_in(&self, e: HalfEdgeId) -> HalfEdgeId {
        let next = self.edges[e].next.expect("half-edge has no next");
        self.edges[next].oppo.expect("half-edge has no oppo")
    }

    /// `e -> oppo(prev(e))`: steps to the next outgoing half-edge in the
    /// rotation around the outgoing fan.
    fn rotate_out(&self, e: HalfEdgeId) -> HalfEdgeId {
        let prev = self.edges[e].prev.expect("half-edge has no prev");
        self.edges[prev].oppo.expect("half-edge has no oppo")
    }

    /// Number of edges in `f`'s face loop.
    pub fn face_valence(&self, f: FaceId) -> usize {
        self.face_adj_edges(f).len()
    }

    /// Number of incoming edges at `v` (equivalently, the number of distinct
    /// faces/sectors touching it, counted with multiplicity around non-
    /// manifold spots).
    pub fn vert_valence(&self, v: VertexId) -> usize {
        let start = match self.verts[v].edge {
            Some(e) => e,
            None => return 0,
        };
        let mut e = start;
        let mut r = 0;
        let mut iters = 0;
        loop {
            r += 1;
            e = self.rotate_in(e);
            iters += 1;
            if e == start {
                break;
            }
            assert!(iters < MAX_LOOP_ITERATIONS, "vertex rotation does not close");
        }
        r
    }

    /// The half-edge running `v1 -> v2`, if one exists. Falls back to a
    /// linear scan around the face loop when `v2` sits on the boundary and
    /// the rotation around it is incomplete.
    pub fn get_edge(&self, v1: VertexId, v2: VertexId) -> Option<HalfEdgeId> {
        let start = self.verts[v2].edge?;
        let mut e = start;
        let mut iters = 0;
        loop {
            let oppo = self.edges[e].oppo.expect("half-edge has no oppo");
            if self.edges[oppo].vert == Some(v1) {
                return Some(e);
            }
            e = self.rotate_in(e);
            iters += 1;
            if e == start {
                break;
            }
            assert!(iters < MAX_LOOP_ITERATIONS, "vertex rotation does not close");
        }

        // v2's rotation didn't find it; if v2 is itself a boundary vertex the
        // rotation above may not reach every edge incident to it, so fall
        // back to scanning the boundary loop linearly.
        if self.edges[start].face.is_some() {
            return None;
        }

        let mut ei = start;
        let mut iters = 0;
        loop {
            let oppo = self.edges[ei].oppo.expect("half-edge has no oppo");
            let tip = self.edges[ei].vert.expect("half-edge has no vert");
            let tail = self.edges[oppo].vert.expect("half-edge has no vert");
            if tip == v2 && tail == v1 {
                return Some(ei);
            }
            if tail == v2 && tip == v1 {
                return Some(oppo);
            }
            ei = self.edges[ei].next.expect("half-edge has no next");
            iters += 1;
            if ei == start {
                break;
            }
            assert!(iters < MAX_LOOP_ITERATIONS, "boundary loop does not close");
        }
        None
    }

    pub fn is_boundary_face(&self, f: FaceId) -> bool {
        self.face_adj_edges(f).into_iter().any(|e| {
            let oppo = self.edges[e].oppo.expect("half-edge has no oppo");
            self.edges[oppo].face.is_none()
        })
    }

    pub fn is_isolated_edge(&self, e: HalfEdgeId) -> bool {
        let oppo = self.edges[e].oppo.expect("half-edge has no oppo");
        self.edges[e].face.is_none() && self.edges[oppo].face.is_none()
    }

    pub fn is_isolated_face(&self, f: FaceId) -> bool {
        self.face_adj_edges(f).into_iter().all(|e| {
            let oppo = self.edges[e].oppo.expect("half-edge has no oppo");
            self.edges[oppo].face.is_none()
        })
    }

    /// The alternating boundary-in/boundary-out edges found when rotating
    /// around `v`. Each pair `(sectors[2k], sectors[2k+1])` bounds one
    /// contiguous run of faces (a "sector") around a possibly non-manifold
    /// vertex.
    pub fn sectors(&self, v: VertexId) -> SVec<HalfEdgeId> {
        let mut sec = SVec::new();
        let start = match self.verts[v].edge {
            Some(e) => e,
            None => return sec,
        };
        let mut e = start;
        let mut iters = 0;
        loop {
            if self.edges[e].face.is_none() {
                sec.push(e);
                sec.push(self.edges[e].next.expect("half-edge has no next"));
            }
            e = self.rotate_in(e);
            iters += 1;
            if e == start {
                break;
            }
            assert!(iters < MAX_LOOP_ITERATIONS, "vertex rotation does not close");
        }
        sec
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn quad_mesh() -> (Mesh<BasicTypes>, [VertexId; 4]) {
        let mut mesh = Mesh::<BasicTypes>::new();
        let verts: Vec<VertexId> = (0..4).map(|id| mesh.new_vert(BasicVertex { id })).collect();
        let [a, b, c, d] = [verts[0], verts[1], verts[2], verts[3]];
        mesh.add_face(&[a, b, c], BasicFace::default());
        mesh.add_face(&[a, c, d], BasicFace::default());
        mesh.set_opposite_and_boundary_edge().unwrap();
        (mesh, [a, b, c, d])
    }

    #[test]
    fn test_valence_on_shared_diagonal() {
        let (mesh, [a, _b, c, _d]) = quad_mesh();
        // a and c each touch both triangles plus the two boundary sectors.
        assert_eq!(mesh.vert_valence(a), 3);
        assert_eq!(mesh.vert_valence(c), 3);
    }

    #[test]
    fn test_get_edge_both_directions() {
        let (mesh, [a, _b, c, _d]) = quad_mesh();
        let ac = mesh.get_edge(a, c).expect("a->c exists");
        let ca = mesh.get_edge(c, a).expect("c->a exists");
        assert_eq!(mesh.edges[ac].oppo, Some(ca));
        assert_eq!(mesh.get_edge(a, a), None::<HalfEdgeId>);
    }

    #[test]
    fn test_face_adj_verts_follows_winding() {
        let (mesh, [a, b, c, _d]) = quad_mesh();
        let f = mesh.vert_adj_faces(a)[0];
        let verts = mesh.face_adj_verts(f);
        assert_eq!(verts.len(), 3);
        assert!(verts.contains(&a) && verts.contains(&b) && verts.contains(&c));
    }

    #[test]
    fn test_sectors_single_manifold_vertex_has_one_sector() {
        let (mesh, [a, ..]) = quad_mesh();
        // a is a manifold (disk-like) vertex here, so it has exactly one
        // boundary-in/boundary-out pair.
        let sec = mesh.sectors(a);
        assert_eq!(sec.len(), 2);
    }

    #[test]
    fn test_isolated_edge_has_no_incident_faces() {
        let mut mesh = Mesh::<BasicTypes>::new();
        let a = mesh.new_vert(BasicVertex { id: 0 });
        let b = mesh.new_vert(BasicVertex { id: 1 });
        let e1 = mesh.new_edge(BasicEdge::default());
        let e2 = mesh.new_edge(BasicEdge::default());
        mesh[e1].vert = Some(b);
        mesh[e2].vert = Some(a);
        mesh[e1].oppo = Some(e2);
        mesh[e2].oppo = Some(e1);
        mesh[e1].next = Some(e2);
        mesh[e1].prev = Some(e2);
        mesh[e2].next = Some(e1);
        mesh[e2].prev = Some(e1);
        mesh[a].edge = Some(e2);
        mesh[b].edge = Some(e1);

        assert!(mesh.is_isolated_edge(e1));
        assert!(mesh.is_boundary_edge(e1));
    }
}
