// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural well-formedness checks. `topology_test` is the audit tool a
//! caller reaches for after a sequence of edits that might have left the
//! mesh invalid (see the no-rollback resource model in `SPEC_FULL.md` §5).

use super::*;

/// The outcome of [`Mesh::topology_test`]. Each non-`Ok` variant carries the
/// id of the offending vertex/edge/face (the payload's diagnostic `id`, not
/// the arena handle) for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyCode {
    Ok,
    /// A vertex's `edge` field points to a half-edge whose tip isn't it.
    VertEdgeMismatch { id: u64 },
    /// An edge has no opposite, or its opposite's opposite isn't itself.
    BadOppo { id: u64 },
    /// An edge has no `next`, or `next`'s `prev` isn't itself, or the loop
    /// reached by repeatedly following `next` has inconsistent `face`s.
    BadNext { id: u64 },
    /// An edge has no `prev`, or `prev`'s `next` isn't itself.
    BadPrev { id: u64 },
    /// Two distinct half-edges run the same directed (tail, tip) pair.
    DuplicateDirectedEdge { id: u64 },
    /// An edge inside a face's loop doesn't point back at that face, or the
    /// edge's own face-loop rotation never returns to itself.
    FaceLoopBroken { id: u64 },
    /// A face has no edge, or its loop never returns to its starting edge.
    FaceEdgeMissing { id: u64 },
}

impl TopologyCode {
    /// The numeric error code from the external contract (0 for success).
    pub fn code(&self) -> i32 {
        match self {
            TopologyCode::Ok => 0,
            TopologyCode::VertEdgeMismatch { .. } => 12,
            TopologyCode::BadOppo { .. } => 21,
            TopologyCode::BadNext { .. } => 22,
            TopologyCode::BadPrev { .. } => 23,
            TopologyCode::DuplicateDirectedEdge { .. } => 24,
            TopologyCode::FaceLoopBroken { .. } => 32,
            TopologyCode::FaceEdgeMissing { .. } => 33,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, TopologyCode::Ok)
    }
}

impl<T: MeshTypes> Mesh<T> {
    /// Does `id` reference a live vertex whose required neighbours are
    /// themselves live?
    pub fn is_valid_vertex(&self, id: VertexId) -> bool {
        match self.verts.get(id) {
            None => false,
            Some(v) => match v.edge {
                None => true,
                Some(e) => self.edges.contains_key(e),
            },
        }
    }

    pub fn is_valid_edge(&self, id: HalfEdgeId) -> bool {
        let e = match self.edges.get(id) {
            None => return false,
            Some(e) => e,
        };
        e.prev.is_some_and(|p| self.edges.contains_key(p))
            && e.next.is_some_and(|n| self.edges.contains_key(n))
            && e.oppo.is_some_and(|o| self.edges.contains_key(o))
            && e.vert.is_some_and(|v| self.verts.contains_key(v))
            && e.face.map_or(true, |f| self.faces.contains_key(f))
    }

    pub fn is_valid_face(&self, id: FaceId) -> bool {
        match self.faces.get(id) {
            None => false,
            Some(f) => f.edge.is_some_and(|e| self.edges.contains_key(e)),
        }
    }

    /// Collect every invalid element handle, for diagnostics.
    pub fn find_invalid(&self) -> (Vec<VertexId>, Vec<HalfEdgeId>, Vec<FaceId>) {
        let bad_verts = self
            .verts
            .keys()
            .filter(|&v| !self.is_valid_vertex(v))
            .collect();
        let bad_edges = self
            .edges
            .keys()
            .filter(|&e| !self.is_valid_edge(e))
            .collect();
        let bad_faces = self
            .faces
            .keys()
            .filter(|&f| !self.is_valid_face(f))
            .collect();
        (bad_verts, bad_edges, bad_faces)
    }

    pub fn is_valid(&self) -> bool {
        let (v, e, f) = self.find_invalid();
        v.is_empty() && e.is_empty() && f.is_empty()
    }

    /// A full audit of the half-edge invariants (I1-I9 in `SPEC_FULL.md`
    /// §3.2), returning the first violation found. Logs a warning with the
    /// offending element's diagnostic id before returning a non-`Ok` code.
    pub fn topology_test(&self) -> TopologyCode {
        for vi in self.verts.keys() {
            let v = &self.verts[vi];
            let e = match v.edge {
                Some(e) => e,
                None => continue,
            };
            if self.edges[e].vert != Some(vi) {
                let id = v.data.id();
                log::warn!("topology_test: vertex {id} edge() has the wrong tip");
                return TopologyCode::VertEdgeMismatch { id };
            }
        }

        for ei in self.edges.keys() {
            let e = &self.edges[ei];
            let id = e.data.id();

            let oppo = match e.oppo {
                Some(o) => o,
                None => {
                    log::warn!("topology_test: edge {id} has no oppo");
                    return TopologyCode::BadOppo { id };
                }
            };
            let next = match e.next {
                Some(n) => n,
                None => {
                    log::warn!("topology_test: edge {id} has no next");
                    return TopologyCode::BadNext { id };
                }
            };
            let prev = match e.prev {
                Some(p) => p,
                None => {
                    log::warn!("topology_test: edge {id} has no prev");
                    return TopologyCode::BadPrev { id };
                }
            };
            if self.edges[oppo].oppo != Some(ei) {
                log::warn!("topology_test: edge {id} oppo is not involutive");
                return TopologyCode::BadOppo { id };
            }
            if self.edges[next].prev != Some(ei) {
                log::warn!("topology_test: edge {id} next/prev mismatch");
                return TopologyCode::BadNext { id };
            }
            if self.edges[prev].next != Some(ei) {
                log::warn!("topology_test: edge {id} prev/next mismatch");
                return TopologyCode::BadPrev { id };
            }
            if e.vert.is_none() {
                log::warn!("topology_test: edge {id} has no vert");
                return TopologyCode::VertEdgeMismatch { id };
            }

            // Walk the face loop and check every visited edge shares `face`.
            let pre_face = e.face;
            let mut cursor = ei;
            let mut max = self.edges.len();
            loop {
                if self.edges[cursor].face != pre_face {
                    log::warn!("topology_test: edge {id} loop has inconsistent face");
                    return TopologyCode::FaceLoopBroken { id };
                }
                if max == 0 {
                    log::warn!("topology_test: edge {id} loop never closes");
                    return TopologyCode::BadNext { id };
                }
                max -= 1;
                cursor = self.edges[cursor].next.expect("checked above");
                if cursor == ei {
                    break;
                }
            }
        }

        // Parallel-directed-edge check: at most one live half-edge per
        // ordered (tail, tip) pair.
        for ei in self.edges.keys() {
            let e = &self.edges[ei];
            let oppo = e.oppo.expect("checked above");
            let v1 = self.edges[oppo].vert;
            let v2 = e.vert;
            for ej in self.edges.keys() {
                if ej == ei {
                    continue;
                }
                let o = &self.edges[ej];
                let o_oppo = o.oppo.expect("checked above");
                if self.edges[o_oppo].vert == v1 && o.vert == v2 {
                    let id = e.data.id();
                    log::warn!("topology_test: edge {id} is a duplicate directed edge");
                    return TopologyCode::DuplicateDirectedEdge { id };
                }
            }
        }

        for fi in self.faces.keys() {
            let f = &self.faces[fi];
            let id = f.data.id();
            let start = match f.edge {
                Some(e) => e,
                None => {
                    log::warn!("topology_test: face {id} has no edge");
                    return TopologyCode::FaceEdgeMissing { id };
                }
            };
            let mut cursor = start;
            let mut max = self.edges.len();
            loop {
                if self.edges[cursor].face != Some(fi) {
                    log::warn!("topology_test: face {id} loop edge points elsewhere");
                    return TopologyCode::FaceLoopBroken { id };
                }
                if max == 0 {
                    log::warn!("topology_test: face {id} loop never closes");
                    return TopologyCode::FaceEdgeMissing { id };
                }
                max -= 1;
                cursor = self.edges[cursor].next.expect("checked above");
                if cursor == start {
                    break;
                }
            }
        }

        TopologyCode::Ok
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn quad_mesh() -> Mesh<BasicTypes> {
        let mut mesh = Mesh::<BasicTypes>::new();
        let verts: Vec<VertexId> = (0..4).map(|id| mesh.new_vert(BasicVertex { id })).collect();
        mesh.add_face(&[verts[0], verts[1], verts[2]], BasicFace::default());
        mesh.add_face(&[verts[0], verts[2], verts[3]], BasicFace::default());
        mesh.set_opposite_and_boundary_edge().unwrap();
        mesh
    }

    #[test]
    fn test_freshly_built_mesh_is_valid() {
        let mesh = quad_mesh();
        assert!(mesh.is_valid());
        assert_eq!(mesh.topology_test(), TopologyCode::Ok);
    }

    #[test]
    fn test_topology_test_catches_broken_oppo() {
        let mesh = quad_mesh();
        let e = mesh.edge_ids().next().unwrap();
        let mut broken = mesh.deep_clone();
        let oppo = broken.edges[e].oppo.unwrap();
        broken[oppo].oppo = None;

        match broken.topology_test() {
            TopologyCode::BadOppo { .. } => {}
            other => panic!("expected BadOppo, got {other:?}"),
        }
    }

    #[test]
    fn test_topology_test_catches_broken_next_prev_pairing() {
        let mesh = quad_mesh();
        let e = mesh.edge_ids().next().unwrap();
        let mut broken = mesh.deep_clone();
        let next = broken.edges[e].next.unwrap();
        let other = broken
            .edge_ids()
            .find(|&id| id != e && id != next)
            .unwrap();
        broken[next].prev = Some(other);

        match broken.topology_test() {
            TopologyCode::BadNext { .. } | TopologyCode::BadPrev { .. } => {}
            other => panic!("expected a next/prev mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_find_invalid_reports_dangling_vertex_edge() {
        let mut mesh = quad_mesh();
        let v = mesh.vertex_ids().next().unwrap();
        let stray = mesh.new_edge(BasicEdge::default());
        mesh.free_edge(stray);
        mesh[v].edge = Some(stray);

        let (bad_verts, _, _) = mesh.find_invalid();
        assert_eq!(bad_verts, vec![v]);
        assert!(!mesh.is_valid());
    }
}
