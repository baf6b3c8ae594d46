// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology-mutating operations: deletion, edge flips, edge collapse, and
//! the split family. This is the part of the library where the branching
//! *is* the algorithm — the nested cases below are transcribed condition for
//! condition rather than simplified, because each one corresponds to a
//! distinct local configuration (triangle vs. larger polygon, boundary vs.
//! interior, manifold vs. non-manifold) that genuinely needs different
//! wiring.
//!
//! None of these operations roll back on failure (see the resource model in
//! `SPEC_FULL.md` §5): a preflight error leaves the mesh untouched, but a
//! cascading failure from a nested `del_*` call can leave it partially
//! edited.

use super::*;

/// The outcome of [`Mesh::try_edge_flip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeFlipError {
    /// The edge or its opposite has no incident face.
    Boundary,
    /// One of the two incident faces isn't a triangle.
    NotTriangle,
    /// Flipping would create an edge that already exists.
    WouldDuplicateEdge,
}

impl EdgeFlipError {
    pub fn code(&self) -> i32 {
        match self {
            EdgeFlipError::Boundary => 1,
            EdgeFlipError::NotTriangle => 2,
            EdgeFlipError::WouldDuplicateEdge => 3,
        }
    }
}

impl std::fmt::Display for EdgeFlipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{self:?}"))
    }
}
impl std::error::Error for EdgeFlipError {}

/// The outcome of [`Mesh::try_collapse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapseError {
    /// Another edge pair already connects a shared neighbour of the two
    /// endpoints outside the immediate triangle fans; collapsing would
    /// create a parallel edge.
    WouldDuplicateEdge,
    /// A boundary-side reflex closure: collapsing would fold a face over
    /// itself.
    WouldFoldBoundary,
    /// Both incident faces are triangles that already share their two
    /// non-collapsed edges.
    DoubledTrianglePair,
}

impl CollapseError {
    pub fn code(&self) -> i32 {
        match self {
            CollapseError::WouldDuplicateEdge => 1,
            CollapseError::WouldFoldBoundary => 2,
            CollapseError::DoubledTrianglePair => 3,
        }
    }
}

impl std::fmt::Display for CollapseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{self:?}"))
    }
}
impl std::error::Error for CollapseError {}

impl<T: MeshTypes> Mesh<T> {
    /// Clear `f`'s incident edges' `face` pointer (turning them into
    /// boundary edges) and free `f`. Does not re-stitch boundary loops;
    /// callers that need that call [`Mesh::set_opposite_and_boundary_edge`]-
    /// style repair themselves.
    pub fn del_face(&mut self, f: FaceId) {
        self.del_face_with_observer(f, &mut NoopObserver)
    }

    pub fn del_face_with_observer(&mut self, f: FaceId, obs: &mut impl SessionObserver<T>) {
        let fe = self.face_adj_edges(f);
        for e in fe {
            self[e].face = None;
        }
        self.free_face_with_observer(f, obs);
    }

    /// Delete `e` and its opposite, first deleting either incident face,
    /// then re-pointing the vertices and neighbouring edges that referenced
    /// it.
    pub fn del_edge(&mut self, e: HalfEdgeId) {
        self.del_edge_with_observer(e, &mut NoopObserver)
    }

    pub fn del_edge_with_observer(&mut self, e: HalfEdgeId, obs: &mut impl SessionObserver<T>) {
        let e_op = self.edges[e].oppo.expect("has oppo");

        if let Some(f) = self.edges[e].face {
            self.del_face_with_observer(f, obs);
        }
        if let Some(f) = self.edges[e_op].face {
            self.del_face_with_observer(f, obs);
        }

        let tip = self.edges[e].vert.expect("has vert");
        if self.verts[tip].edge == Some(e) {
            let e_op_prev = self.edges[e_op].prev.expect("has prev");
            self[tip].edge = Some(e_op_prev);
            if self.verts[tip].edge == Some(e) {
                self[tip].edge = None;
            }
        }
        let tail = self.edges[e_op].vert.expect("has vert");
        if self.verts[tail].edge == Some(e_op) {
            let e_prev = self.edges[e].prev.expect("has prev");
            self[tail].edge = Some(e_prev);
            if self.verts[tail].edge == Some(e_op) {
                self[tail].edge = None;
            }
        }

        let e_next = self.edges[e].next.expect("has next");
        let e_prev = self.edges[e].prev.expect("has prev");
        let op_next = self.edges[e_op].next.expect("has next");
        let op_prev = self.edges[e_op].prev.expect("has prev");

        self[e_next].prev = Some(op_prev);
        self[op_prev].next = Some(e_next);
        self[e_prev].next = Some(op_next);
        self[op_next].prev = Some(e_prev);

        self.free_edge_with_observer(e_op, obs);
        self.free_edge_with_observer(e, obs);
    }

    /// Delete `v` by cascading through its incident faces and outgoing
    /// edges, then freeing the now-isolated vertex.
    pub fn del_vert(&mut self, v: VertexId) {
        self.del_vert_with_observer(v, &mut NoopObserver)
    }

    pub fn del_vert_with_observer(&mut self, v: VertexId, obs: &mut impl SessionObserver<T>) {
        for f in self.vert_adj_faces(v) {
            if self.contains_face(f) {
                self.del_face_with_observer(f, obs);
            }
        }
        for e in self.vert_adj_out_edges(v) {
            if self.contains_halfedge(e) {
                self.del_edge_with_observer(e, obs);
            }
        }
        self.free_vert_with_observer(v, obs);
    }

    /// Preflight check for [`Mesh::edge_flip_by_rotate`] /
    /// [`Mesh::edge_flip_by_del_add`]. Does not modify the mesh.
    pub fn try_edge_flip(&self, e: HalfEdgeId) -> Result<(), EdgeFlipError> {
        let e_op = self.edges[e].oppo.expect("has oppo");

        let f1 = self.edges[e].face.ok_or(EdgeFlipError::Boundary)?;
        let f2 = self.edges[e_op].face.ok_or(EdgeFlipError::Boundary)?;

        if self.face_valence(f1) != 3 || self.face_valence(f2) != 3 {
            return Err(EdgeFlipError::NotTriangle);
        }

        let e_next = self.edges[e].next.expect("has next");
        let sv = self.edges[e_next].vert.expect("has vert");
        let op_next = self.edges[e_op].next.expect("has next");
        let ev = self.edges[op_next].vert.expect("has vert");
        if self.get_edge(sv, ev).is_some() {
            return Err(EdgeFlipError::WouldDuplicateEdge);
        }

        Ok(())
    }

    /// Flip `e`, the shared edge of two triangles, by rotating the diamond
    /// they form 90 degrees. Precondition: `try_edge_flip(e) == Ok`.
    pub fn edge_flip_by_rotate(&mut self, e: HalfEdgeId) {
        let f1 = self.edges[e].face.expect("checked by try_edge_flip");
        let e_op = self.edges[e].oppo.expect("has oppo");
        let f2 = self.edges[e_op].face.expect("checked by try_edge_flip");

        let e_n = self.edges[e].next.expect("has next");
        let e_p = self.edges[e].prev.expect("has prev");
        let e_op_n = self.edges[e_op].next.expect("has next");
        let e_op_p = self.edges[e_op].prev.expect("has prev");

        let v_s = self.edges[e_op].vert.expect("has vert");
        let v_e = self.edges[e].vert.expect("has vert");
        let v_target_s = self.edges[e_op_n].vert.expect("has vert");
        let v_target_e = self.edges[e_n].vert.expect("has vert");

        self[e].next = Some(e_p);
        self[e_p].prev = Some(e);
        self[e].prev = Some(e_op_n);
        self[e_op_n].next = Some(e);
        self[e_p].next = Some(e_op_n);
        self[e_op_n].prev = Some(e_p);

        self[e_op].next = Some(e_op_p);
        self[e_op_p].prev = Some(e_op);
        self[e_op].prev = Some(e_n);
        self[e_n].next = Some(e_op);
        self[e_n].prev = Some(e_op_p);
        self[e_op_p].next = Some(e_n);

        self[e_op_n].face = Some(f1);
        self[e_n].face = Some(f2);

        if self.faces[f1].edge == Some(e_n) {
            self[f1].edge = Some(e);
        }
        if self.faces[f2].edge == Some(e_op_n) {
            self[f2].edge = Some(e_op);
        }

        if self.verts[v_s].edge == Some(e_op) {
            self[v_s].edge = Some(e_p);
        }
        if self.verts[v_e].edge == Some(e) {
            self[v_e].edge = Some(e_op_p);
        }
        self[e].vert = Some(v_target_e);
        self[e_op].vert = Some(v_target_s);
    }

    /// Alternative flip implementation: delete `e` and re-add the two
    /// rotated triangles via `add_face_keep_topo`. Precondition:
    /// `try_edge_flip(e) == Ok`.
    pub fn edge_flip_by_del_add(&mut self, e: HalfEdgeId)
    where
        T::Edge: Default,
    {
        self.edge_flip_by_del_add_with_observer(e, &mut NoopObserver)
    }

    pub fn edge_flip_by_del_add_with_observer(
        &mut self,
        e: HalfEdgeId,
        obs: &mut impl SessionObserver<T>,
    ) where
        T::Edge: Default,
    {
        let e_op = self.edges[e].oppo.expect("has oppo");
        let e_next = self.edges[e].next.expect("has next");
        let op_next = self.edges[e_op].next.expect("has next");

        let v0 = self.edges[e].vert.expect("has vert");
        let v1 = self.edges[e_next].vert.expect("has vert");
        let v2 = self.edges[op_next].vert.expect("has vert");
        let v3 = self.edges[e_op].vert.expect("has vert");

        self.del_edge_with_observer(e, obs);
        self.add_face_keep_topo_with_observer(&[v0, v1, v2], T::Face::default(), obs);
        self.add_face_keep_topo_with_observer(&[v3, v2, v1], T::Face::default(), obs);
    }

    /// Preflight check for [`Mesh::collapse_edge`]. Does not modify the
    /// mesh.
    pub fn try_collapse(&self, ei: HalfEdgeId) -> Result<(), CollapseError> {
        let s_vert = self.edges[self.edges[ei].oppo.expect("has oppo")]
            .vert
            .expect("has vert");
        let e_vert = self.edges[ei].vert.expect("has vert");

        // Case 1: a shared neighbour outside the immediate triangle fans
        // would become a duplicate edge.
        let s_start = self.verts[s_vert].edge.expect("has edge");
        let e_start = self.verts[e_vert].edge.expect("has edge");
        let e_prev = self.edges[ei].prev.expect("has prev");
        let ei_op = self.edges[ei].oppo.expect("has oppo");
        let ei_op_next = self.edges[self.edges[ei_op].next.expect("has next")]
            .oppo
            .expect("has oppo");
        let ei_next_op = self.edges[self.edges[ei].next.expect("has next")]
            .oppo
            .expect("has oppo");
        let ei_op_prev = self.edges[ei_op].prev.expect("has prev");

        let mut sitr = s_start;
        loop {
            let mut eitr = e_start;
            loop {
                let sitr_opvert = self.edges[self.edges[sitr].oppo.expect("has oppo")]
                    .vert
                    .expect("has vert");
                let eitr_opvert = self.edges[self.edges[eitr].oppo.expect("has oppo")]
                    .vert
                    .expect("has vert");
                if sitr_opvert == eitr_opvert
                    && sitr != e_prev
                    && sitr != ei_op_next
                    && eitr != ei_next_op
                    && eitr != ei_op_prev
                {
                    return Err(CollapseError::WouldDuplicateEdge);
                }
                eitr = self.rotate_in_pub(eitr);
                if eitr == e_start {
                    break;
                }
            }
            sitr = self.rotate_in_pub(sitr);
            if sitr == s_start {
                break;
            }
        }

        // Case 2: collapsing a boundary edge would fold a face over itself.
        for e_tmp in [ei, ei_op] {
            if self.edges[e_tmp].face.is_none() {
                let next = self.edges[e_tmp].next.expect("has next");
                let prev = self.edges[e_tmp].prev.expect("has prev");
                let next_vert = self.edges[next].vert.expect("has vert");
                let prev_oppo_vert = self.edges[self.edges[prev].oppo.expect("has oppo")]
                    .vert
                    .expect("has vert");
                let next_next = self.edges[next].next.expect("has next");
                if next_vert == prev_oppo_vert && next_next != prev {
                    return Err(CollapseError::WouldFoldBoundary);
                }
            }
        }

        // Case 3: both incident faces are triangles doubled over each other.
        if let (Some(_), Some(_)) = (self.edges[ei].face, self.edges[ei_op].face) {
            let ei_next_oppo = self.edges[self.edges[ei].next.expect("has next")]
                .oppo
                .expect("has oppo");
            let ei_prev_oppo = self.edges[self.edges[ei].prev.expect("has prev")]
                .oppo
                .expect("has oppo");
            let op_next_next = self.edges[self.edges[ei_op].next.expect("has next")]
                .next
                .expect("has next");
            let op_prev_prev = self.edges[self.edges[ei_op].prev.expect("has prev")]
                .prev
                .expect("has prev");
            if ei_next_oppo == op_next_next && ei_prev_oppo == op_prev_prev {
                return Err(CollapseError::DoubledTrianglePair);
            }
        }

        Ok(())
    }

    fn rotate_in_pub(&self, e: HalfEdgeId) -> HalfEdgeId {
        let next = self.edges[e].next.expect("has next");
        self.edges[next].oppo.expect("has oppo")
    }

    /// Contract `e`, merging its tail vertex into its tip. Returns the tip
    /// vertex (the surviving one). Precondition: `try_collapse(e) == Ok`.
    pub fn collapse_edge(&mut self, e: HalfEdgeId) -> VertexId {
        self.collapse_edge_with_observer(e, &mut NoopObserver)
    }

    pub fn collapse_edge_with_observer(
        &mut self,
        e: HalfEdgeId,
        obs: &mut impl SessionObserver<T>,
    ) -> VertexId {
        let e_op = self.edges[e].oppo.expect("has oppo");
        let t = self.edges[e].vert.expect("has vert");
        let s = self.edges[e_op].vert.expect("has vert");

        let e_next = self.edges[e].next.expect("has next");
        let e_prev = self.edges[e].prev.expect("has prev");

        if e_next == e_prev {
            self[t].edge = None;
            self.free_edge_with_observer(e, obs);
            self.free_edge_with_observer(e_op, obs);
            self.free_vert_with_observer(s, obs);
            return t;
        }

        // Re-point t's edge before the topology it references possibly
        // disappears.
        if let Some(op_face) = self.edges[e_op].face {
            let op_prev = self.edges[e_op].prev.expect("has prev");
            if self.face_valence(op_face) == 3 && self.verts[t].edge == Some(op_prev) {
                let op_next = self.edges[e_op].next.expect("has next");
                let op_next_oppo = self.edges[op_next].oppo.expect("has oppo");
                self[t].edge = Some(op_next_oppo);
            }
        }
        if self.verts[t].edge == Some(e) {
            if let Some(_f) = self.edges[e].face {
                let e_next = self.edges[e].next.expect("has next");
                let e_next_oppo = self.edges[e_next].oppo.expect("has oppo");
                self[t].edge = Some(e_next_oppo);
            } else if self.edges[e_op].face.is_some() {
                let op_next = self.edges[e_op].next.expect("has next");
                let op_next_oppo = self.edges[op_next].oppo.expect("has oppo");
                self[t].edge = Some(op_next_oppo);
            } else if self.edges[e].next.expect("has next") != e_op {
                let e_next = self.edges[e].next.expect("has next");
                let e_next_oppo = self.edges[e_next].oppo.expect("has oppo");
                self[t].edge = Some(e_next_oppo);
            } else if self.edges[e].prev.expect("has prev") != e_op {
                let e_prev = self.edges[e].prev.expect("has prev");
                self[t].edge = Some(e_prev);
            } else {
                self[t].edge = None;
            }
        }

        // Re-point every outgoing edge of s (other than e) to t, splicing
        // out any that would become a self-loop.
        let edges_adj_s = self.vert_adj_out_edges(s);
        for o in edges_adj_s {
            if !self.contains_halfedge(o) || o == e {
                continue;
            }
            let o_vert = self.edges[o].vert.expect("has vert");
            if o_vert == t {
                let o_oppo = self.edges[o].oppo.expect("has oppo");
                if self.verts[o_vert].edge == Some(o_oppo) {
                    let o_next = self.edges[o].next.expect("has next");
                    self[o_vert].edge = Some(o_next);
                }
                let o_oppo_vert = self.edges[o_oppo].vert.expect("has vert");
                if self.verts[o_oppo_vert].edge == Some(o) {
                    let o_oppo_next = self.edges[o_oppo].next.expect("has next");
                    self[o_oppo_vert].edge = Some(o_oppo_next);
                }
                let o_next = self.edges[o].next.expect("has next");
                let o_prev = self.edges[o].prev.expect("has prev");
                let oo_next = self.edges[o_oppo].next.expect("has next");
                let oo_prev = self.edges[o_oppo].prev.expect("has prev");
                self[o_next].prev = Some(o_prev);
                self[o_prev].next = Some(o_next);
                self[oo_next].prev = Some(oo_prev);
                self[oo_prev].next = Some(oo_next);
                self.free_edge_with_observer(o_oppo, obs);
                self.free_edge_with_observer(o, obs);
                continue;
            }
            let o_oppo = self.edges[o].oppo.expect("has oppo");
            self[o_oppo].vert = Some(t);
        }

        // Close the face on e's side.
        if let Some(f) = self.edges[e].face {
            if self.face_valence(f) == 3 {
                let e_prev = self.edges[e].prev.expect("has prev");
                let e_next = self.edges[e].next.expect("has next");
                let e_prev_oppo = self.edges[e_prev].oppo.expect("has oppo");
                let e_next_oppo = self.edges[e_next].oppo.expect("has oppo");
                self[e_prev_oppo].oppo = Some(e_next_oppo);
                self[e_next_oppo].oppo = Some(e_prev_oppo);

                let e_next_vert = self.edges[e_next].vert.expect("has vert");
                if self.verts[e_next_vert].edge == Some(e_next) {
                    self[e_next_vert].edge = Some(e_prev_oppo);
                }

                self.free_edge_with_observer(e_next, obs);
                self.free_edge_with_observer(e_prev, obs);
                self.free_face_with_observer(f, obs);
            } else {
                let e_next = self.edges[e].next.expect("has next");
                let e_prev = self.edges[e].prev.expect("has prev");
                if self.faces[f].edge == Some(e) {
                    self[f].edge = Some(e_next);
                }
                self[e_prev].next = Some(e_next);
                self[e_next].prev = Some(e_prev);
            }
        } else {
            let e_next = self.edges[e].next.expect("has next");
            let e_prev = self.edges[e].prev.expect("has prev");
            if e_next == e_op {
                let op_next = self.edges[e_op].next.expect("has next");
                self[e_prev].next = Some(op_next);
            } else {
                self[e_prev].next = Some(e_next);
            }
            if e_prev == e_op {
                let op_prev = self.edges[e_op].prev.expect("has prev");
                self[e_next].prev = Some(op_prev);
            } else {
                self[e_next].prev = Some(e_prev);
            }
        }

        debug_assert_eq!(self.edges[e].oppo, Some(e_op));

        // Close the face on e_op's side (symmetric).
        if let Some(f) = self.edges[e_op].face {
            if self.face_valence(f) == 3 {
                let op_next = self.edges[e_op].next.expect("has next");
                let op_prev = self.edges[e_op].prev.expect("has prev");
                let op_next_oppo = self.edges[op_next].oppo.expect("has oppo");
                let op_prev_oppo = self.edges[op_prev].oppo.expect("has oppo");
                self[op_next_oppo].oppo = Some(op_prev_oppo);
                self[op_prev_oppo].oppo = Some(op_next_oppo);

                let op_next_vert = self.edges[op_next].vert.expect("has vert");
                if self.verts[op_next_vert].edge == Some(op_next) {
                    self[op_next_vert].edge = Some(op_prev_oppo);
                }

                self.free_edge_with_observer(op_next, obs);
                self.free_edge_with_observer(op_prev, obs);
                self.free_face_with_observer(f, obs);
            } else {
                let op_next = self.edges[e_op].next.expect("has next");
                let op_prev = self.edges[e_op].prev.expect("has prev");
                if self.faces[f].edge == Some(e_op) {
                    self[f].edge = Some(op_next);
                }
                self[op_prev].next = Some(op_next);
                self[op_next].prev = Some(op_prev);
            }
        } else {
            let op_next = self.edges[e_op].next.expect("has next");
            let op_prev = self.edges[e_op].prev.expect("has prev");
            if op_next == e {
                let e_next = self.edges[e].next.expect("has next");
                self[op_prev].next = Some(e_next);
            } else {
                self[op_prev].next = Some(op_next);
            }
            if op_prev == e {
                let e_prev = self.edges[e].prev.expect("has prev");
                self[op_next].prev = Some(e_prev);
            } else {
                self[op_next].prev = Some(op_prev);
            }
        }

        self.free_edge_with_observer(e, obs);
        self.free_edge_with_observer(e_op, obs);
        self.free_vert_with_observer(s, obs);

        self.adjust_vert_edge(t);
        t
    }

    /// Greedily collapse degenerate double-edges (pairs of outgoing edges
    /// at `v` sharing the same tip). Named for what it does, not for what
    /// the analogous routine in other half-edge libraries is sometimes
    /// (mis-)called: it mutates the mesh rather than testing anything.
    pub fn normalise_double_edges_at(&mut self, v: VertexId) {
        self.normalise_double_edges_at_with_observer(v, &mut NoopObserver)
    }

    pub fn normalise_double_edges_at_with_observer(
        &mut self,
        v: VertexId,
        obs: &mut impl SessionObserver<T>,
    ) {
        let ve = self.vert_adj_out_edges(v);
        if ve.is_empty() {
            return;
        }

        let mut last_e = *ve.last().expect("non-empty");
        let mut idx = 0;
        while idx < ve.len() {
            let itr = ve[idx];
            if !self.contains_halfedge(itr) {
                idx += 1;
                continue;
            }
            let itr_oppo = self.edges[itr].oppo.expect("has oppo");
            if self.edges[itr].face.is_none() && self.edges[itr_oppo].face.is_none() {
                self.collapse_edge_with_observer(itr, obs);
                last_e = itr;
                idx += 1;
                continue;
            }

            if self.contains_halfedge(last_e)
                && self.edges[itr].vert == self.edges[last_e].vert
            {
                let last_oppo = self.edges[last_e].oppo.expect("has oppo");
                let itr_vert = self.edges[itr].vert.expect("has vert");

                if self.edges[itr].face.is_some() || self.edges[last_oppo].face.is_some() {
                    if self.verts[v].edge == Some(last_e) {
                        self[v].edge = Some(itr);
                    }
                    if self.verts[itr_vert].edge == Some(itr_oppo) {
                        self[itr_vert].edge = Some(last_oppo);
                    }
                    self[last_oppo].oppo = Some(itr);
                    self[itr].oppo = Some(last_oppo);
                    self.free_edge_with_observer(last_e, obs);
                    self.free_edge_with_observer(itr_oppo, obs);
                } else {
                    if self.verts[v].edge == Some(itr) {
                        self[v].edge = Some(last_e);
                    }
                    if self.verts[itr_vert].edge == Some(last_oppo) {
                        self[itr_vert].edge = Some(itr_oppo);
                    }
                    self[last_e].oppo = Some(itr_oppo);
                    self[itr_oppo].oppo = Some(last_e);
                    self.free_edge_with_observer(last_oppo, obs);
                    self.free_edge_with_observer(itr, obs);
                }
            }

            last_e = itr;
            idx += 1;
        }
    }

    /// Insert a vertex at the midpoint of `e`, splitting each incident
    /// triangle into two. Returns `None` if an incident face isn't a
    /// triangle.
    pub fn split_edge(&mut self, e: HalfEdgeId, vert_data: T::Vertex, edge_data: T::Edge) -> Option<VertexId>
    where
        T::Edge: Clone,
    {
        self.split_edge_with_observer(e, vert_data, edge_data, &mut NoopObserver)
    }

    pub fn split_edge_with_observer(
        &mut self,
        e: HalfEdgeId,
        vert_data: T::Vertex,
        edge_data: T::Edge,
        obs: &mut impl SessionObserver<T>,
    ) -> Option<VertexId>
    where
        T::Edge: Clone,
    {
        let e_op = self.edges[e].oppo.expect("has oppo");
        if let Some(f) = self.edges[e].face {
            if self.face_valence(f) != 3 {
                return None;
            }
        }
        if let Some(f) = self.edges[e_op].face {
            if self.face_valence(f) != 3 {
                return None;
            }
        }

        let new_vert = self.new_vert_with_observer(vert_data, obs);
        self[new_vert].edge = Some(e_op);

        let mid_e1 = self.new_edge_with_observer(edge_data.clone(), obs);
        let mid_e2 = self.new_edge_with_observer(edge_data, obs);

        let e_prev = self.edges[e].prev.expect("has prev");
        let op_next = self.edges[e_op].next.expect("has next");
        let op_vert = self.edges[e_op].vert.expect("has vert");

        self[mid_e1].vert = Some(new_vert);
        self[mid_e1].oppo = Some(mid_e2);
        self[mid_e1].next = Some(e);
        self[mid_e1].prev = Some(e_prev);
        self[mid_e1].face = None;
        self[e_prev].next = Some(mid_e1);

        self[mid_e2].vert = Some(op_vert);
        self[mid_e2].oppo = Some(mid_e1);
        self[mid_e2].next = Some(op_next);
        self[mid_e2].prev = Some(e_op);
        self[mid_e2].face = None;
        self[op_next].prev = Some(mid_e2);

        if self.verts[op_vert].edge == Some(e_op) {
            self[op_vert].edge = Some(mid_e2);
        }

        self[e].prev = Some(mid_e1);
        self[e_op].next = Some(mid_e2);
        self[e_op].vert = Some(new_vert);

        if let Some(face) = self.edges[e].face {
            self[face].edge = Some(e);

            let left_f = self.new_face_with_observer(T::Face::default(), obs);
            self[left_f].edge = Some(mid_e1);

            let mid_e1_prev = self.edges[mid_e1].prev.expect("has prev");
            self[mid_e1].face = Some(left_f);
            self[mid_e1_prev].face = Some(left_f);

            let left_e1 = self.new_edge_with_observer(T::Edge::default(), obs);
            let left_e2 = self.new_edge_with_observer(T::Edge::default(), obs);

            let e_next = self.edges[e].next.expect("has next");

            self[left_e1].vert = Some(new_vert);
            self[left_e1].next = Some(e);
            self[left_e1].prev = Some(e_next);
            self[left_e1].oppo = Some(left_e2);
            self[left_e1].face = Some(face);

            let e_next_vert = self.edges[e_next].vert.expect("has vert");
            let mid_e1_prev = self.edges[mid_e1].prev.expect("has prev");

            self[left_e2].vert = Some(e_next_vert);
            self[left_e2].next = Some(mid_e1_prev);
            self[left_e2].prev = Some(mid_e1);
            self[left_e2].oppo = Some(left_e1);
            self[left_e2].face = Some(left_f);

            self[e].prev = Some(left_e1);
            self[e_next].next = Some(left_e1);
            self[mid_e1].next = Some(left_e2);
            let mid_e1_prev = self.edges[mid_e1].prev.expect("has prev");
            self[mid_e1_prev].prev = Some(left_e2);
        }

        if let Some(face) = self.edges[e_op].face {
            self[face].edge = Some(e_op);

            let right_f = self.new_face_with_observer(T::Face::default(), obs);
            self[right_f].edge = Some(mid_e2);

            let mid_e2_next = self.edges[mid_e2].next.expect("has next");
            self[mid_e2].face = Some(right_f);
            self[mid_e2_next].face = Some(right_f);

            let right_e1 = self.new_edge_with_observer(T::Edge::default(), obs);
            let right_e2 = self.new_edge_with_observer(T::Edge::default(), obs);

            let op_prev = self.edges[e_op].prev.expect("has prev");
            let mid_e2_next_vert = self.edges[mid_e2_next].vert.expect("has vert");

            self[right_e1].vert = Some(mid_e2_next_vert);
            self[right_e1].next = Some(op_prev);
            self[right_e1].prev = Some(e_op);
            self[right_e1].oppo = Some(right_e2);
            self[right_e1].face = Some(face);

            self[right_e2].vert = Some(new_vert);
            self[right_e2].next = Some(mid_e2);
            self[right_e2].prev = Some(mid_e2_next);
            self[right_e2].oppo = Some(right_e1);
            self[right_e2].face = Some(right_f);

            self[op_prev].prev = Some(right_e1);
            self[mid_e2_next].next = Some(right_e2);
            self[e_op].next = Some(right_e1);
            self[mid_e2].prev = Some(right_e2);
        }

        if self.edges[e].face.is_none() {
            self[new_vert].edge = Some(mid_e1);
        }

        Some(new_vert)
    }

    /// Fan-triangulate `f` from an already-existing vertex `v`. Returns
    /// `None`, leaving the mesh untouched, if `v` does not exist.
    pub fn split_face(&mut self, f: FaceId, v: VertexId, edge_data: T::Edge, face_data_fn: impl Fn() -> T::Face) -> Option<VertexId>
    where
        T::Edge: Clone,
    {
        self.split_face_with_observer(f, v, edge_data, face_data_fn, &mut NoopObserver)
    }

    pub fn split_face_with_observer(
        &mut self,
        f: FaceId,
        v: VertexId,
        edge_data: T::Edge,
        face_data_fn: impl Fn() -> T::Face,
        obs: &mut impl SessionObserver<T>,
    ) -> Option<VertexId>
    where
        T::Edge: Clone,
    {
        if !self.contains_vertex(v) {
            return None;
        }

        let ei_end = self.faces[f].edge.expect("has edge");
        let mut ei = ei_end;

        let mut first_ei = None;
        let mut last_ei = None;

        loop {
            let new_out_ei = self.new_edge_with_observer(edge_data.clone(), obs);
            let new_in_ei = self.new_edge_with_observer(edge_data.clone(), obs);
            let new_fi = self.new_face_with_observer(face_data_fn(), obs);

            match first_ei {
                None => first_ei = Some(new_out_ei),
                Some(_) => {
                    let last = last_ei.expect("set after first iteration");
                    self[new_out_ei].oppo = Some(last);
                    self[last].oppo = Some(new_out_ei);
                }
            }

            let ei_oppo = self.edges[ei].oppo.expect("has oppo");
            let ei_oppo_vert = self.edges[ei_oppo].vert.expect("has vert");

            self[new_out_ei].vert = Some(ei_oppo_vert);
            self[new_out_ei].next = Some(ei);
            self[new_out_ei].prev = Some(new_in_ei);
            self[new_out_ei].face = Some(new_fi);

            self[new_in_ei].vert = Some(v);
            self[new_in_ei].next = Some(new_out_ei);
            self[new_in_ei].prev = Some(ei);
            self[new_in_ei].face = Some(new_fi);

            let ei_next = self.edges[ei].next.expect("has next");
            self[ei].next = Some(new_in_ei);
            self[ei].prev = Some(new_out_ei);
            self[ei].face = Some(new_fi);

            self[new_fi].edge = Some(ei);
            last_ei = Some(new_in_ei);

            ei = ei_next;
            if ei == ei_end {
                break;
            }
        }

        let first_ei = first_ei.expect("face has at least one edge");
        let last_ei = last_ei.expect("face has at least one edge");
        self[first_ei].oppo = Some(last_ei);
        self[last_ei].oppo = Some(first_ei);
        self[v].edge = Some(last_ei);
        self.del_face_with_observer(f, obs);

        Some(v)
    }

    /// Subdivide `f` by allocating a new centre vertex and fanning triangles
    /// out to it via [`Mesh::add_face_keep_topo`].
    pub fn split_face2(&mut self, f: FaceId, vert_data: T::Vertex, face_data_fn: impl Fn() -> T::Face) -> VertexId
    where
        T::Edge: Default,
    {
        self.split_face2_with_observer(f, vert_data, face_data_fn, &mut NoopObserver)
    }

    pub fn split_face2_with_observer(
        &mut self,
        f: FaceId,
        vert_data: T::Vertex,
        face_data_fn: impl Fn() -> T::Face,
        obs: &mut impl SessionObserver<T>,
    ) -> VertexId
    where
        T::Edge: Default,
    {
        let fv_list = self.face_adj_verts(f);
        self.del_face_with_observer(f, obs);
        assert!(fv_list.len() > 2);

        let center_v = self.new_vert_with_observer(vert_data, obs);

        let mut i = 0;
        loop {
            let a = fv_list[i];
            let b = fv_list[(i + 1) % fv_list.len()];
            self.add_face_keep_topo_with_observer(&[center_v, a, b], face_data_fn(), obs);
            i += 1;
            if i == fv_list.len() {
                break;
            }
        }

        center_v
    }

    /// Bulk-split every edge in `edges`, propagating `split_info` lineage,
    /// then subdivide any face that was split in the process by connecting
    /// the new mid-vertex to the opposite vertex. Returns `false` (leaving
    /// the mesh in its partially-split state) if any constituent split
    /// fails.
    pub fn split_edges(&mut self, edges: &[HalfEdgeId]) -> bool
    where
        T::Edge: Clone,
    {
        self.split_edges_with_observer(edges, &mut NoopObserver)
    }

    pub fn split_edges_with_observer(
        &mut self,
        edges: &[HalfEdgeId],
        obs: &mut impl SessionObserver<T>,
    ) -> bool
    where
        T::Edge: Clone,
    {
        let mut edges_to_split = SVec::<HalfEdgeId>::new();

        for &ei in edges {
            if !self.contains_halfedge(ei) {
                return false;
            }
            let oi = self.edges[ei].oppo.expect("has oppo");

            let vi = self.new_vert_with_observer(T::Vertex::default(), obs);

            let new_e_1 = self.new_edge_with_observer(T::Edge::default(), obs);
            let new_e_2 = self.new_edge_with_observer(T::Edge::default(), obs);
            let new_o_1 = self.new_edge_with_observer(T::Edge::default(), obs);
            let new_o_2 = self.new_edge_with_observer(T::Edge::default(), obs);

            if self.edges[ei].face.is_some() {
                edges_to_split.push(new_e_1);
            }
            if self.edges[oi].face.is_some() {
                edges_to_split.push(new_e_2);
            }

            if let Some(f) = self.edges[ei].face {
                self.del_face_with_observer(f, obs);
            }
            if let Some(f) = self.edges[oi].face {
                self.del_face_with_observer(f, obs);
            }

            let ei_prev = self.edges[ei].prev.expect("has prev");
            let ei_next = self.edges[ei].next.expect("has next");
            let ei_vert = self.edges[ei].vert.expect("has vert");

            self[new_e_1].prev = Some(ei_prev);
            self[new_e_1].next = Some(new_e_2);
            self[new_e_1].vert = Some(vi);

            self[new_e_2].prev = Some(new_e_1);
            self[new_e_2].next = Some(ei_next);
            self[new_e_2].vert = Some(ei_vert);

            self[ei_next].prev = Some(new_e_2);
            self[ei_prev].next = Some(new_e_1);

            let mut ei_split = self.edges[ei].data.split_info();
            if ei_split.root == -1 {
                ei_split = SplitInfo {
                    root: self.edges[ei].data.id() as i64,
                    level: 0,
                };
                self[ei].data.set_split_info(ei_split);
            }
            self[new_e_1].data.set_split_info(SplitInfo {
                root: ei_split.root,
                level: ei_split.level + 1,
            });
            self[new_e_2].data.set_split_info(SplitInfo {
                root: ei_split.root,
                level: ei_split.level + 1,
            });

            let oi_prev = self.edges[oi].prev.expect("has prev");
            let oi_next = self.edges[oi].next.expect("has next");
            let oi_vert = self.edges[oi].vert.expect("has vert");

            self[new_o_1].prev = Some(oi_prev);
            self[new_o_1].next = Some(new_o_2);
            self[new_o_1].vert = Some(vi);

            self[new_o_2].prev = Some(new_o_1);
            self[new_o_2].next = Some(oi_next);
            self[new_o_2].vert = Some(oi_vert);

            self[oi_next].prev = Some(new_o_2);
            self[oi_prev].next = Some(new_o_1);

            let mut oi_split = self.edges[oi].data.split_info();
            if oi_split.root == -1 {
                oi_split = SplitInfo {
                    root: self.edges[oi].data.id() as i64,
                    level: 0,
                };
                self[oi].data.set_split_info(oi_split);
            }
            self[new_o_1].data.set_split_info(SplitInfo {
                root: oi_split.root,
                level: oi_split.level + 1,
            });
            self[new_o_2].data.set_split_info(SplitInfo {
                root: oi_split.root,
                level: oi_split.level + 1,
            });

            self[new_e_1].oppo = Some(new_o_2);
            self[new_o_2].oppo = Some(new_e_1);
            self[new_e_2].oppo = Some(new_o_1);
            self[new_o_1].oppo = Some(new_e_2);

            if self.verts[ei_vert].edge == Some(ei) {
                self[ei_vert].edge = Some(new_e_2);
            }
            if self.verts[oi_vert].edge == Some(oi) {
                self[oi_vert].edge = Some(new_o_2);
            }

            self.free_edge_with_observer(ei, obs);
            self.free_edge_with_observer(oi, obs);
        }

        for e in edges_to_split {
            if !self.contains_halfedge(e) || !self.split_face_by_edge(e, obs) {
                return false;
            }
        }

        true
    }

    /// Subdivide the face on `e`'s non-boundary side (`e` was just produced
    /// by [`Mesh::split_edges`] and runs from the new mid-vertex) by
    /// connecting the mid-vertex to the vertex opposite it in the face loop.
    fn split_face_by_edge(&mut self, e: HalfEdgeId, obs: &mut impl SessionObserver<T>) -> bool
    where
        T::Edge: Clone,
    {
        let f = match self.edges[e].face {
            Some(f) => f,
            None => return true,
        };
        if self.face_valence(f) <= 3 {
            return true;
        }

        let mid_vert = self.edges[e].vert.expect("has vert");
        let edge_data = self.edges[e].data.clone();
        self.split_face_with_observer(f, mid_vert, edge_data, T::Face::default, obs)
            .is_some()
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
    fn test_del_face_clears_incidence_without_removing_edges() {
        let (mut mesh, [a, ..]) = quad_mesh();
        let f = mesh.vert_adj_faces(a)[0];
        let edge_count = mesh.edge_count();
        mesh.del_face(f);

        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.edge_count(), edge_count);
    }

    #[test]
    fn test_del_vert_removes_incident_faces_and_edges() {
        let (mut mesh, [a, ..]) = quad_mesh();
        mesh.del_vert(a);

        assert!(!mesh.contains_vertex(a));
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn test_edge_flip_by_rotate_swaps_diagonal() {
        let (mut mesh, [a, _b, c, _d]) = quad_mesh();
        let diagonal = mesh.get_edge(a, c).expect("diagonal exists");

        mesh.try_edge_flip(diagonal).expect("two triangles should be flippable");
        mesh.edge_flip_by_rotate(diagonal);

        assert_eq!(mesh.topology_test(), TopologyCode::Ok);
        // The diagonal no longer runs between a and c.
        assert!(mesh.get_edge(a, c).is_none());
    }

    #[test]
    fn test_try_edge_flip_rejects_boundary_edge() {
        let (mesh, [a, b, ..]) = quad_mesh();
        let ab = mesh.get_edge(a, b).expect("a->b exists");
        assert_eq!(mesh.try_edge_flip(ab), Err(EdgeFlipError::Boundary));
    }

    #[test]
    fn test_collapse_edge_merges_endpoints() {
        let (mut mesh, [a, _b, c, _d]) = quad_mesh();
        let diagonal = mesh.get_edge(a, c).expect("diagonal exists");
        mesh.try_collapse(diagonal).expect("should be collapsible");

        let survivor = mesh.collapse_edge(diagonal);
        assert_eq!(survivor, c);
        assert!(!mesh.contains_vertex(a));
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.topology_test(), TopologyCode::Ok);
    }

    #[test]
    fn test_split_edge_on_shared_diagonal_adds_vertex_and_faces() {
        let (mut mesh, [a, _b, c, _d]) = quad_mesh();
        let diagonal = mesh.get_edge(a, c).expect("diagonal exists");

        let before_faces = mesh.face_count();
        let new_vert = mesh
            .split_edge(diagonal, BasicVertex { id: 99 }, BasicEdge::default())
            .expect("both incident faces are triangles");

        assert!(mesh.contains_vertex(new_vert));
        assert_eq!(mesh.face_count(), before_faces + 2);
        assert_eq!(mesh.topology_test(), TopologyCode::Ok);
    }

    #[test]
    fn test_split_edges_bulk_splits_an_interior_tetrahedron_edge() {
        let mut mesh = Mesh::<BasicTypes>::new();
        let verts: Vec<VertexId> = (0..4).map(|id| mesh.new_vert(BasicVertex { id })).collect();
        let [a, b, c, d] = [verts[0], verts[1], verts[2], verts[3]];
        mesh.add_face(&[a, b, c], BasicFace::default());
        mesh.add_face(&[a, d, b], BasicFace::default());
        mesh.add_face(&[b, d, c], BasicFace::default());
        mesh.add_face(&[c, d, a], BasicFace::default());
        mesh.set_opposite_and_boundary_edge().unwrap();

        let e = mesh.get_edge(a, b).expect("interior edge");
        assert!(mesh.split_edges(&[e]));

        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.topology_test(), TopologyCode::Ok);
        for f in mesh.face_ids() {
            assert_eq!(mesh.face_valence(f), 3);
        }
    }

    #[test]
    fn test_split_face2_fans_a_quad_from_a_new_center() {
        let mut mesh = Mesh::<BasicTypes>::new();
        let verts: Vec<VertexId> = (0..4).map(|id| mesh.new_vert(BasicVertex { id })).collect();
        let f = mesh.add_face(&verts, BasicFace::default());
        mesh.set_opposite_and_boundary_edge().unwrap();

        let center = mesh.split_face2(f, BasicVertex { id: 100 }, BasicFace::default);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.vert_valence(center), 4);
        assert_eq!(mesh.topology_test(), TopologyCode::Ok);
    }
}
