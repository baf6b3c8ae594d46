// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Allocation and deletion of raw elements. Nothing here understands
//! topology; builder and editor operations compose these to keep the
//! invariants in `SPEC_FULL.md` §3.2.

use super::*;

impl<T: MeshTypes> Mesh<T> {
    pub fn new_vert(&mut self, data: T::Vertex) -> VertexId {
        self.new_vert_with_observer(data, &mut NoopObserver)
    }

    pub fn new_vert_with_observer(
        &mut self,
        data: T::Vertex,
        obs: &mut impl SessionObserver<T>,
    ) -> VertexId {
        let id = self.verts.insert(Vertex { edge: None, data });
        obs.on_add_vert(self, id);
        id
    }

    pub fn new_edge(&mut self, data: T::Edge) -> HalfEdgeId {
        self.new_edge_with_observer(data, &mut NoopObserver)
    }

    pub fn new_edge_with_observer(
        &mut self,
        data: T::Edge,
        obs: &mut impl SessionObserver<T>,
    ) -> HalfEdgeId {
        let id = self.edges.insert(HalfEdge {
            vert: None,
            oppo: None,
            next: None,
            prev: None,
            face: None,
            data,
        });
        obs.on_add_edge(self, id);
        id
    }

    pub fn new_face(&mut self, data: T::Face) -> FaceId {
        self.new_face_with_observer(data, &mut NoopObserver)
    }

    pub fn new_face_with_observer(
        &mut self,
        data: T::Face,
        obs: &mut impl SessionObserver<T>,
    ) -> FaceId {
        let id = self.faces.insert(Face { edge: None, data });
        obs.on_add_face(self, id);
        id
    }

    pub fn free_vert(&mut self, id: VertexId) {
        self.free_vert_with_observer(id, &mut NoopObserver)
    }

    pub fn free_vert_with_observer(&mut self, id: VertexId, obs: &mut impl SessionObserver<T>) {
        obs.on_del_vert(self, id);
        self.verts.remove(id);
    }

    pub fn free_edge(&mut self, id: HalfEdgeId) {
        self.free_edge_with_observer(id, &mut NoopObserver)
    }

    pub fn free_edge_with_observer(&mut self, id: HalfEdgeId, obs: &mut impl SessionObserver<T>) {
        obs.on_del_edge(self, id);
        self.edges.remove(id);
    }

    pub fn free_face(&mut self, id: FaceId) {
        self.free_face_with_observer(id, &mut NoopObserver)
    }

    pub fn free_face_with_observer(&mut self, id: FaceId, obs: &mut impl SessionObserver<T>) {
        obs.on_del_face(self, id);
        self.faces.remove(id);
    }
}
