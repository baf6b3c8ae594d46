// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A session is an optional collaborator notified of every primitive
//! allocation and deletion. It is threaded through every mutating call
//! rather than stored on the mesh, so it never outlives the call it was
//! borrowed for.
//!
//! Every public mutator that calls the primitive allocator has two forms:
//! a plain one that drives a [`NoopObserver`], and a `*_with_observer` one
//! that takes the observer explicitly. This mirrors the default-argument
//! convention the algorithms here were adapted from, just split into two
//! functions since Rust has no default arguments.

use super::*;

/// Notified of every element allocation and deletion. Allocation callbacks
/// fire after the element's topological fields have been default-initialised
/// and its payload assigned; deletion callbacks fire before the element is
/// removed from its arena, so the observer can still read its final state.
pub trait SessionObserver<T: MeshTypes> {
    fn on_add_vert(&mut self, _mesh: &Mesh<T>, _id: VertexId) {}
    fn on_add_edge(&mut self, _mesh: &Mesh<T>, _id: HalfEdgeId) {}
    fn on_add_face(&mut self, _mesh: &Mesh<T>, _id: FaceId) {}
    fn on_del_vert(&mut self, _mesh: &Mesh<T>, _id: VertexId) {}
    fn on_del_edge(&mut self, _mesh: &Mesh<T>, _id: HalfEdgeId) {}
    fn on_del_face(&mut self, _mesh: &Mesh<T>, _id: FaceId) {}
}

/// The default collaborator: observes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl<T: MeshTypes> SessionObserver<T> for NoopObserver {}
