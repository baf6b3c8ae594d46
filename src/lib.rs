// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A half-edge polygon mesh data structure with in-place topology editing
//! operations: face construction, boundary stitching, edge flips and
//! collapses, and edge/face splitting, all generic over a caller-supplied
//! per-element payload.

pub mod mesh;

pub use mesh::halfedge::{
    BasicEdge, BasicFace, BasicTypes, BasicVertex, BoundaryEdgeError, CollapseError, EdgeData,
    EdgeFlipError, Face, FaceData, FaceId, HalfEdge, HalfEdgeId, Mesh, MeshTypes, NoopObserver,
    SessionObserver, SplitInfo, TopologyCode, Vertex, VertexData, VertexId,
};
