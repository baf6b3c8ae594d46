// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use slotmap::SlotMap;
use smallvec::SmallVec;

/// Type-safe wrappers over the internal arena indices used as handles.
pub mod id_types;
pub use id_types::*;

/// Implements indexing traits so the mesh can be accessed with `mesh[id]`,
/// plus fallible `.vertex()`/`.halfedge()`/`.face()` accessors.
pub mod mesh_index_impls;

/// The per-vertex/edge/face payload trait bundle and a minimal reference
/// implementation used by tests.
pub mod payload;
pub use payload::*;

/// The collaborator notified of every primitive allocation and deletion.
pub mod session;
pub use session::*;

/// The four primitive operations every mutation is built from.
pub mod primitives;

/// Read-only local walks: adjacency enumeration, valence, `get_edge`, sectors.
pub mod queries;

/// Structural well-formedness checks: `is_valid`, `topology_test`.
pub mod validate;
pub use validate::TopologyCode;

/// Face construction, boundary stitching, non-manifold vertex repair.
pub mod builder;
pub use builder::BoundaryEdgeError;

/// Topology-mutating operations: delete, flip, collapse, split.
pub mod editor;
pub use editor::{CollapseError, EdgeFlipError};

/// Deep-copying a mesh into an empty target.
pub mod copy;

/// HalfEdge meshes are a kind of linked list threaded through an arena: it is
/// possible for a malformed mesh to make a `next`/rotation walk loop forever.
/// To ensure the library never hangs on such input, every loop walk is capped
/// at this many iterations before panicking with a diagnostic message.
pub const MAX_LOOP_ITERATIONS: usize = 8196;

/// Small inline buffers for face loops and vertex rotations, almost always
/// triangles or quads but never capacity-bounded.
pub type SVec<T> = SmallVec<[T; 4]>;

/// The trait bundle a concrete mesh is generic over. The core only ever
/// touches the topological fields declared on `Vertex`/`HalfEdge`/`Face`;
/// everything domain-specific (positions, normals, arbitrary per-element
/// data) lives in the associated payload types, which callers provide.
pub trait MeshTypes: Sized {
    type Vertex: VertexData;
    type Edge: EdgeData;
    type Face: FaceData;
}

#[derive(Debug, Clone)]
pub struct Vertex<V> {
    /// One incoming half-edge whose tip is this vertex, or `None` if isolated.
    pub edge: Option<HalfEdgeId>,
    pub data: V,
}

impl<V: Default> Default for Vertex<V> {
    fn default() -> Self {
        Self {
            edge: None,
            data: V::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HalfEdge<E> {
    /// The tip vertex. Never `None` on a live edge.
    pub vert: Option<VertexId>,
    /// The paired half-edge running the opposite direction. Never `None` on
    /// a live edge once the mesh has been stitched.
    pub oppo: Option<HalfEdgeId>,
    pub next: Option<HalfEdgeId>,
    pub prev: Option<HalfEdgeId>,
    /// The incident face, or `None` if this is a boundary half-edge.
    pub face: Option<FaceId>,
    pub data: E,
}

#[derive(Debug, Clone)]
pub struct Face<F> {
    /// One half-edge of the face loop.
    pub edge: Option<HalfEdgeId>,
    pub data: F,
}

impl<F: Default> Default for Face<F> {
    fn default() -> Self {
        Self {
            edge: None,
            data: F::default(),
        }
    }
}

/// A half-edge polygon mesh, generic over a payload trait bundle `T`.
///
/// Topology is expressed entirely through handles (`VertexId`/`HalfEdgeId`/
/// `FaceId`) stored in the three arenas below; there are no owning references
/// between elements, so the usual half-edge reference cycles never arise.
pub struct Mesh<T: MeshTypes> {
    pub(crate) verts: SlotMap<VertexId, Vertex<T::Vertex>>,
    pub(crate) edges: SlotMap<HalfEdgeId, HalfEdge<T::Edge>>,
    pub(crate) faces: SlotMap<FaceId, Face<T::Face>>,
}

impl<T: MeshTypes> Default for Mesh<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: MeshTypes> Mesh<T> {
    pub fn new() -> Self {
        Self {
            verts: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            faces: SlotMap::with_key(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.verts.keys()
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.edges.keys()
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.verts.is_empty() && self.edges.is_empty() && self.faces.is_empty()
    }

    /// True when `v`'s stored edge is `None` or boundary-faced.
    pub fn is_boundary_vert(&self, v: VertexId) -> bool {
        match self.verts[v].edge {
            None => true,
            Some(e) => self.edges[e].face.is_none(),
        }
    }

    pub fn is_boundary_edge(&self, e: HalfEdgeId) -> bool {
        self.edges[e].face.is_none()
    }

    pub fn is_isolated_vert(&self, v: VertexId) -> bool {
        self.verts[v].edge.is_none()
    }
}
