// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-element payload contract. The core never reads anything off a
//! payload except the diagnostic `id` (and, for edges, `split_info`); every
//! other field is free for the embedding application to define.

/// Lineage record an edge carries across `split_edge`/`split_edges`: which
/// original edge it descends from, and how many splits deep it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitInfo {
    pub root: i64,
    pub level: u32,
}

impl Default for SplitInfo {
    fn default() -> Self {
        Self { root: -1, level: 0 }
    }
}

pub trait VertexData: Default + Clone {
    fn id(&self) -> u64;
}

pub trait EdgeData: Default + Clone {
    fn id(&self) -> u64;
    fn split_info(&self) -> SplitInfo;
    fn set_split_info(&mut self, info: SplitInfo);
}

pub trait FaceData: Default + Clone {
    fn id(&self) -> u64;
}

/// A minimal, concrete `MeshTypes` implementation carrying nothing but the
/// diagnostic id (and, for edges, split lineage). This is what the test
/// suite builds meshes over; an embedding application is expected to supply
/// its own richer payload types (positions, normals, attribute handles...)
/// instead of this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicTypes;

impl super::MeshTypes for BasicTypes {
    type Vertex = BasicVertex;
    type Edge = BasicEdge;
    type Face = BasicFace;
}

#[derive(Debug, Clone, Default)]
pub struct BasicVertex {
    pub id: u64,
}

impl VertexData for BasicVertex {
    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct BasicEdge {
    pub id: u64,
    pub split_info: SplitInfo,
}

impl EdgeData for BasicEdge {
    fn id(&self) -> u64 {
        self.id
    }

    fn split_info(&self) -> SplitInfo {
        self.split_info
    }

    fn set_split_info(&mut self, info: SplitInfo) {
        self.split_info = info;
    }
}

#[derive(Debug, Clone, Default)]
pub struct BasicFace {
    pub id: u64,
}

impl FaceData for BasicFace {
    fn id(&self) -> u64 {
        self.id
    }
}
