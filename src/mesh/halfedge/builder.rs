// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building faces: the straightforward `add_face` used for bulk construction
//! (paired with a single trailing `set_opposite_and_boundary_edge` call),
//! and `add_face_keep_topo`, which inserts one face at a time into a mesh
//! that may already have some of the loop's vertices and edges wired up.

use std::collections::HashMap;

use anyhow::bail;
use itertools::Itertools;

use super::*;

/// The outcome of [`Mesh::set_opposite_and_boundary_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryEdgeError {
    /// A half-edge's two endpoints coincide.
    DegenerateEdge,
    /// Two half-edges with the same orientation share an unordered vertex
    /// pair — the input isn't a consistently-wound manifold.
    NonManifoldOrientation,
    /// Three or more half-edges share the same unordered vertex pair.
    NonManifoldEdge,
}

impl BoundaryEdgeError {
    pub fn code(&self) -> i32 {
        match self {
            BoundaryEdgeError::DegenerateEdge => 1,
            BoundaryEdgeError::NonManifoldOrientation => 2,
            BoundaryEdgeError::NonManifoldEdge => 4,
        }
    }
}

impl std::fmt::Display for BoundaryEdgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{self:?}"))
    }
}
impl std::error::Error for BoundaryEdgeError {}

impl<T: MeshTypes> Mesh<T> {
    /// Allocate one face and `loop.len()` half-edges, stitched as a simple
    /// directed cycle. Does not set `oppo`; used when building many faces up
    /// front, ahead of a single trailing [`Mesh::set_opposite_and_boundary_edge`]
    /// call.
    pub fn add_face(&mut self, vert_loop: &[VertexId], face_data: T::Face) -> FaceId
    where
        T::Edge: Default,
    {
        self.add_face_with_observer(vert_loop, face_data, &mut NoopObserver)
    }

    pub fn add_face_with_observer(
        &mut self,
        vert_loop: &[VertexId],
        face_data: T::Face,
        obs: &mut impl SessionObserver<T>,
    ) -> FaceId
    where
        T::Edge: Default,
    {
        let n = vert_loop.len();
        let fi = self.new_face_with_observer(face_data, obs);

        let mut edges = SVec::<HalfEdgeId>::new();
        for &v in vert_loop {
            let ei = self.new_edge_with_observer(T::Edge::default(), obs);
            self[ei].vert = Some(v);
            self[ei].face = Some(fi);
            self[v].edge = Some(ei);
            edges.push(ei);
        }
        for i in 0..n {
            self[edges[i]].next = Some(edges[(i + 1) % n]);
            self[edges[i]].prev = Some(edges[(i + n - 1) % n]);
        }
        self[fi].edge = Some(edges[0]);
        fi
    }

    /// After bulk-constructing faces with [`Mesh::add_face`], cross-link each
    /// undirected edge's two sides and synthesize boundary half-edges for
    /// any side left unpaired.
    pub fn set_opposite_and_boundary_edge(&mut self) -> Result<(), BoundaryEdgeError>
    where
        T::Edge: Default,
    {
        self.set_opposite_and_boundary_edge_with_observer(&mut NoopObserver)
    }

    pub fn set_opposite_and_boundary_edge_with_observer(
        &mut self,
        obs: &mut impl SessionObserver<T>,
    ) -> Result<(), BoundaryEdgeError>
    where
        T::Edge: Default,
    {
        // Bucket every half-edge by its unordered vertex pair, keyed by
        // arena-stable VertexId ordering (standing in for the original's
        // pointer-address ordering).
        let mut edges_map: HashMap<(VertexId, VertexId), (Option<HalfEdgeId>, Option<HalfEdgeId>)> =
            HashMap::new();

        for ei in self.edges.keys() {
            let tip = self.edges[ei].vert.expect("add_face sets vert");
            let prev = self.edges[ei].prev.expect("add_face sets prev");
            let tail = self.edges[prev].vert.expect("add_face sets vert");
            if tail == tip {
                return Err(BoundaryEdgeError::DegenerateEdge);
            }
            let (key, is_swap) = if tail < tip {
                ((tail, tip), false)
            } else {
                ((tip, tail), true)
            };
            let entry = edges_map.entry(key).or_insert((None, None));
            if entry.0.is_none() && entry.1.is_none() {
                if is_swap {
                    entry.1 = Some(ei);
                } else {
                    entry.0 = Some(ei);
                }
            } else if entry.1.is_none() {
                if is_swap {
                    entry.1 = Some(ei);
                } else {
                    return Err(BoundaryEdgeError::NonManifoldOrientation);
                }
            } else if entry.0.is_none() {
                if !is_swap {
                    entry.0 = Some(ei);
                } else {
                    return Err(BoundaryEdgeError::NonManifoldOrientation);
                }
            } else {
                return Err(BoundaryEdgeError::NonManifoldEdge);
            }
        }

        let mut bound_vert: HashMap<VertexId, SVec<HalfEdgeId>> = HashMap::new();

        for (first, second) in edges_map.values().copied() {
            match (first, second) {
                (Some(a), Some(b)) => {
                    self[a].oppo = Some(b);
                    self[b].oppo = Some(a);
                }
                _ => {
                    let be = first.or(second).expect("at least one side present");
                    let ne = self.new_edge_with_observer(T::Edge::default(), obs);
                    let be_prev = self.edges[be].prev.expect("add_face sets prev");
                    let tail = self.edges[be_prev].vert.expect("add_face sets vert");
                    self[ne].vert = Some(tail);
                    self[ne].oppo = Some(be);
                    self[be].oppo = Some(ne);
                    bound_vert.entry(tail).or_default().push(ne);
                }
            }
        }

        for (_, v_edges) in bound_vert {
            let mut bound_edges = SVec::<HalfEdgeId>::new();
            for ne in v_edges {
                let mut out_e = self.edges[ne].oppo.expect("just set");
                let mut iters = 0;
                while self.edges[out_e].face.is_some() {
                    let prev = self.edges[out_e].prev.expect("add_face sets prev");
                    out_e = self.edges[prev].oppo.expect("cross-linked above");
                    iters += 1;
                    assert!(iters < MAX_LOOP_ITERATIONS, "boundary rotation does not close");
                }
                bound_edges.push(ne);
                bound_edges.push(out_e);
            }

            let mut i = 1;
            while i + 1 < bound_edges.len() {
                self[bound_edges[i]].prev = Some(bound_edges[i + 1]);
                self[bound_edges[i + 1]].next = Some(bound_edges[i]);
                i += 2;
            }
            let front = *bound_edges.first().expect("non-empty");
            let back = *bound_edges.last().expect("non-empty");
            self[front].next = Some(back);
            self[back].prev = Some(front);
        }

        let vert_ids: Vec<VertexId> = self.verts.keys().collect();
        for v in vert_ids {
            self.adjust_vert_edge(v);
        }

        log::debug!(
            "set_opposite_and_boundary_edge: stitched {} edges",
            self.edges.len()
        );
        Ok(())
    }

    /// Re-establish the boundary bias (I7): if `v`'s stored edge is not
    /// already boundary-faced, rotate to find one and adopt it.
    pub fn adjust_vert_edge(&mut self, v: VertexId) {
        let start = match self.verts[v].edge {
            Some(e) => e,
            None => return,
        };
        if self.edges[start].face.is_none() {
            return;
        }
        let mut ei = start;
        let mut iters = 0;
        loop {
            if self.edges[ei].face.is_none() {
                self[v].edge = Some(ei);
                break;
            }
            let next = self.edges[ei].next.expect("half-edge has no next");
            ei = self.edges[next].oppo.expect("half-edge has no oppo");
            iters += 1;
            if ei == start {
                break;
            }
            assert!(iters < MAX_LOOP_ITERATIONS, "vertex rotation does not close");
        }
    }

    /// Repair 1-ring consistency around a non-manifold vertex after a new
    /// face merges two of its boundary sectors. `bd_in_edges` are the
    /// boundary-in half-edges collected just before the merge.
    pub fn adjust_nm_vert(&mut self, bd_in_edges: &[HalfEdgeId]) {
        let n = bd_in_edges.len();
        for i in 0..n {
            let mut tmp = self.edges[bd_in_edges[i]].oppo.expect("has oppo");
            let mut iters = 0;
            loop {
                let prev = self.edges[tmp].prev.expect("has prev");
                tmp = self.edges[prev].oppo.expect("has oppo");
                iters += 1;
                assert!(iters < MAX_LOOP_ITERATIONS, "sector rotation does not close");
                if self.edges[tmp].face.is_none() {
                    break;
                }
            }

            let i_next = self.edges[bd_in_edges[i]].next.expect("has next");
            if tmp == i_next {
                let other = bd_in_edges[(i + 1) % n];
                let other_next = self.edges[other].next.expect("has next");

                self[i_next].prev = Some(other);
                self[other_next].prev = Some(bd_in_edges[i]);
                self[bd_in_edges[i]].next = Some(other_next);
                self[other].next = Some(i_next);
            }
        }
    }

    /// Splice a newly-inserted face's pair of boundary edges into an
    /// existing non-manifold vertex's sector list, or attach to the first
    /// sector if neither `in_edge` nor `out_edge` already bounds one.
    pub fn add_face_into_sectors(&mut self, sec: &[HalfEdgeId], in_edge: HalfEdgeId, out_edge: HalfEdgeId) {
        assert!(!sec.is_empty() && sec.len() % 2 == 0);
        let mut is_added = false;

        for i in 0..sec.len() {
            if in_edge == sec[i] && out_edge != sec[i + 1] {
                let out_oppo = self.edges[out_edge].oppo.expect("has oppo");
                self[out_oppo].next = Some(sec[i + 1]);
                self[sec[i + 1]].prev = Some(out_oppo);
                is_added = true;
            }
            if out_edge == sec[i] && in_edge != sec[i - 1] {
                let in_oppo = self.edges[in_edge].oppo.expect("has oppo");
                self[in_oppo].prev = Some(sec[i - 1]);
                self[sec[i - 1]].next = Some(in_oppo);
                is_added = true;
            }
        }

        if !is_added {
            let in_oppo = self.edges[in_edge].oppo.expect("has oppo");
            let out_oppo = self.edges[out_edge].oppo.expect("has oppo");
            self[sec[0]].next = Some(in_oppo);
            self[in_oppo].prev = Some(sec[0]);
            self[sec[1]].prev = Some(out_oppo);
            self[out_oppo].next = Some(sec[1]);
        }

        let v = self.edges[in_edge].vert.expect("has vert");
        self.adjust_vert_edge(v);
    }

    /// Insert a face whose loop may reuse any mix of existing and new
    /// vertices/edges, preserving the topology already present. Returns
    /// `None` if any located existing half-edge is already occupied by
    /// another face.
    pub fn add_face_keep_topo(&mut self, vert_loop: &[VertexId], face_data: T::Face) -> Option<FaceId>
    where
        T::Edge: Default,
    {
        self.add_face_keep_topo_with_observer(vert_loop, face_data, &mut NoopObserver)
    }

    pub fn add_face_keep_topo_with_observer(
        &mut self,
        vert_loop: &[VertexId],
        face_data: T::Face,
        obs: &mut impl SessionObserver<T>,
    ) -> Option<FaceId>
    where
        T::Edge: Default,
    {
        let n = vert_loop.len();
        assert!(n > 2, "add_face_keep_topo needs at least a triangle");

        let is_v_exist: Vec<bool> = vert_loop.iter().map(|&v| self.verts[v].edge.is_some()).collect();

        let fi = self.new_face_with_observer(face_data, obs);

        let mut edges: Vec<(HalfEdgeId, bool)> = Vec::with_capacity(n);
        for i in 0..n {
            let a = vert_loop[i];
            let b = vert_loop[(i + 1) % n];
            let (ei, is_new) = match self.get_edge(a, b) {
                Some(ei) => (ei, false),
                None => {
                    let ei = self.new_edge_with_observer(T::Edge::default(), obs);
                    let eio = self.new_edge_with_observer(T::Edge::default(), obs);
                    self[ei].vert = Some(b);
                    self[eio].vert = Some(a);
                    self[ei].oppo = Some(eio);
                    self[eio].oppo = Some(ei);
                    (ei, true)
                }
            };

            if self.edges[ei].face.is_some() {
                return None;
            }
            edges.push((ei, is_new));
        }

        for i in 0..n {
            if is_v_exist[i] {
                let e1 = edges[(i + n - 1) % n];
                let e2 = edges[i];
                if !e1.1 && !e2.1 {
                    let (e1, _) = e1;
                    let (e2, _) = e2;
                    if self.edges[e1].next != Some(e2) {
                        let e1_vert = self.edges[e1].vert.expect("has vert");
                        let mut bd_in_edges = SVec::<HalfEdgeId>::new();
                        let start = self.verts[e1_vert].edge.expect("boundary vertex has edge");
                        let mut tmp = start;
                        let mut iters = 0;
                        loop {
                            if self.edges[tmp].face.is_none() && tmp != e1 {
                                bd_in_edges.push(tmp);
                            }
                            let oppo = self.edges[tmp].oppo.expect("has oppo");
                            tmp = self.edges[oppo].prev.expect("has prev");
                            iters += 1;
                            assert!(iters < MAX_LOOP_ITERATIONS, "vertex rotation does not close");
                            if tmp == start {
                                break;
                            }
                        }

                        if self.verts[e1_vert].edge == Some(e1) {
                            let e2_prev = self.edges[e2].prev.expect("has prev");
                            self[e1_vert].edge = Some(e2_prev);
                        }

                        let e1_next = self.edges[e1].next.expect("has next");
                        let e2_prev = self.edges[e2].prev.expect("has prev");
                        self[e1_next].prev = Some(e2_prev);
                        self[e2_prev].next = Some(e1_next);
                        self[e1].next = Some(e2);
                        self[e2].prev = Some(e1);

                        if bd_in_edges.len() > 1 {
                            self.adjust_nm_vert(&bd_in_edges);
                        }
                    }
                } else {
                    let v = vert_loop[i];
                    let bd = self.sectors(v);
                    self.add_face_into_sectors(&bd, edges[(i + n - 1) % n].0, edges[i].0);
                }
            } else {
                let a = edges[(i + n - 1) % n].0;
                let b = edges[i].0;
                let a_oppo = self.edges[a].oppo.expect("has oppo");
                let b_oppo = self.edges[b].oppo.expect("has oppo");
                self[a_oppo].prev = Some(b_oppo);
                self[b_oppo].next = Some(a_oppo);
            }
        }

        for i in 0..n {
            let (ei, _) = edges[i];
            let next = edges[(i + 1) % n].0;
            let prev = edges[(i + n - 1) % n].0;
            self[ei].next = Some(next);
            self[ei].prev = Some(prev);
            self[ei].face = Some(fi);
            if !is_v_exist[i] {
                let oppo = self.edges[ei].oppo.expect("has oppo");
                self[vert_loop[i]].edge = Some(oppo);
            }
        }

        for (ei, _) in &edges {
            let v = self.edges[*ei].vert.expect("has vert");
            self.adjust_vert_edge(v);
        }

        self[fi].edge = Some(edges[0].0);
        Some(fi)
    }

    /// Build a mesh in one shot from a flat vertex-payload list and a set of
    /// polygons indexing into it, validating each polygon before admitting
    /// it. Equivalent to calling [`Mesh::add_face`] once per polygon
    /// followed by a single [`Mesh::set_opposite_and_boundary_edge`], with
    /// the input-validation front-matter a one-off conversion skips.
    pub fn build_from_polygons<Index, Polygon>(
        vertex_data: Vec<T::Vertex>,
        polygons: &[Polygon],
    ) -> anyhow::Result<Mesh<T>>
    where
        T::Edge: Default,
        Index: Copy + TryInto<usize>,
        Polygon: AsRef<[Index]>,
    {
        if vertex_data.is_empty() {
            bail!("Cannot build a mesh with no vertices.");
        }

        let mut mesh = Mesh::new();
        let verts: Vec<VertexId> = vertex_data.into_iter().map(|d| mesh.new_vert(d)).collect();

        for polygon in polygons.iter().map(|p| p.as_ref()) {
            if polygon.len() < 3 {
                bail!("Cannot build meshes where a polygon has fewer than three vertices.");
            }
            if polygon.iter().duplicates_by(|&&i| to_index(i)).next().is_some() {
                bail!("Cannot build meshes where a polygon has duplicate vertices.");
            }

            let vert_loop: Vec<VertexId> = polygon
                .iter()
                .map(|&i| {
                    let i = to_index(i);
                    *verts
                        .get(i)
                        .unwrap_or_else(|| panic!("polygon references out-of-range vertex {i}"))
                })
                .collect();
            mesh.add_face(&vert_loop, T::Face::default());
        }

        mesh.set_opposite_and_boundary_edge()?;
        Ok(mesh)
    }
}

fn to_index<Index: TryInto<usize>>(i: Index) -> usize {
    i.try_into()
        .unwrap_or_else(|_| panic!("vertex index does not fit in usize"))
}

#[cfg(test)]
mod test {
    use super::*;

    fn new_vert(mesh: &mut Mesh<BasicTypes>, id: u64) -> VertexId {
        mesh.new_vert(BasicVertex { id })
    }

    #[test]
    fn test_add_face_single_triangle_is_all_boundary() {
        let mut mesh = Mesh::<BasicTypes>::new();
        let a = new_vert(&mut mesh, 0);
        let b = new_vert(&mut mesh, 1);
        let c = new_vert(&mut mesh, 2);

        mesh.add_face(&[a, b, c], BasicFace::default());
        mesh.set_opposite_and_boundary_edge().unwrap();

        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.edge_count(), 6);
        for f in mesh.face_ids() {
            assert_eq!(mesh.face_valence(f), 3);
            assert!(mesh.is_boundary_face(f));
        }
        assert_eq!(mesh.topology_test(), TopologyCode::Ok);
    }

    #[test]
    fn test_set_opposite_stitches_two_triangles_sharing_an_edge() {
        let mut mesh = Mesh::<BasicTypes>::new();
        let a = new_vert(&mut mesh, 0);
        let b = new_vert(&mut mesh, 1);
        let c = new_vert(&mut mesh, 2);
        let d = new_vert(&mut mesh, 3);

        mesh.add_face(&[a, b, c], BasicFace::default());
        mesh.add_face(&[a, c, d], BasicFace::default());
        mesh.set_opposite_and_boundary_edge().unwrap();

        assert_eq!(mesh.face_count(), 2);
        // 4 outer directed face edges (a-b, b-c, c-d, d-a) each gain a
        // synthesized boundary partner (8), plus the shared diagonal's
        // pair (c-a/a-c), already mutual opposites among the 6 face edges.
        assert_eq!(mesh.edge_count(), 10);
        assert_eq!(mesh.topology_test(), TopologyCode::Ok);

        let shared = mesh.get_edge(a, c).unwrap();
        let shared_oppo = mesh.edges[shared].oppo.unwrap();
        assert_ne!(mesh.edges[shared].face, mesh.edges[shared_oppo].face);
    }

    #[test]
    fn test_set_opposite_rejects_degenerate_edge() {
        let mut mesh = Mesh::<BasicTypes>::new();
        let a = new_vert(&mut mesh, 0);
        let b = new_vert(&mut mesh, 1);

        mesh.add_face(&[a, a, b], BasicFace::default());
        let err = mesh.set_opposite_and_boundary_edge().unwrap_err();
        assert_eq!(err, BoundaryEdgeError::DegenerateEdge);
        assert_eq!(err.code(), 1);
    }

    #[test]
    fn test_add_face_keep_topo_extends_existing_mesh() {
        let mut mesh = Mesh::<BasicTypes>::new();
        let a = new_vert(&mut mesh, 0);
        let b = new_vert(&mut mesh, 1);
        let c = new_vert(&mut mesh, 2);
        let d = new_vert(&mut mesh, 3);

        mesh.add_face(&[a, b, c], BasicFace::default());
        mesh.set_opposite_and_boundary_edge().unwrap();

        let f2 = mesh.add_face_keep_topo(&[a, c, d], BasicFace::default());
        assert!(f2.is_some());
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.topology_test(), TopologyCode::Ok);
    }

    #[test]
    fn test_add_face_keep_topo_rejects_occupied_edge() {
        let mut mesh = Mesh::<BasicTypes>::new();
        let a = new_vert(&mut mesh, 0);
        let b = new_vert(&mut mesh, 1);
        let c = new_vert(&mut mesh, 2);
        let d = new_vert(&mut mesh, 3);

        mesh.add_face(&[a, b, c], BasicFace::default());
        mesh.set_opposite_and_boundary_edge().unwrap();

        // Reuses (a, b) with the same winding as the existing face: that
        // directed half-edge is already occupied.
        let f2 = mesh.add_face_keep_topo(&[a, b, d], BasicFace::default());
        assert!(f2.is_none());
    }

    #[test]
    fn test_build_from_polygons_builds_a_valid_mesh() {
        let vertex_data: Vec<BasicVertex> = (0..4).map(|id| BasicVertex { id }).collect();
        let polygons: Vec<[usize; 3]> = vec![[0, 1, 2], [0, 2, 3]];

        let mesh = Mesh::<BasicTypes>::build_from_polygons(vertex_data, &polygons).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.topology_test(), TopologyCode::Ok);
    }

    #[test]
    fn test_build_from_polygons_rejects_degenerate_polygon() {
        let vertex_data: Vec<BasicVertex> = (0..3).map(|id| BasicVertex { id }).collect();
        let polygons: Vec<[usize; 2]> = vec![[0, 1]];

        let err = Mesh::<BasicTypes>::build_from_polygons(vertex_data, &polygons).unwrap_err();
        assert!(err.to_string().contains("fewer than three vertices"));
    }

    #[test]
    fn test_build_from_polygons_rejects_duplicate_vertex_in_polygon() {
        let vertex_data: Vec<BasicVertex> = (0..3).map(|id| BasicVertex { id }).collect();
        let polygons: Vec<[usize; 3]> = vec![[0, 1, 1]];

        let err = Mesh::<BasicTypes>::build_from_polygons(vertex_data, &polygons).unwrap_err();
        assert!(err.to_string().contains("duplicate vertices"));
    }
}
