// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deep-copying a mesh into a separate, empty target.

use slotmap::SecondaryMap;

use super::*;

impl<T: MeshTypes> Mesh<T> {
    /// Copy every vertex, edge, and face of `self` into `dst`, remapping
    /// handles along the way. `dst` must be empty — this is an initializer,
    /// not a merge.
    pub fn copy_into(&self, dst: &mut Mesh<T>)
    where
        T::Vertex: Clone,
        T::Edge: Clone,
        T::Face: Clone,
    {
        debug_assert!(dst.is_empty(), "copy_into target must be empty");

        let mut vmap: SecondaryMap<VertexId, VertexId> = SecondaryMap::new();
        let mut emap: SecondaryMap<HalfEdgeId, HalfEdgeId> = SecondaryMap::new();
        let mut fmap: SecondaryMap<FaceId, FaceId> = SecondaryMap::new();

        for vi in self.verts.keys() {
            let new_id = dst.verts.insert(Vertex {
                edge: None,
                data: self.verts[vi].data.clone(),
            });
            vmap.insert(vi, new_id);
        }
        for ei in self.edges.keys() {
            let new_id = dst.edges.insert(HalfEdge {
                vert: None,
                oppo: None,
                next: None,
                prev: None,
                face: None,
                data: self.edges[ei].data.clone(),
            });
            emap.insert(ei, new_id);
        }
        for fi in self.faces.keys() {
            let new_id = dst.faces.insert(Face {
                edge: None,
                data: self.faces[fi].data.clone(),
            });
            fmap.insert(fi, new_id);
        }

        for vi in self.verts.keys() {
            let new_id = vmap[vi];
            dst.verts[new_id].edge = self.verts[vi].edge.map(|e| emap[e]);
        }
        for ei in self.edges.keys() {
            let new_id = emap[ei];
            let e = &self.edges[ei];
            dst.edges[new_id].vert = e.vert.map(|v| vmap[v]);
            dst.edges[new_id].oppo = e.oppo.map(|o| emap[o]);
            dst.edges[new_id].next = e.next.map(|n| emap[n]);
            dst.edges[new_id].prev = e.prev.map(|p| emap[p]);
            dst.edges[new_id].face = e.face.map(|f| fmap[f]);
        }
        for fi in self.faces.keys() {
            let new_id = fmap[fi];
            dst.faces[new_id].edge = self.faces[fi].edge.map(|e| emap[e]);
        }

        log::debug!(
            "copy_into: copied {} verts, {} edges, {} faces",
            self.verts.len(),
            self.edges.len(),
            self.faces.len()
        );
    }

    /// Convenience wrapper over [`Mesh::copy_into`] building a fresh mesh.
    pub fn deep_clone(&self) -> Mesh<T>
    where
        T::Vertex: Clone,
        T::Edge: Clone,
        T::Face: Clone,
    {
        let mut dst = Mesh::new();
        self.copy_into(&mut dst);
        dst
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_copy_into_preserves_counts_and_validity() {
        let mut src = Mesh::<BasicTypes>::new();
        let verts: Vec<VertexId> = (0..4).map(|id| src.new_vert(BasicVertex { id })).collect();
        src.add_face(&[verts[0], verts[1], verts[2]], BasicFace::default());
        src.add_face(&[verts[0], verts[2], verts[3]], BasicFace::default());
        src.set_opposite_and_boundary_edge().unwrap();

        let mut dst = Mesh::<BasicTypes>::new();
        src.copy_into(&mut dst);

        assert_eq!(dst.vertex_count(), src.vertex_count());
        assert_eq!(dst.edge_count(), src.edge_count());
        assert_eq!(dst.face_count(), src.face_count());
        assert_eq!(dst.topology_test(), TopologyCode::Ok);
    }

    #[test]
    fn test_deep_clone_is_independent_of_source() {
        let mut src = Mesh::<BasicTypes>::new();
        let a = src.new_vert(BasicVertex { id: 0 });
        let b = src.new_vert(BasicVertex { id: 1 });
        let c = src.new_vert(BasicVertex { id: 2 });
        src.add_face(&[a, b, c], BasicFace::default());
        src.set_opposite_and_boundary_edge().unwrap();

        let mut dst = src.deep_clone();
        let dst_face = dst.face_ids().next().unwrap();
        dst.del_face(dst_face);

        assert_eq!(dst.face_count(), 0);
        assert_eq!(src.face_count(), 1, "mutating the clone must not affect the source");
    }
}
