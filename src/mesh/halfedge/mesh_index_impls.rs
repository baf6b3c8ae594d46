// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

macro_rules! impl_index_traits {
    ($id_type:ty, $struct_type:ident, $payload_type:ident, $arena:ident) => {
        impl<T: MeshTypes> std::ops::Index<$id_type> for Mesh<T> {
            type Output = $struct_type<T::$payload_type>;

            fn index(&self, index: $id_type) -> &Self::Output {
                self.$arena.get(index).unwrap_or_else(|| {
                    panic!(
                        "{} index error for {:?}. Has the value been deleted?",
                        stringify!($id_type),
                        index
                    )
                })
            }
        }

        impl<T: MeshTypes> std::ops::IndexMut<$id_type> for Mesh<T> {
            fn index_mut(&mut self, index: $id_type) -> &mut Self::Output {
                self.$arena.get_mut(index).unwrap_or_else(|| {
                    panic!(
                        "{} index error for {:?}. Has the value been deleted?",
                        stringify!($id_type),
                        index
                    )
                })
            }
        }
    };
}

impl_index_traits!(VertexId, Vertex, Vertex, verts);
impl_index_traits!(HalfEdgeId, HalfEdge, Edge, edges);
impl_index_traits!(FaceId, Face, Face, faces);

macro_rules! impl_index_ops {
    ($field_name:ident, $field_name_mut:ident, $id_type:ty, $struct_type:ident, $payload_type:ident, $arena:ident) => {
        /// Try to immutably borrow this element; `None` if it has been freed.
        pub fn $field_name(&self, id: $id_type) -> Option<&$struct_type<T::$payload_type>> {
            self.$arena.get(id)
        }

        /// Try to mutably borrow this element; `None` if it has been freed.
        pub fn $field_name_mut(
            &mut self,
            id: $id_type,
        ) -> Option<&mut $struct_type<T::$payload_type>> {
            self.$arena.get_mut(id)
        }
    };
}

impl<T: MeshTypes> Mesh<T> {
    impl_index_ops!(vertex, vertex_mut, VertexId, Vertex, Vertex, verts);
    impl_index_ops!(halfedge, halfedge_mut, HalfEdgeId, HalfEdge, Edge, edges);
    impl_index_ops!(face, face_mut, FaceId, Face, Face, faces);

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.verts.contains_key(id)
    }

    pub fn contains_halfedge(&self, id: HalfEdgeId) -> bool {
        self.edges.contains_key(id)
    }

    pub fn contains_face(&self, id: FaceId) -> bool {
        self.faces.contains_key(id)
    }
}
