// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scenario tests exercising the public API end to end, building meshes of
//! a few familiar shapes rather than tiny synthetic fragments.

use hedge_mesh::{BasicEdge, BasicFace, BasicVertex, Mesh, MeshTypes, TopologyCode, VertexId};

#[derive(Debug, Clone, Copy, Default)]
struct Types;

impl MeshTypes for Types {
    type Vertex = BasicVertex;
    type Edge = BasicEdge;
    type Face = BasicFace;
}

fn tetrahedron() -> (Mesh<Types>, [VertexId; 4]) {
    let mut mesh = Mesh::<Types>::new();
    let verts: Vec<VertexId> = (0..4).map(|id| mesh.new_vert(BasicVertex { id })).collect();
    let [a, b, c, d] = [verts[0], verts[1], verts[2], verts[3]];

    mesh.add_face(&[a, b, c], BasicFace::default());
    mesh.add_face(&[a, d, b], BasicFace::default());
    mesh.add_face(&[b, d, c], BasicFace::default());
    mesh.add_face(&[c, d, a], BasicFace::default());
    mesh.set_opposite_and_boundary_edge().unwrap();

    (mesh, [a, b, c, d])
}

#[test]
fn tetrahedron_is_closed_and_valid() {
    let (mesh, _) = tetrahedron();

    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.face_count(), 4);
    assert_eq!(mesh.edge_count(), 12);
    assert_eq!(mesh.topology_test(), TopologyCode::Ok);

    for f in mesh.face_ids() {
        assert!(!mesh.is_boundary_face(f));
    }
    for v in mesh.vertex_ids() {
        assert!(!mesh.is_boundary_vert(v));
        assert_eq!(mesh.vert_valence(v), 3);
    }
}

#[test]
fn flipping_a_closed_tetrahedron_edge_preserves_closure() {
    let (mut mesh, [a, b, _c, _d]) = tetrahedron();
    let e = mesh.get_edge(a, b).unwrap();

    mesh.try_edge_flip(e).expect("every edge of a tetrahedron is an interior triangle edge");
    mesh.edge_flip_by_rotate(e);

    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.face_count(), 4);
    assert_eq!(mesh.edge_count(), 12);
    assert_eq!(mesh.topology_test(), TopologyCode::Ok);
    for f in mesh.face_ids() {
        assert!(!mesh.is_boundary_face(f));
    }
}

#[test]
fn collapsing_every_face_of_a_tetrahedron_down_to_one_point() {
    let (mut mesh, [a, b, _c, _d]) = tetrahedron();
    let mut e = mesh.get_edge(a, b).unwrap();

    while mesh.edge_count() > 0 {
        if mesh.try_collapse(e).is_ok() {
            mesh.collapse_edge(e);
        } else {
            break;
        }
        e = match mesh.edge_ids().next() {
            Some(e) => e,
            None => break,
        };
    }

    assert_eq!(mesh.topology_test(), TopologyCode::Ok);
    assert!(mesh.face_count() <= 4);
}

#[test]
fn bowtie_vertex_has_two_sectors() {
    // Two triangles sharing only a single vertex: a classic non-manifold
    // configuration.
    let mut mesh = Mesh::<Types>::new();
    let verts: Vec<VertexId> = (0..5).map(|id| mesh.new_vert(BasicVertex { id })).collect();
    let [center, b, c, d, e] = [verts[0], verts[1], verts[2], verts[3], verts[4]];

    mesh.add_face(&[center, b, c], BasicFace::default());
    mesh.add_face(&[center, d, e], BasicFace::default());
    mesh.set_opposite_and_boundary_edge().unwrap();

    assert_eq!(mesh.face_count(), 2);
    let sec = mesh.sectors(center);
    assert_eq!(sec.len(), 4, "two disjoint triangle fans around one vertex form two sectors");
}

#[test]
fn splitting_a_tetrahedron_edge_keeps_it_valid() {
    let (mut mesh, [a, b, _c, _d]) = tetrahedron();
    let e = mesh.get_edge(a, b).unwrap();

    let new_vert = mesh
        .split_edge(e, BasicVertex { id: 42 }, BasicEdge::default())
        .expect("interior tetrahedron edge has two triangular faces");

    assert!(mesh.contains_vertex(new_vert));
    assert_eq!(mesh.face_count(), 6);
    assert_eq!(mesh.topology_test(), TopologyCode::Ok);
}

#[test]
fn deep_clone_round_trips_topology() {
    let (mesh, _) = tetrahedron();
    let clone = mesh.deep_clone();

    assert_eq!(clone.vertex_count(), mesh.vertex_count());
    assert_eq!(clone.edge_count(), mesh.edge_count());
    assert_eq!(clone.face_count(), mesh.face_count());
    assert_eq!(clone.topology_test(), TopologyCode::Ok);

    for f in clone.face_ids() {
        assert_eq!(clone.face_valence(f), 3);
    }
}
