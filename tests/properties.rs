// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property tests: random sequences of topology-growing operations, checked
//! against the structural invariants `topology_test` audits, rather than
//! against any one hand-picked scenario.

use hedge_mesh::{BasicEdge, BasicFace, BasicVertex, Mesh, MeshTypes, TopologyCode, VertexId};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, Default)]
struct Types;

impl MeshTypes for Types {
    type Vertex = BasicVertex;
    type Edge = BasicEdge;
    type Face = BasicFace;
}

#[derive(Debug, Clone, Copy)]
enum Step {
    /// Fan-subdivide an existing face from a freshly allocated center vertex.
    SplitFace(u32),
    /// Split an existing edge at its midpoint, if both its faces are triangles.
    SplitEdge(u32),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        any::<u32>().prop_map(Step::SplitFace),
        any::<u32>().prop_map(Step::SplitEdge),
    ]
}

fn seed_quad() -> Mesh<Types> {
    let mut mesh = Mesh::<Types>::new();
    let verts: Vec<VertexId> = (0..4).map(|id| mesh.new_vert(BasicVertex { id })).collect();
    mesh.add_face(&verts, BasicFace::default());
    mesh.set_opposite_and_boundary_edge().unwrap();
    mesh
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After any sequence of face/edge splits starting from a single quad,
    /// the mesh must still satisfy every structural invariant, and the
    /// element counts must never go backwards (splits only ever add).
    #[test]
    fn splits_preserve_topology_validity(steps in proptest::collection::vec(step_strategy(), 0..20)) {
        let mut mesh = seed_quad();
        let mut prev_verts = mesh.vertex_count();
        let mut prev_edges = mesh.edge_count();
        let mut prev_faces = mesh.face_count();

        for step in steps {
            match step {
                Step::SplitFace(pick) => {
                    let faces: Vec<_> = mesh.face_ids().collect();
                    if faces.is_empty() {
                        continue;
                    }
                    let f = faces[pick as usize % faces.len()];
                    mesh.split_face2(f, BasicVertex { id: 0 }, BasicFace::default);
                }
                Step::SplitEdge(pick) => {
                    let edges: Vec<_> = mesh.edge_ids().collect();
                    if edges.is_empty() {
                        continue;
                    }
                    let e = edges[pick as usize % edges.len()];
                    mesh.split_edge(e, BasicVertex { id: 0 }, BasicEdge::default());
                }
            }

            prop_assert!(mesh.vertex_count() >= prev_verts);
            prop_assert!(mesh.edge_count() >= prev_edges);
            prop_assert!(mesh.face_count() >= prev_faces);
            prop_assert_eq!(mesh.topology_test(), TopologyCode::Ok);
            prop_assert!(mesh.is_valid());

            prev_verts = mesh.vertex_count();
            prev_edges = mesh.edge_count();
            prev_faces = mesh.face_count();
        }
    }

    /// Every half-edge's opposite relation is its own involution, regardless
    /// of how many random splits were applied.
    #[test]
    fn oppo_is_always_involutive(n_splits in 0u32..12) {
        let mut mesh = seed_quad();
        for i in 0..n_splits {
            let faces: Vec<_> = mesh.face_ids().collect();
            if faces.is_empty() {
                break;
            }
            let f = faces[i as usize % faces.len()];
            mesh.split_face2(f, BasicVertex { id: 0 }, BasicFace::default);
        }

        for e in mesh.edge_ids() {
            let oppo = mesh.halfedge(e).unwrap().oppo.expect("stitched mesh has no dangling edges");
            let oppo_oppo = mesh.halfedge(oppo).unwrap().oppo;
            prop_assert_eq!(oppo_oppo, Some(e));
        }
    }
}
