//! Fixed post-processing applied to every imported scene: primitives are
//! turned into triangle lists and the V texture coordinate is flipped, so
//! image row 0 lands at the top of the texture.

use glam::Vec2;

use crate::scene::ImportedScene;

/// How a mesh's index list is assembled into primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    pub fn is_triangles(self) -> bool {
        matches!(
            self,
            Topology::Triangles | Topology::TriangleStrip | Topology::TriangleFan
        )
    }
}

pub fn apply(scene: &mut ImportedScene) {
    for mesh in &mut scene.meshes {
        if mesh.topology.is_triangles() {
            mesh.indices = triangulate(mesh.topology, &mesh.indices);
            mesh.topology = Topology::Triangles;
            let trailing = mesh.indices.len() % 3;
            if trailing != 0 {
                log::warn!(
                    "mesh '{}' ends in a partial triangle, dropping {trailing} indices",
                    mesh.name
                );
                mesh.indices.truncate(mesh.indices.len() - trailing);
            }
        }
        flip_uvs(&mut mesh.tex_coords);
    }
}

/// Converts strip and fan index lists to plain triangle lists, keeping the
/// winding of every triangle. Other topologies are returned unchanged.
pub fn triangulate(topology: Topology, indices: &[u32]) -> Vec<u32> {
    match topology {
        Topology::TriangleStrip => indices
            .windows(3)
            .enumerate()
            .flat_map(|(i, w)| {
                // Every other triangle of a strip is wound the other way.
                if i % 2 == 0 {
                    [w[0], w[1], w[2]]
                } else {
                    [w[1], w[0], w[2]]
                }
            })
            .collect(),
        Topology::TriangleFan => match indices.split_first() {
            Some((&center, rest)) => rest
                .windows(2)
                .flat_map(|w| [center, w[0], w[1]])
                .collect(),
            None => Vec::new(),
        },
        _ => indices.to_vec(),
    }
}

pub fn flip_uvs(tex_coords: &mut [Vec2]) {
    for uv in tex_coords {
        uv.y = 1.0 - uv.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ImportedMesh, SceneNode};

    #[test]
    fn strips_alternate_winding() {
        assert_eq!(
            triangulate(Topology::TriangleStrip, &[0, 1, 2, 3, 4]),
            vec![0, 1, 2, 2, 1, 3, 2, 3, 4]
        );
        assert!(triangulate(Topology::TriangleStrip, &[0, 1]).is_empty());
    }

    #[test]
    fn fans_share_the_first_vertex() {
        assert_eq!(
            triangulate(Topology::TriangleFan, &[5, 6, 7, 8]),
            vec![5, 6, 7, 5, 7, 8]
        );
        assert!(triangulate(Topology::TriangleFan, &[]).is_empty());
    }

    #[test]
    fn lists_pass_through() {
        assert_eq!(triangulate(Topology::Triangles, &[2, 1, 0]), vec![2, 1, 0]);
        assert_eq!(triangulate(Topology::Lines, &[0, 1]), vec![0, 1]);
    }

    #[test]
    fn apply_flips_v_and_trims_partial_triangles() {
        let mut scene = ImportedScene {
            root: SceneNode::new("root", vec![0, 1], vec![]),
            meshes: vec![
                ImportedMesh {
                    name: "strip".into(),
                    topology: Topology::TriangleStrip,
                    indices: vec![0, 1, 2, 3],
                    tex_coords: vec![Vec2::new(0.25, 0.25), Vec2::new(1.0, 0.0)],
                    ..Default::default()
                },
                ImportedMesh {
                    name: "ragged".into(),
                    indices: vec![0, 1, 2, 0],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        apply(&mut scene);

        let strip = &scene.meshes[0];
        assert_eq!(strip.topology, Topology::Triangles);
        assert_eq!(strip.indices, vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(strip.tex_coords, vec![Vec2::new(0.25, 0.75), Vec2::new(1.0, 1.0)]);
        assert_eq!(scene.meshes[1].indices, vec![0, 1, 2]);
    }

    #[test]
    fn apply_leaves_line_meshes_alone() {
        let mut scene = ImportedScene {
            meshes: vec![ImportedMesh {
                topology: Topology::LineStrip,
                indices: vec![0, 1, 2, 3],
                ..Default::default()
            }],
            ..Default::default()
        };
        apply(&mut scene);
        assert_eq!(scene.meshes[0].topology, Topology::LineStrip);
        assert_eq!(scene.meshes[0].indices, vec![0, 1, 2, 3]);
    }
}
