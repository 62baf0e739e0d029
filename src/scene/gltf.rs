use std::collections::HashMap;
use std::path::Path;

use glam::{Vec2, Vec3};

use crate::scene::{
    EmbeddedTexture, ImportError, ImportedMaterial, ImportedMesh, ImportedScene, SceneNode,
    Topology,
};

/// Loads a glTF 2.0 asset (`.gltf` or `.glb`). The default scene's node tree is
/// kept below a synthetic root, and every primitive becomes its own mesh.
pub fn import(path: &Path) -> Result<ImportedScene, ImportError> {
    let to_import_error = |source| ImportError::Gltf {
        path: path.to_path_buf(),
        source,
    };
    let ::gltf::Gltf { document, blob } = ::gltf::Gltf::open(path).map_err(to_import_error)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let buffers = ::gltf::import_buffers(&document, Some(base), blob).map_err(to_import_error)?;

    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        return Err(ImportError::NoScene(path.to_path_buf()));
    };

    let mut embedded_textures = Vec::new();
    let mut embedded_by_image = HashMap::new();
    let mut materials = Vec::new();
    for material in document.materials() {
        let mut diffuse = Vec::new();
        if let Some(info) = material.pbr_metallic_roughness().base_color_texture() {
            let image = info.texture().source();
            match image.source() {
                ::gltf::image::Source::Uri { uri, .. } if uri.starts_with("data:") => {
                    log::warn!(
                        "'{}': data URI images are not supported, material '{}' stays untextured",
                        path.display(),
                        material.name().unwrap_or_default(),
                    );
                }
                ::gltf::image::Source::Uri { uri, .. } => diffuse.push(decode_uri(uri)),
                ::gltf::image::Source::View { view, .. } => {
                    let index = *embedded_by_image.entry(image.index()).or_insert_with(|| {
                        let buffer = &buffers[view.buffer().index()];
                        let start = view.offset();
                        let end = start + view.length();
                        embedded_textures.push(EmbeddedTexture {
                            bytes: buffer.get(start..end).unwrap_or_default().to_vec(),
                        });
                        embedded_textures.len() - 1
                    });
                    diffuse.push(format!("*{index}"));
                }
            }
        }
        materials.push(ImportedMaterial {
            name: material.name().unwrap_or_default().to_string(),
            diffuse,
            specular: Vec::new(),
        });
    }
    let default_material = materials.len();
    materials.push(ImportedMaterial {
        name: "default".into(),
        ..Default::default()
    });

    let mut meshes = Vec::new();
    let mut meshes_by_gltf_mesh = Vec::with_capacity(document.meshes().len());
    for mesh in document.meshes() {
        let mut primitive_meshes = Vec::new();
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let positions: Vec<Vec3> = reader
                .read_positions()
                .map(|positions| positions.map(Vec3::from).collect())
                .unwrap_or_default();
            let normals: Vec<Vec3> = reader
                .read_normals()
                .map(|normals| normals.map(Vec3::from).collect())
                .unwrap_or_default();
            // glTF puts the UV origin at the top left.
            let tex_coords: Vec<Vec2> = reader
                .read_tex_coords(0)
                .map(|uvs| uvs.into_f32().map(|[u, v]| Vec2::new(u, 1.0 - v)).collect())
                .unwrap_or_default();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            let topology = match primitive.mode() {
                ::gltf::mesh::Mode::Points => Topology::Points,
                ::gltf::mesh::Mode::Lines => Topology::Lines,
                ::gltf::mesh::Mode::LineLoop => Topology::LineLoop,
                ::gltf::mesh::Mode::LineStrip => Topology::LineStrip,
                ::gltf::mesh::Mode::Triangles => Topology::Triangles,
                ::gltf::mesh::Mode::TriangleStrip => Topology::TriangleStrip,
                ::gltf::mesh::Mode::TriangleFan => Topology::TriangleFan,
            };

            primitive_meshes.push(meshes.len());
            meshes.push(ImportedMesh {
                name: format!(
                    "{}#{}",
                    mesh.name().unwrap_or("mesh"),
                    primitive.index()
                ),
                positions,
                normals,
                tex_coords,
                topology,
                indices,
                material: primitive.material().index().unwrap_or(default_material),
            });
        }
        meshes_by_gltf_mesh.push(primitive_meshes);
    }

    let children = scene
        .nodes()
        .map(|node| convert_node(node, &meshes_by_gltf_mesh, &mut Vec::new()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ImportedScene {
        root: SceneNode::new(scene.name().unwrap_or("root"), Vec::new(), children),
        meshes,
        materials,
        embedded_textures,
    })
}

/// Image URIs are percent-encoded. Undecodable ones are kept as written.
fn decode_uri(uri: &str) -> String {
    match urlencoding::decode(uri) {
        Ok(decoded) => decoded.into_owned(),
        Err(error) => {
            log::warn!("image URI '{uri}' is not valid percent-encoded UTF-8: {error}");
            uri.to_string()
        }
    }
}

/// `ancestors` holds the indices of the nodes above `node`. A node that is
/// its own ancestor makes the hierarchy infinite.
fn convert_node(
    node: ::gltf::Node,
    meshes_by_gltf_mesh: &[Vec<usize>],
    ancestors: &mut Vec<usize>,
) -> Result<SceneNode, ImportError> {
    let name = node.name().unwrap_or_default();
    if ancestors.contains(&node.index()) {
        return Err(ImportError::Incomplete(format!(
            "node {} '{name}' is a child of itself",
            node.index()
        )));
    }
    let meshes = node
        .mesh()
        .map(|mesh| meshes_by_gltf_mesh[mesh.index()].clone())
        .unwrap_or_default();
    ancestors.push(node.index());
    let children = node
        .children()
        .map(|child| convert_node(child, meshes_by_gltf_mesh, ancestors))
        .collect::<Result<Vec<_>, _>>()?;
    ancestors.pop();
    Ok(SceneNode::new(name, meshes, children))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One triangle with UVs, referenced by a parent and a child node, and a
    /// material whose base color texture is an external PNG.
    fn write_triangle_gltf(dir: &Path) -> std::path::PathBuf {
        let mut data = Vec::new();
        for value in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        for value in [0.0f32, 0.0, 1.0, 0.25, 0.0, 1.0] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        for index in [0u16, 1, 2] {
            data.extend_from_slice(&index.to_le_bytes());
        }
        data.extend_from_slice(&[0, 0]);
        std::fs::write(dir.join("triangle.bin"), &data).unwrap();

        let json = r#"{
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [ { "name": "main", "nodes": [0] } ],
            "nodes": [
                { "name": "parent", "mesh": 0, "children": [1] },
                { "name": "child", "mesh": 0 }
            ],
            "meshes": [ { "name": "tri", "primitives": [ {
                "attributes": { "POSITION": 0, "TEXCOORD_0": 1 },
                "indices": 2,
                "material": 0
            } ] } ],
            "materials": [ { "name": "painted",
                "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } } ],
            "textures": [ { "source": 0 } ],
            "images": [ { "uri": "paint.png" } ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0, 0, 0], "max": [1, 1, 0] },
                { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2" },
                { "bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }
            ],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
                { "buffer": 0, "byteOffset": 36, "byteLength": 24 },
                { "buffer": 0, "byteOffset": 60, "byteLength": 6 }
            ],
            "buffers": [ { "uri": "triangle.bin", "byteLength": 68 } ]
        }"#;
        let path = dir.join("triangle.gltf");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn keeps_the_node_hierarchy() {
        let dir = tempfile::tempdir().unwrap();
        let scene = import(&write_triangle_gltf(dir.path())).unwrap();

        assert_eq!(scene.root.name, "main");
        assert_eq!(scene.root.children.len(), 1);
        let parent = &scene.root.children[0];
        assert_eq!(parent.name, "parent");
        assert_eq!(parent.meshes, vec![0]);
        assert_eq!(parent.children[0].name, "child");
        assert_eq!(parent.children[0].meshes, vec![0]);
    }

    #[test]
    fn reads_primitives_and_materials() {
        let dir = tempfile::tempdir().unwrap();
        let scene = import(&write_triangle_gltf(dir.path())).unwrap();

        assert_eq!(scene.meshes.len(), 1);
        let mesh = &scene.meshes[0];
        assert_eq!(mesh.positions, vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert!(mesh.normals.is_empty());
        // Converted to a bottom-left origin.
        assert_eq!(mesh.tex_coords[0], Vec2::new(0.0, 1.0));
        assert_eq!(mesh.tex_coords[1], Vec2::new(1.0, 0.75));
        assert_eq!(scene.materials[mesh.material].diffuse, ["paint.png"]);
        // The default material is always appended.
        assert_eq!(scene.materials.last().unwrap().name, "default");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.gltf");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(import(&path), Err(ImportError::Gltf { .. })));
    }

    #[test]
    fn cyclic_node_hierarchy_is_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cycle.gltf");
        std::fs::write(
            &path,
            r#"{
                "asset": { "version": "2.0" },
                "scene": 0,
                "scenes": [ { "nodes": [0] } ],
                "nodes": [
                    { "name": "a", "children": [1] },
                    { "name": "b", "children": [0] }
                ]
            }"#,
        )
        .unwrap();
        assert!(matches!(import(&path), Err(ImportError::Incomplete(_))));
    }

    #[test]
    fn nodes_shared_by_siblings_are_not_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.gltf");
        std::fs::write(
            &path,
            r#"{
                "asset": { "version": "2.0" },
                "scene": 0,
                "scenes": [ { "nodes": [0, 1] } ],
                "nodes": [
                    { "name": "a", "children": [2] },
                    { "name": "b", "children": [2] },
                    { "name": "leaf" }
                ]
            }"#,
        )
        .unwrap();
        let scene = import(&path).unwrap();
        assert_eq!(scene.root.children.len(), 2);
        assert!(scene.root.children.iter().all(|n| n.children[0].name == "leaf"));
    }

    #[test]
    fn image_uris_are_percent_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("escaped.gltf");
        std::fs::write(
            &path,
            r#"{
                "asset": { "version": "2.0" },
                "scene": 0,
                "scenes": [ { "nodes": [] } ],
                "materials": [ { "name": "painted",
                    "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } } ],
                "textures": [ { "source": 0 } ],
                "images": [ { "uri": "my%20tex.png" } ]
            }"#,
        )
        .unwrap();
        let scene = import(&path).unwrap();
        assert_eq!(scene.materials[0].diffuse, ["my tex.png"]);
        assert_eq!(decode_uri("sub%2Fdir/a%25b.png"), "sub/dir/a%b.png");
        assert_eq!(decode_uri("plain.png"), "plain.png");
    }
}
