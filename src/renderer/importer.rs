use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};

use crate::renderer::device::SharedDevice;
use crate::renderer::mesh::{Mesh, Vertex};
use crate::renderer::texture::{self, Texture, TextureError, TextureKind};
use crate::renderer::texture_cache::{TextureCache, TextureKey, TextureRegistry};
use crate::scene::{ImportedMaterial, ImportedMesh, ImportedScene};

/// A texture that could not be decoded and was replaced by the placeholder.
#[derive(Debug)]
pub struct DegradedTexture {
    /// The path as written in the material.
    pub path: String,
    pub kind: TextureKind,
    pub error: TextureError,
}

/// Everything one import pass produces for a model.
pub(crate) struct ImportedMeshes {
    pub meshes: Vec<Mesh>,
    pub textures: TextureCache,
    pub degraded: Vec<DegradedTexture>,
}

/// Walks an imported scene and turns every mesh reference into a GPU mesh.
pub(crate) struct SceneImporter<'a> {
    scene: &'a ImportedScene,
    /// Directory texture paths are relative to.
    directory: &'a Path,
    /// The asset file itself, naming embedded textures.
    asset: &'a Path,
    device: &'a SharedDevice,
    registry: &'a mut TextureRegistry,
    textures: TextureCache,
    degraded: Vec<DegradedTexture>,
}

impl<'a> SceneImporter<'a> {
    pub fn new(
        scene: &'a ImportedScene,
        directory: &'a Path,
        asset: &'a Path,
        device: &'a SharedDevice,
        registry: &'a mut TextureRegistry,
    ) -> SceneImporter<'a> {
        SceneImporter {
            scene,
            directory,
            asset,
            device,
            registry,
            textures: TextureCache::new(),
            degraded: Vec::new(),
        }
    }

    /// Depth first: a node's own meshes in order, then each child's subtree in
    /// order.
    pub fn run(mut self) -> ImportedMeshes {
        let scene = self.scene;
        let mut meshes = Vec::new();
        let mut node_stack = vec![&scene.root];
        while let Some(node) = node_stack.pop() {
            for &mesh_index in &node.meshes {
                let imported = &scene.meshes[mesh_index];
                if !imported.topology.is_triangles() {
                    log::warn!(
                        "skipping mesh '{}' of node '{}': {:?} primitives are not drawn",
                        imported.name,
                        node.name,
                        imported.topology,
                    );
                    continue;
                }
                meshes.push(self.build_mesh(imported));
            }
            node_stack.extend(node.children.iter().rev());
        }
        ImportedMeshes {
            meshes,
            textures: self.textures,
            degraded: self.degraded,
        }
    }

    fn build_mesh(&mut self, imported: &ImportedMesh) -> Mesh {
        let vertices = imported
            .positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex {
                position,
                normal: imported.normals.get(i).copied().unwrap_or(Vec3::ZERO),
                tex_coords: imported.tex_coords.get(i).copied().unwrap_or(Vec2::ZERO),
            })
            .collect::<Vec<_>>();

        let scene = self.scene;
        let material = &scene.materials[imported.material];
        let mut textures = self.load_material_textures(material, TextureKind::Diffuse);
        textures.extend(self.load_material_textures(material, TextureKind::Specular));

        log::debug!(
            "mesh '{}': {} vertices, {} indices, {} textures",
            imported.name,
            vertices.len(),
            imported.indices.len(),
            textures.len(),
        );
        Mesh::new(self.device, vertices, imported.indices.clone(), textures)
    }

    fn load_material_textures(
        &mut self,
        material: &ImportedMaterial,
        kind: TextureKind,
    ) -> Vec<Texture> {
        let paths = match kind {
            TextureKind::Diffuse => &material.diffuse,
            TextureKind::Specular => &material.specular,
        };
        paths
            .iter()
            .map(|path| match self.textures.find(path) {
                Some(texture) => texture.with_kind(kind),
                None => {
                    let texture = self.load_texture(path, kind);
                    self.textures.insert(path.clone(), texture.clone());
                    texture
                }
            })
            .collect()
    }

    fn load_texture(&mut self, path: &str, kind: TextureKind) -> Texture {
        let scene = self.scene;
        let (resource, error) = match embedded_index(path) {
            Some(index) => {
                let asset = self.asset.to_path_buf();
                let key = TextureKey::Embedded {
                    asset: asset.clone(),
                    index,
                };
                self.registry.acquire(self.device, key, || {
                    match scene.embedded_textures.get(index) {
                        Some(embedded) => {
                            let label = PathBuf::from(format!("{}#{path}", asset.display()));
                            texture::decode_memory(&embedded.bytes, &label)
                        }
                        None => Err(TextureError::MissingEmbedded { asset, index }),
                    }
                })
            }
            None => {
                let file = self.directory.join(path);
                self.registry
                    .acquire(self.device, TextureKey::File(file.clone()), || {
                        texture::decode_file(&file)
                    })
            }
        };

        log::debug!("{kind:?} texture '{path}' is {:?}", resource.id());
        if let Some(error) = error {
            self.degraded.push(DegradedTexture {
                path: path.to_string(),
                kind,
                error,
            });
        }
        Texture::new(resource, kind, path)
    }
}

/// Parses the `*N` form materials use to reference embedded textures.
fn embedded_index(path: &str) -> Option<usize> {
    path.strip_prefix('*')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_references() {
        assert_eq!(embedded_index("*0"), Some(0));
        assert_eq!(embedded_index("*12"), Some(12));
        assert_eq!(embedded_index("*"), None);
        assert_eq!(embedded_index("*a.png"), None);
        assert_eq!(embedded_index("textures/wall.png"), None);
    }
}
