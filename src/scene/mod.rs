//! Format-independent scene graphs produced by the asset parsers.
//!
//! Every importer yields the same shape: a tree of nodes referencing meshes by
//! index, a flat mesh list, a flat material list, and the images embedded in
//! the asset file. Post-processing (triangulation, V flip) has already been
//! applied when [`import`] returns.

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};

mod gltf;
mod obj;
pub mod postprocess;

pub use postprocess::Topology;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),
    #[error("unsupported asset format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("failed to parse OBJ file '{path}': {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("failed to parse glTF file '{path}': {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: ::gltf::Error,
    },
    #[error("'{0}' does not contain a scene")]
    NoScene(PathBuf),
    #[error("incomplete scene: {0}")]
    Incomplete(String),
}

/// A node of the imported hierarchy. Transforms are not carried over.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Indices into [`ImportedScene::meshes`].
    pub meshes: Vec<usize>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, meshes: Vec<usize>, children: Vec<SceneNode>) -> SceneNode {
        SceneNode {
            name: name.into(),
            meshes,
            children,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// Empty if the source had no normals.
    pub normals: Vec<Vec3>,
    /// First UV channel, bottom-left origin. Empty if the source had none.
    pub tex_coords: Vec<Vec2>,
    pub topology: Topology,
    pub indices: Vec<u32>,
    /// Index into [`ImportedScene::materials`].
    pub material: usize,
}

/// Texture paths of a material, in the order the material lists them. A path
/// of the form `*N` refers to [`ImportedScene::embedded_textures`]`[N]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedMaterial {
    pub name: String,
    pub diffuse: Vec<String>,
    pub specular: Vec<String>,
}

/// Encoded image bytes stored inside the asset file itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmbeddedTexture {
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportedScene {
    pub root: SceneNode,
    pub meshes: Vec<ImportedMesh>,
    pub materials: Vec<ImportedMaterial>,
    pub embedded_textures: Vec<EmbeddedTexture>,
}

impl ImportedScene {
    /// Checks that every mesh and material reference points at something.
    pub fn validate(&self) -> Result<(), ImportError> {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let Some(&mesh) = node.meshes.iter().find(|&&mesh| mesh >= self.meshes.len()) {
                return Err(ImportError::Incomplete(format!(
                    "node '{}' references mesh {mesh}, but there are only {}",
                    node.name,
                    self.meshes.len()
                )));
            }
            stack.extend(&node.children);
        }
        for mesh in &self.meshes {
            if mesh.material >= self.materials.len() {
                return Err(ImportError::Incomplete(format!(
                    "mesh '{}' references material {}, but there are only {}",
                    mesh.name,
                    mesh.material,
                    self.materials.len()
                )));
            }
        }
        Ok(())
    }
}

/// Parses the asset at `path`, picking the parser by file extension, then
/// triangulates and flips texture coordinates.
pub fn import(path: &Path) -> Result<ImportedScene, ImportError> {
    if !path.is_file() {
        return Err(ImportError::NotFound(path.to_path_buf()));
    }
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);
    let mut scene = match extension.as_deref() {
        Some("obj") => obj::import(path)?,
        Some("gltf") | Some("glb") => gltf::import(path)?,
        _ => return Err(ImportError::UnsupportedFormat(path.to_path_buf())),
    };
    postprocess::apply(&mut scene);
    scene.validate()?;
    log::debug!(
        "imported '{}': {} meshes, {} materials, {} embedded textures",
        path.display(),
        scene.meshes.len(),
        scene.materials.len(),
        scene.embedded_textures.len(),
    );
    Ok(scene)
}
