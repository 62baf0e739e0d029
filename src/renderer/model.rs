use std::path::{Path, PathBuf};

use crate::renderer::device::{ProgramId, SharedDevice};
use crate::renderer::importer::{DegradedTexture, SceneImporter};
use crate::renderer::mesh::Mesh;
use crate::renderer::texture_cache::{TextureCache, TextureRegistry};
use crate::scene::{self, ImportError, ImportedScene};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The asset could not be parsed into a complete scene. Nothing was
    /// uploaded.
    #[error("failed to import model: {0}")]
    Import(#[from] ImportError),
}

/// All meshes loaded from one asset file, drawn in the order they were found.
#[derive(Debug)]
pub struct Model {
    meshes: Vec<Mesh>,
    directory: PathBuf,
    textures: TextureCache,
    degraded: Vec<DegradedTexture>,
}

impl Model {
    /// Imports the asset at `path` and uploads all of its meshes and textures.
    ///
    /// Parse failures are fatal and return an error without touching the
    /// device. Textures that fail to decode are replaced by a placeholder and
    /// listed in [`Model::degraded_textures`].
    pub fn load(
        path: impl AsRef<Path>,
        device: &SharedDevice,
        registry: &mut TextureRegistry,
    ) -> Result<Model, ModelError> {
        let path = path.as_ref();
        let scene = scene::import(path)?;
        let model = Model::from_scene(&scene, path, device, registry)?;
        log::info!(
            "loaded '{}': {} meshes, {} textures{}",
            path.display(),
            model.meshes.len(),
            model.texture_count(),
            if model.is_degraded() {
                format!(", {} degraded", model.degraded.len())
            } else {
                String::new()
            },
        );
        Ok(model)
    }

    /// Builds a model from an already imported scene. `asset_path` is the file
    /// the scene came from: texture paths are resolved against its directory.
    pub fn from_scene(
        scene: &ImportedScene,
        asset_path: &Path,
        device: &SharedDevice,
        registry: &mut TextureRegistry,
    ) -> Result<Model, ModelError> {
        scene.validate()?;
        let directory = asset_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let imported = SceneImporter::new(scene, &directory, asset_path, device, registry).run();
        Ok(Model {
            meshes: imported.meshes,
            directory,
            textures: imported.textures,
            degraded: imported.degraded,
        })
    }

    /// Draws every mesh in load order with `program`, which must be in use.
    pub fn draw(&self, program: ProgramId) {
        for mesh in &self.meshes {
            mesh.draw(program);
        }
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Directory relative texture paths were resolved against.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Number of distinct texture paths the model's materials referenced.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn degraded_textures(&self) -> &[DegradedTexture] {
        &self.degraded
    }

    /// True if any texture was replaced by the placeholder.
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}
