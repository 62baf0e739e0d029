use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use crate::renderer::device::SharedDevice;
use crate::renderer::texture::{DecodedImage, Texture, TextureError, TextureResource};

/// Textures already resolved during one model's loading pass, keyed by the
/// exact path string its materials use. Never evicts.
#[derive(Debug, Default)]
pub struct TextureCache {
    loaded: HashMap<String, Texture>,
}

impl TextureCache {
    pub fn new() -> TextureCache {
        TextureCache::default()
    }

    pub fn find(&self, path: &str) -> Option<&Texture> {
        self.loaded.get(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, texture: Texture) {
        self.loaded.insert(path.into(), texture);
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}

/// Where a texture's pixels come from, independent of which model asks.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureKey {
    /// An image file, with the model directory already joined in.
    File(PathBuf),
    /// The `index`th image embedded in the asset file at `asset`.
    Embedded { asset: PathBuf, index: usize },
}

/// Process-wide texture registry shared by every model loaded through it.
///
/// Only weak references are held: a texture stays alive as long as some mesh
/// (or model cache) uses it, and is then deleted from the GPU. A later request
/// for the same key decodes it again.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    textures: HashMap<TextureKey, Weak<TextureResource>>,
    uploads: usize,
}

impl TextureRegistry {
    pub fn new() -> TextureRegistry {
        TextureRegistry::default()
    }

    /// Returns the live texture for `key`, or runs `decode` and uploads the
    /// result. Failed decodes upload a placeholder which is not registered,
    /// so the next request tries again.
    pub fn acquire<F>(
        &mut self,
        device: &SharedDevice,
        key: TextureKey,
        decode: F,
    ) -> (Rc<TextureResource>, Option<TextureError>)
    where
        F: FnOnce() -> Result<DecodedImage, TextureError>,
    {
        if let Some(resource) = self.textures.get(&key).and_then(Weak::upgrade) {
            log::debug!("reusing texture {:?} for {key:?}", resource.id());
            return (resource, None);
        }

        self.textures.retain(|_, texture| texture.strong_count() > 0);
        let (resource, error) = TextureResource::upload(device, decode());
        let resource = Rc::new(resource);
        self.uploads += 1;
        if error.is_none() {
            self.textures.insert(key, Rc::downgrade(&resource));
        }
        (resource, error)
    }

    /// Number of textures currently alive.
    pub fn live_count(&self) -> usize {
        self.textures
            .values()
            .filter(|texture| texture.strong_count() > 0)
            .count()
    }

    /// Number of uploads performed through this registry, placeholders
    /// included.
    pub fn upload_count(&self) -> usize {
        self.uploads
    }
}
