use std::ffi::c_void;
use std::path::Path;
use std::rc::Rc;

use glam::{Mat4, Vec3};

mod device;
pub(crate) mod gl;
mod gl_device;
mod importer;
mod mesh;
mod model;
mod program;
mod texture;
mod texture_cache;

pub use device::{GraphicsDevice, MeshBuffers, ProgramId, SharedDevice, TextureId};
pub use gl_device::GlDevice;
pub use importer::DegradedTexture;
pub use mesh::{
    sampler_names, Mesh, SamplerBinding, Vertex, ATTR_LOC_NORMAL, ATTR_LOC_POSITION,
    ATTR_LOC_TEXCOORD,
};
pub use model::{Model, ModelError};
pub use program::{ShaderError, ShaderProgram};
pub use texture::{
    decode_file, decode_memory, DecodedImage, PixelFormat, Texture, TextureError, TextureKind,
    TextureResource,
};
pub use texture_cache::{TextureCache, TextureKey, TextureRegistry};

/// Loads the OpenGL ES function pointers. Must be called once, with a current
/// context, before anything else in this module touches the GPU.
pub fn load_gl_with<F>(loader: F)
where
    F: FnMut(&'static str) -> *const c_void,
{
    gl::load_with(loader);
}

/// Owns the GL device, the model program and the texture registry models
/// are loaded through.
pub struct Renderer {
    device: SharedDevice,
    program: ShaderProgram,
    textures: TextureRegistry,
}

impl Renderer {
    /// Requires the bindings to be loaded with [`load_gl_with`].
    pub fn new(width: i32, height: i32) -> Result<Renderer, ShaderError> {
        gl::call!(gl::Viewport(0, 0, width, height));
        gl::call!(gl::Enable(gl::DEPTH_TEST));
        let program = ShaderProgram::new()?;
        Ok(Renderer {
            device: Rc::new(GlDevice::new()),
            program,
            textures: TextureRegistry::new(),
        })
    }

    pub fn load_model(&mut self, path: impl AsRef<Path>) -> Result<Model, ModelError> {
        Model::load(path, &self.device, &mut self.textures)
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        gl::call!(gl::Viewport(0, 0, width, height));
    }

    pub fn render(
        &mut self,
        model: &Model,
        model_transform: Mat4,
        view: Mat4,
        projection: Mat4,
        clear_color: Vec3,
    ) {
        gl::call!(gl::ClearColor(clear_color.x, clear_color.y, clear_color.z, 1.0));
        gl::call!(gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT));
        self.program.activate();
        self.program.set_matrices(model_transform, view, projection);
        model.draw(self.program.id());
    }
}
