use std::rc::Rc;

use crate::renderer::mesh::Vertex;
use crate::renderer::texture::DecodedImage;

/// Name of a texture object owned by a [`GraphicsDevice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Name of a linked shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// The GPU objects backing one mesh: a vertex array object describing the
/// interleaved layout, and the vertex and index buffers it references.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshBuffers {
    pub vao: u32,
    pub vbo: u32,
    pub ebo: u32,
}

/// The subset of the graphics API the model pipeline talks to.
///
/// All methods are called on the thread that owns the graphics context, and
/// none of them may be called after the context has been destroyed.
pub trait GraphicsDevice {
    /// Creates a 2D texture from `image`, generates its mipmaps, and applies
    /// the fixed sampler policy: repeat wrapping, linear-mipmap-linear
    /// minification and linear magnification.
    fn upload_texture(&self, image: &DecodedImage) -> TextureId;

    fn delete_texture(&self, texture: TextureId);

    /// Creates the vertex array, vertex buffer and index buffer for a mesh,
    /// sized exactly to `vertices` and `indices`.
    fn upload_mesh(&self, vertices: &[Vertex], indices: &[u32]) -> MeshBuffers;

    fn delete_mesh(&self, buffers: MeshBuffers);

    /// Points the sampler uniform `name` of `program` at texture unit `unit`.
    /// The program is expected to be in use already.
    fn set_sampler(&self, program: ProgramId, name: &str, unit: u32);

    /// Makes `unit` the active texture unit and binds `texture` to it.
    fn bind_texture(&self, unit: u32, texture: TextureId);

    /// Draws `index_count` indices from `buffers` as a triangle list.
    fn draw_triangles(&self, buffers: MeshBuffers, index_count: usize);

    /// Makes texture unit 0 the active one again.
    fn reset_texture_unit(&self);
}

/// The device handle meshes and textures keep around to release their GPU
/// objects on drop.
pub type SharedDevice = Rc<dyn GraphicsDevice>;
