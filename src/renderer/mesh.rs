use std::fmt;

use glam::{Vec2, Vec3};

use crate::renderer::device::{MeshBuffers, ProgramId, SharedDevice, TextureId};
use crate::renderer::texture::{Texture, TextureKind};

/// The vertex attribute location of the vertex position.
pub const ATTR_LOC_POSITION: u32 = 0;
/// The vertex attribute location of the vertex normal.
pub const ATTR_LOC_NORMAL: u32 = 1;
/// The vertex attribute location of the texture coordinate.
pub const ATTR_LOC_TEXCOORD: u32 = 2;

/// One interleaved vertex, laid out exactly as it is uploaded.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
}

/// The sampler uniform a texture unit is bound to during a draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SamplerBinding {
    pub name: String,
    pub unit: u32,
    pub texture: TextureId,
}

/// Names the sampler of each texture unit, in list order: the kind's prefix
/// followed by a 1-based counter of that kind, e.g. `texture_diffuse2`.
pub fn sampler_names(kinds: impl IntoIterator<Item = TextureKind>) -> Vec<String> {
    let mut diffuse = 0;
    let mut specular = 0;
    kinds
        .into_iter()
        .map(|kind| {
            let counter = match kind {
                TextureKind::Diffuse => &mut diffuse,
                TextureKind::Specular => &mut specular,
            };
            *counter += 1;
            format!("{}{}", kind.sampler_prefix(), counter)
        })
        .collect()
}

/// A drawable unit: immutable vertex, index and texture lists, and the GPU
/// buffers created from them.
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    textures: Vec<Texture>,
    buffers: MeshBuffers,
    device: SharedDevice,
}

impl Mesh {
    /// Uploads the vertices and indices. Indices are not checked against the
    /// vertex count; an out-of-range index is the caller's bug.
    pub fn new(
        device: &SharedDevice,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        textures: Vec<Texture>,
    ) -> Mesh {
        let buffers = device.upload_mesh(&vertices, &indices);
        Mesh {
            vertices,
            indices,
            textures,
            buffers,
            device: device.clone(),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn buffers(&self) -> MeshBuffers {
        self.buffers
    }

    /// Texture units used by [`Mesh::draw`], starting at unit 0.
    pub fn sampler_bindings(&self) -> Vec<SamplerBinding> {
        sampler_names(self.textures.iter().map(Texture::kind))
            .into_iter()
            .zip(&self.textures)
            .enumerate()
            .map(|(unit, (name, texture))| SamplerBinding {
                name,
                unit: unit as u32,
                texture: texture.id(),
            })
            .collect()
    }

    /// Binds every texture to its unit and sampler, then draws the whole index
    /// list as triangles. Texture unit 0 is active again afterwards.
    pub fn draw(&self, program: ProgramId) {
        for binding in self.sampler_bindings() {
            self.device.set_sampler(program, &binding.name, binding.unit);
            self.device.bind_texture(binding.unit, binding.texture);
        }
        self.device.draw_triangles(self.buffers, self.indices.len());
        self.device.reset_texture_unit();
    }
}

impl fmt::Debug for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("vertices", &self.vertices.len())
            .field("indices", &self.indices.len())
            .field("textures", &self.textures)
            .field("buffers", &self.buffers)
            .finish()
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        self.device.delete_mesh(self.buffers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(std::mem::offset_of!(Vertex, normal), 12);
        assert_eq!(std::mem::offset_of!(Vertex, tex_coords), 24);
    }

    #[test]
    fn sampler_names_count_per_kind() {
        use TextureKind::*;
        assert_eq!(
            sampler_names([Diffuse, Diffuse, Specular]),
            ["texture_diffuse1", "texture_diffuse2", "texture_specular1"]
        );
        assert_eq!(
            sampler_names([Specular, Diffuse, Specular, Diffuse]),
            [
                "texture_specular1",
                "texture_diffuse1",
                "texture_specular2",
                "texture_diffuse2"
            ]
        );
        assert!(sampler_names(Vec::new()).is_empty());
    }
}
