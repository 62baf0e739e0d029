use std::ffi::c_void;
use std::mem;
use std::ptr;

use crate::renderer::device::{GraphicsDevice, MeshBuffers, ProgramId, TextureId};
use crate::renderer::gl;
use crate::renderer::mesh::{Vertex, ATTR_LOC_NORMAL, ATTR_LOC_POSITION, ATTR_LOC_TEXCOORD};
use crate::renderer::texture::{DecodedImage, PixelFormat};

/// [`GraphicsDevice`] backed by the global OpenGL ES 3.0 bindings.
///
/// The bindings must have been loaded with [`crate::renderer::load_gl_with`]
/// and a context must be current before any method is called.
#[derive(Debug, Default)]
pub struct GlDevice {}

impl GlDevice {
    pub fn new() -> GlDevice {
        GlDevice {}
    }
}

/// (internal format, pixel format) pairs. ES 3.0 only accepts unsized internal
/// formats for RGB and RGBA, so the sized variants are used throughout.
fn gl_formats(format: PixelFormat) -> (gl::types::GLenum, gl::types::GLenum) {
    match format {
        PixelFormat::Red => (gl::R8, gl::RED),
        PixelFormat::Rgb => (gl::RGB8, gl::RGB),
        PixelFormat::Rgba => (gl::RGBA8, gl::RGBA),
    }
}

impl GraphicsDevice for GlDevice {
    fn upload_texture(&self, image: &DecodedImage) -> TextureId {
        let mut texture = 0;
        gl::call!(gl::GenTextures(1, &mut texture));
        gl::call!(gl::BindTexture(gl::TEXTURE_2D, texture));
        // Rows of single-channel and RGB images are not 4-byte aligned.
        gl::call!(gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1));
        let (internal_format, format) = gl_formats(image.format);
        gl::call!(gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            internal_format as gl::types::GLint,
            image.width as gl::types::GLsizei,
            image.height as gl::types::GLsizei,
            0,
            format,
            gl::UNSIGNED_BYTE,
            image.pixels.as_ptr() as *const c_void,
        ));
        gl::call!(gl::GenerateMipmap(gl::TEXTURE_2D));
        let parameters = [
            (gl::TEXTURE_WRAP_S, gl::REPEAT),
            (gl::TEXTURE_WRAP_T, gl::REPEAT),
            (gl::TEXTURE_MIN_FILTER, gl::LINEAR_MIPMAP_LINEAR),
            (gl::TEXTURE_MAG_FILTER, gl::LINEAR),
        ];
        for (name, value) in parameters {
            gl::call!(gl::TexParameteri(
                gl::TEXTURE_2D,
                name,
                value as gl::types::GLint
            ));
        }
        gl::call!(gl::BindTexture(gl::TEXTURE_2D, 0));
        TextureId(texture)
    }

    fn delete_texture(&self, texture: TextureId) {
        gl::call!(gl::DeleteTextures(1, &texture.0));
    }

    fn upload_mesh(&self, vertices: &[Vertex], indices: &[u32]) -> MeshBuffers {
        let mut vao = 0;
        let mut buffers = [0; 2];
        gl::call!(gl::GenVertexArrays(1, &mut vao));
        gl::call!(gl::GenBuffers(2, buffers.as_mut_ptr()));
        let [vbo, ebo] = buffers;

        gl::call!(gl::BindVertexArray(vao));
        gl::call!(gl::BindBuffer(gl::ARRAY_BUFFER, vbo));
        gl::buffer_data(gl::ARRAY_BUFFER, vertices, gl::STATIC_DRAW);

        let stride = mem::size_of::<Vertex>() as gl::types::GLsizei;
        let attributes = [
            (ATTR_LOC_POSITION, 3, mem::offset_of!(Vertex, position)),
            (ATTR_LOC_NORMAL, 3, mem::offset_of!(Vertex, normal)),
            (ATTR_LOC_TEXCOORD, 2, mem::offset_of!(Vertex, tex_coords)),
        ];
        for (location, size, offset) in attributes {
            gl::call!(gl::VertexAttribPointer(
                location,
                size,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const c_void,
            ));
            gl::call!(gl::EnableVertexAttribArray(location));
        }

        // The element array binding is part of the VAO state, so it has to be
        // bound while the VAO still is.
        gl::call!(gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo));
        gl::buffer_data(gl::ELEMENT_ARRAY_BUFFER, indices, gl::STATIC_DRAW);

        gl::call!(gl::BindVertexArray(0));
        gl::call!(gl::BindBuffer(gl::ARRAY_BUFFER, 0));
        MeshBuffers { vao, vbo, ebo }
    }

    fn delete_mesh(&self, buffers: MeshBuffers) {
        gl::call!(gl::DeleteVertexArrays(1, &buffers.vao));
        let names = [buffers.vbo, buffers.ebo];
        gl::call!(gl::DeleteBuffers(2, names.as_ptr()));
    }

    fn set_sampler(&self, program: ProgramId, name: &str, unit: u32) {
        match gl::get_uniform_location(program.0, name) {
            Some(location) => gl::call!(gl::Uniform1i(location, unit as gl::types::GLint)),
            // Samplers the shader does not declare are simply left alone.
            None => log::trace!("program {} has no sampler named {name}", program.0),
        }
    }

    fn bind_texture(&self, unit: u32, texture: TextureId) {
        gl::call!(gl::ActiveTexture(gl::TEXTURE0 + unit));
        gl::call!(gl::BindTexture(gl::TEXTURE_2D, texture.0));
    }

    fn draw_triangles(&self, buffers: MeshBuffers, index_count: usize) {
        gl::call!(gl::BindVertexArray(buffers.vao));
        gl::call!(gl::DrawElements(
            gl::TRIANGLES,
            index_count as gl::types::GLsizei,
            gl::UNSIGNED_INT,
            ptr::null(),
        ));
        gl::call!(gl::BindVertexArray(0));
    }

    fn reset_texture_unit(&self) {
        gl::call!(gl::ActiveTexture(gl::TEXTURE0));
    }
}
