#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use gl_model::renderer::{
    DecodedImage, GraphicsDevice, MeshBuffers, ProgramId, SharedDevice, TextureId, Vertex,
};

/// A device call that affects what ends up on screen.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    SetSampler { program: ProgramId, name: String, unit: u32 },
    BindTexture { unit: u32, texture: TextureId },
    DrawTriangles { vao: u32, index_count: usize },
    ResetTextureUnit,
}

/// Hands out increasing object names and records everything done with them.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_name: Cell<u32>,
    pub texture_uploads: RefCell<Vec<(TextureId, DecodedImage)>>,
    pub mesh_uploads: RefCell<Vec<(MeshBuffers, usize, Vec<u32>)>>,
    pub live_textures: RefCell<HashSet<TextureId>>,
    pub live_meshes: RefCell<HashSet<u32>>,
    pub calls: RefCell<Vec<Call>>,
}

impl RecordingDevice {
    /// The concrete device for assertions, and the same device as the trait
    /// object the library takes.
    pub fn new() -> (Rc<RecordingDevice>, SharedDevice) {
        let device = Rc::new(RecordingDevice::default());
        let shared: SharedDevice = device.clone();
        (device, shared)
    }

    fn next_name(&self) -> u32 {
        let name = self.next_name.get() + 1;
        self.next_name.set(name);
        name
    }

    pub fn texture_upload_count(&self) -> usize {
        self.texture_uploads.borrow().len()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        self.calls.take()
    }
}

impl GraphicsDevice for RecordingDevice {
    fn upload_texture(&self, image: &DecodedImage) -> TextureId {
        let texture = TextureId(self.next_name());
        self.texture_uploads.borrow_mut().push((texture, image.clone()));
        self.live_textures.borrow_mut().insert(texture);
        texture
    }

    fn delete_texture(&self, texture: TextureId) {
        assert!(
            self.live_textures.borrow_mut().remove(&texture),
            "{texture:?} deleted twice"
        );
    }

    fn upload_mesh(&self, vertices: &[Vertex], indices: &[u32]) -> MeshBuffers {
        let buffers = MeshBuffers {
            vao: self.next_name(),
            vbo: self.next_name(),
            ebo: self.next_name(),
        };
        self.mesh_uploads
            .borrow_mut()
            .push((buffers, vertices.len(), indices.to_vec()));
        self.live_meshes.borrow_mut().insert(buffers.vao);
        buffers
    }

    fn delete_mesh(&self, buffers: MeshBuffers) {
        assert!(
            self.live_meshes.borrow_mut().remove(&buffers.vao),
            "mesh {} deleted twice",
            buffers.vao
        );
    }

    fn set_sampler(&self, program: ProgramId, name: &str, unit: u32) {
        self.calls.borrow_mut().push(Call::SetSampler {
            program,
            name: name.to_string(),
            unit,
        });
    }

    fn bind_texture(&self, unit: u32, texture: TextureId) {
        self.calls
            .borrow_mut()
            .push(Call::BindTexture { unit, texture });
    }

    fn draw_triangles(&self, buffers: MeshBuffers, index_count: usize) {
        self.calls.borrow_mut().push(Call::DrawTriangles {
            vao: buffers.vao,
            index_count,
        });
    }

    fn reset_texture_unit(&self) {
        self.calls.borrow_mut().push(Call::ResetTextureUnit);
    }
}

/// Writes a solid color PNG of the given size.
pub fn write_png(path: &Path, color: [u8; 3]) {
    image::RgbImage::from_pixel(4, 4, image::Rgb(color))
        .save(path)
        .expect("failed to write fixture texture");
}

/// Writes `files` (name, contents) into `dir` and returns the path of the
/// first one.
pub fn write_files(dir: &Path, files: &[(&str, &str)]) -> PathBuf {
    for (name, contents) in files {
        std::fs::write(dir.join(name), contents).expect("failed to write fixture");
    }
    dir.join(files[0].0)
}
