//! Loads 3D models through external asset parsers and uploads them to OpenGL
//! ES 3.0 as drawable meshes.
//!
//! - `scene`: parsers for OBJ and glTF producing one format-independent scene graph
//! - `renderer`: GPU upload, texture caching and drawing of models
//! - `camera`: Euler angle fly camera
//! - `config`: the model viewer's JSON settings

pub mod camera;
pub mod config;
pub mod renderer;
pub mod scene;
