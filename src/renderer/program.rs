use glam::Mat4;

use crate::renderer::device::ProgramId;
use crate::renderer::gl;

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 POSITION;
layout(location = 1) in vec3 NORMAL;
layout(location = 2) in vec2 TEXCOORD;
out vec2 tex_coords;
out vec3 normal;
uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;
void main() {
    tex_coords = TEXCOORD;
    normal = mat3(model) * NORMAL;
    gl_Position = projection * view * model * vec4(POSITION, 1.0);
}
"#;
const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
out vec4 FRAG_COLOR;
in vec2 tex_coords;
in vec3 normal;
uniform sampler2D texture_diffuse1;
void main() {
    vec3 light_dir = normalize(vec3(0.4, 1.0, 0.6));
    float lambert = 0.35 + 0.65 * max(dot(normalize(normal), light_dir), 0.0);
    vec3 linear_color = texture(texture_diffuse1, tex_coords).rgb * lambert;
    // The framebuffer is not SRGB, so we transform the linear color to close-enough-to-srgb.
    FRAG_COLOR = vec4(pow(linear_color, vec3(1.0 / 2.2)), 1.0);
}
"#;

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("compiling the {stage} shader failed: {log}")]
    Compile { stage: &'static str, log: String },
    #[error("linking the shader program failed: {0}")]
    Link(String),
}

/// The program used to render models: textured with `texture_diffuse1` and
/// lit by a fixed directional light.
pub struct ShaderProgram {
    program: gl::types::GLuint,
    model_location: Option<gl::types::GLint>,
    view_location: Option<gl::types::GLint>,
    projection_location: Option<gl::types::GLint>,
}

impl ShaderProgram {
    /// Compiles and links the model program. Requires a current context.
    pub fn new() -> Result<ShaderProgram, ShaderError> {
        let vertex_shader = gl::create_shader(gl::VERTEX_SHADER, VERTEX_SHADER)
            .map_err(|log| ShaderError::Compile { stage: "vertex", log })?;
        let fragment_shader = match gl::create_shader(gl::FRAGMENT_SHADER, FRAGMENT_SHADER) {
            Ok(shader) => shader,
            Err(log) => {
                gl::call!(gl::DeleteShader(vertex_shader));
                return Err(ShaderError::Compile {
                    stage: "fragment",
                    log,
                });
            }
        };
        let program = gl::create_program(&[vertex_shader, fragment_shader]);
        gl::call!(gl::DeleteShader(vertex_shader));
        gl::call!(gl::DeleteShader(fragment_shader));
        let program = program.map_err(ShaderError::Link)?;

        Ok(ShaderProgram {
            program,
            model_location: gl::get_uniform_location(program, "model"),
            view_location: gl::get_uniform_location(program, "view"),
            projection_location: gl::get_uniform_location(program, "projection"),
        })
    }

    pub fn id(&self) -> ProgramId {
        ProgramId(self.program)
    }

    pub fn activate(&self) {
        gl::call!(gl::UseProgram(self.program));
    }

    /// Uploads the transform uniforms. The program must be active.
    pub fn set_matrices(&self, model: Mat4, view: Mat4, projection: Mat4) {
        let uniforms = [
            (self.model_location, model),
            (self.view_location, view),
            (self.projection_location, projection),
        ];
        for (location, matrix) in uniforms {
            if let Some(location) = location {
                let columns = matrix.to_cols_array();
                gl::call!(gl::UniformMatrix4fv(location, 1, gl::FALSE, columns.as_ptr()));
            }
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        gl::call!(gl::DeleteProgram(self.program));
    }
}
