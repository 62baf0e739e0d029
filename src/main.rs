use std::error::Error;
use std::ffi::c_void;
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Instant;

use glam::{Mat4, Vec2, Vec3};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::video::{GLContext, GLProfile, Window};
use sdl2::EventPump;

use gl_model::camera::{Camera, CameraInput};
use gl_model::config::ViewerConfig;
use gl_model::renderer::{self, Model, Renderer};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(argument) = std::env::args_os().nth(1) else {
        anyhow::bail!("usage: gl-model-viewer <model file | viewer.json>");
    };
    let config = ViewerConfig::from_argument(&PathBuf::from(argument))?;

    let sdl_context = sdl2::init().map_err(SdlErr)?;
    let video_subsystem = sdl_context.video().map_err(SdlErr)?;
    let gl_attr = video_subsystem.gl_attr();
    gl_attr.set_context_profile(GLProfile::GLES);
    gl_attr.set_context_version(3, 0);
    gl_attr.set_depth_size(24);
    // Linear->SRGB conversion is done in shader, thanks to lacking WebGL support.
    gl_attr.set_framebuffer_srgb_compatible(false);
    let (width, height) = config.window_size;
    let window = video_subsystem
        .window(env!("CARGO_PKG_NAME"), width, height)
        .resizable()
        .opengl()
        .build()?;
    let gl_context = window.gl_create_context().map_err(SdlErr)?;
    renderer::load_gl_with(|s| video_subsystem.gl_get_proc_address(s) as *const c_void);
    video_subsystem.gl_set_swap_interval(1).map_err(SdlErr)?;
    sdl_context.mouse().set_relative_mouse_mode(true);
    let event_pump = sdl_context.event_pump().map_err(SdlErr)?;

    let (drawable_width, drawable_height) = window.drawable_size();
    let mut renderer = Renderer::new(drawable_width as i32, drawable_height as i32)?;
    let model = renderer.load_model(&config.model)?;
    for degraded in model.degraded_textures() {
        log::warn!("{:?} texture '{}' is a placeholder", degraded.kind, degraded.path);
    }

    let mut state = State {
        camera: Camera::new(config.camera_position, config.camera_yaw, config.camera_pitch),
        model_transform: Mat4::from_scale_rotation_translation(
            Vec3::splat(config.model_scale),
            glam::Quat::IDENTITY,
            config.model_translation,
        ),
        clear_color: config.clear_color,
        last_frame: Instant::now(),
        model,
        renderer,
        event_pump,
        window,
        _gl_context: gl_context,
    };
    while state.run_frame() {}
    Ok(())
}

/// Everything the frame loop needs. Field order is drop order: GPU objects go
/// before the context that owns them.
struct State {
    camera: Camera,
    model_transform: Mat4,
    clear_color: Vec3,
    last_frame: Instant,
    model: Model,
    renderer: Renderer,
    event_pump: EventPump,
    window: Window,
    _gl_context: GLContext,
}

impl State {
    /// Returns false once the viewer should close.
    fn run_frame(&mut self) -> bool {
        let now = Instant::now();
        let delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let mut input = CameraInput::default();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return false,
                Event::Window {
                    win_event: WindowEvent::Resized(w, h),
                    ..
                } => self.renderer.resize(w, h),
                Event::MouseMotion { xrel, yrel, .. } => {
                    input.look += Vec2::new(xrel as f32, -yrel as f32);
                }
                Event::MouseWheel { y, .. } => input.zoom += y as f32,
                _ => {}
            }
        }
        let keyboard = self.event_pump.keyboard_state();
        input.forward = keyboard.is_scancode_pressed(Scancode::W);
        input.backward = keyboard.is_scancode_pressed(Scancode::S);
        input.left = keyboard.is_scancode_pressed(Scancode::A);
        input.right = keyboard.is_scancode_pressed(Scancode::D);
        self.camera.update(&input, delta_time);

        let (width, height) = self.window.drawable_size();
        let aspect_ratio = width as f32 / height.max(1) as f32;
        self.renderer.render(
            &self.model,
            self.model_transform,
            self.camera.view_matrix(),
            self.camera.projection(aspect_ratio),
            self.clear_color,
        );
        self.window.gl_swap_window();
        true
    }
}

#[derive(Debug)]
pub struct SdlErr(String);
impl Display for SdlErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sdl error: {}", self.0)
    }
}
impl Error for SdlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}
