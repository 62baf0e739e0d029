//! Fly camera driven by Euler angles.

use glam::{Mat4, Vec2, Vec3};

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 2.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const DEFAULT_FOV: f32 = 45.0;

const PITCH_LIMIT: f32 = 89.0;
const MIN_FOV: f32 = 1.0;
const MAX_FOV: f32 = 45.0;

/// Input gathered during one frame, consumed by [`Camera::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Mouse movement in pixels, y pointing up.
    pub look: Vec2,
    /// Scroll wheel movement, positive away from the user.
    pub zoom: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Degrees, -90 looks down -Z.
    pub yaw: f32,
    /// Degrees, clamped to ±89.
    pub pitch: f32,
    /// Vertical field of view in degrees, clamped to [1, 45].
    pub fov: f32,
    pub speed: f32,
    pub sensitivity: f32,
    world_up: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Camera {
        let mut camera = Camera {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            fov: DEFAULT_FOV,
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
            world_up: Vec3::Y,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_vectors();
        camera
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Applies one frame of input. `delta_time` is in seconds.
    pub fn update(&mut self, input: &CameraInput, delta_time: f32) {
        let step = self.speed * delta_time;
        if input.forward {
            self.position += self.front * step;
        }
        if input.backward {
            self.position -= self.front * step;
        }
        if input.left {
            self.position -= self.right * step;
        }
        if input.right {
            self.position += self.right * step;
        }

        if input.look != Vec2::ZERO {
            self.yaw += input.look.x * self.sensitivity;
            self.pitch = (self.pitch + input.look.y * self.sensitivity)
                .clamp(-PITCH_LIMIT, PITCH_LIMIT);
            self.update_vectors();
        }

        self.fov = (self.fov - input.zoom).clamp(MIN_FOV, MAX_FOV);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// OpenGL clip space projection, depth in [-1, 1].
    pub fn projection(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect_ratio.max(1e-6), 0.1, 100.0)
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, 3.0), DEFAULT_YAW, DEFAULT_PITCH)
    }
}
