//! Orbit camera, its input controller and the view/projection uniform.
//!
//! The camera sits on a sphere around a target point. [`CameraController`]
//! collects mouse input (left drag rotates, right drag pans, the wheel zooms)
//! and applies it with damping in [`CameraController::update`], once per frame.

use std::f32::consts::PI;

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::config::{CameraConfig, OrbitConfig};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Keeps the polar angle off the poles where `look_at` degenerates.
const POLE_EPSILON: f32 = 1e-6;

/// Zoom factor of a single wheel step.
const ZOOM_STEP: f32 = 0.95;

/// Pixels of a pixel-based scroll delta that count as one wheel step.
const PIXELS_PER_WHEEL_STEP: f64 = 100.0;

/// A camera looking at `target` from spherical coordinates around it.
///
/// `theta` is the azimuth around the Y axis (0 looks down -Z from +Z), `phi`
/// the polar angle from the +Y axis.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl OrbitCamera {
    pub fn new(position: Point3<f32>, target: Point3<f32>) -> Self {
        let offset = position - target;
        let radius = offset.magnitude();
        let (theta, phi) = if radius == 0.0 {
            (0.0, PI / 2.0)
        } else {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        };
        Self {
            target,
            radius,
            theta,
            phi,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.position.into(), config.target.into())
    }

    pub fn position(&self) -> Point3<f32> {
        let sin_phi = self.phi.sin();
        self.target
            + Vector3::new(
                self.radius * sin_phi * self.theta.sin(),
                self.radius * self.phi.cos(),
                self.radius * sin_phi * self.theta.cos(),
            )
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }

    /// Camera right and up vectors in world space.
    fn screen_axes(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.position()).normalize();
        let right = forward.cross(Vector3::unit_y()).normalize();
        let up = right.cross(forward);
        (right, up)
    }

    pub fn clamp(&mut self, orbit: &OrbitConfig) {
        let min = orbit.min_polar_angle.max(POLE_EPSILON);
        let max = orbit.max_polar_angle.min(PI - POLE_EPSILON);
        self.phi = self.phi.clamp(min, max);
        self.radius = self.radius.max(f32::EPSILON);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn from_config(width: u32, height: u32, config: &CameraConfig) -> Self {
        Self::new(width, height, Deg(config.fov_y), config.near, config.far)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Drag {
    Rotate,
    Pan,
}

/// Collects mouse input and moves an [`OrbitCamera`] with damping.
#[derive(Debug)]
pub struct CameraController {
    config: OrbitConfig,
    viewport_height: f32,
    drag: Option<Drag>,
    cursor: Option<PhysicalPosition<f64>>,
    // Pending changes, drained by `update`
    delta_theta: f32,
    delta_phi: f32,
    pan_pixels: (f32, f32),
    pan_offset: Vector3<f32>,
    zoom_scale: f32,
}

impl CameraController {
    pub fn new(config: OrbitConfig, viewport_height: u32) -> Self {
        Self {
            config,
            viewport_height: viewport_height.max(1) as f32,
            drag: None,
            cursor: None,
            delta_theta: 0.0,
            delta_phi: 0.0,
            pan_pixels: (0.0, 0.0),
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            zoom_scale: 1.0,
        }
    }

    pub fn resize(&mut self, viewport_height: u32) {
        self.viewport_height = viewport_height.max(1) as f32;
    }

    /// Queues a rotation for a cursor movement of `dx`/`dy` pixels.
    pub fn rotate_pixels(&mut self, dx: f32, dy: f32) {
        let scale = 2.0 * PI * self.config.rotate_speed / self.viewport_height;
        self.delta_theta -= dx * scale;
        self.delta_phi -= dy * scale;
    }

    /// Queues a pan for a cursor movement of `dx`/`dy` pixels.
    pub fn pan_pixels(&mut self, dx: f32, dy: f32) {
        if !self.config.enable_pan {
            return;
        }
        self.pan_pixels.0 += dx * self.config.pan_speed;
        self.pan_pixels.1 += dy * self.config.pan_speed;
    }

    /// Positive steps zoom in.
    pub fn zoom_steps(&mut self, steps: f32) {
        self.zoom_scale *= ZOOM_STEP.powf(steps * self.config.zoom_speed);
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let drag = match button {
                    MouseButton::Left => Drag::Rotate,
                    MouseButton::Right => Drag::Pan,
                    _ => return,
                };
                match state {
                    ElementState::Pressed => self.drag = Some(drag),
                    ElementState::Released if self.drag == Some(drag) => self.drag = None,
                    ElementState::Released => (),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (Some(drag), Some(last)) = (self.drag, self.cursor) {
                    let dx = (position.x - last.x) as f32;
                    let dy = (position.y - last.y) as f32;
                    match drag {
                        Drag::Rotate => self.rotate_pixels(dx, dy),
                        Drag::Pan => self.pan_pixels(dx, dy),
                    }
                }
                self.cursor = Some(*position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_WHEEL_STEP) as f32,
                };
                self.zoom_steps(steps);
            }
            WindowEvent::Resized(size) => self.resize(size.height),
            _ => (),
        }
    }

    /// Applies pending input to `camera`. Called once per frame.
    pub fn update(&mut self, camera: &mut OrbitCamera, projection: &Projection) {
        let (dx, dy) = std::mem::take(&mut self.pan_pixels);
        if dx != 0.0 || dy != 0.0 {
            let target_distance = camera.radius * (projection.fovy().0 / 2.0).tan();
            let per_pixel = 2.0 * target_distance / self.viewport_height;
            let (right, up) = camera.screen_axes();
            self.pan_offset += right * (-dx * per_pixel) + up * (dy * per_pixel);
        }

        let damping = self.config.damping;
        camera.theta += self.delta_theta * damping;
        camera.phi += self.delta_phi * damping;
        camera.target += self.pan_offset * damping;
        camera.radius *= self.zoom_scale;
        camera.clamp(&self.config);

        self.delta_theta *= 1.0 - damping;
        self.delta_phi *= 1.0 - damping;
        self.pan_offset *= 1.0 - damping;
        self.zoom_scale = 1.0;
    }

    /// True while queued rotation or pan has not decayed yet.
    pub fn is_moving(&self) -> bool {
        const REST: f32 = 1e-6;
        self.delta_theta.abs() > REST
            || self.delta_phi.abs() > REST
            || self.pan_offset.magnitude() > REST
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &OrbitCamera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: OrbitCamera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}
