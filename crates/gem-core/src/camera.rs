//! Orbital camera and the controls that keep it inside its limits.
//!
//! The camera is described in spherical coordinates around a focus point.
//! `OrbitControls` owns the camera together with the viewport aspect ratio
//! and caches the combined projection×view matrix, recomputing it after
//! every adjustment so a draw never observes a stale matrix.

use crate::constants::*;
use glam::{Mat4, Vec3};

/// Camera parameterised by distance, polar angle `phi` (from +Y) and
/// azimuthal angle `theta` around `focus`.
#[derive(Clone, Debug)]
pub struct OrbitalCamera {
    pub focus: Vec3,
    pub distance: f32,
    pub phi: f32,
    pub theta: f32,
}

impl OrbitalCamera {
    pub fn new(focus: Vec3, distance: f32) -> Self {
        Self {
            focus,
            distance,
            phi: std::f32::consts::FRAC_PI_2,
            theta: 0.0,
        }
    }

    pub fn eye_position(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.focus + self.distance * Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.focus, Vec3::Y)
    }
}

impl Default for OrbitalCamera {
    fn default() -> Self {
        let mut camera = Self::new(Vec3::ZERO, CAMERA_DEFAULT_DISTANCE);
        camera.phi = CAMERA_DEFAULT_PHI;
        camera.theta = CAMERA_DEFAULT_THETA;
        camera
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CameraLimits {
    pub min_phi: f32,
    pub max_phi: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self {
            min_phi: CAMERA_PHI_EPSILON,
            max_phi: std::f32::consts::PI - CAMERA_PHI_EPSILON,
            min_distance: CAMERA_MIN_DISTANCE,
            max_distance: CAMERA_MAX_DISTANCE,
        }
    }
}

impl CameraLimits {
    #[inline]
    pub fn clamp_phi(&self, phi: f32) -> f32 {
        phi.clamp(self.min_phi, self.max_phi)
    }

    #[inline]
    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }
}

#[inline]
pub fn projection_matrix(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(FOVY_RADIANS, aspect, Z_NEAR, Z_FAR)
}

/// Camera plus viewport, with the combined matrix kept in sync.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    camera: OrbitalCamera,
    limits: CameraLimits,
    aspect: f32,
    projection: Mat4,
    view_projection: Mat4,
}

impl OrbitControls {
    pub fn new(camera: OrbitalCamera, limits: CameraLimits, aspect: f32) -> Self {
        let mut controls = Self {
            camera,
            limits,
            aspect: sanitize_aspect(aspect),
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
        };
        controls.camera.phi = limits.clamp_phi(controls.camera.phi);
        controls.camera.distance = limits.clamp_distance(controls.camera.distance);
        controls.update_matrices();
        controls
    }

    /// Rotate by a canvas-normalised pointer delta. `theta` is free, `phi` is clamped.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.camera.theta -= DRAG_THETA_SPEED * dx;
        self.camera.phi -= DRAG_PHI_SPEED * dy;
        self.camera.phi = self.limits.clamp_phi(self.camera.phi);
        self.update_matrices();
    }

    /// Dolly by a number of wheel notches.
    pub fn wheel(&mut self, delta: f32) {
        let d = self.camera.distance + WHEEL_DISTANCE_STEP * delta;
        self.camera.distance = self.limits.clamp_distance(d);
        self.update_matrices();
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
        self.update_matrices();
    }

    pub fn camera(&self) -> &OrbitalCamera {
        &self.camera
    }

    pub fn limits(&self) -> CameraLimits {
        self.limits
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn eye_position(&self) -> Vec3 {
        self.camera.eye_position()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    fn update_matrices(&mut self) {
        self.projection = projection_matrix(self.aspect);
        self.view_projection = self.projection * self.camera.view_matrix();
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(OrbitalCamera::default(), CameraLimits::default(), 1.0)
    }
}

#[inline]
fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}
