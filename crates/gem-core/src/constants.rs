// Shared camera, parameter and shader tuning constants used by both web and native frontends.

// Orbital camera defaults
pub const CAMERA_DEFAULT_DISTANCE: f32 = 1.8;
pub const CAMERA_DEFAULT_PHI: f32 = 1.1;
pub const CAMERA_DEFAULT_THETA: f32 = 2.0;

// Camera limits
pub const CAMERA_PHI_EPSILON: f32 = 0.2; // keeps the eye off the poles
pub const CAMERA_MIN_DISTANCE: f32 = 1.8;
pub const CAMERA_MAX_DISTANCE: f32 = 8.0;

// Interaction speeds (per canvas-normalised drag unit / per wheel notch)
pub const DRAG_THETA_SPEED: f32 = 0.5 * 2.0 * std::f32::consts::PI;
pub const DRAG_PHI_SPEED: f32 = 0.5 * 2.0 * 3.0;
pub const WHEEL_DISTANCE_STEP: f32 = 0.2;

// Projection
pub const FOVY_RADIANS: f32 = std::f32::consts::FRAC_PI_4;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

// Bounding volume
pub const CUBE_VERTEX_COUNT: u32 = 3 * 2 * 6;
pub const CUBE_COMPONENTS: u32 = 3;

// Parameter ranges
pub const MIN_RAY_DEPTH: u32 = 1;
pub const MAX_RAY_DEPTH: u32 = 10;
pub const MIN_REFRACTION_INDEX: f32 = 1.0;
pub const MAX_REFRACTION_INDEX: f32 = 3.0;
pub const MAX_ABSORPTION: f32 = 10.0;

// Keyboard step sizes
pub const REFRACTION_STEP: f32 = 0.05;
pub const ABSORPTION_STEP: f32 = 0.1;

// Shader build failure surface
pub const SHADER_LOAD_FAIL_ID: &str = "shader_load_fail";
pub const SHADER_LOAD_FAIL_MESSAGE: &str = "Failed to load/build the shader.";

// Tolerance of the CPU inside-test; matches the WGSL template
pub const INSIDE_EPSILON: f32 = 1e-4;
