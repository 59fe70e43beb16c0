//! Viewer parameters, their change notifications and query-string overrides.

use crate::constants::*;
use crate::error::ConfigError;
use crate::observer::{Observers, Subscription};
use glam::Vec3;
use std::cell::RefCell;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `rrggbb`, with or without a leading `#`.
    pub fn from_hex(s: &str) -> Result<Self, ConfigError> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || ConfigError::InvalidColor(s.to_string());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_unit_rgba(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }
}

pub const BACKGROUND_PRESETS: [Rgb; 4] = [
    Rgb::new(20, 22, 28),
    Rgb::new(0, 0, 0),
    Rgb::new(235, 235, 240),
    Rgb::new(40, 60, 90),
];

pub const GEM_COLOR_PRESETS: [Rgb; 5] = [
    Rgb::new(170, 220, 255),
    Rgb::new(255, 255, 255),
    Rgb::new(255, 40, 60),
    Rgb::new(40, 200, 90),
    Rgb::new(250, 190, 40),
];

/// Snapshot of every value the renderer reads.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    pub background_color: Rgb,
    pub gem_color: Rgb,
    pub absorption: f32,
    pub ray_depth: u32,
    pub refraction_index: f32,
    pub display_normals: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            background_color: BACKGROUND_PRESETS[0],
            gem_color: GEM_COLOR_PRESETS[0],
            absorption: 0.6,
            ray_depth: 5,
            refraction_index: 2.42,
            display_normals: false,
        }
    }
}

impl Parameters {
    /// Per-channel absorption: `absorption * (1 - channel / 255)`.
    pub fn absorption_vector(&self) -> Vec3 {
        absorption_vector(self.gem_color, self.absorption)
    }

    /// Apply `key=value&...` overrides. Bad values are returned as errors and
    /// skipped; unknown keys are logged and ignored.
    pub fn apply_query(&mut self, query: &str) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let query = query.trim_start_matches('?');
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if let Err(e) = self.apply_pair(key, value) {
                errors.push(e);
            }
        }
        errors
    }

    fn clamped(self) -> Self {
        let defaults = Self::default();
        let finite_or = |x: f32, fallback: f32| if x.is_finite() { x } else { fallback };
        Self {
            ray_depth: clamp_ray_depth(self.ray_depth),
            refraction_index: clamp_refraction(finite_or(
                self.refraction_index,
                defaults.refraction_index,
            )),
            absorption: clamp_absorption(finite_or(self.absorption, defaults.absorption)),
            ..self
        }
    }

    fn apply_pair(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "depth" => {
                let depth: u32 = value.parse().map_err(|_| invalid())?;
                self.ray_depth = clamp_ray_depth(depth);
            }
            "ior" => {
                let ior: f32 = value.parse().map_err(|_| invalid())?;
                if !ior.is_finite() {
                    return Err(invalid());
                }
                self.refraction_index = clamp_refraction(ior);
            }
            "absorption" => {
                let a: f32 = value.parse().map_err(|_| invalid())?;
                if !a.is_finite() {
                    return Err(invalid());
                }
                self.absorption = clamp_absorption(a);
            }
            "color" => self.gem_color = Rgb::from_hex(value)?,
            "background" => self.background_color = Rgb::from_hex(value)?,
            "normals" => {
                self.display_normals = match value {
                    "1" | "true" | "on" | "" => true,
                    "0" | "false" | "off" => false,
                    _ => return Err(invalid()),
                }
            }
            other => log::warn!("[params] ignoring unknown key `{}`", other),
        }
        Ok(())
    }
}

#[inline]
pub fn absorption_vector(gem_color: Rgb, absorption: f32) -> Vec3 {
    Vec3::new(
        absorption * (1.0 - gem_color.r as f32 / 255.0),
        absorption * (1.0 - gem_color.g as f32 / 255.0),
        absorption * (1.0 - gem_color.b as f32 / 255.0),
    )
}

#[inline]
fn clamp_ray_depth(depth: u32) -> u32 {
    depth.clamp(MIN_RAY_DEPTH, MAX_RAY_DEPTH)
}

#[inline]
fn clamp_refraction(ior: f32) -> f32 {
    ior.clamp(MIN_REFRACTION_INDEX, MAX_REFRACTION_INDEX)
}

#[inline]
fn clamp_absorption(a: f32) -> f32 {
    a.clamp(0.0, MAX_ABSORPTION)
}

/// Read side of the parameter store as seen by the renderer.
pub trait ParameterSource {
    fn current(&self) -> Parameters;
    /// Fired when a value baked into the shader text changes.
    fn on_recompute_shader(&self, callback: Box<dyn FnMut()>) -> Subscription;
    fn on_background_color(&self, callback: Box<dyn FnMut(Rgb)>) -> Subscription;
}

/// Edits the keyboard bindings can make to the parameter store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamAction {
    IncreaseRayDepth,
    DecreaseRayDepth,
    ToggleNormals,
    IncreaseRefraction,
    DecreaseRefraction,
    IncreaseAbsorption,
    DecreaseAbsorption,
    CycleBackground,
    CycleGemColor,
}

pub struct ParameterStore {
    values: RefCell<Parameters>,
    recompute_shader: Observers<()>,
    background_color: Observers<Rgb>,
}

impl ParameterStore {
    /// Out-of-range fields are clamped; non-finite floats fall back to defaults.
    pub fn new(values: Parameters) -> Self {
        Self {
            values: RefCell::new(values.clamped()),
            recompute_shader: Observers::new(),
            background_color: Observers::new(),
        }
    }

    pub fn set_ray_depth(&self, depth: u32) {
        let depth = clamp_ray_depth(depth);
        let changed = {
            let mut v = self.values.borrow_mut();
            let changed = v.ray_depth != depth;
            v.ray_depth = depth;
            changed
        };
        if changed {
            log::info!("[params] ray depth -> {}", depth);
            self.recompute_shader.notify(&());
        }
    }

    pub fn set_background_color(&self, color: Rgb) {
        self.values.borrow_mut().background_color = color;
        self.background_color.notify(&color);
    }

    pub fn set_gem_color(&self, color: Rgb) {
        self.values.borrow_mut().gem_color = color;
    }

    pub fn set_absorption(&self, absorption: f32) {
        if !absorption.is_finite() {
            log::warn!("[params] ignoring non-finite absorption {}", absorption);
            return;
        }
        self.values.borrow_mut().absorption = clamp_absorption(absorption);
    }

    pub fn set_refraction_index(&self, ior: f32) {
        if !ior.is_finite() {
            log::warn!("[params] ignoring non-finite refraction index {}", ior);
            return;
        }
        self.values.borrow_mut().refraction_index = clamp_refraction(ior);
    }

    pub fn set_display_normals(&self, on: bool) {
        self.values.borrow_mut().display_normals = on;
    }

    pub fn apply(&self, action: ParamAction) {
        let cur = self.current();
        match action {
            ParamAction::IncreaseRayDepth => self.set_ray_depth(cur.ray_depth.saturating_add(1)),
            ParamAction::DecreaseRayDepth => self.set_ray_depth(cur.ray_depth.saturating_sub(1)),
            ParamAction::ToggleNormals => self.set_display_normals(!cur.display_normals),
            ParamAction::IncreaseRefraction => {
                self.set_refraction_index(cur.refraction_index + REFRACTION_STEP)
            }
            ParamAction::DecreaseRefraction => {
                self.set_refraction_index(cur.refraction_index - REFRACTION_STEP)
            }
            ParamAction::IncreaseAbsorption => self.set_absorption(cur.absorption + ABSORPTION_STEP),
            ParamAction::DecreaseAbsorption => self.set_absorption(cur.absorption - ABSORPTION_STEP),
            ParamAction::CycleBackground => {
                self.set_background_color(next_preset(&BACKGROUND_PRESETS, cur.background_color))
            }
            ParamAction::CycleGemColor => {
                self.set_gem_color(next_preset(&GEM_COLOR_PRESETS, cur.gem_color))
            }
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}

impl ParameterSource for ParameterStore {
    fn current(&self) -> Parameters {
        self.values.borrow().clone()
    }

    fn on_recompute_shader(&self, mut callback: Box<dyn FnMut()>) -> Subscription {
        self.recompute_shader.subscribe(move |_| callback())
    }

    fn on_background_color(&self, mut callback: Box<dyn FnMut(Rgb)>) -> Subscription {
        self.background_color.subscribe(move |c| callback(*c))
    }
}

fn next_preset(presets: &[Rgb], current: Rgb) -> Rgb {
    let idx = presets.iter().position(|c| *c == current);
    match idx {
        Some(i) => presets[(i + 1) % presets.len()],
        None => presets[0],
    }
}
