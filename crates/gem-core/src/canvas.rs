//! Viewport size and the pointer/wheel/resize notifications the renderer listens to.

use crate::observer::Observers;
use std::cell::Cell;

/// Canvas-normalised pointer movement (1.0 = full canvas width/height).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragDelta {
    pub dx: f32,
    pub dy: f32,
}

pub struct CanvasEvents {
    size: Cell<(u32, u32)>,
    pub mouse_drag: Observers<DragDelta>,
    pub mouse_wheel: Observers<f32>,
    pub canvas_resize: Observers<()>,
}

impl CanvasEvents {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Cell::new((width.max(1), height.max(1))),
            mouse_drag: Observers::new(),
            mouse_wheel: Observers::new(),
            canvas_resize: Observers::new(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.size.get();
        w as f32 / h.max(1) as f32
    }

    /// Store the new size and notify; zero-sized (minimised) viewports are ignored.
    pub fn resize(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.size.set((width, height));
        self.canvas_resize.notify(&());
    }

    pub fn drag(&self, delta: DragDelta) {
        self.mouse_drag.notify(&delta);
    }

    pub fn wheel(&self, notches: f32) {
        self.mouse_wheel.notify(&notches);
    }
}

/// Turns pixel positions from press/move/release into drag deltas.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerTracker {
    pressed: bool,
    last: (f32, f32),
}

impl PointerTracker {
    pub fn press(&mut self, x: f32, y: f32) {
        self.pressed = true;
        self.last = (x, y);
    }

    pub fn release(&mut self) {
        self.pressed = false;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Returns the delta since the previous position, only while pressed.
    pub fn moved(&mut self, x: f32, y: f32, width: f32, height: f32) -> Option<DragDelta> {
        if !self.pressed || width <= 0.0 || height <= 0.0 {
            return None;
        }
        let (lx, ly) = self.last;
        self.last = (x, y);
        Some(DragDelta {
            dx: (x - lx) / width,
            dy: (y - ly) / height,
        })
    }
}

/// Raw wheel delta → notches (sign only; browsers and platforms disagree on magnitude).
#[inline]
pub fn wheel_notches(delta: f64) -> f32 {
    if delta > 0.0 {
        1.0
    } else if delta < 0.0 {
        -1.0
    } else {
        0.0
    }
}
