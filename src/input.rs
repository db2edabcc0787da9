use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;

/// Pixels of trackpad scroll treated as one wheel line
const PIXELS_PER_LINE: f32 = 40.0;

/// What a held pointer button does while dragging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragMode {
    Rotate,
    Pan,
}

/// Bridges winit pointer events to orbit control input
#[derive(Debug, Clone, Default)]
pub struct PointerInput {
    /// Button currently dragging, first pressed wins
    drag: Option<DragMode>,
    /// Current cursor position relative to the window
    position: Option<(f32, f32)>,
    /// Drag movement since last flush
    delta: (f32, f32),
    /// Wheel lines since last flush
    scroll: f32,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a window event; returns whether it was pointer input
    pub fn process_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(mode) = Self::drag_mode(*button) else {
                    return false;
                };
                match state {
                    ElementState::Pressed => self.press(mode),
                    ElementState::Released => self.release(mode),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_to(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.position = None;
                self.drag = None;
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.scroll(lines);
                true
            }
            _ => false,
        }
    }

    pub fn press(&mut self, mode: DragMode) {
        if self.drag.is_none() {
            self.drag = Some(mode);
        }
    }

    pub fn release(&mut self, mode: DragMode) {
        if self.drag == Some(mode) {
            self.drag = None;
        }
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        if let (Some(old), Some(_)) = (self.position, self.drag) {
            self.delta.0 += x - old.0;
            self.delta.1 += y - old.1;
        }
        self.position = Some((x, y));
    }

    pub fn scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    pub fn dragging(&self) -> Option<DragMode> {
        self.drag
    }

    pub fn position(&self) -> Option<(f32, f32)> {
        self.position
    }

    /// Hands accumulated motion to `controls` and resets it
    pub fn flush(&mut self, controls: &mut OrbitControls, camera: &PerspectiveCamera, viewport_height: f32) {
        let (dx, dy) = self.delta;
        if dx != 0.0 || dy != 0.0 {
            match self.drag {
                Some(DragMode::Rotate) => controls.rotate(dx, dy, viewport_height),
                Some(DragMode::Pan) => controls.pan(dx, dy, viewport_height, camera),
                None => {}
            }
        }
        if self.scroll != 0.0 {
            controls.zoom(self.scroll);
        }
        self.delta = (0.0, 0.0);
        self.scroll = 0.0;
    }

    fn drag_mode(button: MouseButton) -> Option<DragMode> {
        match button {
            MouseButton::Left => Some(DragMode::Rotate),
            MouseButton::Right | MouseButton::Middle => Some(DragMode::Pan),
            _ => None,
        }
    }
}
