//! Mouse orbit controls.
//!
//! Left drag orbits around the target, right drag pans it, the wheel zooms.

use glam::Vec3;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::camera::{Camera, MAX_PITCH};

/// Orbit control state and tuning.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    rotating: bool,
    panning: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.001,
            min_distance: 2.0,
            max_distance: 500.0,
            rotating: false,
            panning: false,
            last_mouse_pos: None,
        }
    }

    /// Feed a window event. Returns `true` if the camera moved.
    pub fn handle_event(&mut self, event: &WindowEvent, camera: &mut Camera) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.rotating = pressed,
                    MouseButton::Right => self.panning = pressed,
                    _ => {}
                }
                if !self.rotating && !self.panning {
                    self.last_mouse_pos = None;
                }
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                if !self.rotating && !self.panning {
                    return false;
                }
                let moved = match self.last_mouse_pos {
                    Some((last_x, last_y)) => {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        if self.rotating {
                            self.rotate(dx, dy, camera);
                        } else {
                            self.pan(dx, dy, camera);
                        }
                        true
                    }
                    None => false,
                };
                self.last_mouse_pos = Some((position.x, position.y));
                moved
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                self.zoom(scroll, camera);
                true
            }
            _ => false,
        }
    }

    /// Orbit by a mouse delta in pixels.
    pub fn rotate(&self, dx: f32, dy: f32, camera: &mut Camera) {
        camera.yaw -= dx * self.rotate_speed;
        camera.pitch = (camera.pitch + dy * self.rotate_speed).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Zoom by wheel lines; positive moves closer.
    pub fn zoom(&self, scroll: f32, camera: &mut Camera) {
        let factor = (1.0 - scroll * self.zoom_speed).max(0.1);
        camera.distance = (camera.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Slide the target in the view plane, scaled by distance so the drag
    /// speed feels constant on screen.
    pub fn pan(&self, dx: f32, dy: f32, camera: &mut Camera) {
        let forward = (camera.target - camera.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let scale = camera.distance * self.pan_speed;
        camera.target += (-right * dx + up * dy) * scale;
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}
