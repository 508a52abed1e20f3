use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Mouse state accumulated between two frames.
#[derive(Default, Debug, Clone)]
pub struct Input {
    /// Cursor position inside the window, physical pixels.
    pub cursor_position: Vec2,
    /// Cursor movement since the previous frame.
    pub cursor_delta: Vec2,
    /// Wheel movement since the previous frame, in lines.
    pub scroll_delta: Vec2,
    pub screen_size: Vec2,
    pub mouse_buttons: HashSet<MouseButton>,
    cursor_seen: bool,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears per-frame deltas.
    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    pub fn handle_cursor_move(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if self.cursor_seen {
            self.cursor_delta += position - self.cursor_position;
        }
        self.cursor_position = position;
        self.cursor_seen = true;
    }

    pub fn handle_cursor_left(&mut self) {
        self.cursor_seen = false;
        self.mouse_buttons.clear();
    }

    pub fn handle_mouse_input(&mut self, state: ElementState, button: MouseButton) {
        match state {
            ElementState::Pressed => {
                self.mouse_buttons.insert(button);
            }
            ElementState::Released => {
                self.mouse_buttons.remove(&button);
            }
        }
    }

    pub fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(x, y) => {
                self.scroll_delta += Vec2::new(x, y);
            }
            MouseScrollDelta::PixelDelta(pos) => {
                // pixel deltas from touchpads are roughly ten times larger
                self.scroll_delta += Vec2::new(pos.x as f32, pos.y as f32) * 0.1;
            }
        }
    }

    /// Feeds a winit event into the accumulated state.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => self.handle_resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor_move(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => self.handle_cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_input(*state, *button);
            }
            WindowEvent::MouseWheel { delta, .. } => self.handle_mouse_wheel(*delta),
            _ => {}
        }
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }
}
