use glam::Vec2;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: String, pressed: bool },
    CursorPos { x: f32, y: f32 },
    MouseButton { button: MouseButton, pressed: bool },
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Device state collected from host events. Keys are matched case-insensitively.
#[derive(Debug, Default)]
pub struct Input {
    held_keys: HashSet<String>,
    cursor_pos: Option<Vec2>,
    left_pressed: bool,
    left_clicked: bool,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key { key, pressed } => {
                let key = key.to_lowercase();
                if pressed {
                    self.held_keys.insert(key);
                } else {
                    self.held_keys.remove(&key);
                }
            }
            InputEvent::CursorPos { x, y } => {
                self.cursor_pos = Some(Vec2::new(x, y));
            }
            InputEvent::MouseButton { button: MouseButton::Left, pressed } => {
                self.left_clicked |= pressed;
                self.left_pressed = pressed;
            }
            InputEvent::MouseButton { .. } | InputEvent::Other => {}
        }
    }

    pub fn clear_frame(&mut self) {
        self.left_clicked = false;
    }

    pub fn take_left_click(&mut self) -> bool {
        let was = self.left_clicked;
        self.left_clicked = false;
        was
    }

    pub fn is_key_held(&self, key: &str) -> bool {
        self.held_keys.contains(&key.to_lowercase())
    }

    pub fn left_held(&self) -> bool {
        self.left_pressed
    }

    /// Cursor position in screen pixels, if the cursor has entered the viewport.
    pub fn cursor_position(&self) -> Option<Vec2> {
        self.cursor_pos
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_follow_press_and_release() {
        let mut input = Input::new();
        input.push(InputEvent::Key { key: "X".to_string(), pressed: true });
        assert!(input.is_key_held("x"));
        input.clear_frame();
        assert!(input.is_key_held("x"), "held keys survive frame clears");
        input.push(InputEvent::Key { key: "x".to_string(), pressed: false });
        assert!(!input.is_key_held("x"));
    }

    #[test]
    fn left_click_is_consumed_once() {
        let mut input = Input::new();
        input.push(InputEvent::MouseButton { button: MouseButton::Left, pressed: true });
        assert!(input.take_left_click());
        assert!(!input.take_left_click());
        assert!(input.left_held());
        input.push(InputEvent::MouseButton { button: MouseButton::Right, pressed: true });
        input.push(InputEvent::MouseButton { button: MouseButton::Left, pressed: false });
        assert!(!input.left_held());
        assert!(!input.take_left_click(), "other buttons never register a click");
    }
}
