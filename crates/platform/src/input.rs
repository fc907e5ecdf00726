//! winit events -> `CameraInput`.

use corelib::CameraInput;
use winit::event::MouseScrollDelta;
use winit::keyboard::KeyCode;

/// Trackpads report pixels; treat this many as one wheel notch.
const PIXELS_PER_LINE: f64 = 40.0;

/// Record a movement key press/release. Returns `false` for keys the camera ignores.
pub fn apply_key(input: &mut CameraInput, key: KeyCode, pressed: bool) -> bool {
    let slot = match key {
        KeyCode::KeyW | KeyCode::ArrowUp => &mut input.forward,
        KeyCode::KeyS | KeyCode::ArrowDown => &mut input.backward,
        KeyCode::KeyD | KeyCode::ArrowRight => &mut input.right,
        KeyCode::KeyA | KeyCode::ArrowLeft => &mut input.left,
        _ => return false,
    };
    *slot = pressed;
    true
}

pub fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn wasd_and_arrows_share_directions() {
        let mut input = CameraInput::default();
        assert!(apply_key(&mut input, KeyCode::KeyW, true));
        assert!(input.forward);
        assert!(apply_key(&mut input, KeyCode::ArrowUp, false));
        assert!(!input.forward);

        assert!(apply_key(&mut input, KeyCode::ArrowLeft, true));
        assert!(apply_key(&mut input, KeyCode::KeyD, true));
        assert!(input.left && input.right);
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut input = CameraInput::default();
        assert!(!apply_key(&mut input, KeyCode::Space, true));
        assert_eq!(input, CameraInput::default());
    }

    #[test]
    fn pixel_scroll_converts_to_lines() {
        assert_eq!(scroll_lines(MouseScrollDelta::LineDelta(0.0, -1.0)), -1.0);
        let px = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 80.0));
        assert_eq!(scroll_lines(px), 2.0);
    }
}
