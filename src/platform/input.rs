//! Raw input to discrete game commands
//!
//! Platform-agnostic: the wasm entry point feeds browser events in and
//! forwards whatever comes out, in arrival order.

/// Discrete command understood by the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    MoveLeft,
    MoveRight,
    Pause,
}

/// Default horizontal swipe distance (CSS pixels) needed to register
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 30.0;

/// Keyboard, pointer and touch mapping
#[derive(Debug, Clone)]
pub struct InputMapper {
    swipe_threshold: f32,
    /// X of the touch currently in progress
    touch_start_x: Option<f32>,
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl InputMapper {
    pub fn new(swipe_threshold: f32) -> Self {
        Self {
            swipe_threshold,
            touch_start_x: None,
        }
    }

    /// Map a `KeyboardEvent.key` value
    pub fn key(&self, key: &str) -> Option<InputEvent> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(InputEvent::MoveLeft),
            "ArrowRight" | "d" | "D" => Some(InputEvent::MoveRight),
            "Escape" | "p" | "P" => Some(InputEvent::Pause),
            _ => None,
        }
    }

    /// A click: left half moves left, right half moves right
    pub fn click(&self, x: f32, width: f32) -> InputEvent {
        if x < width / 2.0 {
            InputEvent::MoveLeft
        } else {
            InputEvent::MoveRight
        }
    }

    pub fn touch_start(&mut self, x: f32) {
        self.touch_start_x = Some(x);
    }

    /// Finish a touch; a horizontal swipe past the threshold is a move
    pub fn touch_end(&mut self, x: f32) -> Option<InputEvent> {
        let start = self.touch_start_x.take()?;
        let dx = x - start;
        if dx.abs() <= self.swipe_threshold {
            return None;
        }
        Some(if dx < 0.0 {
            InputEvent::MoveLeft
        } else {
            InputEvent::MoveRight
        })
    }

    pub fn touch_cancel(&mut self) {
        self.touch_start_x = None;
    }
}
