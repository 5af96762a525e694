//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard, pointer, touch)
//! - Storage (LocalStorage on web, files on native)

pub mod input;
pub mod storage;

pub use input::{InputEvent, InputMapper};
pub use storage::{MemoryStorage, Storage};
