//! OpenGD engine crate.
//!
//! This crate owns the window, GPU and asset pieces used by the game loop:
//! 2D quad and text rendering, the glyph cache, and the texture/sound
//! registry.

pub mod assets;
pub mod config;
pub mod core;
pub mod device;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod render;
pub mod text;
