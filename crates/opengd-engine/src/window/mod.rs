//! Window + platform event pump.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GPU layer.
//! The loop is driven by the caller through [`Platform::pump`] rather than
//! by `run_app`, so the game loop keeps control of frame timing.

mod platform;

pub use platform::{CloseLatch, Platform, WindowSettings};
