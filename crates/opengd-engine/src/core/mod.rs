//! Engine-facing entry point.
//!
//! [`Graphics`] ties the platform window, GPU resources, drawing state and
//! text system together behind the per-frame drawing protocol used by the
//! game loop.

mod graphics;

pub use graphics::{Graphics, GraphicsInit};
