//! Time subsystem.
//!
//! - `FrameClock` produces per-frame delta times for the owning loop
//! - `FrameLimiter` caps the loop to a target frame duration by sleeping

mod frame_clock;
mod limiter;

pub use frame_clock::{FrameClock, FrameTime};
pub use limiter::FrameLimiter;
