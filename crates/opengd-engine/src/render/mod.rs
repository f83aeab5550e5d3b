//! Quad rendering: CPU-side recording and GPU replay.
//!
//! [`Canvas`] holds the per-frame drawing state and records a [`DrawList`].
//! [`QuadRenderer`] replays it with the [`ShaderProgram`] pipelines, the
//! shared unit quad from [`GeometryCache`] and textures from
//! [`TextureStore`].
//!
//! Convention:
//! - CPU geometry is in screen pixels (top-left origin, +Y down).
//! - The projection uniform converts to clip space.

mod canvas;
mod ctx;
mod frame_cache;
mod list;
mod mesh;
mod quad;
mod shader;
mod state;
mod texture;

pub use canvas::{Canvas, ortho, quad_model};
pub use ctx::{RenderCtx, RenderTarget};
pub use frame_cache::FrameCache;
pub use list::{DrawCmd, DrawList, QuadCmd};
pub use mesh::{GeometryCache, Mesh, MeshData, Vertex, Vertex2D, Vertex3D, load_quad_model};
pub use quad::QuadRenderer;
pub use shader::{DrawUniforms, ShaderError, ShaderProgram, ShaderSources, ShaderStage};
pub use state::{BlendMode, BoundTexture, Sampling};
pub use texture::{CpuTexture, RawTexture, Texture, TextureStore};
