//! Shader program lifecycle on top of an explicit driver seam.
//!
//! - `context` defines [`GraphicsContext`], the slice of the driver every
//!   other module talks to. Nothing here touches global GL state directly.
//! - `opengl` implements the trait over the `gl` crate for the window loop.
//! - `pipeline` links two compiled stages into a [`LinkedProgram`] and runs
//!   the separate validation pass.
//! - `uniforms` resolves the `time`/`resolution` handles and pushes their
//!   values once per frame.
//! - `quad` holds the six-vertex full-screen geometry.
//! - `state` glues the above into [`ShaderProgram`], the object `window`
//!   drives.

mod context;
mod opengl;
#[cfg(test)]
pub(crate) mod mock;
mod pipeline;
mod quad;
mod state;
mod uniforms;

pub use context::GraphicsContext;
pub use opengl::GlContext;
pub use pipeline::{link_program, LinkedProgram};
pub use quad::{QUAD_VERTEX_COUNT, QUAD_VERTICES};
pub use state::{ShaderProgram, CLEAR_COLOR};
pub use uniforms::{
    resolve_uniform, update_frame, FrameUniforms, UniformHandle, RESOLUTION_UNIFORM, TIME_UNIFORM,
};
