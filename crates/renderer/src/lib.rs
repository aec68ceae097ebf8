//! Renderer crate for glslplay.
//!
//! Takes two GLSL stages from a [`SourceLoader`], turns them into a single
//! linked program and draws a full-screen quad with it every frame, feeding
//! the `time` and `resolution` uniforms:
//!
//! ```text
//!   SourceLoader ──▶ ShaderSources ──▶ compile_stage (x2) ──▶ link_program
//!                                                                 │
//!   winit loop ◀── ShaderProgram::render_frame ◀── FrameUniforms ◀┘
//! ```
//!
//! All driver calls go through [`GraphicsContext`]. The window loop uses
//! [`GlContext`]; the lifecycle tests use a recording mock.
//!
//! Sources are loaded before any window exists, so a missing or empty shader
//! file aborts startup without touching the display.

mod compile;
mod error;
pub mod gpu;
mod runtime;
mod types;
mod window;

use anyhow::Result;
use shaderload::SourceLoader;

pub use compile::{
    compile_stage, CompiledStage, ShaderSource, ShaderSources, ShaderStage, StageStatus,
    DIAGNOSTIC_LIMIT,
};
pub use error::{DriverError, RenderError};
pub use gpu::{
    link_program, resolve_uniform, update_frame, FrameUniforms, GlContext, GraphicsContext,
    LinkedProgram, ShaderProgram, UniformHandle,
};
pub use runtime::{
    time_source_for_policy, BoxedTimeSource, FixedTimeSource, RenderPolicy, SystemTimeSource,
    TimeSample, TimeSource,
};
pub use types::{RendererConfig, ShaderErrorPolicy, ShaderNames, Viewport};

/// Entry point used by the binary.
pub struct Renderer<L> {
    config: RendererConfig,
    loader: L,
}

impl<L: SourceLoader> Renderer<L> {
    pub fn new(config: RendererConfig, loader: L) -> Self {
        Self { config, loader }
    }

    pub fn load_sources(&self) -> Result<ShaderSources, RenderError> {
        ShaderSources::load(&self.loader, &self.config.shaders)
    }

    /// Loads both stages, then opens the window and blocks until it closes.
    pub fn run(self) -> Result<()> {
        let sources = self.load_sources()?;
        tracing::info!(
            vertex = %self.config.shaders.vertex,
            fragment = %self.config.shaders.fragment,
            policy = ?self.config.error_policy,
            "starting renderer"
        );
        window::run(&self.config, sources)
    }
}
