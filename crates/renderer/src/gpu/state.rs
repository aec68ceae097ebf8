use crate::compile::{compile_stage, CompiledStage, ShaderSources, StageStatus};
use crate::error::RenderError;
use crate::runtime::TimeSample;
use crate::types::{ShaderErrorPolicy, Viewport};

use super::context::GraphicsContext;
use super::pipeline::{link_program, LinkedProgram};
use super::quad::{QUAD_VERTEX_COUNT, QUAD_VERTICES};
use super::uniforms::{update_frame, FrameUniforms};

pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// The single program the playground renders with, plus everything a frame
/// needs: resolved uniforms, the quad, and the current viewport.
#[derive(Debug)]
pub struct ShaderProgram<C: GraphicsContext + ?Sized> {
    program: LinkedProgram<C>,
    uniforms: FrameUniforms<C>,
    quad: C::Quad,
    viewport: Viewport,
}

impl<C: GraphicsContext + ?Sized> ShaderProgram<C> {
    /// Compiles, links and binds `sources`.
    ///
    /// Under [`ShaderErrorPolicy::Continue`] a broken program is kept and
    /// rendered with; its diagnostics have already been logged. Under
    /// [`ShaderErrorPolicy::FailFast`] the first compile or link failure is
    /// returned and every driver object created so far is released.
    pub fn build(
        ctx: &C,
        sources: ShaderSources,
        policy: ShaderErrorPolicy,
        viewport: Viewport,
    ) -> Result<Self, RenderError> {
        // Validation checks against the bound vertex array, so the quad goes first.
        let quad = ctx.create_quad(&QUAD_VERTICES)?;

        let program = match link_sources(ctx, sources, policy) {
            Ok(program) => program,
            Err(err) => {
                ctx.delete_quad(quad);
                return Err(err);
            }
        };

        if !program.is_linked() && policy.is_fail_fast() {
            let diagnostic = program.diagnostic().unwrap_or_default().to_string();
            program.release(ctx);
            ctx.delete_quad(quad);
            return Err(RenderError::Link { diagnostic });
        }

        // Location queries on an unlinked program are a GL error.
        let uniforms = if program.is_linked() {
            ctx.use_program(Some(program.raw()));
            FrameUniforms::resolve(ctx, program.raw())
        } else {
            tracing::warn!("rendering without a linked program; frames will be blank");
            FrameUniforms::absent()
        };
        ctx.viewport(viewport.width, viewport.height);

        tracing::info!(
            linked = program.is_linked(),
            valid = program.is_valid(),
            time = !uniforms.time.is_absent(),
            resolution = !uniforms.resolution.is_absent(),
            width = viewport.width,
            height = viewport.height,
            "shader program ready"
        );

        Ok(Self {
            program,
            uniforms,
            quad,
            viewport,
        })
    }

    pub fn program(&self) -> &LinkedProgram<C> {
        &self.program
    }

    pub fn uniforms(&self) -> &FrameUniforms<C> {
        &self.uniforms
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, ctx: &C, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return;
        }
        tracing::debug!(width = viewport.width, height = viewport.height, "viewport resized");
        self.viewport = viewport;
        ctx.viewport(viewport.width, viewport.height);
    }

    /// Updates uniforms, clears and draws the quad. The caller presents.
    pub fn render_frame(&self, ctx: &C, time: TimeSample) {
        update_frame(
            ctx,
            &self.uniforms,
            time.seconds,
            self.viewport.width,
            self.viewport.height,
        );
        ctx.clear(CLEAR_COLOR);
        ctx.draw_triangles(self.quad, QUAD_VERTEX_COUNT);
    }

    pub fn destroy(self, ctx: &C) {
        ctx.use_program(None);
        ctx.delete_quad(self.quad);
        self.program.release(ctx);
    }
}

fn link_sources<C>(
    ctx: &C,
    sources: ShaderSources,
    policy: ShaderErrorPolicy,
) -> Result<LinkedProgram<C>, RenderError>
where
    C: GraphicsContext + ?Sized,
{
    let vertex = compile_stage(ctx, sources.vertex)?;
    let fragment = match compile_stage(ctx, sources.fragment) {
        Ok(fragment) => fragment,
        Err(err) => {
            vertex.release(ctx);
            return Err(err);
        }
    };

    if policy.is_fail_fast() {
        if let Some(err) = compile_failure(&vertex).or_else(|| compile_failure(&fragment)) {
            vertex.release(ctx);
            fragment.release(ctx);
            return Err(err);
        }
    }

    link_program(ctx, vertex, fragment)
}

fn compile_failure<C>(stage: &CompiledStage<C>) -> Option<RenderError>
where
    C: GraphicsContext + ?Sized,
{
    match stage.status() {
        StageStatus::Success => None,
        StageStatus::Failed { diagnostic } => Some(RenderError::Compile {
            stage: stage.stage(),
            diagnostic: diagnostic.clone(),
        }),
    }
}
