use std::fmt;

use shaderload::SourceLoader;

use crate::error::RenderError;
use crate::gpu::GraphicsContext;
use crate::types::ShaderNames;

/// Upper bound on the size of a driver diagnostic kept in memory.
pub const DIAGNOSTIC_LIMIT: usize = 64 * 1024;

const MISSING_DIAGNOSTIC: &str = "driver reported failure without a diagnostic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Source text for one stage, checked to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    stage: ShaderStage,
    text: String,
}

impl ShaderSource {
    pub fn new(stage: ShaderStage, text: impl Into<String>) -> Result<Self, RenderError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RenderError::EmptySource(stage));
        }
        Ok(Self { stage, text })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Both stages of the playground program, loaded before any GPU work starts.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: ShaderSource,
    pub fragment: ShaderSource,
}

impl ShaderSources {
    /// Fetches both stages through `loader`. Any failure here is fatal: there
    /// is nothing to compile without source text.
    pub fn load<L>(loader: &L, names: &ShaderNames) -> Result<Self, RenderError>
    where
        L: SourceLoader + ?Sized,
    {
        let vertex = load_stage(loader, ShaderStage::Vertex, &names.vertex)?;
        let fragment = load_stage(loader, ShaderStage::Fragment, &names.fragment)?;
        Ok(Self { vertex, fragment })
    }
}

fn load_stage<L>(loader: &L, stage: ShaderStage, name: &str) -> Result<ShaderSource, RenderError>
where
    L: SourceLoader + ?Sized,
{
    let text = loader
        .load(name)
        .map_err(|source| RenderError::ResourceLoad {
            name: name.to_string(),
            source,
        })?;
    tracing::debug!(%stage, shader = name, bytes = text.len(), "loaded shader source");
    ShaderSource::new(stage, text)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Success,
    Failed { diagnostic: String },
}

impl StageStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StageStatus::Success)
    }

    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            StageStatus::Success => None,
            StageStatus::Failed { diagnostic } => Some(diagnostic),
        }
    }
}

/// A driver shader object plus the outcome of compiling it.
///
/// Consumed by [`link_program`](crate::gpu::link_program), which releases the
/// driver object; a stage can therefore never be linked twice.
#[must_use = "compiled stages leak their driver object unless they are linked"]
#[derive(Debug)]
pub struct CompiledStage<C: GraphicsContext + ?Sized> {
    shader: C::Shader,
    stage: ShaderStage,
    status: StageStatus,
}

impl<C: GraphicsContext + ?Sized> CompiledStage<C> {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn status(&self) -> &StageStatus {
        &self.status
    }

    pub fn is_compiled(&self) -> bool {
        self.status.is_success()
    }

    pub(crate) fn raw(&self) -> C::Shader {
        self.shader
    }

    pub(crate) fn release(self, ctx: &C) {
        ctx.delete_shader(self.shader);
    }
}

/// Compiles one stage, blocking until the driver reports a status.
///
/// A failed compile is not an `Err`: the stage comes back with
/// [`StageStatus::Failed`] and is still expected to be handed to the linker.
/// `Err` is reserved for the driver refusing to allocate a shader object.
pub fn compile_stage<C>(ctx: &C, source: ShaderSource) -> Result<CompiledStage<C>, RenderError>
where
    C: GraphicsContext + ?Sized,
{
    let stage = source.stage();
    let shader = ctx.create_shader(stage)?;
    ctx.shader_source(shader, source.text());
    ctx.compile_shader(shader);

    let status = if ctx.shader_compile_status(shader) {
        let log = ctx.shader_info_log(shader);
        if !log.trim().is_empty() {
            tracing::debug!(%stage, log = %log.trim_end(), "shader compiled with messages");
        }
        StageStatus::Success
    } else {
        let diagnostic = bound_diagnostic(ctx.shader_info_log(shader));
        tracing::error!(%stage, "shader compilation failed:\n{diagnostic}");
        StageStatus::Failed { diagnostic }
    };

    Ok(CompiledStage {
        shader,
        stage,
        status,
    })
}

/// Normalises a driver info log into a non-empty diagnostic of bounded size.
pub(crate) fn bound_diagnostic(log: String) -> String {
    let trimmed = log.trim_end();
    if trimmed.trim().is_empty() {
        return MISSING_DIAGNOSTIC.to_string();
    }
    if trimmed.len() <= DIAGNOSTIC_LIMIT {
        return trimmed.to_string();
    }

    let mut cut = DIAGNOSTIC_LIMIT;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    tracing::warn!(
        original_bytes = trimmed.len(),
        kept_bytes = cut,
        "truncated oversized driver diagnostic"
    );
    let mut bounded = trimmed[..cut].to_string();
    bounded.push_str("\n[diagnostic truncated]");
    bounded
}
