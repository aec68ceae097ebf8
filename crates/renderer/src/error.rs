use shaderload::LoadError;
use thiserror::Error;

use crate::compile::ShaderStage;

/// Failure reported by the graphics driver while allocating an object.
#[derive(Debug, Clone, Error)]
#[error("gl error: {0}")]
pub struct DriverError(pub String);

impl From<String> for DriverError {
    fn from(message: String) -> Self {
        DriverError(message)
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to compile {stage} shader:\n{diagnostic}")]
    Compile {
        stage: ShaderStage,
        diagnostic: String,
    },

    #[error("failed to link shader program:\n{diagnostic}")]
    Link { diagnostic: String },

    #[error("failed to load shader source `{name}`")]
    ResourceLoad {
        name: String,
        #[source]
        source: LoadError,
    },

    #[error("failed to initialise graphics context: {0}")]
    ContextInit(String),

    #[error("{0} shader source is empty")]
    EmptySource(ShaderStage),

    #[error("expected a {expected} stage but received a {found} stage")]
    StageMismatch {
        expected: ShaderStage,
        found: ShaderStage,
    },

    #[error(transparent)]
    Driver(#[from] DriverError),
}
