use crate::compile::{bound_diagnostic, CompiledStage, ShaderStage, StageStatus};
use crate::error::RenderError;

use super::context::GraphicsContext;

/// A driver program object with its link and validation outcomes.
///
/// Link and validation are tracked separately: a program can link and still
/// fail validation against the current pipeline state.
#[derive(Debug)]
pub struct LinkedProgram<C: GraphicsContext + ?Sized> {
    program: C::Program,
    link: StageStatus,
    validation: StageStatus,
}

impl<C: GraphicsContext + ?Sized> LinkedProgram<C> {
    pub fn raw(&self) -> C::Program {
        self.program
    }

    pub fn link_status(&self) -> &StageStatus {
        &self.link
    }

    pub fn validation_status(&self) -> &StageStatus {
        &self.validation
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_success()
    }

    pub fn is_valid(&self) -> bool {
        self.validation.is_success()
    }

    /// First diagnostic recorded, link before validation.
    pub fn diagnostic(&self) -> Option<&str> {
        self.link
            .diagnostic()
            .or_else(|| self.validation.diagnostic())
    }

    pub fn release(self, ctx: &C) {
        ctx.delete_program(self.program);
    }
}

/// Links a vertex and a fragment stage into a program and validates it.
///
/// Both stages are consumed and their driver objects are detached and deleted
/// whatever the outcome. Failed stages are still attached; the driver then
/// reports the link failure through the program log.
pub fn link_program<C>(
    ctx: &C,
    vertex: CompiledStage<C>,
    fragment: CompiledStage<C>,
) -> Result<LinkedProgram<C>, RenderError>
where
    C: GraphicsContext + ?Sized,
{
    if let Err(err) = check_stage(&vertex, ShaderStage::Vertex)
        .and_then(|_| check_stage(&fragment, ShaderStage::Fragment))
    {
        vertex.release(ctx);
        fragment.release(ctx);
        return Err(err);
    }

    let program = match ctx.create_program() {
        Ok(program) => program,
        Err(err) => {
            vertex.release(ctx);
            fragment.release(ctx);
            return Err(err.into());
        }
    };

    ctx.attach_shader(program, vertex.raw());
    ctx.attach_shader(program, fragment.raw());
    ctx.link_program(program);
    let linked = ctx.program_link_status(program);

    for stage in [vertex, fragment] {
        ctx.detach_shader(program, stage.raw());
        stage.release(ctx);
    }

    let link = if linked {
        StageStatus::Success
    } else {
        let diagnostic = bound_diagnostic(ctx.program_info_log(program));
        tracing::error!("shader program link failed:\n{diagnostic}");
        StageStatus::Failed { diagnostic }
    };

    ctx.validate_program(program);
    let validation = if ctx.program_validate_status(program) {
        StageStatus::Success
    } else {
        let diagnostic = bound_diagnostic(ctx.program_info_log(program));
        if linked {
            tracing::error!("shader program validation failed:\n{diagnostic}");
        }
        StageStatus::Failed { diagnostic }
    };

    tracing::debug!(
        program = ?program,
        linked,
        valid = validation.is_success(),
        "linked shader program"
    );

    Ok(LinkedProgram {
        program,
        link,
        validation,
    })
}

fn check_stage<C>(stage: &CompiledStage<C>, expected: ShaderStage) -> Result<(), RenderError>
where
    C: GraphicsContext + ?Sized,
{
    if stage.stage() == expected {
        Ok(())
    } else {
        Err(RenderError::StageMismatch {
            expected,
            found: stage.stage(),
        })
    }
}
