use super::context::GraphicsContext;

pub const TIME_UNIFORM: &str = "time";
pub const RESOLUTION_UNIFORM: &str = "resolution";

/// A named uniform slot. `location` is `None` when the program does not use
/// the uniform; writes through such a handle are skipped.
pub struct UniformHandle<C: GraphicsContext + ?Sized> {
    name: String,
    location: Option<C::UniformLocation>,
}

impl<C: GraphicsContext + ?Sized> UniformHandle<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Option<C::UniformLocation> {
        self.location
    }

    pub fn is_absent(&self) -> bool {
        self.location.is_none()
    }

    pub fn set_f32(&self, ctx: &C, value: f32) {
        if let Some(location) = self.location {
            ctx.uniform_1f(location, value);
        }
    }

    pub fn set_vec2(&self, ctx: &C, value: [f32; 2]) {
        if let Some(location) = self.location {
            ctx.uniform_2f(location, value[0], value[1]);
        }
    }
}

impl<C: GraphicsContext + ?Sized> Clone for UniformHandle<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            location: self.location,
        }
    }
}

impl<C: GraphicsContext + ?Sized> std::fmt::Debug for UniformHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniformHandle")
            .field("name", &self.name)
            .field("location", &self.location)
            .finish()
    }
}

/// Looks up `name` in `program`. Never fails: unknown or optimised-out
/// uniforms produce an absent handle.
pub fn resolve_uniform<C>(ctx: &C, program: C::Program, name: &str) -> UniformHandle<C>
where
    C: GraphicsContext + ?Sized,
{
    let location = ctx.uniform_location(program, name);
    if location.is_none() {
        tracing::debug!(uniform = name, "uniform not active in program");
    }
    UniformHandle {
        name: name.to_string(),
        location,
    }
}

/// The per-frame uniforms every playground shader can read.
#[derive(Debug, Clone)]
pub struct FrameUniforms<C: GraphicsContext + ?Sized> {
    pub time: UniformHandle<C>,
    pub resolution: UniformHandle<C>,
}

impl<C: GraphicsContext + ?Sized> FrameUniforms<C> {
    /// Handles for a program that failed to link. No driver query is made.
    pub fn absent() -> Self {
        let absent = |name: &str| UniformHandle {
            name: name.to_string(),
            location: None,
        };
        Self {
            time: absent(TIME_UNIFORM),
            resolution: absent(RESOLUTION_UNIFORM),
        }
    }

    pub fn resolve(ctx: &C, program: C::Program) -> Self {
        Self {
            time: resolve_uniform(ctx, program, TIME_UNIFORM),
            resolution: resolve_uniform(ctx, program, RESOLUTION_UNIFORM),
        }
    }
}

/// Pushes the frame's `resolution` and `time` values to the bound program.
pub fn update_frame<C>(ctx: &C, uniforms: &FrameUniforms<C>, elapsed: f32, width: u32, height: u32)
where
    C: GraphicsContext + ?Sized,
{
    uniforms
        .resolution
        .set_vec2(ctx, [width as f32, height as f32]);
    uniforms.time.set_f32(ctx, elapsed);
}
