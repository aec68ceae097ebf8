use std::fmt;

use crate::compile::ShaderStage;
use crate::error::DriverError;

/// The slice of the graphics driver the shader lifecycle needs.
///
/// The driver keeps a lot of ambient state (the bound program, the current
/// context). Threading an explicit `GraphicsContext` through every call makes
/// that dependency visible and lets tests swap in a recording driver.
///
/// Implementations assume they are only ever called from the thread that
/// owns the current context.
pub trait GraphicsContext {
    type Shader: Copy + fmt::Debug;
    type Program: Copy + fmt::Debug;
    type UniformLocation: Copy + fmt::Debug;
    type Quad: Copy + fmt::Debug;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, DriverError>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    /// Blocks until the driver reports a compile status.
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, DriverError>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    /// Checks the program against the current pipeline state.
    fn validate_program(&self, program: Self::Program);
    fn program_validate_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);

    /// Returns `None` when the program has no active uniform called `name`.
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
    fn uniform_1f(&self, location: Self::UniformLocation, value: f32);
    fn uniform_2f(&self, location: Self::UniformLocation, x: f32, y: f32);

    /// Uploads a static triangle list of 2D positions bound to attribute 0.
    fn create_quad(&self, vertices: &[[f32; 2]]) -> Result<Self::Quad, DriverError>;
    fn draw_triangles(&self, quad: Self::Quad, vertex_count: usize);
    fn delete_quad(&self, quad: Self::Quad);

    fn viewport(&self, width: u32, height: u32);
    fn clear(&self, color: [f32; 4]);
}
