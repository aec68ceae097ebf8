use std::ffi::{c_void, CString};
use std::marker::PhantomData;
use std::{mem, ptr};

use gl::types::{GLchar, GLenum, GLint, GLsizei, GLsizeiptr, GLuint};

use crate::compile::ShaderStage;
use crate::error::DriverError;

use super::context::GraphicsContext;

/// Vertex array plus the buffer backing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlQuad {
    vao: GLuint,
    vbo: GLuint,
}

/// [`GraphicsContext`] over the process-wide `gl` function pointers.
///
/// Only valid while the context it was loaded from is current on this
/// thread, hence `!Send`.
#[derive(Debug)]
pub struct GlContext {
    _not_send: PhantomData<*const ()>,
}

impl GlContext {
    /// Loads the GL entry points through `loader` and enables debug output
    /// when the driver offers it.
    ///
    /// # Safety
    ///
    /// A GL 3.3 core context must be current on the calling thread, and
    /// `loader` must return pointers belonging to that context.
    pub unsafe fn load<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        if gl::DebugMessageCallback::is_loaded() {
            gl::Enable(gl::DEBUG_OUTPUT);
            gl::DebugMessageCallback(Some(debug_callback), ptr::null());
            tracing::debug!("gl debug output enabled");
        }

        let context = Self {
            _not_send: PhantomData,
        };
        tracing::info!(
            version = %context.get_string(gl::VERSION),
            renderer = %context.get_string(gl::RENDERER),
            "opengl context loaded"
        );
        context
    }

    fn get_string(&self, name: GLenum) -> String {
        let raw = unsafe { gl::GetString(name) };
        if raw.is_null() {
            return String::from("unknown");
        }
        unsafe { std::ffi::CStr::from_ptr(raw.cast()) }
            .to_string_lossy()
            .into_owned()
    }

    /// Turns a zero object name into an error carrying any pending GL errors.
    fn check_allocation(&self, name: GLuint, what: &str) -> Result<GLuint, DriverError> {
        if name != 0 {
            return Ok(name);
        }
        let codes = drain_errors();
        Err(DriverError(format!("failed to create {what} ({codes})")))
    }
}

fn drain_errors() -> String {
    let mut codes = Vec::new();
    loop {
        let err = unsafe { gl::GetError() };
        if err == gl::NO_ERROR || codes.len() >= 8 {
            break;
        }
        codes.push(error_name(err));
    }
    if codes.is_empty() {
        "no error reported".into()
    } else {
        codes.join(", ")
    }
}

fn error_name(err: GLenum) -> String {
    match err {
        gl::INVALID_ENUM => "GL_INVALID_ENUM".into(),
        gl::INVALID_VALUE => "GL_INVALID_VALUE".into(),
        gl::INVALID_OPERATION => "GL_INVALID_OPERATION".into(),
        gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION".into(),
        gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY".into(),
        other => format!("0x{other:04x}"),
    }
}

fn read_log(len: GLint, fill: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
    if len <= 0 {
        return String::new();
    }
    let mut buf = vec![0u8; len as usize];
    let mut written: GLsizei = 0;
    fill(len, &mut written, buf.as_mut_ptr().cast());
    buf.truncate(written.clamp(0, len) as usize);
    String::from_utf8_lossy(&buf).into_owned()
}

extern "system" fn debug_callback(
    source: GLenum,
    ty: GLenum,
    id: GLuint,
    severity: GLenum,
    length: GLsizei,
    message: *const GLchar,
    _user: *mut c_void,
) {
    if message.is_null() || length < 0 {
        return;
    }
    let bytes = unsafe { std::slice::from_raw_parts(message.cast::<u8>(), length as usize) };
    let message = String::from_utf8_lossy(bytes);

    let source = match source {
        gl::DEBUG_SOURCE_API => "api",
        gl::DEBUG_SOURCE_WINDOW_SYSTEM => "window-system",
        gl::DEBUG_SOURCE_SHADER_COMPILER => "shader-compiler",
        gl::DEBUG_SOURCE_THIRD_PARTY => "third-party",
        gl::DEBUG_SOURCE_APPLICATION => "application",
        _ => "other",
    };
    let kind = match ty {
        gl::DEBUG_TYPE_ERROR => "error",
        gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "deprecated",
        gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "undefined-behaviour",
        gl::DEBUG_TYPE_PORTABILITY => "portability",
        gl::DEBUG_TYPE_PERFORMANCE => "performance",
        _ => "other",
    };

    match severity {
        gl::DEBUG_SEVERITY_HIGH => tracing::error!(target: "renderer::gl", source, kind, id, "{message}"),
        gl::DEBUG_SEVERITY_MEDIUM => tracing::warn!(target: "renderer::gl", source, kind, id, "{message}"),
        gl::DEBUG_SEVERITY_LOW => tracing::info!(target: "renderer::gl", source, kind, id, "{message}"),
        _ => tracing::trace!(target: "renderer::gl", source, kind, id, "{message}"),
    }
}

impl GraphicsContext for GlContext {
    type Shader = GLuint;
    type Program = GLuint;
    type UniformLocation = GLint;
    type Quad = GlQuad;

    fn create_shader(&self, stage: ShaderStage) -> Result<GLuint, DriverError> {
        let kind = match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        };
        let shader = unsafe { gl::CreateShader(kind) };
        self.check_allocation(shader, "shader object")
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let ptr = source.as_ptr().cast::<GLchar>();
        let len = source.len() as GLint;
        unsafe { gl::ShaderSource(shader, 1, &ptr, &len) };
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) };
    }

    fn shader_compile_status(&self, shader: GLuint) -> bool {
        let mut status = gl::FALSE as GLint;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status != gl::FALSE as GLint
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        let mut len = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len) };
        read_log(len, |cap, written, buf| unsafe {
            gl::GetShaderInfoLog(shader, cap, written, buf)
        })
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&self) -> Result<GLuint, DriverError> {
        let program = unsafe { gl::CreateProgram() };
        self.check_allocation(program, "program object")
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::DetachShader(program, shader) };
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) };
    }

    fn program_link_status(&self, program: GLuint) -> bool {
        let mut status = gl::FALSE as GLint;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status != gl::FALSE as GLint
    }

    fn validate_program(&self, program: GLuint) {
        unsafe { gl::ValidateProgram(program) };
    }

    fn program_validate_status(&self, program: GLuint) -> bool {
        let mut status = gl::FALSE as GLint;
        unsafe { gl::GetProgramiv(program, gl::VALIDATE_STATUS, &mut status) };
        status != gl::FALSE as GLint
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let mut len = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len) };
        read_log(len, |cap, written, buf| unsafe {
            gl::GetProgramInfoLog(program, cap, written, buf)
        })
    }

    fn use_program(&self, program: Option<GLuint>) {
        unsafe { gl::UseProgram(program.unwrap_or(0)) };
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn uniform_location(&self, program: GLuint, name: &str) -> Option<GLint> {
        let Ok(c_name) = CString::new(name) else {
            tracing::warn!(uniform = name, "uniform name contains a NUL byte");
            return None;
        };
        let location = unsafe { gl::GetUniformLocation(program, c_name.as_ptr()) };
        (location >= 0).then_some(location)
    }

    fn uniform_1f(&self, location: GLint, value: f32) {
        unsafe { gl::Uniform1f(location, value) };
    }

    fn uniform_2f(&self, location: GLint, x: f32, y: f32) {
        unsafe { gl::Uniform2f(location, x, y) };
    }

    fn create_quad(&self, vertices: &[[f32; 2]]) -> Result<GlQuad, DriverError> {
        let mut vao = 0;
        let mut vbo = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::GenBuffers(1, &mut vbo);
        }
        if vao == 0 || vbo == 0 {
            let codes = drain_errors();
            unsafe {
                gl::DeleteBuffers(1, &vbo);
                gl::DeleteVertexArrays(1, &vao);
            }
            return Err(DriverError(format!("failed to create quad buffers ({codes})")));
        }

        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        unsafe {
            gl::BindVertexArray(vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                bytes.len() as GLsizeiptr,
                bytes.as_ptr().cast(),
                gl::STATIC_DRAW,
            );
            gl::VertexAttribPointer(
                0,
                2,
                gl::FLOAT,
                gl::FALSE,
                mem::size_of::<[f32; 2]>() as GLsizei,
                ptr::null(),
            );
            gl::EnableVertexAttribArray(0);
        }

        Ok(GlQuad { vao, vbo })
    }

    fn draw_triangles(&self, quad: GlQuad, vertex_count: usize) {
        unsafe {
            gl::BindVertexArray(quad.vao);
            gl::DrawArrays(gl::TRIANGLES, 0, vertex_count as GLsizei);
        }
    }

    fn delete_quad(&self, quad: GlQuad) {
        unsafe {
            gl::BindVertexArray(0);
            gl::DeleteBuffers(1, &quad.vbo);
            gl::DeleteVertexArrays(1, &quad.vao);
        }
    }

    fn viewport(&self, width: u32, height: u32) {
        unsafe { gl::Viewport(0, 0, width as GLsizei, height as GLsizei) };
    }

    fn clear(&self, color: [f32; 4]) {
        unsafe {
            gl::ClearColor(color[0], color[1], color[2], color[3]);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }
}
