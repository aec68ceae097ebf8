/// Pass-through vertex shader for the full-screen quad.
///
/// Expects the quad corners as `vec2` at attribute location 0.
pub const BUILTIN_VERTEX: &str = r"#version 330 core
layout(location = 0) in vec2 pos;

void main() {
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

