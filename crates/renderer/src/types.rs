use crate::runtime::RenderPolicy;

/// Logical names handed to the source loader for each stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderNames {
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderNames {
    fn default() -> Self {
        Self {
            vertex: "vertex".to_string(),
            fragment: "fragment".to_string(),
        }
    }
}

/// What to do when a stage fails to compile or the program fails to link.
///
/// * `Continue` logs the driver diagnostic and keeps rendering with whatever
///   program resulted, which usually shows up as a black frame.
/// * `FailFast` turns the first shader failure into a fatal startup error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShaderErrorPolicy {
    #[default]
    Continue,
    FailFast,
}

impl ShaderErrorPolicy {
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            Self::FailFast
        } else {
            Self::Continue
        }
    }

    pub fn is_fail_fast(self) -> bool {
        matches!(self, Self::FailFast)
    }
}

/// Pixel rectangle the quad is rasterised into, anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Minimised windows report a zero size; keep at least one pixel so the
    /// resolution uniform never divides by zero in user shaders.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn resolution(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Initial window size in physical pixels.
    pub surface_size: (u32, u32),
    pub title: String,
    pub vsync: bool,
    pub shaders: ShaderNames,
    pub error_policy: ShaderErrorPolicy,
    pub policy: RenderPolicy,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1080, 720),
            title: "glslplay".to_string(),
            vsync: true,
            shaders: ShaderNames::default(),
            error_policy: ShaderErrorPolicy::default(),
            policy: RenderPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_never_collapses_to_zero() {
        let viewport = Viewport::new(0, 480);
        assert_eq!(viewport, Viewport { width: 1, height: 480 });
        assert_eq!(viewport.resolution(), [1.0, 480.0]);
    }

    #[test]
    fn policy_from_flag() {
        assert_eq!(ShaderErrorPolicy::from_fail_fast(true), ShaderErrorPolicy::FailFast);
        assert!(!ShaderErrorPolicy::from_fail_fast(false).is_fail_fast());
    }
}
