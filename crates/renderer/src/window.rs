use std::ffi::CString;
use std::num::NonZeroU32;
use std::ptr;

use anyhow::Result;
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasRawWindowHandle;
use tracing::{error, info};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use crate::compile::ShaderSources;
use crate::error::RenderError;
use crate::gpu::{GlContext, ShaderProgram};
use crate::runtime::{time_source_for_policy, RenderPolicy};
use crate::types::{RendererConfig, Viewport};

fn context_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::ContextInit(err.to_string())
}

/// Framebuffer request for an opaque window. glutin asks for 8 alpha bits
/// unless told otherwise.
fn config_template() -> ConfigTemplateBuilder {
    ConfigTemplateBuilder::new().with_alpha_size(0)
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, config| {
            if config.num_samples() > best.num_samples() {
                config
            } else {
                best
            }
        })
        .expect("display offered no framebuffer configurations")
}

/// Opens the window, builds the program from `sources` and renders until the
/// window is closed.
pub(crate) fn run(config: &RendererConfig, sources: ShaderSources) -> Result<()> {
    let mut event_loop = EventLoop::new();
    let (width, height) = config.surface_size;
    let builder = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(width, height));

    let (window, gl_config) = DisplayBuilder::new()
        .with_window_builder(Some(builder.clone()))
        .build(&event_loop, config_template(), pick_config)
        .map_err(context_error)?;
    let window = match window {
        Some(window) => window,
        None => glutin_winit::finalize_window(&event_loop, builder, &gl_config)
            .map_err(context_error)?,
    };

    let attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .with_profile(GlProfile::Core)
        .build(Some(window.raw_window_handle()));
    let display = gl_config.display();
    let not_current = unsafe { display.create_context(&gl_config, &attributes) }
        .map_err(context_error)?;

    let surface_attributes = window.build_surface_attributes(Default::default());
    let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }
        .map_err(context_error)?;
    let context = not_current.make_current(&surface).map_err(context_error)?;

    let interval = if config.vsync {
        SwapInterval::Wait(NonZeroU32::MIN)
    } else {
        SwapInterval::DontWait
    };
    if let Err(err) = surface.set_swap_interval(&context, interval) {
        tracing::warn!(error = %err, vsync = config.vsync, "failed to set swap interval");
    }

    let gl = unsafe {
        GlContext::load(|symbol| {
            CString::new(symbol)
                .map(|symbol| display.get_proc_address(symbol.as_c_str()))
                .unwrap_or(ptr::null())
        })
    };

    let size = window.inner_size();
    let program = ShaderProgram::build(
        &gl,
        sources,
        config.error_policy,
        Viewport::new(size.width, size.height),
    )?;
    info!(width = size.width, height = size.height, "window opened");

    let animate = matches!(config.policy, RenderPolicy::Animate);
    let mut clock = time_source_for_policy(&config.policy);
    let mut program = Some(program);
    let mut failure: Option<anyhow::Error> = None;

    event_loop.run_return(|event, _, control_flow| {
        *control_flow = if animate {
            ControlFlow::Poll
        } else {
            ControlFlow::Wait
        };

        match event {
            Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!("close requested");
                    control_flow.set_exit();
                }
                WindowEvent::Resized(new_size) => {
                    resize(&gl, &surface, &context, program.as_mut(), new_size);
                    window.request_redraw();
                }
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    resize(&gl, &surface, &context, program.as_mut(), *new_inner_size);
                    window.request_redraw();
                }
                _ => {}
            },
            Event::MainEventsCleared if animate => window.request_redraw(),
            Event::RedrawRequested(window_id) if window_id == window.id() => {
                let Some(program) = program.as_ref() else {
                    return;
                };
                let sample = clock.sample();
                tracing::trace!(frame = sample.frame_index, time = sample.seconds, "frame");
                program.render_frame(&gl, sample);
                if let Err(err) = surface.swap_buffers(&context) {
                    error!(error = %err, "failed to present frame");
                    failure = Some(anyhow::Error::new(err).context("failed to present frame"));
                    control_flow.set_exit();
                }
            }
            Event::LoopDestroyed => {
                if let Some(program) = program.take() {
                    program.destroy(&gl);
                }
            }
            _ => {}
        }
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn resize(
    gl: &GlContext,
    surface: &Surface<WindowSurface>,
    context: &PossiblyCurrentContext,
    program: Option<&mut ShaderProgram<GlContext>>,
    size: PhysicalSize<u32>,
) {
    let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
    else {
        return;
    };
    surface.resize(context, width, height);
    if let Some(program) = program {
        program.resize(gl, size.width, size.height);
    }
}
