//! Recording driver used by the lifecycle tests.
//!
//! Compilation fails on unbalanced braces or an `#error` directive. Linking
//! fails when any attached stage failed or when `fail_link` was called.
//! Uniform locations come from the `uniform <type> <name>;` declarations of
//! the attached sources.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::compile::ShaderStage;
use crate::error::DriverError;

use super::context::GraphicsContext;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage, u32),
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    DetachShader(u32, u32),
    LinkProgram(u32),
    ValidateProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    Uniform1f(i32, f32),
    Uniform2f(i32, f32, f32),
    CreateQuad(u32, usize),
    Draw(u32, usize),
    DeleteQuad(u32),
    Viewport(u32, u32),
    Clear,
}

/// What a draw call would have seen.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub program: Option<u32>,
    pub vertex_count: usize,
    pub viewport: Option<(u32, u32)>,
    pub uniforms: BTreeMap<String, Vec<f32>>,
}

#[derive(Debug)]
struct MockShader {
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct MockProgram {
    attached: Vec<u32>,
    linked: bool,
    valid: bool,
    log: String,
    uniforms: BTreeMap<String, i32>,
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u32,
    next_location: i32,
    calls: Vec<Call>,
    shaders: BTreeMap<u32, MockShader>,
    programs: BTreeMap<u32, MockProgram>,
    quads: BTreeSet<u32>,
    current: Option<u32>,
    viewport: Option<(u32, u32)>,
    values: BTreeMap<i32, Vec<f32>>,
    draws: Vec<DrawRecord>,
    fail_allocations: bool,
    fail_link: bool,
    fail_validation: bool,
    uniform_lookups: usize,
}

impl MockState {
    fn allocate(&mut self) -> Result<u32, DriverError> {
        if self.fail_allocations {
            return Err(DriverError("out of memory".into()));
        }
        self.next_id += 1;
        Ok(self.next_id)
    }

    fn current_uniforms(&self) -> BTreeMap<String, Vec<f32>> {
        let Some(program) = self.current.and_then(|id| self.programs.get(&id)) else {
            return BTreeMap::new();
        };
        program
            .uniforms
            .iter()
            .filter_map(|(name, location)| {
                self.values
                    .get(location)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct MockContext {
    state: RefCell<MockState>,
}

impl MockContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_allocations(&self) {
        self.state.borrow_mut().fail_allocations = true;
    }

    pub fn fail_link(&self) {
        self.state.borrow_mut().fail_link = true;
    }

    pub fn fail_validation(&self) {
        self.state.borrow_mut().fail_validation = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn draws(&self) -> Vec<DrawRecord> {
        self.state.borrow().draws.clone()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_quads(&self) -> usize {
        self.state.borrow().quads.len()
    }

    /// Number of `uniform_location` queries made so far.
    pub fn uniform_lookups(&self) -> usize {
        self.state.borrow().uniform_lookups
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current
    }

    pub fn current_viewport(&self) -> Option<(u32, u32)> {
        self.state.borrow().viewport
    }

    /// Last value written to `name` in the bound program.
    pub fn uniform_value(&self, name: &str) -> Option<Vec<f32>> {
        self.state.borrow().current_uniforms().remove(name)
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

fn compile_log(source: &str) -> Option<String> {
    let mut depth = 0i64;
    for ch in source.chars() {
        match ch {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return Some("0:1(1): error: unexpected '}'".into());
        }
    }
    if depth != 0 {
        return Some("0:1(1): error: syntax error, unexpected end of file".into());
    }
    source
        .lines()
        .find(|line| line.trim_start().starts_with("#error"))
        .map(|line| format!("0:1(1): error: {}", line.trim()))
}

fn declared_uniforms(source: &str) -> Vec<String> {
    source
        .split(';')
        .filter_map(|statement| {
            let mut tokens = statement.split_whitespace();
            while let Some(token) = tokens.next() {
                if token == "uniform" {
                    let _ty = tokens.next()?;
                    return tokens.next().map(str::to_string);
                }
            }
            None
        })
        .collect()
}

impl GraphicsContext for MockContext {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = i32;
    type Quad = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.shaders.insert(
            id,
            MockShader {
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        state.calls.push(Call::CreateShader(stage, id));
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(entry) = self.state.borrow_mut().shaders.get_mut(&shader) {
            entry.source = source.to_string();
        }
        self.record(Call::ShaderSource(shader));
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(entry) = self.state.borrow_mut().shaders.get_mut(&shader) {
            match compile_log(&entry.source) {
                Some(log) => {
                    entry.compiled = false;
                    entry.log = log;
                }
                None => {
                    entry.compiled = true;
                    entry.log.clear();
                }
            }
        }
        self.record(Call::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map_or(false, |entry| entry.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|entry| entry.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.programs.insert(id, MockProgram::default());
        state.calls.push(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(entry) = self.state.borrow_mut().programs.get_mut(&program) {
            entry.attached.push(shader);
        }
        self.record(Call::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(entry) = self.state.borrow_mut().programs.get_mut(&program) {
            entry.attached.retain(|attached| *attached != shader);
        }
        self.record(Call::DetachShader(program, shader));
    }

    fn link_program(&self, program: u32) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let forced = state.fail_link;
        if let Some(entry) = state.programs.get_mut(&program) {
            let stages: Vec<&MockShader> = entry
                .attached
                .iter()
                .filter_map(|id| state.shaders.get(id))
                .collect();
            entry.uniforms.clear();
            if stages.len() < 2 || stages.iter().any(|stage| !stage.compiled) {
                entry.linked = false;
                entry.log = "error: linking with uncompiled/unspecialized shader".into();
            } else if forced {
                entry.linked = false;
                entry.log = "error: fragment shader input `v_uv` has no matching vertex output".into();
            } else {
                entry.linked = true;
                entry.log.clear();
                let names: BTreeSet<String> = stages
                    .iter()
                    .flat_map(|stage| declared_uniforms(&stage.source))
                    .collect();
                for name in names {
                    entry.uniforms.insert(name, state.next_location);
                    state.next_location += 1;
                }
            }
        }
        state.calls.push(Call::LinkProgram(program));
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(false, |entry| entry.linked)
    }

    fn validate_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let forced = state.fail_validation;
        if let Some(entry) = state.programs.get_mut(&program) {
            entry.valid = entry.linked && !forced;
            if !entry.linked {
                entry.log = "error: program not linked".into();
            } else if forced {
                entry.log = "error: validation failed for current state".into();
            }
        }
        state.calls.push(Call::ValidateProgram(program));
    }

    fn program_validate_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(false, |entry| entry.valid)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|entry| entry.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().current = program;
        self.record(Call::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current == Some(program) {
            state.current = None;
        }
        state.calls.push(Call::DeleteProgram(program));
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<i32> {
        if name.contains('\0') {
            return None;
        }
        let mut state = self.state.borrow_mut();
        state.uniform_lookups += 1;
        let entry = state.programs.get(&program)?;
        if !entry.linked {
            return None;
        }
        entry.uniforms.get(name).copied()
    }

    fn uniform_1f(&self, location: i32, value: f32) {
        let mut state = self.state.borrow_mut();
        state.values.insert(location, vec![value]);
        state.calls.push(Call::Uniform1f(location, value));
    }

    fn uniform_2f(&self, location: i32, x: f32, y: f32) {
        let mut state = self.state.borrow_mut();
        state.values.insert(location, vec![x, y]);
        state.calls.push(Call::Uniform2f(location, x, y));
    }

    fn create_quad(&self, vertices: &[[f32; 2]]) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.quads.insert(id);
        state.calls.push(Call::CreateQuad(id, vertices.len()));
        Ok(id)
    }

    fn draw_triangles(&self, quad: u32, vertex_count: usize) {
        let mut state = self.state.borrow_mut();
        let record = DrawRecord {
            program: state.current,
            vertex_count,
            viewport: state.viewport,
            uniforms: state.current_uniforms(),
        };
        state.draws.push(record);
        state.calls.push(Call::Draw(quad, vertex_count));
    }

    fn delete_quad(&self, quad: u32) {
        let mut state = self.state.borrow_mut();
        state.quads.remove(&quad);
        state.calls.push(Call::DeleteQuad(quad));
    }

    fn viewport(&self, width: u32, height: u32) {
        let mut state = self.state.borrow_mut();
        state.viewport = Some((width, height));
        state.calls.push(Call::Viewport(width, height));
    }

    fn clear(&self, _color: [f32; 4]) {
        self.record(Call::Clear);
    }
}
