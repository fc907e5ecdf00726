//! GLSL shader stages: read, compile (naga front end + validation), link.
//!
//! "Link" here means the CPU-side interface check between the two stages;
//! the renderer still builds the GPU pipeline and reports what the driver
//! rejects.

use std::collections::BTreeSet;
use std::path::Path;

use naga::front::glsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{Binding, Handle, Module, Type, TypeInner};

use crate::error::{AssetError, AssetResult};

/// Entry point name every GLSL stage uses.
pub const ENTRY_POINT: &str = "main";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

/// One compiled stage: a validated naga module.
#[derive(Debug)]
pub struct CompiledStage {
    pub stage: ShaderStage,
    pub label: String,
    pub module: Module,
}

/// Vertex + fragment stages that agree on their interface.
#[derive(Debug)]
pub struct ShaderProgram {
    pub vertex: CompiledStage,
    pub fragment: CompiledStage,
}

/// Read a stage's source text.
pub fn load_stage_source(path: impl AsRef<Path>) -> AssetResult<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| AssetError::io(path, e))
}

/// Compile GLSL source for one stage.
pub fn compile_stage(stage: ShaderStage, source: &str, label: &str) -> AssetResult<CompiledStage> {
    let compile_err = |log: String| AssetError::Compile {
        stage,
        label: label.to_string(),
        log,
    };

    let mut frontend = glsl::Frontend::default();
    let module = frontend
        .parse(&glsl::Options::from(stage.to_naga()), source)
        .map_err(|e| compile_err(e.to_string()))?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| compile_err(e.to_string()))?;

    if !module
        .entry_points
        .iter()
        .any(|ep| ep.name == ENTRY_POINT && ep.stage == stage.to_naga())
    {
        return Err(compile_err(format!("no {stage:?} entry point '{ENTRY_POINT}'")));
    }

    log::debug!("Compiled {:?} shader {}", stage, label);
    Ok(CompiledStage {
        stage,
        label: label.to_string(),
        module,
    })
}

impl ShaderProgram {
    /// Pair two stages, checking that every fragment input is fed by the vertex stage.
    pub fn link(vertex: CompiledStage, fragment: CompiledStage) -> AssetResult<Self> {
        if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err(AssetError::Link {
                log: format!(
                    "expected vertex + fragment, got {:?} + {:?}",
                    vertex.stage, fragment.stage
                ),
            });
        }

        let produced = vertex_outputs(&vertex.module);
        let consumed = fragment_inputs(&fragment.module);
        let missing: Vec<u32> = consumed.difference(&produced).copied().collect();
        if !missing.is_empty() {
            return Err(AssetError::Link {
                log: format!(
                    "fragment stage '{}' reads location(s) {:?} not written by vertex stage '{}'",
                    fragment.label, missing, vertex.label
                ),
            });
        }

        Ok(Self { vertex, fragment })
    }
}

/// Read, compile and link a program, logging each failure's diagnostic.
pub fn load_program(
    vertex_path: impl AsRef<Path>,
    fragment_path: impl AsRef<Path>,
) -> AssetResult<ShaderProgram> {
    let compile = |stage: ShaderStage, path: &Path| -> AssetResult<CompiledStage> {
        let source = load_stage_source(path)?;
        compile_stage(stage, &source, &path.display().to_string())
    };

    let result = compile(ShaderStage::Vertex, vertex_path.as_ref()).and_then(|vs| {
        let fs = compile(ShaderStage::Fragment, fragment_path.as_ref())?;
        ShaderProgram::link(vs, fs)
    });

    match &result {
        Ok(program) => log::info!(
            "Linked shader program ({} + {})",
            program.vertex.label,
            program.fragment.label
        ),
        Err(e) => log::error!("{e}"),
    }
    result
}

fn entry_point(module: &Module, stage: naga::ShaderStage) -> Option<&naga::EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == ENTRY_POINT && ep.stage == stage)
}

fn vertex_outputs(module: &Module) -> BTreeSet<u32> {
    let mut out = BTreeSet::new();
    if let Some(ep) = entry_point(module, naga::ShaderStage::Vertex) {
        if let Some(result) = &ep.function.result {
            collect_locations(module, result.ty, result.binding.as_ref(), &mut out);
        }
    }
    out
}

fn fragment_inputs(module: &Module) -> BTreeSet<u32> {
    let mut out = BTreeSet::new();
    if let Some(ep) = entry_point(module, naga::ShaderStage::Fragment) {
        for arg in &ep.function.arguments {
            collect_locations(module, arg.ty, arg.binding.as_ref(), &mut out);
        }
    }
    out
}

/// Locations carried by a value, looking through one level of struct members.
fn collect_locations(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut BTreeSet<u32>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.insert(*location);
        }
        Some(_) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(Binding::Location { location, .. }) = &member.binding {
                        out.insert(*location);
                    }
                }
            }
        }
    }
}
