use naga::valid::Capabilities;
use naga::{Binding, Module, ScalarKind, ShaderStage, TypeInner};

use crate::error::{RenderError, Result};

/// Names of the two stage functions of a program.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct EntryPoints {
    pub vertex: String,
    pub fragment: String,
}

impl EntryPoints {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

impl Default for EntryPoints {
    fn default() -> Self {
        Self::new("vert", "frag")
    }
}

/// Scalar kind of a vertex-stage input.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum InputKind {
    Float,
    Sint,
    Uint,
}

/// One `@location(n)` input of the vertex stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexInput {
    pub location: u32,
    pub components: u32,
    pub kind: InputKind,
}

/// What pipeline construction needs to know about a compiled program.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct ShaderReflection {
    /// Sorted by location.
    pub vertex_inputs: Vec<VertexInput>,
}

impl ShaderReflection {
    pub fn input_at(&self, location: u32) -> Option<&VertexInput> {
        self.vertex_inputs.iter().find(|i| i.location == location)
    }
}

/// Parses and validates `source`, then checks both entry points.
///
/// The vertex entry must be a `@vertex` function whose `@location` inputs
/// are scalars or vectors; the fragment entry must be a `@fragment` function
/// returning a `vec4<f32>` color at `@location(0)`.
///
/// Validates against baseline capabilities only; see [`reflect_with`].
pub fn reflect(source: &str, entries: &EntryPoints) -> Result<ShaderReflection> {
    reflect_with(source, entries, Capabilities::default())
}

/// [`reflect`] against an explicit capability set, e.g. the one a device
/// offers ([`capabilities_for`]).
pub fn reflect_with(
    source: &str,
    entries: &EntryPoints,
    capabilities: Capabilities,
) -> Result<ShaderReflection> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| RenderError::shader(e.emit_to_string(source)))?;

    naga::valid::Validator::new(naga::valid::ValidationFlags::all(), capabilities)
        .validate(&module)
        .map_err(|e| RenderError::shader(error_chain(&e.into_inner())))?;

    let vertex = find_entry(&module, &entries.vertex, ShaderStage::Vertex)?;
    let fragment = find_entry(&module, &entries.fragment, ShaderStage::Fragment)?;

    check_fragment_output(&module, fragment)?;

    let mut vertex_inputs = Vec::new();
    for arg in &vertex.function.arguments {
        collect_inputs(&module, arg.ty, arg.binding.as_ref(), &mut vertex_inputs)?;
    }
    vertex_inputs.sort_by_key(|i| i.location);

    Ok(ShaderReflection { vertex_inputs })
}

/// Shader capabilities unlocked by the enabled device `features`.
pub fn capabilities_for(features: wgpu::Features) -> Capabilities {
    let gated = [
        (wgpu::Features::IMMEDIATES, Capabilities::IMMEDIATES),
        (wgpu::Features::SHADER_F64, Capabilities::FLOAT64),
        (wgpu::Features::SHADER_F16, Capabilities::SHADER_FLOAT16),
        (wgpu::Features::SHADER_INT64, Capabilities::SHADER_INT64),
        (wgpu::Features::SHADER_PRIMITIVE_INDEX, Capabilities::PRIMITIVE_INDEX),
        (wgpu::Features::SHADER_EARLY_DEPTH_TEST, Capabilities::EARLY_DEPTH_TEST),
        (wgpu::Features::MULTIVIEW, Capabilities::MULTIVIEW),
    ];

    gated
        .into_iter()
        .filter(|(feature, _)| features.contains(*feature))
        .fold(Capabilities::default(), |caps, (_, cap)| caps | cap)
}

fn find_entry<'m>(module: &'m Module, name: &str, stage: ShaderStage) -> Result<&'m naga::EntryPoint> {
    let ep = module
        .entry_points
        .iter()
        .find(|ep| ep.name == name)
        .ok_or_else(|| RenderError::shader(format!("entry point `{name}` not found in shader source")))?;

    if ep.stage != stage {
        return Err(RenderError::shader(format!(
            "entry point `{name}` is a {:?} function, expected {stage:?}",
            ep.stage
        )));
    }
    Ok(ep)
}

fn check_fragment_output(module: &Module, ep: &naga::EntryPoint) -> Result<()> {
    let name = &ep.name;
    let Some(result) = ep.function.result.as_ref() else {
        return Err(RenderError::shader(format!("fragment entry `{name}` returns no color")));
    };

    let is_color = |ty: naga::Handle<naga::Type>, binding: Option<&Binding>| {
        matches!(binding, Some(Binding::Location { location: 0, .. }))
            && matches!(
                module.types[ty].inner,
                TypeInner::Vector { size: naga::VectorSize::Quad, scalar } if scalar.kind == ScalarKind::Float
            )
    };

    let found = match &module.types[result.ty].inner {
        TypeInner::Struct { members, .. } => members.iter().any(|m| is_color(m.ty, m.binding.as_ref())),
        _ => is_color(result.ty, result.binding.as_ref()),
    };

    if found {
        Ok(())
    } else {
        Err(RenderError::shader(format!(
            "fragment entry `{name}` must return vec4<f32> at @location(0)"
        )))
    }
}

fn collect_inputs(
    module: &Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut Vec<VertexInput>,
) -> Result<()> {
    match (binding, &module.types[ty].inner) {
        (Some(Binding::Location { location, .. }), inner) => {
            let (components, scalar) = match *inner {
                TypeInner::Scalar(scalar) => (1, scalar),
                TypeInner::Vector { size, scalar } => (size as u32, scalar),
                ref other => {
                    return Err(RenderError::shader(format!(
                        "vertex input @location({location}) has unsupported type {other:?}"
                    )));
                }
            };
            let kind = match scalar.kind {
                ScalarKind::Float => InputKind::Float,
                ScalarKind::Sint => InputKind::Sint,
                ScalarKind::Uint => InputKind::Uint,
                other => {
                    return Err(RenderError::shader(format!(
                        "vertex input @location({location}) has unsupported scalar kind {other:?}"
                    )));
                }
            };
            out.push(VertexInput { location: *location, components, kind });
        }
        (None, TypeInner::Struct { members, .. }) => {
            for m in members {
                collect_inputs(module, m.ty, m.binding.as_ref(), out)?;
            }
        }
        // Built-ins (vertex_index, instance_index) read no attribute.
        _ => {}
    }
    Ok(())
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        msg.push_str(": ");
        msg.push_str(&e.to_string());
        source = e.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::BASIC_WGSL;

    const TWO_INPUTS: &str = r#"
struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(v: VertexIn, @builtin(vertex_index) idx: u32) -> VertexOut {
    var out: VertexOut;
    out.clip = vec4<f32>(v.position, 1.0);
    out.uv = v.uv;
    return out;
}

struct FragOut {
    @location(0) color: vec4<f32>,
};

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> FragOut {
    var out: FragOut;
    out.color = vec4<f32>(uv, 0.0, 1.0);
    return out;
}
"#;

    fn diagnostics(err: RenderError) -> String {
        match err {
            RenderError::ShaderCompileError { diagnostics } => diagnostics,
            other => panic!("expected ShaderCompileError, got {other:?}"),
        }
    }

    #[test]
    fn basic_program_compiles() {
        let r = reflect(BASIC_WGSL, &EntryPoints::default()).unwrap();
        assert_eq!(
            r.vertex_inputs,
            vec![VertexInput { location: 0, components: 4, kind: InputKind::Float }]
        );
    }

    #[test]
    fn missing_vertex_entry_is_a_compile_error() {
        let err = reflect(BASIC_WGSL, &EntryPoints::new("vertX", "frag")).unwrap_err();
        assert!(diagnostics(err).contains("vertX"));
    }

    #[test]
    fn missing_fragment_entry_is_a_compile_error() {
        assert!(reflect(BASIC_WGSL, &EntryPoints::new("vert", "fragX")).is_err());
    }

    #[test]
    fn swapped_stages_are_rejected() {
        let err = reflect(BASIC_WGSL, &EntryPoints::new("frag", "vert")).unwrap_err();
        assert!(diagnostics(err).contains("expected Vertex"));
    }

    #[test]
    fn syntax_error_is_a_compile_error() {
        let err = reflect("@vertex fn vert( -> {", &EntryPoints::default()).unwrap_err();
        assert!(!diagnostics(err).is_empty());
    }

    #[test]
    fn fragment_must_return_four_components() {
        let src = r#"
@vertex
fn vert(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(p, 1.0);
}

@fragment
fn frag() -> @location(0) vec2<f32> {
    return vec2<f32>(1.0, 0.0);
}
"#;
        let err = reflect(src, &EntryPoints::default()).unwrap_err();
        assert!(diagnostics(err).contains("vec4<f32>"));
    }

    #[test]
    fn struct_inputs_and_outputs_are_reflected() {
        let r = reflect(TWO_INPUTS, &EntryPoints::new("vs_main", "fs_main")).unwrap();
        let locations: Vec<u32> = r.vertex_inputs.iter().map(|i| i.location).collect();
        assert_eq!(locations, vec![0, 2]);
        assert_eq!(r.input_at(2).map(|i| i.components), Some(2));
        assert!(r.input_at(1).is_none());
    }

    const HALF_COLOR: &str = r#"
enable f16;

@vertex
fn vert(@location(0) p: vec4<f32>) -> @builtin(position) vec4<f32> {
    return p;
}

@fragment
fn frag() -> @location(0) vec4<f32> {
    let c = vec4<f16>(1.0h, 0.5h, 0.25h, 1.0h);
    return vec4<f32>(c);
}
"#;

    #[test]
    fn capabilities_follow_device_features() {
        assert!(!capabilities_for(wgpu::Features::empty()).contains(Capabilities::SHADER_FLOAT16));
        assert!(capabilities_for(wgpu::Features::SHADER_F16).contains(Capabilities::SHADER_FLOAT16));
    }

    #[test]
    fn half_floats_are_rejected_without_the_device_feature() {
        let err = reflect_with(HALF_COLOR, &EntryPoints::default(), capabilities_for(wgpu::Features::empty()))
            .unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompileError { .. }));
    }

    #[test]
    fn compiling_twice_is_idempotent() {
        let a = reflect(TWO_INPUTS, &EntryPoints::new("vs_main", "fs_main")).unwrap();
        let b = reflect(TWO_INPUTS, &EntryPoints::new("vs_main", "fs_main")).unwrap();
        assert_eq!(a, b);
    }
}
