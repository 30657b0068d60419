use crate::device::OutputFormat;
use crate::error::{RenderError, Result};
use crate::geometry::VertexLayout;
use crate::shader::{InputKind, ShaderReflection};

/// Checks that a program, an output format and a vertex layout fit together.
///
/// Succeeds iff the layout is valid, every slot the vertex stage reads is
/// present in it with a float format, and the output format is a color
/// format.
pub fn validate(reflection: &ShaderReflection, output: OutputFormat, layout: &VertexLayout) -> Result<()> {
    layout.validate()?;

    for input in &reflection.vertex_inputs {
        let Some(attr) = layout.attribute_at(input.location) else {
            return Err(RenderError::PipelineValidationError(format!(
                "vertex stage reads @location({}) but the vertex layout has no attribute at that slot",
                input.location
            )));
        };
        if input.kind != InputKind::Float {
            return Err(RenderError::PipelineValidationError(format!(
                "vertex stage reads @location({}) as {:?} but the layout supplies {:?}",
                input.location, input.kind, attr.format
            )));
        }
    }

    let format = output.get();
    if format.is_depth_stencil_format() {
        return Err(RenderError::PipelineValidationError(format!(
            "{format:?} is not a color format"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Drawable, HostSurface, RenderTargetDescriptor};
    use crate::geometry::{Semantic, VertexFormat};
    use crate::shader::VertexInput;

    struct Surface(wgpu::TextureFormat);

    impl HostSurface for Surface {
        fn format(&self) -> wgpu::TextureFormat {
            self.0
        }
        fn current_drawable(&mut self) -> Option<Drawable> {
            None
        }
        fn current_render_target(&self) -> Option<RenderTargetDescriptor> {
            None
        }
    }

    fn bgra() -> OutputFormat {
        OutputFormat::of(&Surface(wgpu::TextureFormat::Bgra8Unorm))
    }

    fn reads(locations: &[u32]) -> ShaderReflection {
        ShaderReflection {
            vertex_inputs: locations
                .iter()
                .map(|&location| VertexInput { location, components: 3, kind: InputKind::Float })
                .collect(),
        }
    }

    fn layout_with(locations: &[u32]) -> VertexLayout {
        let semantics = [Semantic::Position, Semantic::Normal, Semantic::TexCoord];
        locations
            .iter()
            .zip(semantics)
            .fold(VertexLayout::new(0), |l, (&loc, sem)| l.with_attribute(sem, VertexFormat::Float32x3, loc))
    }

    #[test]
    fn accepts_layout_covering_all_inputs() {
        validate(&reads(&[0]), bgra(), &VertexLayout::position_only()).unwrap();
    }

    #[test]
    fn rejects_missing_slot() {
        let err = validate(&reads(&[0, 1]), bgra(), &VertexLayout::position_only()).unwrap_err();
        assert!(matches!(err, RenderError::PipelineValidationError(m) if m.contains("@location(1)")));
    }

    #[test]
    fn succeeds_iff_every_read_slot_is_present() {
        let layouts: [&[u32]; 4] = [&[0], &[0, 1], &[0, 2], &[0, 1, 2]];
        let programs: [&[u32]; 5] = [&[], &[0], &[1], &[0, 1], &[0, 1, 2]];

        for layout in layouts {
            for program in programs {
                let expected = program.iter().all(|loc| layout.contains(loc));
                let got = validate(&reads(program), bgra(), &layout_with(layout)).is_ok();
                assert_eq!(got, expected, "layout {layout:?} program {program:?}");
            }
        }
    }

    #[test]
    fn extra_layout_attributes_are_allowed() {
        validate(&reads(&[0]), bgra(), &VertexLayout::position_normal_uv()).unwrap();
    }

    #[test]
    fn integer_inputs_are_rejected() {
        let r = ShaderReflection {
            vertex_inputs: vec![VertexInput { location: 0, components: 1, kind: InputKind::Uint }],
        };
        assert!(validate(&r, bgra(), &VertexLayout::position_only()).is_err());
    }

    #[test]
    fn depth_output_is_rejected() {
        let out = OutputFormat::of(&Surface(wgpu::TextureFormat::Depth32Float));
        assert!(validate(&reads(&[0]), out, &VertexLayout::position_only()).is_err());
    }

    #[test]
    fn invalid_layout_is_rejected() {
        let layout = VertexLayout::new(0).with_attribute(Semantic::Normal, VertexFormat::Float32x3, 0);
        assert!(validate(&reads(&[0]), bgra(), &layout).is_err());
    }
}
