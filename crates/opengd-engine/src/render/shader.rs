use std::fmt;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};

use crate::device::DEPTH_FORMAT;

use super::{BlendMode, QuadCmd, Vertex, Vertex2D};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read {stage} shader {path}: {source}")]
    Read {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
}

/// WGSL text of the two stages.
///
/// Both stages declare the same `DrawUniforms` block at group 0; the
/// fragment stage samples group 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn builtin() -> Self {
        Self {
            vertex: include_str!("shaders/quad2d.vert.wgsl").to_owned(),
            fragment: include_str!("shaders/quad2d.frag.wgsl").to_owned(),
        }
    }

    pub fn from_files(vertex: impl AsRef<Path>, fragment: impl AsRef<Path>) -> Result<Self, ShaderError> {
        Ok(Self {
            vertex: read_stage(ShaderStage::Vertex, vertex.as_ref())?,
            fragment: read_stage(ShaderStage::Fragment, fragment.as_ref())?,
        })
    }
}

fn read_stage(stage: ShaderStage, path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        stage,
        path: path.to_path_buf(),
        source,
    })
}

/// Per-draw uniform block, mirrored by `DrawUniforms` in the WGSL.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct DrawUniforms {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub sampling: u32,
    pub _pad: [u32; 3],
}

impl DrawUniforms {
    pub const SIZE: u64 = std::mem::size_of::<DrawUniforms>() as u64;

    pub fn from_quad(cmd: &QuadCmd) -> Self {
        Self {
            projection: cmd.projection.to_cols_array_2d(),
            view: cmd.view.to_cols_array_2d(),
            model: cmd.model.to_cols_array_2d(),
            color: cmd.color.to_array(),
            sampling: cmd.texture.sampling().as_uniform(),
            _pad: [0; 3],
        }
    }

    pub(crate) fn min_binding_size() -> NonZeroU64 {
        NonZeroU64::new(Self::SIZE).unwrap_or(NonZeroU64::MIN)
    }
}

/// Compiled vertex + fragment stages linked into one pipeline per blend
/// mode. Immutable after creation.
pub struct ShaderProgram {
    uniform_layout: wgpu::BindGroupLayout,
    normal: wgpu::RenderPipeline,
    additive: wgpu::RenderPipeline,
}

impl ShaderProgram {
    /// Compiles both stages and links the pipelines.
    ///
    /// Compiler diagnostics are checked before linking, so a bad stage
    /// returns [`ShaderError::Compile`] carrying the compiler log.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        sources: &ShaderSources,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Result<Self, ShaderError> {
        let vertex = compile(device, ShaderStage::Vertex, &sources.vertex)?;
        let fragment = compile(device, ShaderStage::Fragment, &sources.fragment)?;

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("opengd uniform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: Some(DrawUniforms::min_binding_size()),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("opengd quad pipeline layout"),
            bind_group_layouts: &[&uniform_layout, texture_layout],
            immediate_size: 0,
        });

        let link = |blend: BlendMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(match blend {
                    BlendMode::Normal => "opengd quad pipeline (normal)",
                    BlendMode::Additive => "opengd quad pipeline (additive)",
                }),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex2D::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(blend.blend_state()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                // Cleared every frame, never tested: draws land in submission order.
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Always,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let normal = link(BlendMode::Normal);
        let additive = link(BlendMode::Additive);
        log::debug!("shader program linked for {surface_format:?}");

        Ok(Self {
            uniform_layout,
            normal,
            additive,
        })
    }

    pub fn pipeline(&self, blend: BlendMode) -> &wgpu::RenderPipeline {
        match blend {
            BlendMode::Normal => &self.normal,
            BlendMode::Additive => &self.additive,
        }
    }

    pub fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_layout
    }
}

fn compile(device: &wgpu::Device, stage: ShaderStage, source: &str) -> Result<wgpu::ShaderModule, ShaderError> {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(match stage {
            ShaderStage::Vertex => "opengd vertex shader",
            ShaderStage::Fragment => "opengd fragment shader",
        }),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let info = pollster::block_on(module.get_compilation_info());
    let errors: Vec<String> = info
        .messages
        .iter()
        .filter(|m| m.message_type == wgpu::CompilationMessageType::Error)
        .map(|m| match &m.location {
            Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
            None => m.message.clone(),
        })
        .collect();

    if errors.is_empty() {
        Ok(module)
    } else {
        Err(ShaderError::Compile {
            stage,
            log: errors.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_matches_wgsl_layout() {
        // 3 mat4 + vec4 + u32, rounded up to 16-byte struct alignment
        assert_eq!(DrawUniforms::SIZE, 224);
    }

    #[test]
    fn builtin_sources_share_the_uniform_block() {
        let src = ShaderSources::builtin();
        assert!(src.vertex.contains("struct DrawUniforms"));
        assert!(src.fragment.contains("struct DrawUniforms"));
        assert!(src.vertex.contains("fn vs_main"));
        assert!(src.fragment.contains("fn fs_main"));
    }

    #[test]
    fn from_files_reads_both_stages() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("a.vert.wgsl");
        let fs = dir.path().join("a.frag.wgsl");
        std::fs::write(&vs, "// vs").unwrap();
        std::fs::write(&fs, "// fs").unwrap();

        let src = ShaderSources::from_files(&vs, &fs).unwrap();
        assert_eq!(src.vertex, "// vs");
        assert_eq!(src.fragment, "// fs");
    }

    #[test]
    fn missing_stage_names_the_stage() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("a.vert.wgsl");
        std::fs::write(&vs, "// vs").unwrap();

        let err = ShaderSources::from_files(&vs, dir.path().join("missing.wgsl")).unwrap_err();
        assert!(matches!(err, ShaderError::Read { stage: ShaderStage::Fragment, .. }));
    }
}
