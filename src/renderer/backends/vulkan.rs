use std::collections::HashMap;
use color_eyre::Result;
use crate::renderer::api::{NativeWindow, RenderingApi, ShaderHandle, ShaderInfo};
use crate::renderer::config::RenderConfig;
use crate::renderer::core::context::GraphicsContext;
use crate::renderer::core::error::{BringUpError, SurfaceCreationError};
use crate::renderer::core::state::{RenderState, SamplerState};

#[derive(Debug, Clone, Copy)]
struct ShaderProgram {
    shader_id: u32,
    info: ShaderInfo,
}

/// Rendering backend that owns the Vulkan graphics context.
///
/// Shader translation, texture upload and triangle submission are not implemented;
/// those calls only track state.
pub struct VulkanRenderingApi {
    config: RenderConfig,
    context: Option<GraphicsContext>,
    state: RenderState,

    shader_pool: Vec<ShaderProgram>,
    current_shader: Option<ShaderHandle>,
    next_texture_id: u32,
    texture_sizes: HashMap<u32, (u32, u32)>,
}

impl VulkanRenderingApi {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            context: None,
            state: RenderState::default(),
            shader_pool: Vec::new(),
            current_shader: None,
            next_texture_id: 0,
            texture_sizes: HashMap::new(),
        }
    }

    pub fn context(&self) -> Option<&GraphicsContext> {
        self.context.as_ref()
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn current_shader(&self) -> Option<ShaderHandle> {
        self.current_shader
    }

    pub fn texture_size(&self, texture_id: u32) -> Option<(u32, u32)> {
        self.texture_sizes.get(&texture_id).copied()
    }

    fn debug_assert_initialized(&self) {
        debug_assert!(
            self.context.is_some(),
            "rendering API used before init completed"
        );
    }
}

impl RenderingApi for VulkanRenderingApi {
    fn z_is_from_0_to_1(&self) -> bool {
        true
    }

    fn unload_shader(&mut self, old_prg: ShaderHandle) {
        if self.current_shader == Some(old_prg) {
            self.current_shader = None;
        }
    }

    fn load_shader(&mut self, new_prg: ShaderHandle) {
        self.debug_assert_initialized();
        self.current_shader = Some(new_prg);
    }

    fn create_and_load_new_shader(&mut self, shader_id: u32) -> ShaderHandle {
        self.debug_assert_initialized();
        let handle = ShaderHandle(self.shader_pool.len());
        self.shader_pool.push(ShaderProgram {
            shader_id,
            info: ShaderInfo::default(),
        });
        log::debug!("Registered shader program {:#010x} as {:?}", shader_id, handle);
        self.load_shader(handle);
        handle
    }

    fn lookup_shader(&self, shader_id: u32) -> Option<ShaderHandle> {
        self.shader_pool
            .iter()
            .position(|prg| prg.shader_id == shader_id)
            .map(ShaderHandle)
    }

    fn shader_get_info(&self, prg: ShaderHandle) -> ShaderInfo {
        self.shader_pool
            .get(prg.0)
            .map(|prg| prg.info)
            .unwrap_or_default()
    }

    fn new_texture(&mut self) -> u32 {
        let id = self.next_texture_id;
        self.next_texture_id += 1;
        id
    }

    fn select_texture(&mut self, tile: usize, texture_id: u32) {
        let tile = tile.min(self.state.bound_textures.len() - 1);
        self.state.active_tile = tile;
        self.state.bound_textures[tile] = Some(texture_id);
    }

    fn upload_texture(&mut self, rgba32_buf: &[u8], width: u32, height: u32) {
        debug_assert!(rgba32_buf.len() >= (width as usize) * (height as usize) * 4);
        if let Some(texture_id) = self.state.bound_textures[self.state.active_tile] {
            self.texture_sizes.insert(texture_id, (width, height));
        }
    }

    fn set_sampler_parameters(&mut self, tile: usize, linear_filter: bool, cms: u32, cmt: u32) {
        if let Some(sampler) = self.state.samplers.get_mut(tile) {
            *sampler = SamplerState {
                linear_filter,
                cms,
                cmt,
            };
        }
    }

    fn set_depth_test(&mut self, depth_test: bool) {
        self.state.depth_test = depth_test;
    }

    fn set_depth_mask(&mut self, z_upd: bool) {
        self.state.depth_mask = z_upd;
    }

    fn set_zmode_decal(&mut self, zmode_decal: bool) {
        self.state.zmode_decal = zmode_decal;
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.state.set_viewport(x, y, width, height);
    }

    fn set_scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.state.set_scissor(x, y, width, height);
    }

    fn set_use_alpha(&mut self, use_alpha: bool) {
        self.state.use_alpha = use_alpha;
    }

    fn draw_triangles(&mut self, buf_vbo: &[f32], buf_vbo_num_tris: usize) {
        self.debug_assert_initialized();
        debug_assert!(
            buf_vbo_num_tris == 0 || buf_vbo.len() % (buf_vbo_num_tris * 3) == 0,
            "vertex buffer length is not a whole number of vertices"
        );
        self.state.frame_triangles += buf_vbo_num_tris;
    }

    fn init(&mut self, window: Option<&dyn NativeWindow>) -> Result<()> {
        let window = window.ok_or(BringUpError::SurfaceCreation(SurfaceCreationError::NoNativeWindow))?;
        self.context = Some(GraphicsContext::new(window, &self.config)?);
        Ok(())
    }

    fn start_frame(&mut self) -> Result<()> {
        self.state.begin_frame();
        if let Some(context) = self.context.as_mut() {
            context.refresh_swapchain()?;
        }
        Ok(())
    }
}
