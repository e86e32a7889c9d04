//! The two dispatch tables the game loop talks to. Exactly one implementation of each
//! is bound at startup, and the frame loop never learns which.

use color_eyre::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use crate::renderer::config::RenderConfig;

/// Anything a presentation surface can be bound to
pub trait NativeWindow: HasDisplayHandle + HasWindowHandle {}

impl<T: HasDisplayHandle + HasWindowHandle> NativeWindow for T {}

/// Index into a backend's shader program pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShaderInfo {
    pub num_inputs: u8,
    pub used_textures: [bool; 2],
}

/// Rendering capability set.
///
/// Every method other than `init` assumes `init` has already succeeded; calling them
/// earlier is a programming error.
pub trait RenderingApi {
    /// Whether clip-space depth runs 0..1 (as opposed to -1..1)
    fn z_is_from_0_to_1(&self) -> bool;
    fn unload_shader(&mut self, old_prg: ShaderHandle);
    fn load_shader(&mut self, new_prg: ShaderHandle);
    fn create_and_load_new_shader(&mut self, shader_id: u32) -> ShaderHandle;
    fn lookup_shader(&self, shader_id: u32) -> Option<ShaderHandle>;
    fn shader_get_info(&self, prg: ShaderHandle) -> ShaderInfo;
    fn new_texture(&mut self) -> u32;
    fn select_texture(&mut self, tile: usize, texture_id: u32);
    fn upload_texture(&mut self, rgba32_buf: &[u8], width: u32, height: u32);
    fn set_sampler_parameters(&mut self, tile: usize, linear_filter: bool, cms: u32, cmt: u32);
    fn set_depth_test(&mut self, depth_test: bool);
    fn set_depth_mask(&mut self, z_upd: bool);
    fn set_zmode_decal(&mut self, zmode_decal: bool);
    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn set_scissor(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn set_use_alpha(&mut self, use_alpha: bool);
    /// `buf_vbo` holds `buf_vbo_num_tris * 3` vertices of interleaved float attributes
    fn draw_triangles(&mut self, buf_vbo: &[f32], buf_vbo_num_tris: usize);
    fn init(&mut self, window: Option<&dyn NativeWindow>) -> Result<()>;
    fn start_frame(&mut self) -> Result<()>;
}

/// Callback run once per main-loop iteration
pub type GameIteration<'a> = dyn FnMut(&mut dyn WindowManagerApi) -> Result<()> + 'a;

/// Window and event capability set
pub trait WindowManagerApi {
    fn init(&mut self, config: &RenderConfig) -> Result<()>;
    /// Runs `run_one_game_iter` at the configured cadence until the window closes
    fn main_loop(&mut self, run_one_game_iter: &mut GameIteration<'_>) -> Result<()>;
    fn get_dimensions(&self) -> (u32, u32);
    fn handle_events(&mut self);
    fn start_frame(&mut self) -> bool;
    fn swap_buffers_begin(&mut self);
    fn swap_buffers_end(&mut self);
    /// Seconds since `init`
    fn get_time(&self) -> f64;
    fn should_close(&self) -> bool;
    fn native_window(&self) -> Option<&dyn NativeWindow>;
}
