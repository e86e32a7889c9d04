use ash::vk;

/// Contains often-mutated render toggles set through the rendering API
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub depth_test: bool,
    pub depth_mask: bool,
    pub zmode_decal: bool,
    pub use_alpha: bool,
    pub viewport: vk::Viewport,
    pub scissor: vk::Rect2D,

    pub active_tile: usize,
    pub bound_textures: [Option<u32>; 2],
    pub samplers: [SamplerState; 2],

    pub frame_triangles: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplerState {
    pub linear_filter: bool,
    pub cms: u32,
    pub cmt: u32,
}

impl RenderState {
    pub fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport = vk::Viewport {
            x: x as f32,
            y: y as f32,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
    }

    pub fn set_scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.scissor = vk::Rect2D {
            offset: vk::Offset2D { x, y },
            extent: vk::Extent2D {
                width: width.max(0) as u32,
                height: height.max(0) as u32,
            },
        };
    }

    pub fn begin_frame(&mut self) {
        self.frame_triangles = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scissor_rejects_negative_size() {
        let mut state = RenderState::default();
        state.set_scissor(4, 8, -1, 20);
        assert_eq!(state.scissor.offset, vk::Offset2D { x: 4, y: 8 });
        assert_eq!(state.scissor.extent, vk::Extent2D { width: 0, height: 20 });
    }

    #[test]
    fn viewport_spans_full_depth_range() {
        let mut state = RenderState::default();
        state.set_viewport(0, 0, 640, 480);
        assert_eq!(state.viewport.width, 640.0);
        assert_eq!(state.viewport.height, 480.0);
        assert_eq!(state.viewport.min_depth, 0.0);
        assert_eq!(state.viewport.max_depth, 1.0);
    }
}
