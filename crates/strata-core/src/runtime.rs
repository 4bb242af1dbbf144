use crate::{DrawList, RenderBackend};

/// Counters collected while running a frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub actors_updated: usize,
    pub widgets_drawn: usize,
    pub layout_passes: u32,
    pub draw_commands: usize,
}

/// Output of [`Scene::frame`](crate::Scene::frame).
#[derive(Clone, Debug)]
pub struct Frame {
    pub draw_list: DrawList,
    pub stats: FrameStats,
}

impl Frame {
    pub fn present(&self, backend: &mut dyn RenderBackend) {
        log::trace!(
            "presenting {} command(s) from {} widget(s)",
            self.draw_list.len(),
            self.stats.widgets_drawn
        );
        backend.frame(&self.draw_list);
    }
}
