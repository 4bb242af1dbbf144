use crate::DrawList;

pub trait RenderBackend {
    fn configure_surface(&mut self, width: u32, height: u32);
    fn frame(&mut self, list: &DrawList);
}

/// Backend that keeps the last submitted list, for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub surface: (u32, u32),
    pub frames: usize,
    pub last: DrawList,
}

impl RenderBackend for RecordingBackend {
    fn configure_surface(&mut self, width: u32, height: u32) {
        self.surface = (width, height);
    }

    fn frame(&mut self, list: &DrawList) {
        self.frames += 1;
        self.last = list.clone();
    }
}
