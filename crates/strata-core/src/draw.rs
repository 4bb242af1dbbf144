use crate::{Basis, Color, Rect};

/// Flat list of draw commands produced by one frame, consumed by a
/// [`RenderBackend`](crate::RenderBackend).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    pub clear_color: Color,
    pub commands: Vec<DrawCommand>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Rect {
        rect: Rect,
        color: Color,
        radius: f32,
    },
    Border {
        rect: Rect,
        color: Color,
        width: f32,
        radius: f32,
    },
    Text {
        rect: Rect,
        text: String,
        color: Color,
        size: f32,
    },
    Image {
        rect: Rect,
        image: String,
        tint: Color,
    },
    PushClip {
        rect: Rect,
    },
    PopClip,
    PushTransform {
        basis: Basis,
    },
    PopTransform,
}

impl DrawList {
    pub fn new(clear_color: Color) -> Self {
        Self {
            clear_color,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Rects of every `Rect`/`Image` command in submission order.
    pub fn filled_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Rect { rect, .. } | DrawCommand::Image { rect, .. } => Some(*rect),
            _ => None,
        })
    }
}
