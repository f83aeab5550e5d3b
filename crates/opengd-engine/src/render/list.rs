use glam::Mat4;

use crate::coords::{ColorRgb, ColorRgba, Viewport};

use super::{BlendMode, BoundTexture};

/// One textured quad with every piece of pipeline state it depends on.
///
/// Commands are self-contained so state changes between draws never affect
/// an already recorded quad.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadCmd {
    pub projection: Mat4,
    pub view: Mat4,
    pub model: Mat4,
    pub color: ColorRgba,
    pub texture: BoundTexture,
    pub blend: BlendMode,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Clears color (alpha 1) and depth.
    Clear(ColorRgb),
    Quad(QuadCmd),
}

/// Recorded draw stream for one frame, in submission order.
///
/// `push()` is O(1); `clear()` keeps the allocation for the next frame.
#[derive(Debug, Default)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    #[inline]
    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    #[inline]
    pub fn cmds(&self) -> &[DrawCmd] {
        &self.cmds
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Quad commands only, in order.
    pub fn quads(&self) -> impl Iterator<Item = &QuadCmd> {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Quad(q) => Some(q),
            DrawCmd::Clear(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> QuadCmd {
        QuadCmd {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            color: ColorRgba::white(),
            texture: BoundTexture::None,
            blend: BlendMode::Normal,
            viewport: Viewport::new(1, 1),
        }
    }

    #[test]
    fn keeps_submission_order() {
        let mut list = DrawList::new();
        list.push(DrawCmd::Quad(quad()));
        list.push(DrawCmd::Clear(ColorRgb::black()));
        list.push(DrawCmd::Quad(quad()));

        assert_eq!(list.len(), 3);
        assert!(matches!(list.cmds()[1], DrawCmd::Clear(_)));
        assert_eq!(list.quads().count(), 2);
    }

    #[test]
    fn clear_empties() {
        let mut list = DrawList::new();
        list.push(DrawCmd::Quad(quad()));
        list.clear();
        assert!(list.is_empty());
    }
}
