use super::Transform;

/// Pixel rectangle of the active GL viewport.
///
/// Host coordinates use this as their basis: origin bottom-left, +Y up, one
/// unit per pixel.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    #[inline]
    pub const fn from_array([x, y, width, height]: [i32; 4]) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Converts a host transform into the form draw primitives expect.
    ///
    /// `t` places the centered square `(-0.5, -0.5)..(0.5, 0.5)` in pixel
    /// space. The result places the unit quad `(0, 0)..(1, 1)` in clip space
    /// `(-1, -1)..(1, 1)`. `flip` mirrors the quad vertically, which is what
    /// textures produced by a canvas need.
    pub fn to_clip_space(self, t: Transform, flip: bool) -> Transform {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        let mut ret = Transform::translation(-1.0, -1.0)
            .scale(2.0 / w, 2.0 / h)
            .compose(t);
        if flip {
            ret = ret.scale(1.0, -1.0);
        }
        ret.translate(-0.5, -0.5)
    }
}
