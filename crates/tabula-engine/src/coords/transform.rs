/// Affine 2D transform stored as three column vectors `[a b] [c d] [tx ty]`.
///
/// Maps `(x, y)` to `(a·x + c·y + tx, b·x + d·y + ty)`. The layout matches the
/// `vec2[3]` uniform the shaders consume, so [`Transform::to_uniform`] is a
/// plain copy.
///
/// Builder methods post-multiply: `t.translate(x, y)` first translates, then
/// applies `t`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub m: [f32; 6],
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self { m: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0] }
    }

    #[inline]
    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { m: [a, b, c, d, tx, ty] }
    }

    #[inline]
    pub const fn translation(x: f32, y: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    #[inline]
    pub const fn scaling(x: f32, y: f32) -> Self {
        Self::new(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    /// Counter-clockwise rotation by `radians`.
    #[inline]
    pub fn rotation(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// `self ∘ other`: applies `other` first.
    pub fn compose(self, other: Transform) -> Self {
        let [a, b, c, d, tx, ty] = self.m;
        let [oa, ob, oc, od, otx, oty] = other.m;
        Self::new(
            a * oa + c * ob,
            b * oa + d * ob,
            a * oc + c * od,
            b * oc + d * od,
            a * otx + c * oty + tx,
            b * otx + d * oty + ty,
        )
    }

    #[inline]
    pub fn translate(self, x: f32, y: f32) -> Self {
        self.compose(Self::translation(x, y))
    }

    #[inline]
    pub fn scale(self, x: f32, y: f32) -> Self {
        self.compose(Self::scaling(x, y))
    }

    #[inline]
    pub fn rotate(self, radians: f32) -> Self {
        self.compose(Self::rotation(radians))
    }

    #[inline]
    pub fn apply(self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, tx, ty] = self.m;
        (a * x + c * y + tx, b * x + d * y + ty)
    }

    #[inline]
    pub fn determinant(self) -> f32 {
        self.m[0] * self.m[3] - self.m[2] * self.m[1]
    }

    /// Inverse transform, `None` when the linear part is singular.
    pub fn inverse(self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let [a, b, c, d, tx, ty] = self.m;
        let inv = 1.0 / det;
        let (ia, ib, ic, id) = (d * inv, -b * inv, -c * inv, a * inv);
        Some(Self::new(ia, ib, ic, id, -(ia * tx + ic * ty), -(ib * tx + id * ty)))
    }

    /// Column data in `vec2[3]` uniform order.
    #[inline]
    pub fn to_uniform(&self) -> &[f32; 6] {
        &self.m
    }
}
