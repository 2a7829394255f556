//! Integer value types shared by the pattern model, the animation algebra and
//! the wire codec.
//!
//! Pattern math is done entirely in integers (a caller-defined fixed-point
//! scale) so that both sides of the protocol agree exactly on tile placement.
//! The only float type here is [Vec4], which is what presenters consume after
//! colors have been converted to the 0-1 scale.

use crate::{animation::AnimationError, util::range::NumRange};
use derive_more::{Add, AddAssign, Display, Mul, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};
use std::ops;

/// A 2D integer vector, used for corner coordinates, tile translations and
/// group offsets.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Add,
    Sub,
    Neg,
    Mul,
    AddAssign,
    SubAssign,
    Serialize,
    Deserialize,
)]
#[display(fmt = "({}, {})", x, y)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Componentwise addition, `None` on overflow
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(rhs.x)?,
            self.y.checked_add(rhs.y)?,
        ))
    }

    /// Scale both components, `None` on overflow
    pub fn checked_scale(self, factor: i32) -> Option<Self> {
        Some(Self::new(
            self.x.checked_mul(factor)?,
            self.y.checked_mul(factor)?,
        ))
    }
}

/// A 3D integer vector
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Add,
    Sub,
    Neg,
    Mul,
    AddAssign,
    SubAssign,
    Serialize,
    Deserialize,
)]
#[display(fmt = "({}, {}, {})", x, y, z)]
pub struct Vec3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// An integer RGBA color on the 0-255 scale. The components are named
/// `x, y, z, w` (red, green, blue, alpha) to match the wire format.
///
/// Components are allowed to leave [0, 255] while an animation is being
/// evaluated. Use [Vec4i::clamped] to bring a final value back into range.
#[derive(
    Copy, Clone, Debug, Default, Display, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[display(fmt = "rgba({}, {}, {}, {})", x, y, z, w)]
pub struct Vec4i {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub w: i32,
}

impl Vec4i {
    /// The valid range of a single component once a color is finalized
    pub const COMPONENT_RANGE: NumRange<i32> = NumRange::new(0, 255);

    pub const ZERO: Self = Self::new(0, 0, 0, 0);
    pub const ONE: Self = Self::new(1, 1, 1, 1);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const RED: Self = Self::new(255, 0, 0, 255);
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    pub const CYAN: Self = Self::new(0, 255, 255, 255);

    pub const fn new(x: i32, y: i32, z: i32, w: i32) -> Self {
        Self { x, y, z, w }
    }

    /// Build an opaque color from red, green, and blue
    pub const fn rgb(x: i32, y: i32, z: i32) -> Self {
        Self::new(x, y, z, 255)
    }

    pub fn to_array(self) -> [i32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Force every component into [0, 255]
    pub fn clamped(self) -> Self {
        let range = Self::COMPONENT_RANGE;
        Self::new(
            range.clamp(self.x),
            range.clamp(self.y),
            range.clamp(self.z),
            range.clamp(self.w),
        )
    }

    /// Convert this color to the 0-1 float scale that presenters use.
    /// Components outside [0, 255] map proportionally, no clamping is done.
    pub fn to_unit_float(self) -> Vec4 {
        let source: NumRange<f32> = NumRange::new(0.0, 255.0);
        Vec4::new(
            source.normalize(self.x as f32),
            source.normalize(self.y as f32),
            source.normalize(self.z as f32),
            source.normalize(self.w as f32),
        )
    }

    fn zip_with(
        self,
        rhs: Self,
        f: impl Fn(i32, i32) -> Result<i32, AnimationError>,
    ) -> Result<Self, AnimationError> {
        Ok(Self::new(
            f(self.x, rhs.x)?,
            f(self.y, rhs.y)?,
            f(self.z, rhs.z)?,
            f(self.w, rhs.w)?,
        ))
    }

    /// Componentwise addition that fails instead of wrapping
    pub fn checked_add(self, rhs: Self) -> Result<Self, AnimationError> {
        self.zip_with(rhs, |a, b| {
            a.checked_add(b).ok_or(AnimationError::Overflow)
        })
    }

    /// Componentwise multiplication that fails instead of wrapping
    pub fn checked_mul(self, rhs: Self) -> Result<Self, AnimationError> {
        self.zip_with(rhs, |a, b| {
            a.checked_mul(b).ok_or(AnimationError::Overflow)
        })
    }

    /// Componentwise (truncating) division. A zero in any component of the
    /// divisor is an error.
    pub fn checked_div(self, rhs: Self) -> Result<Self, AnimationError> {
        self.zip_with(rhs, |a, b| {
            if b == 0 {
                Err(AnimationError::DivisionByZero)
            } else {
                a.checked_div(b).ok_or(AnimationError::Overflow)
            }
        })
    }
}

impl From<[i32; 4]> for Vec4i {
    fn from([x, y, z, w]: [i32; 4]) -> Self {
        Self::new(x, y, z, w)
    }
}

// The operators below panic on overflow (and `/` on zero) like the integer
// operators do. Animation code goes through the `checked_*` methods instead.

impl ops::Add for Vec4i {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

// Scale a color by a constant
impl ops::Mul<i32> for Vec4i {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

impl ops::Div<i32> for Vec4i {
    type Output = Self;

    fn div(self, rhs: i32) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs, self.w / rhs)
    }
}

/// A float RGBA color (or generic 4-vector) on the 0-1 scale
#[derive(Copy, Clone, Debug, Default, Display, PartialEq)]
#[display(fmt = "({}, {}, {}, {})", x, y, z, w)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, AnimationError> {
        Ok(Self::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        ))
    }

    pub fn checked_mul(self, rhs: Self) -> Result<Self, AnimationError> {
        Ok(Self::new(
            self.x * rhs.x,
            self.y * rhs.y,
            self.z * rhs.z,
            self.w * rhs.w,
        ))
    }

    /// Componentwise division. Dividing by zero would hand NaN or infinity to
    /// the renderer, so it's an error instead.
    pub fn checked_div(self, rhs: Self) -> Result<Self, AnimationError> {
        if rhs.to_array().iter().any(|c| *c == 0.0) {
            return Err(AnimationError::DivisionByZero);
        }
        Ok(Self::new(
            self.x / rhs.x,
            self.y / rhs.y,
            self.z / rhs.z,
            self.w / rhs.w,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use serde_test::{assert_tokens, Token};

    #[test]
    fn test_vec2_ops() {
        let a = Vec2::new(3, -4);
        let b = Vec2::new(10, 20);
        assert_eq!(a + b, Vec2::new(13, 16));
        assert_eq!(b - a, Vec2::new(7, 24));
        assert_eq!(-a, Vec2::new(-3, 4));
        assert_eq!(a * 3, Vec2::new(9, -12));
    }

    #[test]
    fn test_vec2_checked() {
        let big = Vec2::new(i32::MAX, 0);
        assert_eq!(
            big.checked_add(Vec2::new(0, 5)),
            Some(Vec2::new(i32::MAX, 5))
        );
        assert_eq!(big.checked_add(Vec2::new(1, 0)), None);
        assert_eq!(
            Vec2::new(3, -4).checked_scale(-2),
            Some(Vec2::new(-6, 8))
        );
        assert_eq!(big.checked_scale(2), None);
        assert_eq!(Vec2::new(0, i32::MIN).checked_scale(-1), None);
    }

    #[test]
    fn test_vec2_ordering() {
        // Lexicographic: x first, then y
        assert!(Vec2::new(1, 100) < Vec2::new(2, 0));
        assert!(Vec2::new(1, 0) < Vec2::new(1, 1));
        assert!(Vec3::new(0, 5, 0) < Vec3::new(0, 5, 1));
    }

    #[test]
    fn test_vec2_serde() {
        assert_tokens(
            &Vec2::new(5, -6),
            &[
                Token::Struct {
                    name: "Vec2",
                    len: 2,
                },
                Token::Str("x"),
                Token::I32(5),
                Token::Str("y"),
                Token::I32(-6),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn test_vec4i_checked_ops() {
        let color = Vec4i::new(100, 200, 50, 255);
        assert_eq!(
            color.checked_add(Vec4i::new(100, 100, 100, 0)).unwrap(),
            Vec4i::new(200, 300, 150, 255)
        );
        assert_eq!(
            color.checked_mul(Vec4i::new(2, 1, 0, 1)).unwrap(),
            Vec4i::new(200, 200, 0, 255)
        );
        assert_eq!(
            color.checked_div(Vec4i::new(2, 3, 5, 255)).unwrap(),
            Vec4i::new(50, 66, 10, 1)
        );
        assert_eq!(
            color.checked_div(Vec4i::new(1, 0, 1, 1)),
            Err(AnimationError::DivisionByZero)
        );
        assert_eq!(
            Vec4i::new(i32::MAX, 0, 0, 0).checked_add(Vec4i::ONE),
            Err(AnimationError::Overflow)
        );
    }

    #[test]
    fn test_vec4i_scalar_ops() {
        assert_eq!(Vec4i::new(1, 2, 3, 4) * 2, Vec4i::new(2, 4, 6, 8));
        assert_eq!(Vec4i::new(10, 20, 30, 40) / 10, Vec4i::new(1, 2, 3, 4));
        assert_eq!(Vec4i::RED + Vec4i::BLUE, Vec4i::new(255, 0, 255, 510));
    }

    #[test]
    #[should_panic]
    fn test_vec4i_scalar_div_by_zero() {
        let _ = Vec4i::WHITE / 0;
    }

    #[test]
    fn test_vec4i_scalar_ops_have_checked_forms() {
        // Same values the panicking operators would choke on
        let big = Vec4i::new(i32::MAX, 0, 0, 0);
        assert_eq!(big.checked_add(big), Err(AnimationError::Overflow));
        assert_eq!(
            big.checked_mul(Vec4i::new(2, 2, 2, 2)),
            Err(AnimationError::Overflow)
        );
        assert_eq!(
            Vec4i::WHITE.checked_div(Vec4i::ZERO),
            Err(AnimationError::DivisionByZero)
        );
    }

    #[test]
    fn test_vec4i_clamped() {
        assert_eq!(
            Vec4i::new(-5, 300, 128, 255).clamped(),
            Vec4i::new(0, 255, 128, 255)
        );
    }

    #[test]
    fn test_vec4i_to_unit_float() {
        let float = Vec4i::new(0, 51, 255, 255).to_unit_float();
        assert_approx_eq!(float.x, 0.0);
        assert_approx_eq!(float.y, 0.2);
        assert_approx_eq!(float.z, 1.0);
        assert_approx_eq!(float.w, 1.0);
    }

    #[test]
    fn test_vec4_div_by_zero() {
        assert_eq!(
            Vec4::ONE.checked_div(Vec4::new(1.0, 1.0, 0.0, 1.0)),
            Err(AnimationError::DivisionByZero)
        );
        assert_eq!(Vec4::ONE.checked_div(Vec4::ONE), Ok(Vec4::ONE));
    }
}
