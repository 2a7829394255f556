//! A small declarative animation algebra. An animation is an expression tree
//! that yields a value (usually a color) for a point in time. The protocol
//! only ever ships constants and the four arithmetic nodes; time-varying leaf
//! kinds (interpolations and the like) are plugged in by the engine side via
//! [AnimationLeaf], and the algebra can still combine them.

use crate::geometry::{Vec4, Vec4i};
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;

/// Time, in milliseconds, used to evaluate animations. Supplied by whatever
/// clock the host uses.
pub type TimeMs = i64;

/// An animation over integer colors on the 0-255 scale. This is what travels
/// over the wire.
pub type Vec4iAnimation = Animation<Vec4i>;
/// An animation over float vectors, typically colors on the 0-1 scale. This is
/// what presenters consume.
pub type Vector4Animation = Animation<Vec4>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum AnimationError {
    #[error("division by zero while evaluating animation")]
    DivisionByZero,
    #[error("integer overflow while evaluating animation")]
    Overflow,
}

/// A value type that animations can be built over. Arithmetic is fallible so
/// that bad inputs surface as errors instead of garbage colors.
pub trait AnimationValue:
    Copy + Debug + PartialEq + Send + Sync + 'static
{
    /// Additive identity
    const ZERO: Self;
    /// Multiplicative identity
    const ONE: Self;

    fn add(self, rhs: Self) -> Result<Self, AnimationError>;
    fn multiply(self, rhs: Self) -> Result<Self, AnimationError>;
    fn divide(self, rhs: Self) -> Result<Self, AnimationError>;

    /// Interpolate between two values, `elapsed` of the way through
    /// `duration`. Callers guarantee `0 <= elapsed < duration`. Unsigned so
    /// that any two [TimeMs] values are at most `u64::MAX` apart.
    fn interpolate(
        from: Self,
        to: Self,
        elapsed: u64,
        duration: u64,
    ) -> Self;
}

impl AnimationValue for Vec4i {
    const ZERO: Self = Vec4i::ZERO;
    const ONE: Self = Vec4i::ONE;

    fn add(self, rhs: Self) -> Result<Self, AnimationError> {
        self.checked_add(rhs)
    }

    fn multiply(self, rhs: Self) -> Result<Self, AnimationError> {
        self.checked_mul(rhs)
    }

    fn divide(self, rhs: Self) -> Result<Self, AnimationError> {
        self.checked_div(rhs)
    }

    fn interpolate(
        from: Self,
        to: Self,
        elapsed: u64,
        duration: u64,
    ) -> Self {
        // Widen so the intermediate product can't overflow. The delta is
        // under 2^33 and elapsed under 2^64, and the result lies between a
        // and b, so it fits back in an i32.
        let (elapsed, duration) = (i128::from(elapsed), i128::from(duration));
        let lerp = |a: i32, b: i32| {
            let delta = (i128::from(b) - i128::from(a)) * elapsed / duration;
            (i128::from(a) + delta) as i32
        };
        Vec4i::new(
            lerp(from.x, to.x),
            lerp(from.y, to.y),
            lerp(from.z, to.z),
            lerp(from.w, to.w),
        )
    }
}

impl AnimationValue for Vec4 {
    const ZERO: Self = Vec4::ZERO;
    const ONE: Self = Vec4::ONE;

    fn add(self, rhs: Self) -> Result<Self, AnimationError> {
        self.checked_add(rhs)
    }

    fn multiply(self, rhs: Self) -> Result<Self, AnimationError> {
        self.checked_mul(rhs)
    }

    fn divide(self, rhs: Self) -> Result<Self, AnimationError> {
        self.checked_div(rhs)
    }

    fn interpolate(
        from: Self,
        to: Self,
        elapsed: u64,
        duration: u64,
    ) -> Self {
        let ratio = (elapsed as f64 / duration as f64) as f32;
        let lerp = |a: f32, b: f32| a + (b - a) * ratio;
        Vec4::new(
            lerp(from.x, to.x),
            lerp(from.y, to.y),
            lerp(from.z, to.z),
            lerp(from.w, to.w),
        )
    }
}

/// An opaque, possibly time-varying leaf node. Leaves are never folded by
/// [Animation::simplify] and have no wire encoding.
pub trait AnimationLeaf<V>: Debug + Send + Sync {
    /// Short name for the leaf kind, used in logs and errors
    fn kind(&self) -> &'static str;

    fn evaluate(&self, time_ms: TimeMs) -> Result<V, AnimationError>;
}

/// An expression tree over some [AnimationValue]. Operands are owned, so a
/// node can never be missing one of its children.
#[derive(Clone, Debug)]
pub enum Animation<V: AnimationValue> {
    Constant(V),
    Add(Box<Animation<V>>, Box<Animation<V>>),
    Multiply(Box<Animation<V>>, Box<Animation<V>>),
    Divide(Box<Animation<V>>, Box<Animation<V>>),
    Leaf(Arc<dyn AnimationLeaf<V>>),
}

impl<V: AnimationValue> Animation<V> {
    pub fn constant(value: V) -> Self {
        Self::Constant(value)
    }

    pub fn add(left: Self, right: Self) -> Self {
        Self::Add(Box::new(left), Box::new(right))
    }

    pub fn multiply(left: Self, right: Self) -> Self {
        Self::Multiply(Box::new(left), Box::new(right))
    }

    pub fn divide(left: Self, right: Self) -> Self {
        Self::Divide(Box::new(left), Box::new(right))
    }

    pub fn leaf(leaf: impl AnimationLeaf<V> + 'static) -> Self {
        Self::Leaf(Arc::new(leaf))
    }

    /// Get the value if this node is a constant
    pub fn as_constant(&self) -> Option<V> {
        match self {
            Self::Constant(value) => Some(*value),
            _ => None,
        }
    }

    /// Number of nodes on the longest root-to-leaf path. A constant has depth
    /// 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Constant(_) | Self::Leaf(_) => 1,
            Self::Add(left, right)
            | Self::Multiply(left, right)
            | Self::Divide(left, right) => 1 + left.depth().max(right.depth()),
        }
    }

    /// Does this tree contain any engine-side leaves?
    pub fn has_leaves(&self) -> bool {
        match self {
            Self::Constant(_) => false,
            Self::Leaf(_) => true,
            Self::Add(left, right)
            | Self::Multiply(left, right)
            | Self::Divide(left, right) => {
                left.has_leaves() || right.has_leaves()
            }
        }
    }

    /// Compute the value of this animation at the given time
    pub fn evaluate(&self, time_ms: TimeMs) -> Result<V, AnimationError> {
        match self {
            Self::Constant(value) => Ok(*value),
            Self::Add(left, right) => {
                left.evaluate(time_ms)?.add(right.evaluate(time_ms)?)
            }
            Self::Multiply(left, right) => {
                left.evaluate(time_ms)?.multiply(right.evaluate(time_ms)?)
            }
            Self::Divide(left, right) => {
                left.evaluate(time_ms)?.divide(right.evaluate(time_ms)?)
            }
            Self::Leaf(leaf) => leaf.evaluate(time_ms),
        }
    }

    /// Rewrite this tree into a smaller equivalent one. Constant subtrees are
    /// folded and identity operations (`+ 0`, `* 1`, `/ 1`) are dropped.
    ///
    /// The result always evaluates to the same value as the input at
    /// `time_ms`, and simplifying an already simplified tree is a no-op. A
    /// subtree that fails to evaluate (e.g. divides by zero) is left as-is so
    /// that evaluating the result still reports the failure.
    pub fn simplify(&self, time_ms: TimeMs) -> Self {
        match self {
            Self::Constant(_) | Self::Leaf(_) => self.clone(),
            Self::Add(left, right) => {
                let (left, right) =
                    (left.simplify(time_ms), right.simplify(time_ms));
                if left.as_constant() == Some(V::ZERO) {
                    right
                } else if right.as_constant() == Some(V::ZERO) {
                    left
                } else {
                    Self::fold(Self::add(left, right), time_ms)
                }
            }
            Self::Multiply(left, right) => {
                let (left, right) =
                    (left.simplify(time_ms), right.simplify(time_ms));
                if left.as_constant() == Some(V::ONE) {
                    right
                } else if right.as_constant() == Some(V::ONE) {
                    left
                } else {
                    Self::fold(Self::multiply(left, right), time_ms)
                }
            }
            Self::Divide(left, right) => {
                let (left, right) =
                    (left.simplify(time_ms), right.simplify(time_ms));
                // Only the divisor has an identity
                if right.as_constant() == Some(V::ONE) {
                    left
                } else {
                    Self::fold(Self::divide(left, right), time_ms)
                }
            }
        }
    }

    /// Collapse a binary node whose operands are both constants. If the
    /// arithmetic fails, the node is returned untouched.
    fn fold(node: Self, time_ms: TimeMs) -> Self {
        let both_constant = match &node {
            Self::Add(left, right)
            | Self::Multiply(left, right)
            | Self::Divide(left, right) => {
                left.as_constant().is_some() && right.as_constant().is_some()
            }
            Self::Constant(_) | Self::Leaf(_) => false,
        };
        if !both_constant {
            return node;
        }
        match node.evaluate(time_ms) {
            Ok(value) => Self::Constant(value),
            Err(_) => node,
        }
    }
}

impl<V: AnimationValue> From<V> for Animation<V> {
    fn from(value: V) -> Self {
        Self::Constant(value)
    }
}

// Leaves are opaque, so two leaf nodes are only equal if they're the same
// shared instance
impl<V: AnimationValue> PartialEq for Animation<V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Constant(a), Self::Constant(b)) => a == b,
            (Self::Add(a1, a2), Self::Add(b1, b2))
            | (Self::Multiply(a1, a2), Self::Multiply(b1, b2))
            | (Self::Divide(a1, a2), Self::Divide(b1, b2)) => {
                a1 == b1 && a2 == b2
            }
            (Self::Leaf(a), Self::Leaf(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Vec4iAnimation {
    /// Convert an integer color animation on the 0-255 scale into a float
    /// animation on the 0-1 scale, for handing to a presenter.
    ///
    /// The converted tree evaluates to the scaled-down value of the original.
    /// Products and quotients need an extra factor of 255 for that to hold,
    /// since `(a / 255) * (b / 255)` is off from `(a * b) / 255` by exactly
    /// that much. Float division doesn't truncate, so quotients may differ
    /// slightly from the integer result.
    pub fn to_unit_float(&self) -> Vector4Animation {
        const SCALE: Vec4 = Vec4::new(255.0, 255.0, 255.0, 255.0);
        match self {
            Self::Constant(value) => Animation::Constant(value.to_unit_float()),
            Self::Add(left, right) => {
                Animation::add(left.to_unit_float(), right.to_unit_float())
            }
            Self::Multiply(left, right) => Animation::multiply(
                Animation::multiply(
                    left.to_unit_float(),
                    right.to_unit_float(),
                ),
                Animation::Constant(SCALE),
            ),
            Self::Divide(left, right) => Animation::divide(
                Animation::divide(left.to_unit_float(), right.to_unit_float()),
                Animation::Constant(SCALE),
            ),
            Self::Leaf(leaf) => Animation::leaf(UnitFloatLeaf {
                inner: Arc::clone(leaf),
            }),
        }
    }
}

/// Adapter that exposes an integer color leaf as a float leaf
#[derive(Debug)]
struct UnitFloatLeaf {
    inner: Arc<dyn AnimationLeaf<Vec4i>>,
}

impl AnimationLeaf<Vec4> for UnitFloatLeaf {
    fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    fn evaluate(&self, time_ms: TimeMs) -> Result<Vec4, AnimationError> {
        Ok(self.inner.evaluate(time_ms)?.to_unit_float())
    }
}

/// A linear transition from one value to another over a time window. Before
/// the window it holds `from`, after the window it holds `to`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinearAnimation<V> {
    pub from: V,
    pub to: V,
    pub start_ms: TimeMs,
    pub end_ms: TimeMs,
}

impl<V: AnimationValue> AnimationLeaf<V> for LinearAnimation<V> {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn evaluate(&self, time_ms: TimeMs) -> Result<V, AnimationError> {
        if time_ms >= self.end_ms {
            Ok(self.to)
        } else if time_ms <= self.start_ms {
            Ok(self.from)
        } else {
            // start < time < end here, so both differences are positive
            let since = |ms: TimeMs| {
                (i128::from(ms) - i128::from(self.start_ms)) as u64
            };
            Ok(V::interpolate(
                self.from,
                self.to,
                since(time_ms),
                since(self.end_ms),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn c(x: i32, y: i32, z: i32, w: i32) -> Vec4iAnimation {
        Animation::constant(Vec4i::new(x, y, z, w))
    }

    fn fade() -> Vec4iAnimation {
        Animation::leaf(LinearAnimation {
            from: Vec4i::BLACK,
            to: Vec4i::WHITE,
            start_ms: 0,
            end_ms: 1000,
        })
    }

    /// A grab bag of trees that exercise every rule in simplify
    fn sample_trees() -> Vec<Vec4iAnimation> {
        vec![
            c(1, 2, 3, 4),
            Animation::add(c(1, 2, 3, 4), c(10, 10, 10, 10)),
            Animation::add(c(0, 0, 0, 0), fade()),
            Animation::add(fade(), c(0, 0, 0, 0)),
            Animation::multiply(c(1, 1, 1, 1), fade()),
            Animation::multiply(fade(), c(2, 2, 2, 1)),
            Animation::divide(fade(), c(1, 1, 1, 1)),
            Animation::divide(c(1, 1, 1, 1), fade()),
            Animation::divide(c(10, 10, 10, 10), c(0, 1, 1, 1)),
            Animation::multiply(
                Animation::add(c(100, 0, 0, 255), c(0, 0, 0, 0)),
                Animation::divide(
                    Animation::add(fade(), c(1, 1, 1, 1)),
                    Animation::multiply(c(1, 1, 1, 1), c(2, 2, 2, 2)),
                ),
            ),
        ]
    }

    #[test]
    fn test_evaluate() {
        let anim = Animation::divide(
            Animation::multiply(c(10, 20, 30, 40), c(3, 3, 3, 1)),
            Animation::add(c(1, 1, 1, 1), c(1, 1, 1, 0)),
        );
        assert_eq!(anim.evaluate(0), Ok(Vec4i::new(15, 30, 45, 40)));
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        let anim = Animation::divide(c(10, 10, 10, 10), c(1, 1, 0, 1));
        assert_eq!(anim.evaluate(0), Err(AnimationError::DivisionByZero));
    }

    #[test]
    fn test_evaluate_linear_leaf() {
        let anim = fade();
        assert_eq!(anim.evaluate(-50), Ok(Vec4i::BLACK));
        assert_eq!(anim.evaluate(500), Ok(Vec4i::new(127, 127, 127, 255)));
        assert_eq!(anim.evaluate(1000), Ok(Vec4i::WHITE));
        assert_eq!(anim.evaluate(2000), Ok(Vec4i::WHITE));
    }

    #[test]
    fn test_evaluate_linear_leaf_wide_window() {
        let everything = LinearAnimation {
            from: Vec4i::BLACK,
            to: Vec4i::WHITE,
            start_ms: TimeMs::MIN,
            end_ms: TimeMs::MAX,
        };
        assert_eq!(everything.evaluate(TimeMs::MIN), Ok(Vec4i::BLACK));
        assert_eq!(everything.evaluate(TimeMs::MAX), Ok(Vec4i::WHITE));
        // Halfway through the window, give or take rounding
        let middle = everything.evaluate(0).unwrap();
        assert!((126..=128).contains(&middle.x), "got {}", middle);
        assert_eq!(middle.w, 255);

        let long = LinearAnimation {
            start_ms: 0,
            ..everything
        };
        let early = long.evaluate(1 << 60).unwrap();
        assert_eq!(early, Vec4i::new(31, 31, 31, 255));

        let float = LinearAnimation {
            from: Vec4::ZERO,
            to: Vec4::ONE,
            start_ms: TimeMs::MIN,
            end_ms: TimeMs::MAX,
        };
        assert_approx_eq!(float.evaluate(0).unwrap().x, 0.5);
        assert_approx_eq!(float.evaluate(TimeMs::MIN + 1).unwrap().x, 0.0);
    }

    #[test]
    fn test_simplify_folds_constants() {
        let anim = Animation::add(
            c(1, 2, 3, 4),
            Animation::multiply(c(2, 2, 2, 2), c(5, 5, 5, 5)),
        );
        assert_eq!(anim.simplify(0), c(11, 12, 13, 14));
    }

    #[test]
    fn test_simplify_drops_identities() {
        // Leaves are compared by identity, so reuse the same instance
        let leaf = fade();
        assert_eq!(
            Animation::multiply(c(1, 1, 1, 1), leaf.clone()).simplify(0),
            leaf
        );
        assert_eq!(
            Animation::add(leaf.clone(), c(0, 0, 0, 0)).simplify(0),
            leaf
        );
        assert_eq!(
            Animation::divide(leaf.clone(), c(1, 1, 1, 1)).simplify(0),
            leaf
        );
        // 1 is not a left identity for division
        let not_identity = Animation::divide(c(1, 1, 1, 1), leaf.clone());
        assert_eq!(not_identity.simplify(0), not_identity);
    }

    #[test]
    fn test_simplify_keeps_failing_fold() {
        let anim = Animation::divide(c(10, 10, 10, 10), c(0, 1, 1, 1));
        let simplified = anim.simplify(0);
        assert_eq!(simplified, anim);
        assert_eq!(simplified.evaluate(0), Err(AnimationError::DivisionByZero));
    }

    #[test]
    fn test_simplify_preserves_value() {
        for anim in sample_trees() {
            for time in [-100, 0, 250, 999, 5000] {
                assert_eq!(
                    anim.simplify(time).evaluate(time),
                    anim.evaluate(time),
                    "simplify changed the value of {anim:?} at {time}"
                );
            }
        }
    }

    #[test]
    fn test_simplify_idempotent() {
        for anim in sample_trees() {
            for time in [0, 500] {
                let once = anim.simplify(time);
                assert_eq!(
                    once.simplify(time),
                    once,
                    "simplify is not idempotent for {anim:?}"
                );
            }
        }
    }

    #[test]
    fn test_depth() {
        assert_eq!(c(0, 0, 0, 0).depth(), 1);
        let anim = Animation::add(
            c(0, 0, 0, 0),
            Animation::multiply(fade(), c(1, 1, 1, 1)),
        );
        assert_eq!(anim.depth(), 3);
        assert!(anim.has_leaves());
        assert!(!c(0, 0, 0, 0).has_leaves());
    }

    #[test]
    fn test_to_unit_float() {
        let anim = Animation::add(
            Animation::multiply(c(255, 51, 0, 255), c(1, 5, 1, 1)),
            c(0, 0, 51, 0),
        );
        let float = anim.to_unit_float().evaluate(0).unwrap();
        let expected = anim.evaluate(0).unwrap().to_unit_float();
        assert_approx_eq!(float.x, expected.x);
        assert_approx_eq!(float.y, expected.y);
        assert_approx_eq!(float.z, expected.z);
        assert_approx_eq!(float.w, expected.w);

        // Leaves get wrapped, and still evaluate on the unit scale
        let float = fade().to_unit_float().evaluate(1000).unwrap();
        assert_approx_eq!(float.x, 1.0);
    }
}
