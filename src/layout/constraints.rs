use std::fmt;

use crate::geometry::{Padding, Size};

/// Box-protocol constraints: an allowed range on each axis.
///
/// A parent hands these down; the child must answer with a size inside the
/// range. Maxima may be infinite, minima may not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxConstraints {
    pub min_width: f32,
    pub min_height: f32,
    pub max_width: f32,
    pub max_height: f32,
}

impl BoxConstraints {
    pub fn new(min_width: f32, min_height: f32, max_width: f32, max_height: f32) -> Self {
        Self {
            min_width,
            min_height,
            max_width,
            max_height,
        }
    }

    pub fn tight(size: Size) -> Self {
        Self::new(size.width, size.height, size.width, size.height)
    }

    pub fn loose(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn unbounded() -> Self {
        Self::new(0.0, 0.0, f32::INFINITY, f32::INFINITY)
    }

    /// Tight on width, unbounded on height. The usual constraint for a
    /// vertically scrolling child.
    pub fn tight_for_width(width: f32) -> Self {
        Self::new(width, 0.0, width, f32::INFINITY)
    }

    pub fn constrain(&self, size: Size) -> Size {
        Size {
            width: size.width.max(self.min_width).min(self.max_width),
            height: size.height.max(self.min_height).min(self.max_height),
        }
    }

    pub fn biggest(&self) -> Size {
        self.constrain(Size::new(f32::INFINITY, f32::INFINITY))
    }

    pub fn smallest(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    pub fn max_size(&self) -> Size {
        Size::new(self.max_width, self.max_height)
    }

    pub fn is_tight(&self) -> bool {
        self.min_width == self.max_width && self.min_height == self.max_height
    }

    pub fn has_bounded_width(&self) -> bool {
        self.max_width.is_finite()
    }

    pub fn has_bounded_height(&self) -> bool {
        self.max_height.is_finite()
    }

    pub fn loosen(&self) -> Self {
        Self::new(0.0, 0.0, self.max_width, self.max_height)
    }

    /// Clamps `self` into `outer`, so the result satisfies both.
    pub fn enforce(&self, outer: BoxConstraints) -> Self {
        let clamp_w = |v: f32| v.max(outer.min_width).min(outer.max_width);
        let clamp_h = |v: f32| v.max(outer.min_height).min(outer.max_height);
        Self::new(
            clamp_w(self.min_width),
            clamp_h(self.min_height),
            clamp_w(self.max_width),
            clamp_h(self.max_height),
        )
    }

    pub fn deflate(&self, padding: Padding) -> Self {
        let horizontal = padding.horizontal();
        let vertical = padding.vertical();
        let min_width = (self.min_width - horizontal).max(0.0);
        let min_height = (self.min_height - vertical).max(0.0);
        Self::new(
            min_width,
            min_height,
            (self.max_width - horizontal).max(min_width),
            (self.max_height - vertical).max(min_height),
        )
    }

    pub fn is_satisfied_by(&self, size: Size, tolerance: f32) -> bool {
        size.width >= self.min_width - tolerance
            && size.width <= self.max_width + tolerance
            && size.height >= self.min_height - tolerance
            && size.height <= self.max_height + tolerance
    }

    /// Checks the constraint invariants, describing the first one broken.
    pub fn validate(&self) -> Result<(), String> {
        let values = [self.min_width, self.min_height, self.max_width, self.max_height];
        if values.iter().any(|v| v.is_nan()) {
            return Err(format!("{self} contains NaN"));
        }
        if self.min_width < 0.0 || self.min_height < 0.0 {
            return Err(format!("{self} has a negative minimum"));
        }
        if !self.min_width.is_finite() || !self.min_height.is_finite() {
            return Err(format!("{self} has an infinite minimum"));
        }
        if self.min_width > self.max_width || self.min_height > self.max_height {
            return Err(format!("{self} has a minimum above its maximum"));
        }
        Ok(())
    }
}

impl Default for BoxConstraints {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl fmt::Display for BoxConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_tight() {
            return write!(f, "BoxConstraints(tight {:.1}x{:.1})", self.min_width, self.min_height);
        }
        write!(
            f,
            "BoxConstraints({:.1}<=w<={:.1}, {:.1}<=h<={:.1})",
            self.min_width, self.max_width, self.min_height, self.max_height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraints_tight() {
        let c = BoxConstraints::tight(Size::new(50.0, 75.0));
        assert!(c.is_tight());
        assert_eq!(c.biggest(), Size::new(50.0, 75.0));
        assert_eq!(c.smallest(), Size::new(50.0, 75.0));
    }

    #[test]
    fn test_constraints_constrain() {
        let c = BoxConstraints::new(10.0, 20.0, 100.0, 200.0);
        assert_eq!(c.constrain(Size::new(50.0, 100.0)), Size::new(50.0, 100.0));
        assert_eq!(c.constrain(Size::new(5.0, 10.0)), Size::new(10.0, 20.0));
        assert_eq!(c.constrain(Size::new(150.0, 300.0)), Size::new(100.0, 200.0));
    }

    #[test]
    fn test_constraints_biggest_with_unbounded_axis() {
        let c = BoxConstraints::tight_for_width(100.0);
        let biggest = c.biggest();
        assert_eq!(biggest.width, 100.0);
        assert!(biggest.height.is_infinite());
        assert!(!c.has_bounded_height());
    }

    #[test]
    fn test_constraints_enforce() {
        let outer = BoxConstraints::new(0.0, 0.0, 100.0, 100.0);
        let inner = BoxConstraints::tight(Size::new(150.0, 40.0)).enforce(outer);
        assert_eq!(inner, BoxConstraints::tight(Size::new(100.0, 40.0)));
    }

    #[test]
    fn test_constraints_deflate() {
        let c = BoxConstraints::tight(Size::new(100.0, 50.0)).deflate(Padding::all(10.0));
        assert_eq!(c, BoxConstraints::tight(Size::new(80.0, 30.0)));

        let tiny = BoxConstraints::tight(Size::new(10.0, 10.0)).deflate(Padding::all(10.0));
        assert_eq!(tiny.biggest(), Size::ZERO);
    }

    #[test]
    fn test_constraints_validate() {
        assert!(BoxConstraints::unbounded().validate().is_ok());
        assert!(BoxConstraints::new(-1.0, 0.0, 10.0, 10.0).validate().is_err());
        assert!(BoxConstraints::new(20.0, 0.0, 10.0, 10.0).validate().is_err());
        assert!(BoxConstraints::new(f32::INFINITY, 0.0, f32::INFINITY, 10.0).validate().is_err());
        assert!(BoxConstraints::new(f32::NAN, 0.0, 10.0, 10.0).validate().is_err());
    }

    #[test]
    fn test_constraints_satisfied_with_tolerance() {
        let c = BoxConstraints::tight(Size::new(100.0, 100.0));
        assert!(c.is_satisfied_by(Size::new(100.0005, 99.9995), 1e-3));
        assert!(!c.is_satisfied_by(Size::new(101.0, 100.0), 1e-3));
    }
}
