//! Sliver protocol: constraints handed down by a viewport and the geometry a
//! sliver reports back.
//!
//! All extents are measured along the scroll axis in logical pixels. A sliver
//! describes three different lengths:
//!
//! - `scroll_extent`: how much scrolling it consumes in the sequence,
//! - `paint_extent`: how much of the visible region it paints right now,
//! - `layout_extent`: how far it pushes the next sibling's paint origin.
//!
//! When `layout_extent < paint_extent` the sliver paints over whatever comes
//! next, and the viewport reports the difference to that sibling as `overlap`.

use std::fmt;

use super::{Axis, BoxConstraints};

/// Direction in which scroll offsets increase, in physical terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisDirection {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl AxisDirection {
    pub fn axis(self) -> Axis {
        match self {
            AxisDirection::Up | AxisDirection::Down => Axis::Vertical,
            AxisDirection::Left | AxisDirection::Right => Axis::Horizontal,
        }
    }

    /// True when scroll offsets grow towards the physical origin.
    pub fn is_reversed(self) -> bool {
        matches!(self, AxisDirection::Up | AxisDirection::Left)
    }
}

/// Which way the user is currently moving the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    #[default]
    Idle,
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliverConstraints {
    pub axis_direction: AxisDirection,
    /// Scroll offset into this sliver, clamped to zero by the viewport.
    pub scroll_offset: f32,
    pub preceding_scroll_extent: f32,
    /// How far the previous sliver paints into this one's leading edge.
    pub overlap: f32,
    pub remaining_paint_extent: f32,
    pub cross_axis_extent: f32,
    pub viewport_main_axis_extent: f32,
    pub remaining_cache_extent: f32,
    /// Where the cache window starts relative to `scroll_offset`. Never positive.
    pub cache_origin: f32,
    pub user_scroll_direction: ScrollDirection,
}

impl SliverConstraints {
    pub fn axis(&self) -> Axis {
        self.axis_direction.axis()
    }

    /// Box constraints for a child that spans the full cross axis.
    pub fn as_box_constraints(
        &self,
        min_extent: f32,
        max_extent: f32,
        cross_extent: Option<f32>,
    ) -> BoxConstraints {
        let cross = cross_extent.unwrap_or(self.cross_axis_extent);
        match self.axis() {
            Axis::Vertical => BoxConstraints::new(cross, min_extent, cross, max_extent),
            Axis::Horizontal => BoxConstraints::new(min_extent, cross, max_extent, cross),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("scroll_offset", self.scroll_offset),
            ("preceding_scroll_extent", self.preceding_scroll_extent),
            ("overlap", self.overlap),
            ("remaining_paint_extent", self.remaining_paint_extent),
            ("cross_axis_extent", self.cross_axis_extent),
            ("viewport_main_axis_extent", self.viewport_main_axis_extent),
            ("remaining_cache_extent", self.remaining_cache_extent),
            ("cache_origin", self.cache_origin),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| v.is_nan()) {
            return Err(format!("{name} is NaN"));
        }
        if self.scroll_offset < 0.0 {
            return Err(format!("scroll_offset {} is negative", self.scroll_offset));
        }
        if self.remaining_paint_extent < 0.0 || self.remaining_cache_extent < 0.0 {
            return Err("remaining extents must not be negative".to_string());
        }
        if self.cross_axis_extent < 0.0 {
            return Err(format!("cross_axis_extent {} is negative", self.cross_axis_extent));
        }
        if self.cache_origin > 0.0 {
            return Err(format!("cache_origin {} is positive", self.cache_origin));
        }
        Ok(())
    }
}

impl fmt::Display for SliverConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SliverConstraints({:?}, scroll {:.1}, overlap {:.1}, remaining paint {:.1}, cross {:.1}, cache {:.1}@{:.1})",
            self.axis_direction,
            self.scroll_offset,
            self.overlap,
            self.remaining_paint_extent,
            self.cross_axis_extent,
            self.remaining_cache_extent,
            self.cache_origin,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliverGeometry {
    pub scroll_extent: f32,
    pub paint_extent: f32,
    pub paint_origin: f32,
    pub layout_extent: f32,
    pub max_paint_extent: f32,
    pub hit_test_extent: f32,
    pub cache_extent: f32,
    pub visible: bool,
    pub has_visual_overflow: bool,
    /// Non-zero asks the viewport to shift its scroll offset and lay out again.
    pub scroll_offset_correction: f32,
}

impl SliverGeometry {
    pub const ZERO: SliverGeometry = SliverGeometry {
        scroll_extent: 0.0,
        paint_extent: 0.0,
        paint_origin: 0.0,
        layout_extent: 0.0,
        max_paint_extent: 0.0,
        hit_test_extent: 0.0,
        cache_extent: 0.0,
        visible: false,
        has_visual_overflow: false,
        scroll_offset_correction: 0.0,
    };

    /// Geometry whose layout, hit-test and cache extents follow the paint extent.
    pub fn new(scroll_extent: f32, paint_extent: f32, max_paint_extent: f32) -> Self {
        Self {
            scroll_extent,
            paint_extent,
            layout_extent: paint_extent,
            max_paint_extent,
            hit_test_extent: paint_extent,
            cache_extent: paint_extent,
            visible: paint_extent > 0.0,
            ..Self::ZERO
        }
    }

    pub fn correction(amount: f32) -> Self {
        Self {
            scroll_offset_correction: amount,
            ..Self::ZERO
        }
    }

    pub fn with_layout_extent(mut self, layout_extent: f32) -> Self {
        self.layout_extent = layout_extent;
        self
    }

    pub fn with_cache_extent(mut self, cache_extent: f32) -> Self {
        self.cache_extent = cache_extent;
        self
    }

    pub fn with_visual_overflow(mut self, has_visual_overflow: bool) -> Self {
        self.has_visual_overflow = has_visual_overflow;
        self
    }

    /// True when this sliver paints into the next sibling's region.
    pub fn overlaps_following(&self) -> bool {
        self.paint_extent > self.layout_extent
    }

    pub fn validate(&self, constraints: &SliverConstraints, tolerance: f32) -> Result<(), String> {
        let fields = [
            self.scroll_extent,
            self.paint_extent,
            self.paint_origin,
            self.layout_extent,
            self.max_paint_extent,
            self.hit_test_extent,
            self.cache_extent,
        ];
        if fields.iter().any(|v| v.is_nan()) {
            return Err(format!("{self:?} contains NaN"));
        }
        if self.scroll_extent < 0.0 {
            return Err(format!("scroll_extent {} is negative", self.scroll_extent));
        }
        if self.paint_extent < 0.0 || self.layout_extent < 0.0 || self.cache_extent < 0.0 {
            return Err(format!("{self:?} has a negative extent"));
        }
        if self.layout_extent > self.paint_extent + tolerance {
            return Err(format!(
                "layout_extent {} exceeds paint_extent {}",
                self.layout_extent, self.paint_extent
            ));
        }
        if self.paint_extent > constraints.remaining_paint_extent + tolerance {
            return Err(format!(
                "paint_extent {} exceeds remaining_paint_extent {}",
                self.paint_extent, constraints.remaining_paint_extent
            ));
        }
        let paintable = (self.max_paint_extent - constraints.scroll_offset).max(0.0);
        if self.paint_extent > paintable + tolerance {
            return Err(format!(
                "paint_extent {} exceeds what is left of max_paint_extent ({paintable})",
                self.paint_extent
            ));
        }
        Ok(())
    }

    /// Forces the geometry back inside the protocol's bounds.
    pub fn clamped(mut self, constraints: &SliverConstraints) -> Self {
        let paintable = (self.max_paint_extent - constraints.scroll_offset).max(0.0);
        self.scroll_extent = self.scroll_extent.max(0.0);
        self.paint_extent = self
            .paint_extent
            .min(constraints.remaining_paint_extent)
            .min(paintable)
            .max(0.0);
        self.layout_extent = self.layout_extent.min(self.paint_extent).max(0.0);
        self.cache_extent = self.cache_extent.max(0.0);
        self.hit_test_extent = self.hit_test_extent.max(0.0);
        self.visible = self.paint_extent > 0.0;
        self
    }
}

impl Default for SliverGeometry {
    fn default() -> Self {
        Self::ZERO
    }
}

fn clamp_between(value: f32, low: f32, high: f32) -> f32 {
    value.max(low).min(high)
}

/// Portion of `[from, to)` (in this sliver's scroll coordinates) that falls in
/// the visible region.
pub fn calculate_paint_offset(constraints: &SliverConstraints, from: f32, to: f32) -> f32 {
    let start = constraints.scroll_offset;
    let end = constraints.scroll_offset + constraints.remaining_paint_extent;
    clamp_between(
        clamp_between(to, start, end) - clamp_between(from, start, end),
        0.0,
        constraints.remaining_paint_extent,
    )
}

/// Portion of `[from, to)` that falls in the cache window.
pub fn calculate_cache_offset(constraints: &SliverConstraints, from: f32, to: f32) -> f32 {
    let start = constraints.scroll_offset + constraints.cache_origin;
    let end = constraints.scroll_offset + constraints.remaining_cache_extent;
    clamp_between(
        clamp_between(to, start, end) - clamp_between(from, start, end),
        0.0,
        constraints.remaining_cache_extent,
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn constraints(scroll_offset: f32, remaining_paint_extent: f32) -> SliverConstraints {
        SliverConstraints {
            axis_direction: AxisDirection::Down,
            scroll_offset,
            preceding_scroll_extent: 0.0,
            overlap: 0.0,
            remaining_paint_extent,
            cross_axis_extent: 300.0,
            viewport_main_axis_extent: 600.0,
            remaining_cache_extent: remaining_paint_extent,
            cache_origin: 0.0,
            user_scroll_direction: ScrollDirection::Idle,
        }
    }

    #[test]
    fn test_paint_offset_partially_scrolled() {
        let c = constraints(100.0, 600.0);
        // A 550px sliver scrolled by 100 paints its remaining 450.
        assert_eq!(calculate_paint_offset(&c, 0.0, 550.0), 450.0);
        // Never more than the remaining paint budget.
        assert_eq!(calculate_paint_offset(&c, 0.0, 5000.0), 600.0);
        // Fully scrolled past.
        assert_eq!(calculate_paint_offset(&c, 0.0, 80.0), 0.0);
    }

    #[test]
    fn test_paint_offset_zero_remaining() {
        let c = constraints(0.0, 0.0);
        assert_eq!(calculate_paint_offset(&c, 0.0, 200.0), 0.0);
    }

    #[test]
    fn test_cache_offset_includes_leading_cache() {
        let mut c = constraints(300.0, 600.0);
        c.cache_origin = -250.0;
        c.remaining_cache_extent = 1100.0;
        assert_eq!(calculate_cache_offset(&c, 0.0, 400.0), 350.0);
    }

    #[test]
    fn test_as_box_constraints_follows_axis() {
        let mut c = constraints(0.0, 600.0);
        let vertical = c.as_box_constraints(0.0, f32::INFINITY, None);
        assert_eq!(vertical.min_width, 300.0);
        assert_eq!(vertical.max_width, 300.0);
        assert!(vertical.max_height.is_infinite());

        c.axis_direction = AxisDirection::Right;
        let horizontal = c.as_box_constraints(40.0, 40.0, None);
        assert_eq!(horizontal, BoxConstraints::new(40.0, 300.0, 40.0, 300.0));
    }

    #[test]
    fn test_geometry_validate() {
        let c = constraints(0.0, 100.0);
        assert!(SliverGeometry::new(200.0, 100.0, 200.0).validate(&c, 1e-3).is_ok());
        assert!(SliverGeometry::new(200.0, 150.0, 200.0).validate(&c, 1e-3).is_err());

        let overlapping = SliverGeometry::new(50.0, 100.0, 100.0).with_layout_extent(50.0);
        assert!(overlapping.overlaps_following());
        assert!(overlapping.validate(&c, 1e-3).is_ok());

        let inverted = SliverGeometry::new(50.0, 40.0, 100.0).with_layout_extent(60.0);
        assert!(inverted.validate(&c, 1e-3).is_err());
    }

    #[test]
    fn test_geometry_clamped_respects_budget() {
        let c = constraints(0.0, 100.0);
        let geometry = SliverGeometry::new(500.0, 400.0, 500.0).clamped(&c);
        assert_eq!(geometry.paint_extent, 100.0);
        assert!(geometry.layout_extent <= geometry.paint_extent);
        assert!(geometry.validate(&c, 1e-3).is_ok());
    }

    #[test]
    fn test_constraints_validate() {
        assert!(constraints(0.0, 100.0).validate().is_ok());
        assert!(constraints(-1.0, 100.0).validate().is_err());
        let mut c = constraints(0.0, 100.0);
        c.cache_origin = 10.0;
        assert!(c.validate().is_err());
    }
}
