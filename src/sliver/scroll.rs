use std::time::Duration;

use crate::animation::{Curve, Progress};
use crate::layout::ScrollDirection;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollAnimation {
    from: f32,
    to: f32,
    progress: Progress,
    curve: Curve,
}

/// Scroll offset of a viewport and the extents it may range over.
///
/// The offset only changes between frames: jumps apply immediately, and
/// animations step with the frame's `dt`. Starting a new animation replaces
/// the running one from wherever it has got to.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollPosition {
    pixels: f32,
    min_scroll_extent: f32,
    max_scroll_extent: f32,
    viewport_dimension: f32,
    direction: ScrollDirection,
    animation: Option<ScrollAnimation>,
}

impl Default for ScrollPosition {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ScrollPosition {
    pub fn new(pixels: f32) -> Self {
        Self {
            pixels,
            min_scroll_extent: 0.0,
            max_scroll_extent: f32::INFINITY,
            viewport_dimension: 0.0,
            direction: ScrollDirection::Idle,
            animation: None,
        }
    }

    pub fn pixels(&self) -> f32 {
        self.pixels
    }

    pub fn min_scroll_extent(&self) -> f32 {
        self.min_scroll_extent
    }

    pub fn max_scroll_extent(&self) -> f32 {
        self.max_scroll_extent
    }

    pub fn viewport_dimension(&self) -> f32 {
        self.viewport_dimension
    }

    pub fn user_scroll_direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    fn set_pixels(&mut self, pixels: f32) -> bool {
        if pixels == self.pixels {
            return false;
        }
        self.direction = if pixels > self.pixels {
            ScrollDirection::Reverse
        } else {
            ScrollDirection::Forward
        };
        self.pixels = pixels;
        true
    }

    /// Moves straight to `pixels`, cancelling any animation. Returns true if
    /// the offset changed.
    pub fn jump_to(&mut self, pixels: f32) -> bool {
        self.animation = None;
        let changed = self.set_pixels(pixels.clamp(self.min_scroll_extent, self.max_scroll_extent));
        self.direction = ScrollDirection::Idle;
        changed
    }

    /// Starts animating toward `target`, superseding any running animation.
    pub fn animate_to(&mut self, target: f32, duration: Duration, curve: Curve) {
        if duration.is_zero() {
            self.jump_to(target);
            return;
        }
        self.animation = Some(ScrollAnimation {
            from: self.pixels,
            to: target,
            progress: Progress::new(duration),
            curve,
        });
    }

    /// Steps the running animation. Returns true if the offset changed.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(mut animation) = self.animation.take() else {
            return false;
        };
        let t = animation.curve.evaluate(animation.progress.advance(dt));
        let pixels = animation.from + (animation.to - animation.from) * t;
        let changed = self.set_pixels(pixels);
        if animation.progress.is_complete() {
            self.direction = ScrollDirection::Idle;
        } else {
            self.animation = Some(animation);
        }
        changed
    }

    /// Shifts the offset by a correction a sliver asked for during layout.
    /// Content moved by the same amount, so nothing on screen jumps.
    pub fn correct_by(&mut self, correction: f32) {
        self.pixels += correction;
        if let Some(animation) = self.animation.as_mut() {
            animation.from += correction;
            animation.to += correction;
        }
    }

    pub fn apply_viewport_dimension(&mut self, dimension: f32) -> bool {
        if self.viewport_dimension == dimension {
            return false;
        }
        self.viewport_dimension = dimension;
        true
    }

    /// Records the scrollable range and clamps the offset into it. Returns
    /// true if the offset had to move, which means layout must run again.
    pub fn apply_content_dimensions(&mut self, min: f32, max: f32) -> bool {
        self.min_scroll_extent = min;
        self.max_scroll_extent = max.max(min);
        let clamped = self.pixels.clamp(self.min_scroll_extent, self.max_scroll_extent);
        if clamped == self.pixels {
            return false;
        }
        log::trace!("scroll offset {} clamped to {clamped}", self.pixels);
        self.pixels = clamped;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_jump_clamps_to_known_extents() {
        let mut position = ScrollPosition::new(0.0);
        position.apply_content_dimensions(0.0, 50.0);
        assert!(position.jump_to(80.0));
        assert_eq!(position.pixels(), 50.0);
        assert!(!position.jump_to(50.0));
    }

    #[test]
    fn test_content_shrink_pulls_offset_back() {
        let mut position = ScrollPosition::new(300.0);
        assert!(position.apply_content_dimensions(0.0, 120.0));
        assert_eq!(position.pixels(), 120.0);
        assert!(!position.apply_content_dimensions(0.0, 120.0));
    }

    #[test]
    fn test_animation_reaches_target() {
        let mut position = ScrollPosition::new(0.0);
        position.animate_to(100.0, ms(100), Curve::Linear);
        assert!(position.advance(ms(50)));
        assert_eq!(position.pixels(), 50.0);
        assert_eq!(position.user_scroll_direction(), ScrollDirection::Reverse);
        assert!(position.advance(ms(50)));
        assert_eq!(position.pixels(), 100.0);
        assert!(!position.is_animating());
        assert!(!position.advance(ms(16)));
    }

    #[test]
    fn test_new_target_supersedes_running_animation() {
        let mut position = ScrollPosition::new(0.0);
        position.animate_to(100.0, ms(100), Curve::Linear);
        position.advance(ms(50));
        position.animate_to(0.0, ms(100), Curve::Linear);
        position.advance(ms(50));
        assert_eq!(position.pixels(), 25.0);
        position.advance(ms(50));
        assert_eq!(position.pixels(), 0.0);
    }

    #[test]
    fn test_correction_moves_animation_too() {
        let mut position = ScrollPosition::new(10.0);
        position.animate_to(110.0, ms(100), Curve::Linear);
        position.correct_by(-10.0);
        assert_eq!(position.pixels(), 0.0);
        position.advance(ms(100));
        assert_eq!(position.pixels(), 100.0);
    }
}
