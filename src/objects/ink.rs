use std::time::Duration;

use crate::animation::{Curve, Progress};
use crate::error::LayoutError;
use crate::geometry::{Offset, Rect, Size};
use crate::hit_test::HitTestBehavior;
use crate::layout::BoxConstraints;
use crate::paint::{Color, PaintContext};
use crate::pipeline::{LayoutCtx, UpdateCtx};
use crate::render::{RenderBox, RenderObject};

/// Look and timing of the pressed ripple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleConfig {
    /// Color of the ripple (usually semi-transparent white)
    pub color: Color,
    pub expand_duration: Duration,
    pub fade_duration: Duration,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            color: Color::rgba(1.0, 1.0, 1.0, 0.3),
            expand_duration: Duration::from_millis(400),
            fade_duration: Duration::from_millis(300),
        }
    }
}

impl RippleConfig {
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }
}

/// Ripple animation state for pressed feedback
#[derive(Debug, Clone, Default)]
pub struct RippleState {
    /// Press position in local coordinates
    pub center: Option<Offset>,
    /// Release position the ripple contracts toward
    pub exit_center: Option<Offset>,
    /// Expansion progress (0.0 = start, 1.0 = fully expanded)
    pub progress: f32,
    pub opacity: f32,
    /// Whether the ripple is fading out (pointer released)
    pub fading: bool,
    expand: Option<Progress>,
    fade: Option<Progress>,
    fade_start_progress: f32,
    contraction: f32,
}

impl RippleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a ripple at the given local position
    pub fn start(&mut self, position: Offset, config: &RippleConfig) {
        self.reset();
        self.center = Some(position);
        self.opacity = 1.0;
        self.expand = Some(Progress::new(config.expand_duration));
    }

    /// Start fading, contracting toward the given local position
    pub fn start_fade(&mut self, exit: Offset, config: &RippleConfig) {
        if self.center.is_some() && self.opacity > 0.0 && !self.fading {
            self.exit_center = Some(exit);
            self.fading = true;
            self.fade = Some(Progress::new(config.fade_duration));
            self.fade_start_progress = self.progress;
        }
    }

    pub fn is_active(&self) -> bool {
        self.center.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.center.is_some() && (self.progress < 1.0 || self.fading)
    }

    /// Where the ripple is drawn, moving toward the exit point as it contracts.
    pub fn current_center(&self) -> Option<Offset> {
        let center = self.center?;
        Some(match self.exit_center {
            Some(exit) => Offset::new(
                center.x + (exit.x - center.x) * self.contraction,
                center.y + (exit.y - center.y) * self.contraction,
            ),
            None => center,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance by `dt`, returns true if still animating
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.center.is_none() {
            return false;
        }

        if !self.fading
            && self.progress < 1.0
            && let Some(expand) = self.expand.as_mut()
        {
            let t = expand.advance(dt);
            // Ease-out cubic for expansion.
            self.progress = 1.0 - (1.0 - t).powi(3);
        }

        if self.fading {
            let Some(fade) = self.fade.as_mut() else {
                return false;
            };
            let t = fade.advance(dt);
            // Contraction accelerates as it shrinks.
            let eased = Curve::EaseIn.evaluate(t);
            self.progress = self.fade_start_progress * (1.0 - eased);
            self.contraction = eased;
            self.opacity = (1.0 - eased).max(0.0);
            if fade.is_complete() {
                self.reset();
                return false;
            }
        }

        self.progress < 1.0 || self.fading
    }
}

/// Proxy that draws press feedback over its only child.
///
/// The ripple is transient state owned by this node: it survives widget
/// updates that keep the node, is stepped by the frame's `dt` while it
/// animates, and is dropped when the node is disposed.
#[derive(Debug, Clone, Default)]
pub struct RenderInkFeedback {
    config: RippleConfig,
    ripple: RippleState,
}

impl RenderInkFeedback {
    pub fn new(config: RippleConfig) -> Self {
        Self {
            config,
            ripple: RippleState::new(),
        }
    }

    pub fn ripple(&self) -> &RippleState {
        &self.ripple
    }

    pub fn config(&self) -> &RippleConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RippleConfig) -> bool {
        if self.config == config {
            return false;
        }
        self.config = config;
        true
    }

    pub fn press(&mut self, position: Offset, cx: &mut UpdateCtx<'_>) {
        self.ripple.start(position, &self.config);
        cx.request_animation_frame();
        cx.mark_needs_paint();
    }

    pub fn release(&mut self, position: Offset, cx: &mut UpdateCtx<'_>) {
        self.ripple.start_fade(position, &self.config);
        cx.request_animation_frame();
    }

    /// Release toward the center, as when the pointer leaves.
    pub fn cancel(&mut self, cx: &mut UpdateCtx<'_>) {
        let size = cx.size().unwrap_or_default();
        self.release(Offset::new(size.width / 2.0, size.height / 2.0), cx);
    }
}

/// Distance from `center` to the farthest corner of `size`.
fn max_radius(center: Offset, size: Size) -> f32 {
    let dx = center.x.max(size.width - center.x);
    let dy = center.y.max(size.height - center.y);
    (dx * dx + dy * dy).sqrt()
}

impl RenderObject for RenderInkFeedback {
    fn paint(&self, cx: &mut PaintContext<'_>, offset: Offset) {
        for child in cx.children() {
            let child_offset = cx.child_offset(child);
            cx.paint_child(child, offset + child_offset);
        }

        let Some(center) = self.ripple.current_center() else {
            return;
        };
        let size = cx.size();
        let radius = max_radius(center, size) * self.ripple.progress;
        if radius <= 0.0 || self.ripple.opacity <= 0.0 {
            return;
        }
        let color = self
            .config
            .color
            .with_alpha(self.config.color.a * self.ripple.opacity);
        cx.push_clip(Rect::from_size(size).translate(offset));
        cx.draw_circle(offset + center, radius, color);
        cx.pop_clip();
    }

    fn hit_test_behavior(&self) -> HitTestBehavior {
        HitTestBehavior::Opaque
    }

    fn dispose(&mut self) {
        if self.ripple.is_active() {
            log::trace!("dropping an active ripple");
        }
        self.ripple.reset();
    }

    fn advance(&mut self, dt: Duration, cx: &mut UpdateCtx<'_>) -> bool {
        let more = self.ripple.advance(dt);
        cx.mark_needs_paint();
        more
    }
}

impl RenderBox for RenderInkFeedback {
    fn perform_layout(
        &mut self,
        cx: &mut LayoutCtx<'_>,
        constraints: BoxConstraints,
    ) -> Result<Size, LayoutError> {
        match cx.children().first() {
            Some(&child) => Ok(cx.layout_child(child, constraints)),
            None => Ok(constraints.smallest()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_ripple_expands_then_settles() {
        let config = RippleConfig::default();
        let mut ripple = RippleState::new();
        ripple.start(Offset::new(10.0, 10.0), &config);
        assert!(ripple.advance(ms(200)));
        assert!(ripple.progress > 0.5 && ripple.progress < 1.0);
        assert!(!ripple.advance(ms(200)));
        assert_eq!(ripple.progress, 1.0);
        assert!(ripple.is_active());
    }

    #[test]
    fn test_ripple_fades_and_resets() {
        let config = RippleConfig::default();
        let mut ripple = RippleState::new();
        ripple.start(Offset::ZERO, &config);
        ripple.advance(ms(400));
        ripple.start_fade(Offset::new(20.0, 0.0), &config);
        assert!(ripple.advance(ms(150)));
        assert!(ripple.opacity < 1.0);
        let center = ripple.current_center().unwrap();
        assert!(center.x > 0.0 && center.x < 20.0);
        assert!(!ripple.advance(ms(150)));
        assert!(!ripple.is_active());
    }

    #[test]
    fn test_fade_without_press_is_ignored() {
        let mut ripple = RippleState::new();
        ripple.start_fade(Offset::ZERO, &RippleConfig::default());
        assert!(!ripple.fading);
        assert!(!ripple.advance(ms(16)));
    }

    #[test]
    fn test_max_radius_reaches_far_corner() {
        let radius = max_radius(Offset::ZERO, Size::new(30.0, 40.0));
        assert_eq!(radius, 50.0);
    }
}
