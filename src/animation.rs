//! Frame-driven timing for transient visual state.
//!
//! Nothing here reads the clock. Every animation advances by the `dt` the
//! frame driver passes in, so tests step time deterministically.

use std::time::Duration;

/// Easing curve mapping linear progress in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Curve {
    #[default]
    Linear,
    /// Starts slow, ends fast
    EaseIn,
    /// Starts fast, ends slow
    EaseOut,
    EaseInOut,
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
}

impl Curve {
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::EaseIn => t * t,
            Curve::EaseOut => t * (2.0 - t),
            Curve::EaseInOut if t < 0.5 => 2.0 * t * t,
            Curve::EaseInOut => -1.0 + (4.0 - 2.0 * t) * t,
            Curve::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
        }
    }
}

/// Solves x(t) = progress with Newton-Raphson, then evaluates y.
fn cubic_bezier(progress: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let mut t = progress;
    for _ in 0..8 {
        let slope = bezier_slope(t, x1, x2);
        if slope.abs() < 1e-6 {
            break;
        }
        t -= (bezier(t, x1, x2) - progress) / slope;
    }
    bezier(t, y1, y2)
}

fn bezier(t: f32, p1: f32, p2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

fn bezier_slope(t: f32, p1: f32, p2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

/// Elapsed time over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    elapsed: Duration,
    duration: Duration,
}

impl Progress {
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
        }
    }

    /// Steps forward and returns the new linear progress.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_nanos() as f64 / self.duration.as_nanos() as f64).min(1.0) as f32
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}
