use crate::geometry::Size;
use crate::layout::BoxConstraints;

/// What the pipeline does when a node breaks the layout protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Record the violation and fail the frame after the rest of it is laid out.
    Strict,
    /// Clamp the offending value into range, log a warning, and carry on.
    Lenient,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            ErrorPolicy::Strict
        } else {
            ErrorPolicy::Lenient
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub error_policy: ErrorPolicy,
    /// Distance laid out before and after the visible region of a viewport.
    pub cache_extent: f32,
    /// Layout attempts a viewport makes before giving up on scroll corrections.
    pub max_scroll_corrections: usize,
    pub precision_tolerance: f32,
    pub root_constraints: BoxConstraints,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::default(),
            cache_extent: 250.0,
            max_scroll_corrections: 10,
            precision_tolerance: 1e-3,
            root_constraints: BoxConstraints::tight(Size::new(800.0, 600.0)),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn cache_extent(mut self, extent: f32) -> Self {
        self.cache_extent = extent.max(0.0);
        self
    }

    pub fn max_scroll_corrections(mut self, attempts: usize) -> Self {
        self.max_scroll_corrections = attempts.max(1);
        self
    }

    pub fn precision_tolerance(mut self, tolerance: f32) -> Self {
        self.precision_tolerance = tolerance;
        self
    }

    pub fn root_constraints(mut self, constraints: BoxConstraints) -> Self {
        self.root_constraints = constraints;
        self
    }

    /// Shorthand for a window of a fixed size.
    pub fn window_size(self, width: f32, height: f32) -> Self {
        self.root_constraints(BoxConstraints::tight(Size::new(width, height)))
    }
}
