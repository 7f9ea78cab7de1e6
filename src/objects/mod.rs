//! Box-protocol render objects.
//!
//! This is the small catalog the pipeline is exercised with: leaves that size
//! themselves from configuration or from a measurement, single-child proxies,
//! and the two multi-child layouts (flex and stack).

mod constrained;
mod flex;
mod ink;
mod measured;
mod repaint_boundary;
mod sized;
mod stack;

pub use constrained::RenderConstrainedBox;
pub use flex::RenderFlex;
pub use ink::{RenderInkFeedback, RippleConfig, RippleState};
pub use measured::{IntrinsicSize, Measure, MeasureUpdate, MonospaceText, RenderMeasured};
pub use repaint_boundary::RenderRepaintBoundary;
pub use sized::RenderFixedSize;
pub use stack::RenderStack;
