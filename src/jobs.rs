//! Hand-off of work produced off the frame thread.
//!
//! Background work (asset decoding, measurement, I/O) never touches the
//! render tree. It posts a [`Job`] through a cloneable [`JobQueue`] handle,
//! and the pipeline drains the queue at the start of the next frame, on the
//! frame thread. Layout and paint requests are deduplicated per target.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::render::RenderId;

pub enum JobKind {
    /// Target needs layout.
    Layout,
    /// Target needs repaint only.
    Paint,
    /// Deliver a value to the target's `receive` hook.
    Deliver(Box<dyn Any + Send>),
}

impl fmt::Debug for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Layout => f.write_str("Layout"),
            JobKind::Paint => f.write_str("Paint"),
            JobKind::Deliver(_) => f.write_str("Deliver(..)"),
        }
    }
}

#[derive(Debug)]
pub struct Job {
    pub target: RenderId,
    pub kind: JobKind,
}

/// Thread-safe queue of pending jobs. Clones share the same queue.
#[derive(Clone, Default)]
pub struct JobQueue {
    pending: Arc<Mutex<Vec<Job>>>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Job>> {
        // A panicking producer cannot leave the Vec half-written.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push_request(&self, target: RenderId, kind: JobKind) {
        let mut pending = self.lock();
        let duplicate = pending.iter().any(|job| {
            job.target == target
                && std::mem::discriminant(&job.kind) == std::mem::discriminant(&kind)
        });
        if !duplicate {
            pending.push(Job { target, kind });
        }
    }

    pub fn post<T: Any + Send>(&self, target: RenderId, payload: T) {
        self.lock().push(Job {
            target,
            kind: JobKind::Deliver(Box::new(payload)),
        });
    }

    pub fn request_layout(&self, target: RenderId) {
        self.push_request(target, JobKind::Layout);
    }

    pub fn request_paint(&self, target: RenderId) {
        self.push_request(target, JobKind::Paint);
    }

    pub fn has_pending(&self) -> bool {
        !self.lock().is_empty()
    }

    /// Takes every pending job in posting order.
    pub fn drain(&self) -> Vec<Job> {
        std::mem::take(&mut *self.lock())
    }
}
