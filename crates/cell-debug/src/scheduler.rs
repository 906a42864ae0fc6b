//! Deferred work run at the host's next paint.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

pub type FrameTask = Box<dyn FnOnce()>;

/// Host event-loop hook: run `task` after the current pass, before the next
/// user-visible frame.
pub trait Scheduler {
    fn request_animation_frame(&self, task: FrameTask);
}

/// FIFO of tasks drained by the host once per rendered frame.
#[derive(Default)]
pub struct AnimationFrameQueue {
    pending: RefCell<VecDeque<FrameTask>>,
}

impl AnimationFrameQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Run the tasks queued before this call; tasks they queue wait for the
    /// next frame. Returns how many ran.
    pub fn run_frame(&self) -> usize {
        let batch: Vec<FrameTask> = self.pending.borrow_mut().drain(..).collect();
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }
}

impl Scheduler for AnimationFrameQueue {
    fn request_animation_frame(&self, task: FrameTask) {
        self.pending.borrow_mut().push_back(task);
    }
}

impl fmt::Debug for AnimationFrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationFrameQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Runs tasks immediately; for hosts without a paint cycle.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl Scheduler for Immediate {
    fn request_animation_frame(&self, task: FrameTask) {
        task();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn tasks_queued_during_a_frame_wait_for_the_next() {
        let queue = Rc::new(AnimationFrameQueue::new());
        let hits = Rc::new(Cell::new(0));
        let nested_queue = Rc::clone(&queue);
        let counter = Rc::clone(&hits);
        queue.request_animation_frame(Box::new(move || {
            counter.set(counter.get() + 1);
            let counter = Rc::clone(&counter);
            nested_queue.request_animation_frame(Box::new(move || counter.set(counter.get() + 10)));
        }));

        assert_eq!(queue.run_frame(), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.run_frame(), 1);
        assert_eq!(hits.get(), 11);
    }
}
