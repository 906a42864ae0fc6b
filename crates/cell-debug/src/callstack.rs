//! Call stack model of a paused debug session.

use std::cell::RefCell;

use crate::signal::Signal;
use crate::types::Frame;

/// Frames of the stopped thread and the frame currently shown to the user.
#[derive(Debug, Default)]
pub struct CallstackModel {
    frames: RefCell<Vec<Frame>>,
    current: RefCell<Option<Frame>>,
    frames_changed: Signal<Vec<Frame>>,
    current_frame_changed: Signal<Option<Frame>>,
}

impl CallstackModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.borrow().clone()
    }

    #[must_use]
    pub fn current_frame(&self) -> Option<Frame> {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn frames_changed(&self) -> Signal<Vec<Frame>> {
        self.frames_changed.clone()
    }

    #[must_use]
    pub fn current_frame_changed(&self) -> Signal<Option<Frame>> {
        self.current_frame_changed.clone()
    }

    /// Replace the stack; the top frame becomes current.
    pub fn set_frames(&self, frames: Vec<Frame>) {
        let top = frames.first().cloned();
        *self.frames.borrow_mut() = frames.clone();
        self.frames_changed.emit(&frames);
        self.set_current_frame(top);
    }

    /// Select a frame, or `None` once execution resumes.
    pub fn set_current_frame(&self, frame: Option<Frame>) {
        *self.current.borrow_mut() = frame.clone();
        self.current_frame_changed.emit(&frame);
    }

    /// Drop all frames, e.g. on `continued` or `terminated`.
    pub fn clear(&self) {
        self.set_frames(Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn top_frame_becomes_current() {
        let model = CallstackModel::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        model
            .current_frame_changed()
            .subscribe(move |frame: &Option<Frame>| {
                sink.borrow_mut().push(frame.as_ref().map(|f| f.id));
            });

        model.set_frames(vec![
            Frame::new(3, "inner", "1", 2),
            Frame::new(2, "<module>", "1", 5),
        ]);
        model.clear();

        assert_eq!(*seen.borrow(), vec![Some(3), None]);
        assert!(model.current_frame().is_none());
        assert!(model.frames().is_empty());
    }
}
