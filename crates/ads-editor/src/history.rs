//! Snapshot-based undo/redo.
//!
//! The template is small and cheap to clone, so history is a stack of
//! whole-template snapshots rather than per-mutation inverses. Drag
//! gestures use **snapshot batching**: the template is captured at the
//! start and end of the gesture, so undo reverses the whole drag in a
//! single step instead of one step per pointer frame.
//!
//! The caller records a snapshot of the state *before* each mutation and
//! installs whatever `undo`/`redo` return (e.g. via
//! `DesignSession::restore`, which also rebuilds the canvas).

use ads_core::model::Template;

pub struct History {
    undo_stack: Vec<Template>,
    redo_stack: Vec<Template>,
    /// Maximum undo depth.
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    /// Snapshot captured at the start of a batch.
    batch_snapshot: Option<Template>,
    /// Whether any mutations were recorded during the current batch.
    batch_dirty: bool,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
            batch_dirty: false,
        }
    }

    /// Start a batch group, capturing the current template. Mutations
    /// until `end_batch` are applied live but tracked as one atomic step.
    pub fn begin_batch(&mut self, current: &Template) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(current.clone());
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// Close a batch group. When the outermost batch closes and the
    /// template actually changed, one snapshot is pushed to the undo
    /// stack; an untouched batch pushes nothing.
    pub fn end_batch(&mut self, current: &Template) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            if self.batch_dirty
                && let Some(before) = self.batch_snapshot.take()
                && before != *current
            {
                self.push_undo(before);
            }
            self.batch_snapshot = None;
            self.batch_dirty = false;
        }
    }

    /// Record the template state *before* a mutation. Inside a batch the
    /// call only marks the batch dirty; the batch snapshot already holds
    /// the pre-gesture state.
    pub fn record(&mut self, before: &Template) {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
            return;
        }
        self.push_undo(before.clone());
    }

    /// Step back. Returns the snapshot to install, or `None` when there
    /// is nothing to undo.
    pub fn undo(&mut self, current: &Template) -> Option<Template> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current.clone());
        Some(snapshot)
    }

    /// Step forward again. Returns the snapshot to install.
    pub fn redo(&mut self, current: &Template) -> Option<Template> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current.clone());
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn push_undo(&mut self, snapshot: Template) {
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // A new action invalidates the redo chain.
        self.redo_stack.clear();
    }
}
