//! Async submission lifecycle state.
//!
//! Each screen-level submission (credential flows, logout) gets a busy
//! flag here. The reducer marks a task active synchronously at submit
//! time, which is what makes "one in-flight submission per screen"
//! airtight: a second activation in the same frame already sees the flag.

/// Identifier for one spawned submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

/// Task id generator.
#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// The guarded submission kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    SignIn,
    SignUp,
    Reset,
    SignOut,
}

/// Busy flag for one submission kind.
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    active: Option<TaskId>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Marks a submission in flight. Called by the reducer, not the runtime.
    pub fn begin(&mut self, id: TaskId) {
        self.active = Some(id);
    }

    /// Clears the flag if `id` is the active submission; a stale
    /// completion (superseded screen, reset state) returns false and the
    /// caller drops its result.
    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
        }
        ok
    }
}

/// Busy flags for all guarded submissions.
#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub sign_in: TaskState,
    pub sign_up: TaskState,
    pub reset: TaskState,
    pub sign_out: TaskState,
}

impl Tasks {
    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::SignIn => &mut self.sign_in,
            TaskKind::SignUp => &mut self.sign_up,
            TaskKind::Reset => &mut self.reset,
            TaskKind::SignOut => &mut self.sign_out,
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.sign_in.is_running()
            || self.sign_up.is_running()
            || self.reset.is_running()
            || self.sign_out.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_and_finish_round_trip() {
        let mut seq = TaskSeq::default();
        let mut state = TaskState::default();
        let id = seq.next_id();

        assert!(!state.is_running());
        state.begin(id);
        assert!(state.is_running());
        assert!(state.finish_if_active(id));
        assert!(!state.is_running());
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut seq = TaskSeq::default();
        let mut state = TaskState::default();
        let stale = seq.next_id();
        let active = seq.next_id();

        state.begin(active);
        assert!(!state.finish_if_active(stale));
        assert!(state.is_running());
    }
}
