//! Per-entity sync state machine
//!
//! The pipeline runs each stage, reports what happened as a [`StageOutcome`], and
//! asks [`transition`] for the next state. All retry and backoff routing lives in
//! this table.

use std::fmt;

/// Where an entity pipeline is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncState {
    Idle,
    Polling,
    /// Caught up; no rows after the cursor
    Empty,
    /// A non-empty batch was polled and its related rows are next
    Batch,
    Transforming,
    Loading,
    Checkpointing,
    /// A stage failed; the entity backs off and polls again
    Error,
    BackoffSleep,
    /// Halted until an operator intervenes
    Fatal,
    /// Drained after a shutdown request
    Stopped,
}

impl SyncState {
    /// Whether the pipeline has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncState::Fatal | SyncState::Stopped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Idle => "IDLE",
            SyncState::Polling => "POLLING",
            SyncState::Empty => "EMPTY",
            SyncState::Batch => "BATCH",
            SyncState::Transforming => "TRANSFORMING",
            SyncState::Loading => "LOADING",
            SyncState::Checkpointing => "CHECKPOINTING",
            SyncState::Error => "ERROR",
            SyncState::BackoffSleep => "BACKOFF_SLEEP",
            SyncState::Fatal => "FATAL",
            SyncState::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the stage run in the current state reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage completed normally
    Proceed,
    /// The poll found nothing after the cursor
    Empty,
    /// The poll returned at least one row
    BatchReady,
    /// The stage failed; `escalate` halts the entity instead of retrying
    Failed { escalate: bool },
    /// Shutdown was requested before the stage started its work
    Shutdown,
}

/// Next state for a stage outcome
///
/// Terminal states absorb every outcome. An outcome that makes no sense for the
/// current state routes to `Error`, so the pipeline backs off rather than
/// spinning.
pub fn transition(state: SyncState, outcome: StageOutcome) -> SyncState {
    use StageOutcome as O;
    use SyncState as S;

    if state.is_terminal() {
        return state;
    }

    match (state, outcome) {
        (_, O::Shutdown) => S::Stopped,
        (_, O::Failed { escalate: true }) => S::Fatal,
        (_, O::Failed { escalate: false }) => S::Error,

        (S::Idle, O::Proceed) => S::Polling,
        (S::Polling, O::Empty) => S::Empty,
        (S::Polling, O::BatchReady) => S::Batch,
        (S::Empty, O::Proceed) => S::BackoffSleep,
        (S::Batch, O::Proceed) => S::Transforming,
        (S::Transforming, O::Proceed) => S::Loading,
        (S::Loading, O::Proceed) => S::Checkpointing,
        (S::Checkpointing, O::Proceed) => S::Idle,
        (S::Error, O::Proceed) => S::BackoffSleep,
        (S::BackoffSleep, O::Proceed) => S::Polling,

        _ => S::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use StageOutcome as O;
    use SyncState as S;

    #[test_case(S::Idle, O::Proceed => S::Polling ; "idle starts a poll")]
    #[test_case(S::Polling, O::Empty => S::Empty ; "poll caught up")]
    #[test_case(S::Polling, O::BatchReady => S::Batch ; "poll found rows")]
    #[test_case(S::Empty, O::Proceed => S::BackoffSleep ; "empty sleeps")]
    #[test_case(S::Batch, O::Proceed => S::Transforming ; "batch transforms")]
    #[test_case(S::Transforming, O::Proceed => S::Loading ; "transform loads")]
    #[test_case(S::Loading, O::Proceed => S::Checkpointing ; "load checkpoints")]
    #[test_case(S::Checkpointing, O::Proceed => S::Idle ; "checkpoint completes cycle")]
    #[test_case(S::Error, O::Proceed => S::BackoffSleep ; "error sleeps")]
    #[test_case(S::BackoffSleep, O::Proceed => S::Polling ; "sleep polls again")]
    #[test_case(S::Polling, O::Failed { escalate: false } => S::Error ; "poll failure")]
    #[test_case(S::Loading, O::Failed { escalate: false } => S::Error ; "load failure")]
    #[test_case(S::Checkpointing, O::Failed { escalate: true } => S::Fatal ; "corrupt checkpoint")]
    #[test_case(S::Polling, O::Failed { escalate: true } => S::Fatal ; "error cap reached")]
    #[test_case(S::BackoffSleep, O::Shutdown => S::Stopped ; "shutdown while sleeping")]
    #[test_case(S::Transforming, O::Shutdown => S::Stopped ; "shutdown discards pre-load work")]
    #[test_case(S::Fatal, O::Proceed => S::Fatal ; "fatal absorbs")]
    #[test_case(S::Stopped, O::Failed { escalate: true } => S::Stopped ; "stopped absorbs")]
    #[test_case(S::Idle, O::BatchReady => S::Error ; "unexpected outcome")]
    fn test_transition(state: SyncState, outcome: StageOutcome) -> SyncState {
        transition(state, outcome)
    }

    #[test]
    fn test_happy_cycle_returns_to_idle() {
        let mut state = S::Idle;
        for outcome in [O::Proceed, O::BatchReady, O::Proceed, O::Proceed, O::Proceed, O::Proceed] {
            state = transition(state, outcome);
        }
        assert_eq!(state, S::Idle);
    }

    #[test]
    fn test_display() {
        assert_eq!(S::BackoffSleep.to_string(), "BACKOFF_SLEEP");
    }
}
