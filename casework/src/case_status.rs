use futures_signals::signal::{Mutable, MutableSignalCloned, SignalExt, SignalStream};

/// Lifecycle phase of one asynchronous case stream.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Status {
    #[default]
    Initial,
    Pending,
    Resolved,
    Rejected,
}

impl Status {
    pub fn is_initial(&self) -> bool {
        matches!(self, Status::Initial)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Status::Pending)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Status::Resolved)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Status::Rejected)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Status::Resolved | Status::Rejected)
    }
}

/// Read-only projection of a [`Status`], precomputed for consumers that
/// branch on several predicates at once. Derived from the status alone.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct StatusFlags {
    pub status: Status,
    pub is_initial: bool,
    pub is_pending: bool,
    pub is_resolved: bool,
    pub is_rejected: bool,
    pub is_finished: bool,
}

impl From<Status> for StatusFlags {
    fn from(status: Status) -> Self {
        StatusFlags {
            status,
            is_initial: status.is_initial(),
            is_pending: status.is_pending(),
            is_resolved: status.is_resolved(),
            is_rejected: status.is_rejected(),
            is_finished: status.is_finished(),
        }
    }
}

/// Full tracked record of one case stream: phase, latest value or error, and
/// the origin tag of the invocation that produced the latest transition.
///
/// Transition methods consume the state and return the next one, so every
/// update is a whole-record replacement.
///
/// Origin policy: `started` stamps the origin of the new invocation,
/// clearing any previous tag when none is given; `resolved` and `rejected`
/// without an explicit origin preserve the tag stamped by `started` rather
/// than clearing it.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseState<V: Clone, E: Clone> {
    pub status: Status,
    pub value: Option<V>,
    pub error: Option<E>,
    pub origin: Option<String>,
}

impl<V: Clone, E: Clone> Default for CaseState<V, E> {
    fn default() -> Self {
        CaseState {
            status: Status::Initial,
            value: None,
            error: None,
            origin: None,
        }
    }
}

impl<V: Clone, E: Clone> CaseState<V, E> {
    /// Enters `Pending`. The previous value and error are retained until a
    /// settlement overwrites them, so re-entrant starts keep showing the last
    /// known data.
    pub fn started(self, origin: Option<String>) -> Self {
        CaseState {
            status: Status::Pending,
            origin,
            ..self
        }
    }

    /// Enters `Resolved` with `value`; any previous error is cleared.
    pub fn resolved(self, value: V, origin: Option<String>) -> Self {
        CaseState {
            status: Status::Resolved,
            value: Some(value),
            error: None,
            origin: origin.or(self.origin),
        }
    }

    /// Enters `Rejected` with `error`; any previous value is cleared.
    pub fn rejected(self, error: E, origin: Option<String>) -> Self {
        CaseState {
            status: Status::Rejected,
            value: None,
            error: Some(error),
            origin: origin.or(self.origin),
        }
    }

    /// Back to `Initial` with value, error and origin all cleared.
    pub fn reset(self) -> Self {
        CaseState::default()
    }

    pub fn flags(&self) -> StatusFlags {
        self.status.into()
    }
}

/// Owner of one observable [`CaseState`] cell.
///
/// Every transition replaces the whole record under the cell's lock, so
/// observers of the signal never see a partial update. No transition is
/// refused from any status; sequencing them sensibly is the caller's job,
/// and the case runner does exactly that.
pub struct StatusTracker<V: Clone, E: Clone> {
    state: Mutable<CaseState<V, E>>,
}

impl<V: Clone, E: Clone> StatusTracker<V, E> {
    pub fn new() -> Self {
        StatusTracker {
            state: Mutable::new(CaseState::default()),
        }
    }

    pub fn start(&self, origin: Option<&str>) {
        self.transition(|state| state.started(origin.map(Into::into)));
    }

    pub fn resolve(&self, value: V, origin: Option<&str>) {
        self.transition(|state| state.resolved(value, origin.map(Into::into)));
    }

    pub fn reject(&self, error: E, origin: Option<&str>) {
        self.transition(|state| state.rejected(error, origin.map(Into::into)));
    }

    pub fn reset(&self) {
        self.transition(CaseState::reset);
    }

    fn transition(&self, apply: impl FnOnce(CaseState<V, E>) -> CaseState<V, E>) {
        let mut lock = self.state.lock_mut();
        let next = apply(lock.clone());
        *lock = next;
    }

    pub fn get(&self) -> CaseState<V, E> {
        self.state.get_cloned()
    }

    pub fn status(&self) -> Status {
        self.state.lock_ref().status
    }

    pub fn flags(&self) -> StatusFlags {
        self.status().into()
    }

    pub fn to_signal(&self) -> MutableSignalCloned<CaseState<V, E>> {
        self.state.signal_cloned()
    }

    pub fn to_stream(&self) -> SignalStream<MutableSignalCloned<CaseState<V, E>>> {
        self.state.signal_cloned().to_stream()
    }
}

impl<V: Clone, E: Clone> Default for StatusTracker<V, E> {
    fn default() -> Self {
        StatusTracker::new()
    }
}
