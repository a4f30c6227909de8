/// Coarse status of a remote fetch, without the error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Idle => "idle",
            FetchStatus::Loading => "loading",
            FetchStatus::Succeeded => "succeeded",
            FetchStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one remote fetch.
///
/// A failure always carries its message, so "failed with no error" cannot
/// be represented. The fetched data itself lives next to this state in the
/// owning store: a failure must not discard what an earlier success stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed(String),
}

impl FetchState {
    /// Enter `Loading`. Refused while a fetch is already outstanding.
    ///
    /// Allowed from `Idle` and from both terminal states, so a manual
    /// re-fetch re-enters the cycle.
    pub fn begin(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        *self = FetchState::Loading;
        true
    }

    /// Record a successful completion. Ignored unless a fetch is outstanding.
    pub fn succeed(&mut self) -> bool {
        if !self.is_loading() {
            return false;
        }
        *self = FetchState::Succeeded;
        true
    }

    /// Record a failed completion. Ignored unless a fetch is outstanding.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.is_loading() {
            return false;
        }
        *self = FetchState::Failed(message.into());
        true
    }

    pub fn status(&self) -> FetchStatus {
        match self {
            FetchState::Idle => FetchStatus::Idle,
            FetchState::Loading => FetchStatus::Loading,
            FetchState::Succeeded => FetchStatus::Succeeded,
            FetchState::Failed(_) => FetchStatus::Failed,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    /// The error message, present only in the `Failed` state.
    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }
}
