use derive_more::Display;
use reqwest::StatusCode;

/// Refresh attempts one call may spend.
pub const REFRESH_BUDGET: u8 = 1;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    #[display(fmt = "initial")]
    Initial,
    #[display(fmt = "awaiting-response")]
    AwaitingResponse,
    #[display(fmt = "refreshing")]
    Refreshing,
    #[display(fmt = "retrying")]
    Retrying,
    #[display(fmt = "done")]
    Done,
    #[display(fmt = "failed")]
    Failed,
}

/// What the driver of a call has to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Hand the response to the caller, success or not
    Accept,
    /// Spend the refresh budget on a new access credential
    Refresh,
    /// Re-issue the original request with the new credential
    Retry,
    /// Clear the session and fail as unauthorized
    Reset,
}

/// Retry-once protocol of a single gateway call.
///
/// The only way into `Refreshing` consumes the refresh budget, so a call can
/// never refresh twice no matter how many 401s it sees. A response received
/// while `Retrying` is always accepted.
#[derive(Debug)]
pub struct CallFlow {
    state: CallState,
    refresh_budget: u8,
}

impl Default for CallFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CallFlow {
    pub fn new() -> Self {
        Self {
            state: CallState::Initial,
            refresh_budget: REFRESH_BUDGET,
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn refreshes_left(&self) -> u8 {
        self.refresh_budget
    }

    /// The original request is about to be sent.
    pub fn begin(&mut self) {
        if self.state == CallState::Initial {
            self.state = CallState::AwaitingResponse;
        } else {
            self.state = CallState::Failed;
        }
    }

    /// A response arrived; `has_refresh` tells whether a refresh credential is
    /// stored.
    pub fn on_status(&mut self, status: StatusCode, has_refresh: bool) -> Next {
        match self.state {
            CallState::AwaitingResponse if status == StatusCode::UNAUTHORIZED => {
                if has_refresh && self.refresh_budget > 0 {
                    self.refresh_budget -= 1;
                    self.state = CallState::Refreshing;
                    Next::Refresh
                } else {
                    self.state = CallState::Failed;
                    Next::Reset
                }
            }
            CallState::AwaitingResponse | CallState::Retrying => Next::Accept,
            _ => {
                self.state = CallState::Failed;
                Next::Reset
            }
        }
    }

    /// The refresh request finished.
    pub fn on_refresh(&mut self, renewed: bool) -> Next {
        match self.state {
            CallState::Refreshing if renewed => {
                self.state = CallState::Retrying;
                Next::Retry
            }
            _ => {
                self.state = CallState::Failed;
                Next::Reset
            }
        }
    }

    /// The accepted response was turned into the call's outcome.
    pub fn settle(&mut self, succeeded: bool) {
        self.state = if succeeded {
            CallState::Done
        } else {
            CallState::Failed
        };
    }

    /// The request never produced a response.
    pub fn abort(&mut self) {
        self.state = CallState::Failed;
    }
}
