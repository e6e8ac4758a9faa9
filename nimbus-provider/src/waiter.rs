//! Status waiter for asynchronous create/delete operations.
//!
//! Create and delete calls return before the resource reaches a usable
//! state; callers re-fetch the status until it lands in the terminal set.
//! The lifecycle is an explicit state machine (allowed transitions plus a
//! terminal set) rather than a pending/target string list, so a status the
//! machine does not allow fails the wait immediately instead of spinning
//! until the timeout.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::error::ProviderError;

/// One observation from the refresh function.
pub enum Refresh<T> {
    /// The resource exists with the given status.
    Observed(T, String),
    /// The API no longer knows the resource.
    Gone,
}

/// Allowed status transitions and terminal set for one resource lifecycle.
///
/// Self-transitions (status unchanged between polls) are always allowed.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    transitions: Vec<(&'static str, &'static str)>,
    terminal: Vec<&'static str>,
    gone: Option<&'static str>,
}

impl StateMachine {
    pub fn builder() -> StateMachineBuilder {
        StateMachineBuilder {
            machine: StateMachine::default(),
        }
    }

    fn allows(&self, from: &str, to: &str) -> bool {
        from == to || self.transitions.iter().any(|&(f, t)| f == from && t == to)
    }

    fn is_terminal(&self, state: &str) -> bool {
        self.terminal.contains(&state)
    }
}

pub struct StateMachineBuilder {
    machine: StateMachine,
}

impl StateMachineBuilder {
    /// Allow `from -> to`.
    pub fn transition(mut self, from: &'static str, to: &'static str) -> Self {
        self.machine.transitions.push((from, to));
        self
    }

    /// Mark a state as terminal; the wait ends when it is observed.
    pub fn terminal(mut self, state: &'static str) -> Self {
        self.machine.terminal.push(state);
        self
    }

    /// Designate the terminal state a `Gone` observation maps to (the
    /// "fully removed" status of delete waits).
    pub fn gone(mut self, state: &'static str) -> Self {
        if !self.machine.terminal.contains(&state) {
            self.machine.terminal.push(state);
        }
        self.machine.gone = Some(state);
        self
    }

    pub fn build(self) -> StateMachine {
        self.machine
    }
}

/// Errors from a status wait.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("timeout waiting for terminal status (last observed: {last})")]
    Timeout { last: String },

    #[error("unexpected status transition {from} -> {to}")]
    UnexpectedTransition { from: String, to: String },

    /// The resource vanished in a lifecycle that has no removed-terminal.
    #[error("resource disappeared while waiting (last observed: {last})")]
    Gone { last: String },

    #[error("wait cancelled")]
    Cancelled,

    /// The refresh function failed; surfaced as-is, polling stops.
    #[error(transparent)]
    Refresh(Box<ProviderError>),
}

impl WaitError {
    pub fn return_code(&self) -> Option<&str> {
        match self {
            WaitError::Refresh(err) => err.return_code(),
            _ => None,
        }
    }
}

/// Timed poll loop: total timeout, fixed inter-poll delay.
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    timeout: Duration,
    delay: Duration,
}

impl Waiter {
    pub fn new(timeout: Duration, delay: Duration) -> Self {
        Self { timeout, delay }
    }

    /// Poll `refresh` until the machine reaches a terminal state.
    ///
    /// Returns the last observed object, or `None` when the resource ended
    /// in the removed-terminal state. A refresh error aborts immediately.
    pub async fn wait<T, F>(
        &self,
        machine: &StateMachine,
        refresh: F,
    ) -> Result<Option<T>, WaitError>
    where
        F: AsyncFnMut() -> Result<Refresh<T>, ProviderError>,
    {
        self.run(machine, refresh, None).await
    }

    /// Like [`Waiter::wait`], but stops with [`WaitError::Cancelled`] when a
    /// message arrives on `cancel` between polls.
    pub async fn wait_with_cancel<T, F>(
        &self,
        machine: &StateMachine,
        refresh: F,
        cancel: &mut mpsc::Receiver<()>,
    ) -> Result<Option<T>, WaitError>
    where
        F: AsyncFnMut() -> Result<Refresh<T>, ProviderError>,
    {
        self.run(machine, refresh, Some(cancel)).await
    }

    async fn run<T, F>(
        &self,
        machine: &StateMachine,
        mut refresh: F,
        mut cancel: Option<&mut mpsc::Receiver<()>>,
    ) -> Result<Option<T>, WaitError>
    where
        F: AsyncFnMut() -> Result<Refresh<T>, ProviderError>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut last: Option<String> = None;

        loop {
            match refresh()
                .await
                .map_err(|e| WaitError::Refresh(Box::new(e)))?
            {
                Refresh::Observed(obj, state) => {
                    if let Some(prev) = &last
                        && prev != &state
                        && !machine.allows(prev, &state)
                    {
                        return Err(WaitError::UnexpectedTransition {
                            from: prev.clone(),
                            to: state,
                        });
                    }
                    debug!(status = %state, "poll");
                    if machine.is_terminal(&state) {
                        return Ok(Some(obj));
                    }
                    last = Some(state);
                }
                Refresh::Gone => {
                    return match machine.gone {
                        Some(_) => Ok(None),
                        None => Err(WaitError::Gone {
                            last: last.unwrap_or_default(),
                        }),
                    };
                }
            }

            if Instant::now() + self.delay >= deadline {
                return Err(WaitError::Timeout {
                    last: last.unwrap_or_default(),
                });
            }

            match cancel.as_deref_mut() {
                Some(rx) => {
                    tokio::select! {
                        _ = sleep(self.delay) => {}
                        _ = rx.recv() => return Err(WaitError::Cancelled),
                    }
                }
                None => sleep(self.delay).await,
            }
        }
    }
}
