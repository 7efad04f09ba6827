//! Search request lifecycle state machine.
//!
//! ```text
//! Idle ──schedule──▶ Debouncing ──dispatch──▶ InFlight ──complete──▶ Succeeded | Failed
//!                        ▲                       │
//!                        └──────schedule─────────┘ (previous request cancelled)
//! ```
//!
//! One [`RequestToken`] is current at a time. A completion carrying any
//! other token is stale and must be discarded.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

/// Identifies one dispatched request. Tokens increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase of the current search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchPhase {
    #[default]
    Idle,
    Debouncing,
    InFlight,
    Succeeded,
    Failed,
    Cancelled,
}

/// What caused a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    /// First search after mount.
    Initial,
    /// URL-derived query or tag change.
    Query,
    /// Local filter refinement (category, tags, sort, price, featured).
    Filtering,
    /// Explicit retry after a failure.
    Retry,
}

impl TriggerKind {
    pub fn is_filtering(&self) -> bool {
        matches!(self, TriggerKind::Filtering)
    }
}

/// Result of scheduling a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    /// When the request should be dispatched.
    pub deadline: Instant,
    /// In-flight request that was cancelled by this trigger.
    pub superseded: Option<RequestToken>,
}

/// Outcome of reporting a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The token was current; its result must be applied.
    Applied(TriggerKind),
    /// The token was superseded; its result must be ignored.
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    kind: TriggerKind,
    deadline: Instant,
}

/// Pure state machine tracking debounce, dispatch and staleness.
#[derive(Debug, Default)]
pub struct SearchLifecycle {
    phase: SearchPhase,
    generation: u64,
    pending: Option<Pending>,
    in_flight: Option<(RequestToken, TriggerKind)>,
}

impl SearchLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Deadline of the pending debounce, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Arm (or re-arm) the debounce timer for `kind`.
    ///
    /// Any in-flight request is cancelled immediately and returned so the
    /// caller can signal it.
    pub fn schedule(&mut self, kind: TriggerKind, debounce: Duration, now: Instant) -> Scheduled {
        let superseded = self.in_flight.take().map(|(token, _)| token);
        let deadline = now + debounce;
        self.pending = Some(Pending { kind, deadline });
        self.phase = SearchPhase::Debouncing;
        Scheduled {
            deadline,
            superseded,
        }
    }

    /// Fire the pending trigger, minting a new current token.
    pub fn dispatch(&mut self) -> Option<(RequestToken, TriggerKind)> {
        let pending = self.pending.take()?;
        self.generation += 1;
        let token = RequestToken(self.generation);
        self.in_flight = Some((token, pending.kind));
        self.phase = SearchPhase::InFlight;
        Some((token, pending.kind))
    }

    /// Report that the request for `token` finished.
    pub fn complete(&mut self, token: RequestToken, succeeded: bool) -> Completion {
        match self.in_flight {
            Some((current, kind)) if current == token => {
                self.in_flight = None;
                self.phase = if succeeded {
                    SearchPhase::Succeeded
                } else {
                    SearchPhase::Failed
                };
                Completion::Applied(kind)
            }
            _ => Completion::Stale,
        }
    }

    /// Cancel the pending timer and any in-flight request.
    pub fn cancel(&mut self) -> Option<RequestToken> {
        let had_work = self.pending.take().is_some() || self.in_flight.is_some();
        let cancelled = self.in_flight.take().map(|(token, _)| token);
        if had_work {
            self.phase = SearchPhase::Cancelled;
        }
        cancelled
    }
}
