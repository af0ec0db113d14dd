//! Host collaborator traits so `wyrm-core` stays OS-agnostic.

use std::collections::VecDeque;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{info, warn};
use wyrm_core::{PermissionOutcome, ProfileKind, Viewport};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Pending answer to a permission request. Poll it once per frame; it never
/// blocks the tick loop.
#[derive(Debug)]
pub struct PermissionTicket {
    receiver: Receiver<PermissionOutcome>,
}

impl PermissionTicket {
    /// `Some` once the request resolved. A responder dropped without an
    /// answer resolves as a failure.
    pub fn poll(&self) -> Option<PermissionOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                Some(PermissionOutcome::Failed("permission prompt closed".into()))
            }
        }
    }
}

/// Answering end of a permission request.
#[derive(Debug)]
pub struct PromptRequest {
    sender: Sender<PermissionOutcome>,
}

impl PromptRequest {
    pub fn grant(self) {
        self.answer(PermissionOutcome::Granted);
    }

    pub fn deny(self) {
        self.answer(PermissionOutcome::Denied);
    }

    pub fn fail(self, reason: impl Into<String>) {
        self.answer(PermissionOutcome::Failed(reason.into()));
    }

    fn answer(self, outcome: PermissionOutcome) {
        info!(?outcome, "permission prompt answered");
        if self.sender.send(outcome).is_err() {
            warn!("permission ticket dropped before the answer arrived");
        }
    }
}

pub fn permission_channel() -> (PromptRequest, PermissionTicket) {
    let (sender, receiver) = crossbeam_channel::bounded(1);
    (PromptRequest { sender }, PermissionTicket { receiver })
}

/// Capability check for the orientation sensor.
pub trait PermissionGate {
    fn request(&mut self) -> PermissionTicket;
}

/// Platforms without a permission prompt: every request is granted at once.
#[derive(Debug, Default)]
pub struct ImmediateGate;

impl PermissionGate for ImmediateGate {
    fn request(&mut self) -> PermissionTicket {
        let (prompt, ticket) = permission_channel();
        prompt.grant();
        ticket
    }
}

/// Platforms with a prompt: requests queue up until the UI answers them.
#[derive(Debug, Default)]
pub struct PromptGate {
    queue: VecDeque<PromptRequest>,
}

impl PromptGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest unanswered request, for the UI to show.
    pub fn next_prompt(&mut self) -> Option<PromptRequest> {
        self.queue.pop_front()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }
}

impl PermissionGate for PromptGate {
    fn request(&mut self) -> PermissionTicket {
        let (prompt, ticket) = permission_channel();
        self.queue.push_back(prompt);
        ticket
    }
}

/// One-shot user-visible messages.
pub trait UserNotice {
    fn notice(&mut self, message: &str);
}

/// Headless hosts have nobody to show a toast to; log it instead.
#[derive(Debug, Default)]
pub struct LogNotice;

impl UserNotice for LogNotice {
    fn notice(&mut self, message: &str) {
        warn!("notice: {message}");
    }
}

/// Decides which profile a viewport runs. Must be a pure function.
pub trait ProfileSelector {
    fn select(&self, viewport: Viewport) -> ProfileKind;
}

#[derive(Debug, Clone, Copy)]
pub struct ThresholdSelector {
    pub threshold: f32,
}

impl ThresholdSelector {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for ThresholdSelector {
    fn default() -> Self {
        Self::new(wyrm_core::EngineConfig::default().profile_threshold)
    }
}

impl ProfileSelector for ThresholdSelector {
    fn select(&self, viewport: Viewport) -> ProfileKind {
        ProfileKind::for_viewport(viewport, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_gate_grants_on_first_poll() {
        let ticket = ImmediateGate.request();
        assert_eq!(ticket.poll(), Some(PermissionOutcome::Granted));
    }

    #[test]
    fn prompt_gate_waits_for_an_answer() {
        let mut gate = PromptGate::new();
        let ticket = gate.request();
        assert_eq!(ticket.poll(), None);
        assert!(gate.has_pending());
        gate.next_prompt().unwrap().deny();
        assert_eq!(ticket.poll(), Some(PermissionOutcome::Denied));
        assert!(!gate.has_pending());
    }

    #[test]
    fn dropped_prompt_resolves_as_failure() {
        let mut gate = PromptGate::new();
        let ticket = gate.request();
        drop(gate.next_prompt());
        assert!(matches!(ticket.poll(), Some(PermissionOutcome::Failed(_))));
    }

    #[test]
    fn answering_a_dropped_ticket_is_harmless() {
        let (prompt, ticket) = permission_channel();
        drop(ticket);
        prompt.fail("sensor missing");
    }

    #[test]
    fn threshold_selector_matches_core_rule() {
        let selector = ThresholdSelector::default();
        assert_eq!(selector.select(Viewport::new(1920.0, 1080.0)), ProfileKind::Full);
        assert_eq!(selector.select(Viewport::new(800.0, 1080.0)), ProfileKind::Compact);
    }
}
