//! Tokio driver for the feedback delay.
//!
//! Each scheduled delay is one spawned task that sleeps and then posts its
//! token on a channel. Cancelling aborts the task. A token that was already
//! posted before the abort may still arrive; the controller ignores tokens it
//! is not waiting for.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use super::action::{AdvanceToken, PracticeAction};

#[derive(Debug)]
pub struct FeedbackTimer {
    tx: mpsc::UnboundedSender<AdvanceToken>,
    rx: mpsc::UnboundedReceiver<AdvanceToken>,
    pending: Option<(AdvanceToken, AbortHandle)>,
}

impl Default for FeedbackTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackTimer {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            pending: None,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, token: AdvanceToken, after: Duration) {
        self.abort_pending();
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(token);
        });
        self.pending = Some((token, handle.abort_handle()));
    }

    pub fn cancel(&mut self, token: AdvanceToken) {
        if self.pending_token() == Some(token) {
            self.abort_pending();
        }
    }

    #[must_use]
    pub fn pending_token(&self) -> Option<AdvanceToken> {
        self.pending.as_ref().map(|(token, _)| *token)
    }

    /// Execute the timer side of `actions`. Returns whether a render was
    /// requested.
    pub fn apply(&mut self, actions: &[PracticeAction]) -> bool {
        let mut render = false;
        for action in actions {
            match action {
                PracticeAction::Render => render = true,
                PracticeAction::ScheduleAdvance { token, after } => self.schedule(*token, *after),
                PracticeAction::CancelAdvance { token } => self.cancel(*token),
            }
        }
        render
    }

    /// Wait for the next delay to run out.
    pub async fn elapsed(&mut self) -> Option<AdvanceToken> {
        let token = self.rx.recv().await?;
        if self.pending_token() == Some(token) {
            self.pending = None;
        }
        Some(token)
    }

    fn abort_pending(&mut self) {
        if let Some((token, handle)) = self.pending.take() {
            tracing::trace!(%token, "feedback delay aborted");
            handle.abort();
        }
    }
}

impl Drop for FeedbackTimer {
    fn drop(&mut self) {
        self.abort_pending();
    }
}
