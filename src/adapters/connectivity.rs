//! Network status and install-prompt signals.
//!
//! Two independent boolean signals are published over `tokio::sync::watch`
//! so any number of views can observe them: whether the device is online,
//! and whether an install prompt has been captured and should be offered.

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

use super::BoxFuture;

/// The user's answer to an install prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

/// A deferred platform install prompt. It can be shown once.
pub trait InstallPrompt: Send + Sync {
    /// Show the prompt and resolve with the user's choice.
    fn prompt(&self) -> BoxFuture<'_, InstallOutcome>;
}

/// Tracks connectivity and installability for the app shell.
pub struct Connectivity {
    online: watch::Sender<bool>,
    install_available: watch::Sender<bool>,
    prompt: Mutex<Option<Box<dyn InstallPrompt>>>,
}

impl Connectivity {
    /// Start with the platform's initial online status and no prompt.
    pub fn new(initially_online: bool) -> Self {
        Self {
            online: watch::Sender::new(initially_online),
            install_available: watch::Sender::new(false),
            prompt: Mutex::new(None),
        }
    }

    /// Record an online/offline transition.
    pub fn set_online(&self, online: bool) {
        let previous = self.online.send_replace(online);
        if previous != online {
            tracing::info!(online, "connectivity changed");
        }
    }

    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    pub fn subscribe_online(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }

    /// Capture an install prompt the platform offered and surface the
    /// install banner. A newer prompt replaces an older one.
    pub fn offer_install(&self, prompt: Box<dyn InstallPrompt>) {
        *self.prompt.lock().unwrap_or_else(PoisonError::into_inner) = Some(prompt);
        self.install_available.send_replace(true);
    }

    /// Whether the install banner should be shown.
    pub fn install_available(&self) -> bool {
        *self.install_available.borrow()
    }

    pub fn subscribe_install(&self) -> watch::Receiver<bool> {
        self.install_available.subscribe()
    }

    /// Hide the install banner. The captured prompt is kept, so
    /// [`install`](Self::install) can still be called later.
    pub fn dismiss_install(&self) {
        self.install_available.send_replace(false);
    }

    /// Show the captured install prompt, if any, and wait for the answer.
    ///
    /// The prompt is consumed either way, and the banner is hidden.
    /// Returns `None` when no prompt was captured.
    pub async fn install(&self) -> Option<InstallOutcome> {
        let prompt = self
            .prompt
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        let outcome = prompt.prompt().await;
        tracing::info!(?outcome, "install prompt answered");
        self.install_available.send_replace(false);
        Some(outcome)
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}
