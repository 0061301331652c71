//! Terminal implementations of the UI-side collaborators

use nova_core::{
    LoadingOverlayService, LoadingToken, MessageLevel, MessageService, NavigationService,
    NavigationTarget, UserMessage,
};
use std::sync::atomic::{AtomicU64, Ordering};

/// Messages go to the log
#[derive(Debug, Default)]
pub(crate) struct ConsoleMessages;

impl MessageService for ConsoleMessages {
    fn add_message(&self, message: UserMessage) {
        match message.level {
            MessageLevel::Error => tracing::error!(key = %message.key, "{}", message.text),
            MessageLevel::Warning => tracing::warn!(key = %message.key, "{}", message.text),
            MessageLevel::Info => tracing::info!(key = %message.key, "{}", message.text),
        }
    }

    fn clear_sticky_messages(&self) {}
}

/// There is no router; requested navigations are logged
#[derive(Debug, Default)]
pub(crate) struct ConsoleNavigation;

impl NavigationService for ConsoleNavigation {
    fn navigate_to(&self, target: NavigationTarget) {
        tracing::info!("Navigate to {} (version {:?})", target.id, target.version);
    }

    fn navigate_to_main(&self, redirect: bool) {
        tracing::info!(redirect, "Navigate to main view");
    }

    fn reload_current_state(&self) {
        tracing::info!("Reload current state");
    }
}

#[derive(Debug, Default)]
pub(crate) struct ConsoleOverlay {
    next: AtomicU64,
}

impl LoadingOverlayService for ConsoleOverlay {
    fn begin_loading(&self) -> LoadingToken {
        let token = LoadingToken(self.next.fetch_add(1, Ordering::Relaxed) + 1);
        tracing::debug!(token = token.0, "loading...");
        token
    }

    fn end_loading(&self, token: LoadingToken) {
        tracing::debug!(token = token.0, "loading done");
    }
}
