//! Post-reconciliation side effects
//!
//! Reconciliation returns events instead of performing notification or
//! analytics I/O itself; the dispatcher fans them out afterwards, best
//! effort, observing nothing.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Events produced by reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    UserCreated { email: String, name: String },
}

/// Post-creation notification hook (e.g. a welcome email)
#[async_trait]
pub trait NotificationHook: Send + Sync {
    async fn on_user_created(&self, email: &str, name: &str);
}

/// Analytics sink, consumed fire-and-forget
#[async_trait]
pub trait Analytics: Send + Sync {
    async fn track(&self, event: &str, payload: serde_json::Value);
}

/// Fans reconciliation events out to the registered hooks
#[derive(Default)]
pub struct EventDispatcher {
    hooks: Vec<Arc<dyn NotificationHook>>,
    analytics: Vec<Arc<dyn Analytics>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn NotificationHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    #[must_use]
    pub fn with_analytics(mut self, sink: Arc<dyn Analytics>) -> Self {
        self.analytics.push(sink);
        self
    }

    pub async fn dispatch(&self, events: &[AuthEvent]) {
        for event in events {
            match event {
                AuthEvent::UserCreated { email, name } => {
                    for hook in &self.hooks {
                        hook.on_user_created(email, name).await;
                    }
                    for sink in &self.analytics {
                        sink.track("user_created", json!({ "email": email, "name": name }))
                            .await;
                    }
                }
            }
        }
    }
}
