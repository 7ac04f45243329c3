// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Best-effort fan-out over the configured channels.

use crate::{Destination, GateNotification, NotifyError, PushGatewayChannel, TelegramChannel};
use tracing::{info, warn};

/// Fans a gate notification out to every configured channel.
///
/// Channels are a closed set; an unconfigured channel is simply absent.
/// Delivery never fails the caller: each channel's outcome is logged and
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    telegram: Option<TelegramChannel>,
    push: Option<PushGatewayChannel>,
}

impl Dispatcher {
    /// Creates a dispatcher with no channels configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a Telegram channel.
    #[must_use]
    pub fn with_telegram(mut self, channel: TelegramChannel) -> Self {
        self.telegram = Some(channel);
        self
    }

    /// Adds a push-relay channel.
    #[must_use]
    pub fn with_push(mut self, channel: PushGatewayChannel) -> Self {
        self.push = Some(channel);
        self
    }

    /// Returns true if at least one channel is configured.
    #[must_use]
    pub const fn has_channels(&self) -> bool {
        self.telegram.is_some() || self.push.is_some()
    }

    /// Attempts delivery on every configured channel.
    ///
    /// A channel with no registered destination is skipped quietly; real
    /// failures are logged at `warn`. Nothing is retried and nothing is
    /// returned: the triggering action must never observe delivery state.
    pub async fn dispatch(&self, destination: &Destination, notification: &GateNotification) {
        let mut delivered = 0u32;

        if let Some(telegram) = &self.telegram {
            match telegram.deliver(destination, notification).await {
                Ok(()) => delivered += 1,
                Err(NotifyError::NoDestination) => {}
                Err(e) => {
                    warn!(
                        visitor_id = notification.visitor_id,
                        channel = "telegram",
                        error = %e,
                        "Notification delivery failed"
                    );
                }
            }
        }

        if let Some(push) = &self.push {
            match push.deliver(destination, notification).await {
                Ok(()) => delivered += 1,
                Err(NotifyError::NoDestination) => {}
                Err(e) => {
                    warn!(
                        visitor_id = notification.visitor_id,
                        channel = "push",
                        error = %e,
                        "Notification delivery failed"
                    );
                }
            }
        }

        info!(
            visitor_id = notification.visitor_id,
            delivered, "Gate notification dispatch finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_dispatcher_is_a_no_op() {
        let dispatcher = Dispatcher::new();
        assert!(!dispatcher.has_channels());

        // Must not panic or block with nothing configured
        dispatcher
            .dispatch(
                &Destination::default(),
                &GateNotification {
                    visitor_id: 1,
                    building_id: 1,
                    flat: String::from("B-404"),
                    guest_name: String::from("Asha Patel"),
                    purpose: String::from("Family visit"),
                },
            )
            .await;
    }
}
