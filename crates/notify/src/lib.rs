// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Gate-event notification delivery.
//!
//! When a walk-in visitor lands in `waiting_approval`, the resident gets a
//! message over every channel they have registered: a Telegram chat (with
//! inline approve/deny buttons) and/or a push relay. Delivery is strictly
//! best-effort: failures are logged and swallowed, and the visitor record
//! that triggered the notification is never rolled back.
//!
//! Events here are informational, never authoritative. The approve/deny
//! buttons round-trip a [`GateDecision`] through the server's callback
//! endpoint, which applies the same guarded transition as any other actor.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod dispatcher;
mod push;
mod telegram;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use dispatcher::Dispatcher;
pub use push::PushGatewayChannel;
pub use telegram::TelegramChannel;

/// The payload emitted when a visitor enters `waiting_approval`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateNotification {
    /// The visitor awaiting a decision.
    pub visitor_id: i64,
    /// The building the request belongs to.
    pub building_id: i64,
    /// The flat being visited, in canonical `WING-NUMBER` form.
    pub flat: String,
    /// The guest's name.
    pub guest_name: String,
    /// The purpose of the visit.
    pub purpose: String,
}

impl GateNotification {
    /// Returns the human-readable message body for this notification.
    #[must_use]
    pub fn body(&self) -> String {
        format!(
            "{} is at the gate for {} ({})",
            self.guest_name, self.flat, self.purpose
        )
    }
}

/// Where a resident can be reached.
///
/// Both fields are optional; a channel with no destination is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Telegram chat identifier, if the resident linked the bot.
    pub telegram_chat_id: Option<String>,
    /// Push-relay endpoint, if the resident registered one.
    pub push_endpoint: Option<String>,
}

/// The resident's answer, carried back through the callback endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    /// Approve or deny.
    pub action: DecisionAction,
    /// The visitor the decision applies to.
    pub visitor_id: i64,
}

/// The two possible answers to an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    /// Let the visitor in.
    Approve,
    /// Turn the visitor away.
    Deny,
}

impl DecisionAction {
    /// Returns true if this decision admits the visitor.
    #[must_use]
    pub const fn is_approval(&self) -> bool {
        matches!(self, Self::Approve)
    }
}

/// Errors that can occur while delivering a notification.
///
/// These never propagate past the dispatcher; they exist so each channel
/// can be logged precisely.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The HTTP request did not complete.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// The remote service answered with a non-success status.
    #[error("channel rejected the notification: HTTP {status}: {body}")]
    Rejected {
        /// The HTTP status code returned.
        status: u16,
        /// The response body, for the log.
        body: String,
    },
    /// The resident has not registered a destination for this channel.
    #[error("no destination registered")]
    NoDestination,
    /// The payload could not be serialized.
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
