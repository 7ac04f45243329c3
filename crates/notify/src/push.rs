// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Push-relay delivery channel.
//!
//! The relay is a separate service that owns the web-push subscription
//! keys; this channel hands it `{destination, title, body, metadata}` and
//! lets it fan out to the resident's devices.

use crate::{Destination, GateNotification, NotifyError};
use serde::Serialize;
use tracing::debug;

/// Sends gate notifications to a configured push relay.
#[derive(Debug, Clone)]
pub struct PushGatewayChannel {
    http: reqwest::Client,
    gateway_url: String,
}

/// Request body for the relay.
#[derive(Debug, Serialize)]
struct RelayPayload {
    destination: String,
    title: String,
    body: String,
    metadata: serde_json::Value,
}

impl PushGatewayChannel {
    /// Creates a new channel for the given relay URL.
    #[must_use]
    pub fn new(http: reqwest::Client, gateway_url: String) -> Self {
        Self { http, gateway_url }
    }

    /// Delivers a notification through the push relay.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::NoDestination` if the resident has no push
    /// endpoint, or a transport/rejection error if the relay call fails.
    pub async fn deliver(
        &self,
        destination: &Destination,
        notification: &GateNotification,
    ) -> Result<(), NotifyError> {
        let endpoint = destination
            .push_endpoint
            .as_ref()
            .ok_or(NotifyError::NoDestination)?;

        let payload = RelayPayload {
            destination: endpoint.clone(),
            title: String::from("Visitor at the gate"),
            body: notification.body(),
            metadata: serde_json::to_value(notification)?,
        };

        let response = self.http.post(&self.gateway_url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        debug!(
            visitor_id = notification.visitor_id,
            "Push notification delivered"
        );
        Ok(())
    }
}
