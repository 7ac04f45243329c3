// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Telegram Bot API delivery channel.

use crate::{DecisionAction, Destination, GateDecision, GateNotification, NotifyError};
use serde::Serialize;
use tracing::debug;

/// Sends gate notifications through a Telegram bot, with inline
/// approve/deny buttons.
///
/// The button callback data is a serialized [`GateDecision`]; the bot's
/// webhook forwards it to the server's `/gate/callback` endpoint.
#[derive(Debug, Clone)]
pub struct TelegramChannel {
    http: reqwest::Client,
    bot_token: String,
}

/// Request body for the Bot API `sendMessage` method.
#[derive(Debug, Serialize)]
struct SendMessage {
    chat_id: String,
    text: String,
    reply_markup: ReplyMarkup,
}

#[derive(Debug, Serialize)]
struct ReplyMarkup {
    inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Debug, Serialize)]
struct InlineButton {
    text: String,
    callback_data: String,
}

impl TelegramChannel {
    /// Creates a new channel for the given bot token.
    #[must_use]
    pub fn new(http: reqwest::Client, bot_token: String) -> Self {
        Self { http, bot_token }
    }

    /// Delivers a notification to the resident's Telegram chat.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::NoDestination` if the resident has not linked
    /// the bot, or a transport/rejection error if the Bot API call fails.
    pub async fn deliver(
        &self,
        destination: &Destination,
        notification: &GateNotification,
    ) -> Result<(), NotifyError> {
        let chat_id = destination
            .telegram_chat_id
            .as_ref()
            .ok_or(NotifyError::NoDestination)?;

        let approve = GateDecision {
            action: DecisionAction::Approve,
            visitor_id: notification.visitor_id,
        };
        let deny = GateDecision {
            action: DecisionAction::Deny,
            visitor_id: notification.visitor_id,
        };

        let body = SendMessage {
            chat_id: chat_id.clone(),
            text: notification.body(),
            reply_markup: ReplyMarkup {
                inline_keyboard: vec![vec![
                    InlineButton {
                        text: String::from("Approve"),
                        callback_data: serde_json::to_string(&approve)?,
                    },
                    InlineButton {
                        text: String::from("Deny"),
                        callback_data: serde_json::to_string(&deny)?,
                    },
                ]],
            },
        };

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        debug!(
            visitor_id = notification.visitor_id,
            "Telegram notification delivered"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_data_round_trip() {
        let decision = GateDecision {
            action: DecisionAction::Approve,
            visitor_id: 42,
        };

        let json = serde_json::to_string(&decision).unwrap();
        // Telegram limits callback data to 64 bytes
        assert!(json.len() <= 64, "callback data too long: {json}");

        let parsed: GateDecision = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, decision);
        assert!(parsed.action.is_approval());
    }
}
