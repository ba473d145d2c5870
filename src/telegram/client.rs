use anyhow::{Context, Result, anyhow, bail};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use super::types::{
    ApiResponse, CommandDescription, CommandScope, GetUpdatesParams, Message, SendMessageParams,
    SetMyCommandsParams, Update, User,
};

/// Extra time on top of the long-poll timeout before the HTTP call gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Handle to the Bot API, created once at startup and shared by all handlers.
pub struct TelegramClient {
    api_url: String,
    token: SecretString,
    poll_timeout_secs: u64,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxbot/1.0")
            .timeout(Duration::from_secs(poll_timeout_secs) + POLL_GRACE)
            .build()
            .context("Failed to build Telegram HTTP client")?;

        Ok(TelegramClient {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: SecretString::new(token.to_string()),
            poll_timeout_secs,
            client,
        })
    }

    // Contains the token, never log it
    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_url,
            self.token.expose_secret(),
            method
        )
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(method, "Calling Telegram API");

        let response = self
            .client
            .post(self.method_url(method))
            .json(params)
            .send()
            .await
            .map_err(|e| anyhow!("Request error calling {}: {}", method, e.without_url()))?;

        let status = response.status();
        let body: ApiResponse<R> = response.json().await.map_err(|e| {
            anyhow!(
                "Failed to parse {} response (HTTP {}): {}",
                method,
                status,
                e.without_url()
            )
        })?;

        if !body.ok {
            bail!(
                "Telegram API error calling {}: {} {}",
                method,
                body.error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                body.description.unwrap_or_default()
            );
        }

        body.result
            .ok_or_else(|| anyhow!("Telegram API returned no result for {}", method))
    }

    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-polls for new messages starting at `offset`.
    #[instrument(name = "TelegramGetUpdates", skip(self))]
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let params = GetUpdatesParams {
            offset,
            timeout: self.poll_timeout_secs,
            allowed_updates: &["message"],
        };
        let updates: Vec<Update> = self.call("getUpdates", &params).await?;
        debug!(count = updates.len(), "Received updates");
        Ok(updates)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message> {
        self.call("sendMessage", &SendMessageParams { chat_id, text })
            .await
    }

    /// Registers the command menu shown in private chats.
    pub async fn set_my_commands(&self, commands: &[CommandDescription]) -> Result<bool> {
        let params = SetMyCommandsParams {
            commands,
            scope: CommandScope {
                kind: "all_private_chats",
            },
        };
        self.call("setMyCommands", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:test-token";

    fn bot_path(method: &str) -> String {
        format!("/bot{TOKEN}/{method}")
    }

    #[tokio::test]
    async fn test_get_me() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(bot_path("getMe")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": { "id": 1, "is_bot": true, "first_name": "Fx", "username": "fx_bot" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TelegramClient::new(&mock_server.uri(), TOKEN, 1).unwrap();
        let me = client.get_me().await.unwrap();

        assert!(me.is_bot);
        assert_eq!(me.username.as_deref(), Some("fx_bot"));
    }

    #[tokio::test]
    async fn test_get_updates_sends_offset_and_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(bot_path("getUpdates")))
            .and(body_partial_json(serde_json::json!({
                "offset": 5,
                "timeout": 1,
                "allowed_updates": ["message"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [{
                    "update_id": 5,
                    "message": { "message_id": 1, "chat": { "id": 9 }, "text": "/help" }
                }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TelegramClient::new(&mock_server.uri(), TOKEN, 1).unwrap();
        let updates = client.get_updates(Some(5)).await.unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].update_id, 5);
    }

    #[tokio::test]
    async fn test_send_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(bot_path("sendMessage")))
            .and(body_partial_json(serde_json::json!({ "chat_id": 9, "text": "hi" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": { "message_id": 2, "chat": { "id": 9 }, "text": "hi" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TelegramClient::new(&mock_server.uri(), TOKEN, 1).unwrap();
        let message = client.send_message(9, "hi").await.unwrap();

        assert_eq!(message.message_id, 2);
    }

    #[tokio::test]
    async fn test_set_my_commands_scoped_to_private_chats() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(bot_path("setMyCommands")))
            .and(body_partial_json(serde_json::json!({
                "commands": [{ "command": "help", "description": "Usage instructions" }],
                "scope": { "type": "all_private_chats" }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "ok": true, "result": true })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TelegramClient::new(&mock_server.uri(), TOKEN, 1).unwrap();
        let commands = [CommandDescription {
            command: "help".to_string(),
            description: "Usage instructions".to_string(),
        }];

        assert!(client.set_my_commands(&commands).await.unwrap());
    }

    #[tokio::test]
    async fn test_api_error_hides_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(bot_path("getMe")))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 401,
                "description": "Unauthorized"
            })))
            .mount(&mock_server)
            .await;

        let client = TelegramClient::new(&mock_server.uri(), TOKEN, 1).unwrap();
        let err = client.get_me().await.unwrap_err().to_string();

        assert!(err.contains("401 Unauthorized"));
        assert!(!err.contains("test-token"));
    }
}
