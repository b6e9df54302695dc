use anyhow::{anyhow, Result};
use futures::StreamExt;
use reqwest::{header, Client};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;

const MODEL: &str = "openai/gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are an AI Doctor in a smart clinic, providing general medical information and guidance. Always remember to display the disclaimer: This AI provides general medical information only. Always consult a licensed doctor. Engage with users in a professional and informative manner, offering basic precautions, home remedies, and necessary urgency to visit a doctor if needed. Implement emergency detection for critical symptoms and maintain a clean, modern UI design for a premium feel.";

/// Forwards a user message, prefixed by the fixed system instruction, to the
/// platform's chat-completion endpoint. No retries, no timeouts, no rate
/// limiting; the platform's own behavior governs all of that.
pub struct ChatService {
    http_client: Client,
    base_url: String,
    anon_key: String,
}

impl ChatService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http_client: Client::new(),
            base_url: config.insforge_url.clone(),
            anon_key: config.insforge_anon_key.clone(),
        }
    }

    fn body(message: &str, stream: bool) -> Value {
        json!({
            "model": MODEL,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": message }
            ],
            "stream": stream
        })
    }

    async fn request(&self, message: &str, stream: bool) -> Result<reqwest::Response> {
        let url = format!("{}/api/ai/chat/completions", self.base_url);
        debug!("Forwarding chat message to {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.anon_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&Self::body(message, stream))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("AI service error ({}): {}", status, error_text));
        }

        Ok(response)
    }

    /// One complete answer, no streaming.
    pub async fn complete(&self, message: &str) -> Result<String> {
        let response = self.request(message, false).await?;
        let payload: Value = response.json().await?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| anyhow!("Invalid AI response format"))
    }

    /// Streamed answer: every content fragment goes to `on_chunk` in arrival
    /// order, and the concatenated text is returned once the stream ends.
    pub async fn complete_streamed<F>(&self, message: &str, mut on_chunk: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        let response = self.request(message, true).await?;

        let mut stream = response.bytes_stream();
        let mut buffer = SseBuffer::default();
        let mut full_message = String::new();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            for payload in buffer.push(&bytes) {
                if payload == "[DONE]" {
                    return Ok(full_message);
                }
                let event: Value = match serde_json::from_str(&payload) {
                    Ok(event) => event,
                    Err(e) => {
                        debug!("Skipping malformed stream event: {}", e);
                        continue;
                    }
                };
                if let Some(content) = event["choices"][0]["delta"]["content"].as_str() {
                    full_message.push_str(content);
                    on_chunk(content);
                }
            }
        }

        Ok(full_message)
    }
}

/// Reassembles `data:` payloads from a server-sent-event byte stream that can
/// split anywhere, including mid-line.
#[derive(Default)]
pub(crate) struct SseBuffer {
    buf: Vec<u8>,
}

impl SseBuffer {
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}
