//! Remote speech over HTTP.
//!
//! POSTs `{"text", "voice"}` with a bearer key and expects
//! `{"audioContent": "<base64>"}` back. The caller enforces the timeout;
//! this client only bounds connection setup.

use base64::Engine as _;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::SpeechSynthesizer;
use crate::error::AudioError;

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisResponse {
    #[serde(default)]
    audio_content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpSpeechSynthesizer {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    voice: String,
}

impl HttpSpeechSynthesizer {
    pub fn new(endpoint: Url, api_key: impl Into<String>, voice: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint,
            api_key: api_key.into(),
            voice: voice.into(),
        }
    }

    /// Build from an endpoint and the name of the env var holding the key.
    ///
    /// Returns `None` when either is missing: no credential means no remote
    /// tier, and speech goes straight to the local speaker.
    pub fn from_env(endpoint: Option<&Url>, api_key_env: &str, voice: &str) -> Option<Self> {
        let endpoint = endpoint?.clone();
        let api_key = std::env::var(api_key_env).ok().filter(|k| !k.trim().is_empty())?;
        Some(Self::new(endpoint, api_key, voice))
    }

    async fn request(&self, text: &str) -> Result<Option<Vec<u8>>, AudioError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&SynthesisRequest {
                text,
                voice: &self.voice,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AudioError::Remote(format!("HTTP {status}")));
        }

        let body: SynthesisResponse = response.json().await?;
        match body.audio_content {
            Some(encoded) if !encoded.is_empty() => base64::engine::general_purpose::STANDARD
                .decode(encoded.as_bytes())
                .map(Some)
                .map_err(|e| AudioError::Remote(format!("bad audio payload: {e}"))),
            _ => Ok(None),
        }
    }
}

impl SpeechSynthesizer for HttpSpeechSynthesizer {
    fn synthesize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>, AudioError>> {
        self.request(text).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth(server: &mockito::Server) -> HttpSpeechSynthesizer {
        let endpoint = Url::parse(&format!("{}/v1/speech", server.url())).unwrap();
        HttpSpeechSynthesizer::new(endpoint, "test-key", "coach")
    }

    #[tokio::test]
    async fn decodes_audio_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/speech")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "text": "Go",
                "voice": "coach"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"audioContent":"AQID"}"#)
            .create_async()
            .await;

        let clip = synth(&server).synthesize("Go").await.unwrap();
        assert_eq!(clip, Some(vec![1, 2, 3]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_audio_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/speech")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        assert_eq!(synth(&server).synthesize("Go").await.unwrap(), None);
    }

    #[tokio::test]
    async fn server_error_is_remote_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/speech")
            .with_status(503)
            .create_async()
            .await;

        let err = synth(&server).synthesize("Go").await.unwrap_err();
        assert!(matches!(err, AudioError::Remote(msg) if msg.contains("503")));
    }

    #[test]
    fn no_endpoint_means_no_remote() {
        assert!(HttpSpeechSynthesizer::from_env(None, "PATH", "coach").is_none());
    }

    #[test]
    fn unset_key_means_no_remote() {
        let url = Url::parse("http://localhost/tts").unwrap();
        assert!(HttpSpeechSynthesizer::from_env(
            Some(&url),
            "FITCUE_TEST_KEY_THAT_IS_NEVER_SET",
            "coach"
        )
        .is_none());
    }
}
