use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("resolution request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("resolution failed with status {0}")]
    Status(StatusCode),
    #[error("{0}")]
    Backend(String),
    #[error("resolution response could not be parsed: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("resolution response carried no audio url")]
    MissingAudioUrl,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ResolvedAudio {
    pub(crate) audio_url: String,
}

pub(crate) trait Resolve {
    async fn resolve(&self, video_id: &str) -> Result<ResolvedAudio, Error>;
}

/// One request per call against the backend's resolution endpoint. Calls are
/// independent: no caching, no retries, no deduplication.
pub(crate) struct BackendResolver {
    http_client: reqwest::Client,
    base_url: String,
}

impl BackendResolver {
    pub(crate) fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }
}

impl Resolve for BackendResolver {
    async fn resolve(&self, video_id: &str) -> Result<ResolvedAudio, Error> {
        let url = format!("{}/youtube/audio/{}", self.base_url, video_id);
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_response(status, &body)
    }
}

#[derive(Deserialize)]
struct ResolutionPayload {
    audio_url: Option<String>,
    error: Option<String>,
}

// A non-success status is a failure regardless of what the body says; an
// error field wins over an audio url even on a 200.
fn interpret_response(status: StatusCode, body: &str) -> Result<ResolvedAudio, Error> {
    if !status.is_success() {
        return Err(Error::Status(status));
    }

    let payload: ResolutionPayload = serde_json::from_str(body)?;
    if let Some(message) = payload.error {
        return Err(Error::Backend(message));
    }

    payload
        .audio_url
        .map(|audio_url| ResolvedAudio { audio_url })
        .ok_or(Error::MissingAudioUrl)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_payload_with_an_audio_url_resolves() {
        let resolved =
            interpret_response(StatusCode::OK, r#"{"audio_url": "https://cdn/a.mp3"}"#).unwrap();
        assert_eq!(resolved.audio_url, "https://cdn/a.mp3");
    }

    #[test]
    fn an_error_payload_fails_even_with_a_success_status() {
        let error = interpret_response(StatusCode::OK, r#"{"error": "x"}"#).unwrap_err();
        match error {
            Error::Backend(message) => assert_eq!(message, "x"),
            other => panic!("expected a backend error, got {other:?}"),
        }
    }

    #[test]
    fn a_non_success_status_fails_regardless_of_the_body() {
        let error = interpret_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"audio_url": "https://cdn/a.mp3"}"#,
        )
        .unwrap_err();
        assert!(matches!(
            error,
            Error::Status(status) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[test]
    fn an_unparseable_body_is_a_failure() {
        let error = interpret_response(StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert!(matches!(error, Error::MalformedPayload(_)));
    }

    #[test]
    fn a_payload_with_neither_field_is_a_failure() {
        let error = interpret_response(StatusCode::OK, "{}").unwrap_err();
        assert!(matches!(error, Error::MissingAudioUrl));
    }
}
