use crate::error::ServiceError;
use crate::network::protocol::{MoveRequest, MoveResponse};
use crate::network::MoveService;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the remote move service.
pub struct MoveServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl MoveServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Map a `/move` reply to the move text or a [`ServiceError`].
fn interpret(status: StatusCode, body: &str) -> Result<String, ServiceError> {
    if !status.is_success() {
        let message = serde_json::from_str::<MoveResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .unwrap_or_else(|| body.to_string());
        warn!(status = status.as_u16(), %message, "move service rejected request");
        return Err(ServiceError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let parsed: MoveResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::Malformed(e.to_string()))?;
    match parsed.mv {
        Some(mv) if !mv.trim().is_empty() => Ok(mv),
        _ => Err(ServiceError::MissingMove),
    }
}

#[async_trait]
impl MoveService for MoveServiceClient {
    async fn request_move(&self, request: &MoveRequest) -> Result<String, ServiceError> {
        let url = self.endpoint("move");
        debug!(%url, fen = %request.fen, elo = %request.elo, "requesting move");

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        interpret(status, &body)
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        let response = self.http.get(self.endpoint("ping")).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ServiceError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = MoveServiceClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.endpoint("move"), "http://localhost:5000/move");
    }

    #[test]
    fn test_error_status_uses_error_field() {
        let result = interpret(StatusCode::BAD_REQUEST, r#"{"error":"Missing FEN"}"#);
        match result {
            Err(ServiceError::Status { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Missing FEN");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_error_status_falls_back_to_body() {
        let result = interpret(StatusCode::INTERNAL_SERVER_ERROR, "engine crashed");
        match result {
            Err(ServiceError::Status { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "engine crashed");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_blank_or_null_move_is_missing() {
        for body in [r#"{"move":"  "}"#, r#"{"move":null}"#, r#"{"fen":"8/8/8/8/8/8/8/8 w - - 0 1"}"#] {
            assert!(
                matches!(interpret(StatusCode::OK, body), Err(ServiceError::MissingMove)),
                "{}",
                body
            );
        }
    }

    #[test]
    fn test_non_json_success_is_malformed() {
        assert!(matches!(
            interpret(StatusCode::OK, "<html>ok</html>"),
            Err(ServiceError::Malformed(_))
        ));
    }

    #[test]
    fn test_move_is_returned() {
        let body = r#"{"move":"e7e5","fen":"rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"}"#;
        assert_eq!(interpret(StatusCode::OK, body).unwrap(), "e7e5");
    }
}
