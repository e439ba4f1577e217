//! Protocol error mapping: [`GatewayError`] → HTTP status + response body.
//!
//! This is the single point where failures are logged and shaped for the
//! client. The body is a JSON-RPC-style `{code, message, data?}` object with
//! the correlation `id` echoed when the request carried one. Stack traces and
//! internal context go to the log only, and only for backend/internal
//! failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use remilk_types::GatewayError;
use serde_json::{Value, json};

/// Wrapper around [`GatewayError`] that implements [`IntoResponse`].
pub struct ApiError {
    err: GatewayError,
    id: Option<Value>,
}

impl ApiError {
    /// Attach the request's correlation id for echoing in the body.
    #[must_use]
    pub fn with_id(mut self, id: Option<Value>) -> Self {
        self.id = id;
        self
    }

    fn status(&self) -> StatusCode {
        match &self.err {
            GatewayError::Parse(_)
            | GatewayError::InvalidRequest(_)
            | GatewayError::InvalidParams { .. }
            | GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Auth { .. } => StatusCode::UNAUTHORIZED,
            GatewayError::MethodNotFound(_) | GatewayError::Resource(_) => StatusCode::NOT_FOUND,
            GatewayError::Internal(_) | GatewayError::Backend { .. } | GatewayError::Tool(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Structured context safe to return to the client.
    fn data(&self) -> Option<Value> {
        match &self.err {
            GatewayError::InvalidParams {
                field: Some(field), ..
            } => Some(json!({ "field": field })),
            GatewayError::Auth { kind, .. } => Some(json!({ "kind": kind.as_str() })),
            GatewayError::Backend { code, .. } if *code != 0 => {
                Some(json!({ "backend_code": code }))
            }
            _ => None,
        }
    }

    /// Log the failure exactly once, with a backtrace for the kinds that
    /// warrant one. Nothing logged here ever reaches the response body.
    fn log(&self) {
        match &self.err {
            GatewayError::Backend { .. } | GatewayError::Internal(_) => {
                let backtrace = std::backtrace::Backtrace::capture();
                tracing::error!(error = %self.err, %backtrace, "request failed");
            }
            GatewayError::Auth { .. } => {
                tracing::warn!(error = %self.err, "request rejected");
            }
            _ => {
                tracing::debug!(error = %self.err, "request rejected");
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        // Internal details (paths, panic payloads) stay in the log.
        let message = match &self.err {
            GatewayError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        let mut body = json!({
            "code": self.err.code(),
            "message": message,
        });
        if let Some(data) = self.data() {
            body["data"] = data;
        }
        if let Some(ref id) = self.id {
            body["id"] = id.clone();
        }
        (self.status(), Json(body)).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self { err, id: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt as _;
    use remilk_types::AuthErrorKind;

    async fn extract(err: ApiError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_parse_error_is_400() {
        let (status, body) = extract(GatewayError::Parse("bad json".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], -32700);
    }

    #[tokio::test]
    async fn test_invalid_params_names_field() {
        let (status, body) = extract(GatewayError::missing_arg("list_id").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], -32602);
        assert_eq!(body["data"]["field"], "list_id");
        assert!(body["message"].as_str().unwrap().contains("list_id"));
    }

    #[tokio::test]
    async fn test_auth_error_is_401_with_kind() {
        let (status, body) =
            extract(GatewayError::auth(AuthErrorKind::Required, "authenticate first").into())
                .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], -32001);
        assert_eq!(body["data"]["kind"], "not_authenticated");
    }

    #[tokio::test]
    async fn test_method_not_found_is_404() {
        let (status, body) = extract(GatewayError::MethodNotFound("frobnicate".into()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], -32601);
    }

    #[tokio::test]
    async fn test_resource_not_found_is_404() {
        let (status, body) = extract(GatewayError::Resource("bogus://rtm".into()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], -32002);
    }

    #[tokio::test]
    async fn test_backend_error_is_500_with_code() {
        let (status, body) = extract(
            GatewayError::Backend {
                code: 105,
                msg: "service unavailable".into(),
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], -32003);
        assert_eq!(body["data"]["backend_code"], 105);
    }

    #[tokio::test]
    async fn test_transport_backend_error_has_no_data() {
        let (_, body) = extract(
            GatewayError::Backend {
                code: 0,
                msg: "timed out".into(),
            }
            .into(),
        )
        .await;
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_validation_error_is_400() {
        let (status, body) = extract(GatewayError::Validation("bad priority".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], -32005);
    }

    #[tokio::test]
    async fn test_id_is_echoed() {
        let err = ApiError::from(GatewayError::Parse("x".into())).with_id(Some(json!(42)));
        let (_, body) = extract(err).await;
        assert_eq!(body["id"], 42);
    }

    #[tokio::test]
    async fn test_no_internal_detail_in_body() {
        let (status, body) =
            extract(GatewayError::Internal("mutex poisoned at src/x.rs:10".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "internal error");
        assert!(body.get("backtrace").is_none());
    }
}
