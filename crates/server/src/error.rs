use axum::Json;
use axum::http::StatusCode;
use axum_core::response::{IntoResponse as AxumCoreIntoResponse, Response};
use restpki_client::RestPkiError;
use serde_json::json;

use crate::flow::FlowError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl From<StorageError> for AppError {
    fn from(error: StorageError) -> Self {
        Self::Flow(FlowError::Storage(error))
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_)
            | AppError::Flow(FlowError::Storage(StorageError::InvalidFileName(_))) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Flow(FlowError::Storage(StorageError::NotFound(_))) => StatusCode::NOT_FOUND,
            AppError::Flow(FlowError::Remote(RestPkiError::InvalidToken(_))) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Flow(FlowError::Remote(_) | FlowError::MissingField(_)) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Flow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every failure ends up here and is rendered the same way.
impl AxumCoreIntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Something wrong happened.".to_string()
        } else {
            tracing::warn!(error = %self, %status, "request failed");
            self.to_string()
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::SigningError;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn bad_request_returns_400() {
        let error = AppError::BadRequest("bad".into());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_file_name_returns_400() {
        let error = AppError::from(StorageError::InvalidFileName("../x".into()));
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_app_data_file_returns_404() {
        let error = AppError::from(StorageError::NotFound("x.pdf".into()));
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_token_returns_400() {
        let error = AppError::Flow(FlowError::Remote(RestPkiError::InvalidToken("x".into())));
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_digest_returns_502() {
        let error = AppError::Flow(FlowError::MissingField("toSignData"));
        assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn remote_error_returns_502_with_message() {
        let error = AppError::Flow(FlowError::Remote(RestPkiError::Api {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            code: Some("ValidationError".into()),
            message: Some("Certificate revoked".into()),
            detail: None,
        }));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(
            body["message"],
            "REST PKI responded with 422 Unprocessable Entity: Certificate revoked"
        );
    }

    #[tokio::test]
    async fn signing_error_returns_500_without_details() {
        let error = AppError::Flow(FlowError::Signing(SigningError::UnsupportedDigestAlgorithm(
            "1.2.3".into(),
        )));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Something wrong happened.");
    }
}
