use api_types::{Empty, Envelope};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use engine::{Attachment, EngineError};

pub use server::{Environment, ServerState, router, run_with_listener, spawn_with_listener};

mod balance;
mod convert;
mod dashboard;
mod deposits;
mod server;
mod transactions;

/// Generic message sent instead of internal error details in production.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Malformed request (body, query string).
    Generic(String),
}

/// Full text of an internal error, attached to the response so the
/// development middleware can reveal it.
#[derive(Clone, Debug)]
pub(crate) struct InternalDetail(pub(crate) String);

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Aggregation(_) | EngineError::Corrupted(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::InvalidCurrency(_)
        | EngineError::InvalidLimit(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidAttachment(_)
        | EngineError::InvalidCode(_)
        | EngineError::InvalidField(_)
        | EngineError::MissingField(_) => StatusCode::BAD_REQUEST,
    }
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(Envelope::<Empty>::error(message))).into_response()
}

/// Serves an attachment with its own content type.
pub(crate) fn attachment_response(attachment: Attachment) -> Result<Response, ServerError> {
    let bytes = attachment.bytes()?;
    let file_name: String = attachment
        .name
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"' && *c != '\\')
        .collect();
    Ok((
        [
            (header::CONTENT_TYPE, attachment.mime_type),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::Engine(err) if err.is_internal() => {
                tracing::error!("internal error: {err}");
                let mut response =
                    error_response(status_for_engine_error(&err), INTERNAL_ERROR_MESSAGE);
                response
                    .extensions_mut()
                    .insert(InternalDetail(err.to_string()));
                response
            }
            ServerError::Engine(err) => error_response(status_for_engine_error(&err), err.to_string()),
            ServerError::Generic(err) => error_response(StatusCode::BAD_REQUEST, err),
        }
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("code".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        for err in [
            EngineError::InvalidCurrency("XYZ".to_string()),
            EngineError::InvalidLimit("0".to_string()),
            EngineError::MissingField("recipient".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let res =
            ServerError::from(EngineError::Aggregation("disk on fire".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = res.extensions().get::<InternalDetail>().unwrap();
        assert_eq!(detail.0, "Error computing balance: disk on fire");
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.extensions().get::<InternalDetail>().is_none());
    }
}
