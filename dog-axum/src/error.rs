use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use dog_blob::{BlobError, ResolvedRange};
use serde::Serialize;

#[derive(Debug)]
pub struct DogAxumError(pub anyhow::Error);

impl From<anyhow::Error> for DogAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<BlobError> for DogAxumError {
    fn from(e: BlobError) -> Self {
        Self(e.into())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for DogAxumError {
    fn into_response(self) -> Response {
        // If it's a BlobError (even if wrapped by anyhow contexts), keep its status
        if let Some(blob) = self.0.chain().find_map(|e| e.downcast_ref::<BlobError>()) {
            let status = StatusCode::from_u16(blob.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                tracing::error!(error = ?self.0, "request failed");
            }

            return match (blob.client_message(), blob.unsatisfied_size()) {
                (Some(message), _) => (status, Json(ErrorBody { error: message })).into_response(),
                (None, Some(size)) => {
                    let mut res = status.into_response();
                    if let Ok(value) = HeaderValue::from_str(&ResolvedRange::unsatisfied_content_range(size)) {
                        res.headers_mut().insert(header::CONTENT_RANGE, value);
                    }
                    res
                }
                (None, None) => status.into_response(),
            };
        }

        // Anything else is a generic 500 with no detail leaked
        tracing::error!(error = ?self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody { error: "Internal server error" }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body(res: Response) -> Vec<u8> {
        res.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[tokio::test]
    async fn not_found_keeps_status_through_context() {
        let err = anyhow::Error::from(BlobError::not_found("a.mp3")).context("looking up blob");
        let res = DogAxumError(err).into_response();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(&body(res).await).unwrap();
        assert_eq!(body["error"], "Audio file not found");
    }

    #[tokio::test]
    async fn unsatisfiable_range_is_empty_416_with_content_range() {
        let res = DogAxumError::from(BlobError::RangeUnsatisfiable { size: 100 }).into_response();

        assert_eq!(res.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(res.headers()[header::CONTENT_RANGE], "bytes */100");
        assert!(body(res).await.is_empty());
    }

    #[tokio::test]
    async fn malformed_range_reports_blob_size() {
        let res = DogAxumError::from(BlobError::malformed_range("bytes=x", 42)).into_response();

        assert_eq!(res.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(res.headers()[header::CONTENT_RANGE], "bytes */42");
    }

    #[tokio::test]
    async fn io_failure_hides_detail() {
        let io = std::io::Error::other("disk on fire");
        let res = DogAxumError::from(BlobError::from(io)).into_response();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(&body(res).await).unwrap();
        assert_eq!(body["error"], "Internal server error");
    }
}
