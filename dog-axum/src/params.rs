use axum::http::{header, HeaderMap, Method};
use dog_blob::StreamRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamParams {
    pub filename: String,
    pub range: Option<String>,
    pub head_only: bool,
    pub request_id: Option<String>,
}

impl StreamParams {
    pub fn from_parts(method: &Method, headers: &HeaderMap, filename: String) -> Self {
        Self {
            filename,
            // Non-UTF-8 bytes survive as replacement characters and fail
            // range parsing, so a garbled header still gets a 416.
            range: headers
                .get(header::RANGE)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned()),
            head_only: method == Method::HEAD,
            request_id: headers
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()),
        }
    }

    pub fn into_request(self) -> StreamRequest {
        StreamRequest::new(self.filename)
            .with_optional_range(self.range)
            .head_only(self.head_only)
    }
}
