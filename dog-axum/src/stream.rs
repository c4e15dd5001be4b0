//! `GET/HEAD /{filename}` backed by a [`RangeStreamer`](dog_blob::RangeStreamer).

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use dog_blob::BlobError;
use tracing::Instrument;

use crate::{params::StreamParams, sink, DogAxumError, StreamState};

pub fn stream_router(state: StreamState) -> Router<()> {
    // axum answers HEAD through the GET route and strips the body
    Router::new()
        .route("/{filename}", get(stream_blob))
        .fallback(no_such_blob)
        .with_state(state)
}

/// Anything under the mount that is not a single filename
pub(crate) async fn no_such_blob(uri: Uri) -> DogAxumError {
    tracing::debug!(path = %uri.path(), "no blob route matched");
    BlobError::not_found(uri.path()).into()
}

async fn stream_blob(
    State(state): State<StreamState>,
    filename: Result<Path<String>, PathRejection>,
    uri: Uri,
    method: Method,
    headers: HeaderMap,
) -> Response {
    // A name that does not even decode cannot name a blob
    let filename = match filename {
        Ok(Path(filename)) => filename,
        Err(rejection) => {
            tracing::debug!(path = %uri.path(), error = %rejection, "undecodable blob name");
            return DogAxumError::from(BlobError::not_found(uri.path())).into_response();
        }
    };

    let params = StreamParams::from_parts(&method, &headers, filename);
    tracing::debug!(
        filename = %params.filename,
        range = ?params.range,
        request_id = ?params.request_id,
        head_only = params.head_only,
        "stream request"
    );

    let (mut writer, pending) = sink::channel(state.buffer);
    let streamer = state.streamer.clone();
    let request = params.into_request();

    tokio::spawn(
        async move {
            // Errors were already written to the sink and logged by the streamer
            let _ = streamer.stream(request, &mut writer).await;
        }
        .instrument(tracing::Span::current()),
    );

    pending.into_response().await
}
