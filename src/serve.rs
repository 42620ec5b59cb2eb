use axum::body::StreamBody;
use axum::extract::{Query, State};
use axum::http::header::HeaderMap;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

use crate::pipeline::{Container, MediaRequest, PipelineResult};
use crate::util::ByteStream;
use crate::{admission, AppState, Error, Result};

#[derive(Deserialize)]
pub struct InfoBody {
  url: String,
}

// POST /info: resolve metadata for a url without downloading anything
pub async fn info(
  State(state): State<AppState>,
  Json(body): Json<InfoBody>,
) -> axum::response::Response {
  if !admission::check(&body.url) {
    return (
      StatusCode::BAD_REQUEST,
      Json(json!({ "error": "Invalid URL" })),
    )
      .into_response();
  }

  match state.extractor.info(&body.url).await {
    Ok(info) => Json(info).into_response(),
    Err(err) => {
      error!("info failed for {}: {err}", body.url);
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Failed to fetch video info" })),
      )
        .into_response()
    }
  }
}

#[derive(Deserialize)]
pub struct DownloadQuery {
  url: String,
  format: Option<String>,
  resolution: Option<u32>,
}

// GET /download: run the full pipeline and stream the result back,
// honoring a single-range Range header
pub async fn download(
  State(state): State<AppState>,
  Query(query): Query<DownloadQuery>,
  headers: HeaderMap,
) -> Result<axum::response::Response> {
  let request = MediaRequest {
    source_url: query.url,
    container: Container::parse(query.format.as_deref().unwrap_or("mp4")),
    max_height: query.resolution.unwrap_or(720),
  };

  debug!(
    "download {} as {} (max height {})",
    request.source_url,
    request.container.ext(),
    request.max_height
  );

  let range_header = headers
    .get(header::RANGE)
    .and_then(|value| value.to_str().ok());

  let result = state.pipeline.run(&request, range_header).await?;
  respond(result).await
}

// emit 200 (whole file) or 206 (partial) and hand the staged file to the
// body stream. the stream owns the file, so it is deleted once the body
// has been fully sent or the connection is dropped, whichever comes
// first. delivery failures never escape into other requests; the
// connection just ends.
async fn respond(result: PipelineResult) -> Result<axum::response::Response> {
  let PipelineResult { file, range } = result;

  let size = file.size_bytes;
  let mime = file.mime_type;
  let ext = file
    .path()
    .extension()
    .and_then(|e| e.to_str())
    .unwrap_or("bin")
    .to_owned();

  let (status, skip, len) = match range {
    None => (StatusCode::OK, 0, size),
    Some(r) => (StatusCode::PARTIAL_CONTENT, r.start, r.len()),
  };

  let handle = tokio::fs::File::open(file.path()).await?;
  let reader = ReaderStream::new(handle)
    .map(|res| res.map_err(Error::from))
    .boxed();
  let stream = ByteStream::new(reader)
    .skip_bytes(skip as usize)
    .limit_bytes(len as usize)
    .with_cleanup(file);

  let mut builder = Response::builder()
    .status(status)
    .header(header::CONTENT_TYPE, mime)
    .header(header::CONTENT_LENGTH, len);

  builder = match range {
    None => builder.header(
      header::CONTENT_DISPOSITION,
      format!("attachment; filename=\"video.{ext}\""),
    ),
    Some(r) => builder
      .header(
        header::CONTENT_RANGE,
        format!("bytes {}-{}/{size}", r.start, r.end),
      )
      .header(header::ACCEPT_RANGES, "bytes"),
  };

  let response = builder.body(axum::body::boxed(StreamBody::new(stream)))?;
  Ok(response)
}
