use axum::response::{IntoResponse, Response};
use http::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Invalid URL")]
  AdmissionDenied,

  #[error("extraction failed: {0}")]
  Extraction(String),

  #[error("transcode failed: {0}")]
  Transcode(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Http(#[from] http::Error),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    // tool output and io detail stay in the server log; the client only
    // ever sees a generic message
    match self {
      Error::AdmissionDenied => {
        (StatusCode::BAD_REQUEST, "Bad URL").into_response()
      }
      err => {
        tracing::error!("request failed: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, "Download failed")
          .into_response()
      }
    }
  }
}
