mod ytdlp;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use ytdlp::Ytdlp;

// metadata resolved for a source url, shaped after yt-dlp's `-j` output.
// unknown keys are ignored on the way in and the struct is re-serialized
// verbatim for the /info endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaInfo {
  #[serde(default)]
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub thumbnail: Option<String>,
  #[serde(default)]
  pub formats: Vec<MediaFormat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaFormat {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub format_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ext: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub height: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub width: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub filesize: Option<u64>,
}

// the extraction client seam. the real implementation shells out to
// yt-dlp; tests substitute a fake.
#[async_trait]
pub trait Extractor: Send + Sync {
  // resolve metadata without fetching any media
  async fn info(&self, url: &str) -> Result<MediaInfo>;

  // fetch the best stream with vertical resolution <= max_height into
  // `dest`, falling back to the overall best when nothing satisfies the
  // bound
  async fn fetch(&self, url: &str, max_height: u32, dest: &Path)
    -> Result<()>;
}
