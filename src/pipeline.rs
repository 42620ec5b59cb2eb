use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::extractor::Extractor;
use crate::range::ByteRange;
use crate::transcoder::{Profile, Transcoder};
use crate::{admission, Error, Result};

// target container for the delivered file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
  Mp4,
  Mp3,
  Webm,
}

impl Container {
  // unrecognized values fall back to mp4
  pub fn parse(s: &str) -> Self {
    match s {
      "mp3" => Container::Mp3,
      "webm" => Container::Webm,
      _ => Container::Mp4,
    }
  }

  pub fn ext(self) -> &'static str {
    match self {
      Container::Mp4 => "mp4",
      Container::Mp3 => "mp3",
      Container::Webm => "webm",
    }
  }

  pub fn mime_type(self) -> &'static str {
    match self {
      Container::Mp3 => "audio/mpeg",
      Container::Mp4 => "video/mp4",
      Container::Webm => "video/webm",
    }
  }
}

#[derive(Debug, Clone)]
pub struct MediaRequest {
  pub source_url: String,
  pub container: Container,
  pub max_height: u32,
}

// intermediate temp path, deleted on drop unless promoted into a
// StagedFile. every temp file in the pipeline lives behind one of these
// guards, so every early return cleans up after itself.
struct ScratchPath(Option<PathBuf>);

impl ScratchPath {
  fn new(path: PathBuf) -> Self {
    Self(Some(path))
  }

  fn as_path(&self) -> &Path {
    self.0.as_deref().expect("scratch path already promoted")
  }

  fn promote(mut self, size_bytes: u64, mime_type: &'static str) -> StagedFile {
    StagedFile {
      path: self.0.take().expect("scratch path already promoted"),
      size_bytes,
      mime_type,
    }
  }
}

impl Drop for ScratchPath {
  fn drop(&mut self) {
    if let Some(path) = self.0.take() {
      remove_quietly(&path);
    }
  }
}

// the final output file, ready to stream. deleting on drop is the
// delivery guarantee: the http body stream owns this value, so the file
// disappears when the body finishes or the connection is dropped.
#[derive(Debug)]
pub struct StagedFile {
  path: PathBuf,
  pub size_bytes: u64,
  pub mime_type: &'static str,
}

impl StagedFile {
  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl Drop for StagedFile {
  fn drop(&mut self) {
    remove_quietly(&self.path);
  }
}

// best-effort deletion; a file already gone is not an error
fn remove_quietly(path: &Path) {
  match std::fs::remove_file(path) {
    Ok(()) => debug!("deleted temp file {}", path.display()),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
    Err(e) => {
      tracing::warn!("failed to delete temp file {}: {e}", path.display())
    }
  }
}

// exists only for the duration of one http response
#[derive(Debug)]
pub struct PipelineResult {
  pub file: StagedFile,
  pub range: Option<ByteRange>,
}

pub struct Pipeline {
  temp_dir: PathBuf,
  extractor: Arc<dyn Extractor>,
  transcoder: Arc<dyn Transcoder>,
  // bounds concurrent external-tool invocations, and with them the
  // worst-case scratch-disk usage
  jobs: Semaphore,
}

impl Pipeline {
  pub fn new(
    temp_dir: impl Into<PathBuf>,
    extractor: Arc<dyn Extractor>,
    transcoder: Arc<dyn Transcoder>,
    job_concurrency: usize,
  ) -> Self {
    Self {
      temp_dir: temp_dir.into(),
      extractor,
      transcoder,
      jobs: Semaphore::new(job_concurrency),
    }
  }

  // sequence admission, extraction, optional transcoding and range
  // clamping. every failure path deletes whatever partial files exist
  // via the scratch guards.
  pub async fn run(
    &self,
    request: &MediaRequest,
    range_header: Option<&str>,
  ) -> Result<PipelineResult> {
    // re-check even though the handler validated already
    if !admission::check(&request.source_url) {
      return Err(Error::AdmissionDenied);
    }

    let raw = self.scratch_path("in", None);
    let out = self.scratch_path("out", Some(request.container.ext()));

    let _permit = self.jobs.acquire().await.unwrap();

    self
      .extractor
      .fetch(&request.source_url, request.max_height, raw.as_path())
      .await?;

    match Profile::for_container(request.container) {
      // container already matches the common source format, a plain
      // rename avoids a pointless re-encode
      None => {
        tokio::fs::rename(raw.as_path(), out.as_path()).await?;
      }
      Some(profile) => {
        self
          .transcoder
          .transcode(raw.as_path(), profile, out.as_path())
          .await?;
      }
    }

    // the raw file must never outlive the transcode step
    drop(raw);

    let size_bytes = tokio::fs::metadata(out.as_path()).await?.len();
    let file = out.promote(size_bytes, request.container.mime_type());
    let range = range_header.and_then(|h| ByteRange::parse(h, size_bytes));

    Ok(PipelineResult { file, range })
  }

  // millisecond timestamp plus a random suffix, so concurrent requests
  // never share a path
  fn scratch_path(&self, prefix: &str, ext: Option<&str>) -> ScratchPath {
    let millis = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .unwrap_or_default()
      .as_millis();
    let suffix: u32 = rand::thread_rng().gen();

    let name = match ext {
      Some(ext) => format!("{prefix}_{millis}_{suffix:08x}.{ext}"),
      None => format!("{prefix}_{millis}_{suffix:08x}"),
    };

    ScratchPath::new(self.temp_dir.join(name))
  }
}
