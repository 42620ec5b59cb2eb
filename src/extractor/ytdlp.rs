use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{Error, Result};

use super::{Extractor, MediaInfo};

// runs the yt-dlp command line. requires the yt-dlp executable to be in
// PATH (or at the configured program path).
pub struct Ytdlp {
  program: String,
}

impl Ytdlp {
  pub fn new() -> Self {
    Self::with_program("yt-dlp")
  }

  pub fn with_program(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
    }
  }

  // one-time startup check that the executable is present and runs,
  // so a missing binary fails the boot instead of the first request
  pub async fn preflight(&self) -> Result<()> {
    let output = Command::new(&self.program)
      .arg("--version")
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|e| Error::Extraction(format!("{} not available: {e}", self.program)))?;

    if !output.status.success() {
      return Err(Error::Extraction(format!(
        "{} --version exited with {}",
        self.program, output.status
      )));
    }

    debug!(
      "yt-dlp version: {}",
      String::from_utf8_lossy(&output.stdout).trim()
    );
    Ok(())
  }
}

impl Default for Ytdlp {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Extractor for Ytdlp {
  async fn info(&self, url: &str) -> Result<MediaInfo> {
    let output = Command::new(&self.program)
      .arg("-j")
      .arg("--no-playlist")
      .arg(url)
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|e| Error::Extraction(e.to_string()))?;

    if !output.status.success() {
      return Err(Error::Extraction(
        String::from_utf8_lossy(&output.stderr).into_owned(),
      ));
    }

    serde_json::from_slice(&output.stdout)
      .map_err(|e| Error::Extraction(format!("unparseable yt-dlp output: {e}")))
  }

  async fn fetch(
    &self,
    url: &str,
    max_height: u32,
    dest: &Path,
  ) -> Result<()> {
    let selector = format!("best[height<={max_height}]/best");

    let output = Command::new(&self.program)
      .arg("-f")
      .arg(selector)
      .arg("--no-playlist")
      .arg("--no-progress")
      .arg("--no-mtime")
      .arg("-o")
      .arg(dest)
      .arg(url)
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|e| Error::Extraction(e.to_string()))?;

    detect_error(&output.stderr)?;
    if !output.status.success() {
      return Err(Error::Extraction(format!(
        "yt-dlp exited with {}",
        output.status
      )));
    }

    Ok(())
  }
}

fn detect_error(bytes: &[u8]) -> Result<()> {
  let s = String::from_utf8_lossy(bytes);
  if s.contains("ERROR:") {
    Err(Error::Extraction(s.into_owned()))
  } else {
    Ok(())
  }
}
