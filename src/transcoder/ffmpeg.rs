use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{Error, Result};

use super::{Profile, Transcoder};

// runs the ffmpeg command line. requires the ffmpeg executable to be in
// PATH (or at the configured program path).
pub struct Ffmpeg {
  program: String,
}

impl Ffmpeg {
  pub fn new() -> Self {
    Self::with_program("ffmpeg")
  }

  pub fn with_program(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
    }
  }

  pub async fn preflight(&self) -> Result<()> {
    let output = Command::new(&self.program)
      .arg("-version")
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|e| Error::Transcode(format!("{} not available: {e}", self.program)))?;

    if !output.status.success() {
      return Err(Error::Transcode(format!(
        "{} -version exited with {}",
        self.program, output.status
      )));
    }

    if let Some(line) = String::from_utf8_lossy(&output.stdout).lines().next() {
      debug!("ffmpeg: {line}");
    }
    Ok(())
  }
}

impl Default for Ffmpeg {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Transcoder for Ffmpeg {
  async fn transcode(
    &self,
    input: &Path,
    profile: Profile,
    output: &Path,
  ) -> Result<()> {
    let mut cmd = Command::new(&self.program);

    cmd
      .arg("-hide_banner")
      .arg("-loglevel")
      .arg("error")
      .arg("-i")
      .arg(input);

    match profile.video_codec {
      Some(codec) => {
        cmd.arg("-c:v").arg(codec);
      }
      None => {
        cmd.arg("-vn");
      }
    }

    cmd.arg("-c:a").arg(profile.audio_codec);
    cmd.arg("-y").arg(output);

    let out = cmd
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|e| Error::Transcode(e.to_string()))?;

    if !out.status.success() {
      return Err(Error::Transcode(
        String::from_utf8_lossy(&out.stderr).into_owned(),
      ));
    }

    Ok(())
  }
}
