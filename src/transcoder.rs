mod ffmpeg;

use std::path::Path;

use async_trait::async_trait;

use crate::pipeline::Container;
use crate::Result;

pub use ffmpeg::Ffmpeg;

// codec selection for one transcode run, derived from the target
// container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
  // None means drop the video track entirely
  pub video_codec: Option<&'static str>,
  pub audio_codec: &'static str,
}

impl Profile {
  // None means the container needs no transcoding at all
  pub fn for_container(container: Container) -> Option<Self> {
    match container {
      Container::Webm => None,
      Container::Mp3 => Some(Profile {
        video_codec: None,
        audio_codec: "libmp3lame",
      }),
      Container::Mp4 => Some(Profile {
        video_codec: Some("libx264"),
        audio_codec: "aac",
      }),
    }
  }
}

// the transcode client seam. the real implementation shells out to
// ffmpeg; tests substitute a fake.
#[async_trait]
pub trait Transcoder: Send + Sync {
  async fn transcode(
    &self,
    input: &Path,
    profile: Profile,
    output: &Path,
  ) -> Result<()>;
}
