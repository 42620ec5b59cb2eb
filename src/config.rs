use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// environment-style configuration, every value has a default so the
// server comes up with no configuration at all
#[derive(Debug, Clone)]
pub struct Config {
  pub port: u16,
  pub temp_dir: PathBuf,
  pub rate_limit_window: Duration,
  pub rate_limit_max: u32,
  pub job_concurrency: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      port: 3000,
      temp_dir: PathBuf::from("./temp"),
      rate_limit_window: Duration::from_millis(60_000),
      rate_limit_max: 50,
      job_concurrency: 4,
    }
  }
}

impl Config {
  pub fn from_env() -> Self {
    let defaults = Self::default();

    Self {
      port: env_parse("PORT").unwrap_or(defaults.port),
      temp_dir: std::env::var("TEMP_DIR")
        .map(PathBuf::from)
        .unwrap_or(defaults.temp_dir),
      rate_limit_window: env_parse("RATE_LIMIT_WINDOW_MS")
        .map(Duration::from_millis)
        .unwrap_or(defaults.rate_limit_window),
      rate_limit_max: env_parse("RATE_LIMIT_MAX")
        .unwrap_or(defaults.rate_limit_max),
      job_concurrency: env_parse("JOB_CONCURRENCY")
        .unwrap_or(defaults.job_concurrency),
    }
  }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
  std::env::var(key).ok().and_then(|s| s.parse().ok())
}
