use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::AppState;

// fixed-window request counter applied to the /info and /download
// routes. one process-wide window, not keyed per client.
pub struct RateLimiter {
  window: Duration,
  max: u32,
  state: Mutex<Window>,
}

struct Window {
  started_at: Instant,
  count: u32,
}

impl RateLimiter {
  pub fn new(window: Duration, max: u32) -> Self {
    Self {
      window,
      max,
      state: Mutex::new(Window {
        started_at: Instant::now(),
        count: 0,
      }),
    }
  }

  pub fn try_acquire(&self) -> bool {
    let mut state = self.state.lock().unwrap();

    let now = Instant::now();
    if now.duration_since(state.started_at) >= self.window {
      state.started_at = now;
      state.count = 0;
    }

    if state.count < self.max {
      state.count += 1;
      true
    } else {
      false
    }
  }
}

pub async fn limit<B>(
  State(state): State<AppState>,
  request: Request<B>,
  next: Next<B>,
) -> Response {
  if state.limiter.try_acquire() {
    next.run(request).await
  } else {
    (
      StatusCode::TOO_MANY_REQUESTS,
      "Too many requests - try again later",
    )
      .into_response()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_limit_within_window() {
    let limiter = RateLimiter::new(Duration::from_secs(60), 2);
    assert!(limiter.try_acquire());
    assert!(limiter.try_acquire());
    assert!(!limiter.try_acquire());
  }

  #[test]
  fn test_window_rollover() {
    let limiter = RateLimiter::new(Duration::from_millis(10), 1);
    assert!(limiter.try_acquire());
    assert!(!limiter.try_acquire());

    std::thread::sleep(Duration::from_millis(15));
    assert!(limiter.try_acquire());
  }
}
