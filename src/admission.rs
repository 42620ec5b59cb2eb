// allow-list check applied to every incoming url before any resource is
// committed. pure and stateless.

const ALLOWED_DOMAINS: &[&str] = &[
  "youtube.com",
  "youtu.be",
  "tiktok.com",
  "vm.tiktok.com",
  "vt.tiktok.com",
  "m.tiktok.com",
  "instagram.com",
  "vimeo.com",
];

pub fn check(raw: &str) -> bool {
  let Some(host) = hostname(raw) else {
    return false;
  };

  ALLOWED_DOMAINS
    .iter()
    .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}

// extract the hostname of an http(s) url without pulling in a full url
// parser. anything unparseable is rejected.
fn hostname(raw: &str) -> Option<&str> {
  let rest = raw
    .strip_prefix("https://")
    .or_else(|| raw.strip_prefix("http://"))?;

  let authority = rest.split(['/', '?', '#']).next()?;
  // strip userinfo and port
  let host = authority.rsplit('@').next()?;
  let host = host.split(':').next()?;

  if host.is_empty() {
    None
  } else {
    Some(host)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_allowed_hosts() {
    assert!(check("https://youtube.com/watch?v=abc"));
    assert!(check("https://www.youtube.com/watch?v=abc"));
    assert!(check("http://youtu.be/abc"));
    assert!(check("https://vm.tiktok.com/xyz"));
    assert!(check("https://vimeo.com:443/12345"));
  }

  #[test]
  fn test_rejected_hosts() {
    assert!(!check("https://example.com/video"));
    assert!(!check("https://evilyoutube.com/watch?v=abc"));
    assert!(!check("https://youtube.com.evil.io/watch"));
  }

  #[test]
  fn test_malformed_urls() {
    assert!(!check("invalid"));
    assert!(!check(""));
    assert!(!check("ftp://youtube.com/file"));
    assert!(!check("https://"));
  }
}
