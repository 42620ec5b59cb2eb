// inclusive byte span within a file of known size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
  pub start: u64,
  pub end: u64,
}

impl ByteRange {
  // parse a `bytes=<start>-<end>` request header against the actual file
  // size. only the first range of a multi-range set is honored, matching
  // what browser video players send when seeking. returns None for
  // malformed headers (the caller then serves the whole file).
  pub fn parse(header: &str, size: u64) -> Option<Self> {
    let last = size.checked_sub(1)?;

    let spec = header.strip_prefix("bytes=")?;
    let spec = spec.split(',').next()?.trim();
    let (start, end) = spec.split_once('-')?;

    let start: u64 = start.trim().parse().ok()?;
    let end: u64 = match end.trim() {
      "" => last,
      s => s.parse().ok()?,
    };

    // clamp a client-declared end that overshoots the file
    let end = end.min(last);
    if start > end {
      return None;
    }

    Some(ByteRange { start, end })
  }

  pub fn len(&self) -> u64 {
    self.end - self.start + 1
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_explicit_range() {
    let range = ByteRange::parse("bytes=0-99", 1000).unwrap();
    assert_eq!(range, ByteRange { start: 0, end: 99 });
    assert_eq!(range.len(), 100);
  }

  #[test]
  fn test_open_ended_range() {
    let range = ByteRange::parse("bytes=100-", 1000).unwrap();
    assert_eq!(range, ByteRange { start: 100, end: 999 });
  }

  #[test]
  fn test_end_clamped_to_size() {
    let range = ByteRange::parse("bytes=500-5000", 1000).unwrap();
    assert_eq!(range, ByteRange { start: 500, end: 999 });
  }

  #[test]
  fn test_first_range_of_multi_range_set() {
    let range = ByteRange::parse("bytes=0-10,20-30", 1000).unwrap();
    assert_eq!(range, ByteRange { start: 0, end: 10 });
  }

  #[test]
  fn test_malformed() {
    assert_eq!(ByteRange::parse("bytes=", 1000), None);
    assert_eq!(ByteRange::parse("bytes=abc-def", 1000), None);
    assert_eq!(ByteRange::parse("bytes=-500", 1000), None);
    assert_eq!(ByteRange::parse("0-99", 1000), None);
  }

  #[test]
  fn test_inverted_or_out_of_bounds() {
    assert_eq!(ByteRange::parse("bytes=500-100", 1000), None);
    assert_eq!(ByteRange::parse("bytes=1000-", 1000), None);
    assert_eq!(ByteRange::parse("bytes=0-", 0), None);
  }
}
