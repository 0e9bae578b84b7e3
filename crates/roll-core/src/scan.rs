//! Scan sources: whatever turns a QR image into its decoded text.
//!
//! Image decoding itself happens outside this crate. Hardware scanners in
//! keyboard-wedge mode type the decoded text followed by a newline, which is
//! what [`LineScanner`] consumes.

use std::io::BufRead;

pub trait ScanSource {
  /// The next decoded payload, or `None` once the source is exhausted or the
  /// operator cancelled.
  fn scan(&mut self) -> Option<String>;
}

/// One payload per non-blank line of `reader`.
#[derive(Debug)]
pub struct LineScanner<R> {
  reader: R,
}

impl<R: BufRead> LineScanner<R> {
  pub fn new(reader: R) -> Self { Self { reader } }
}

impl<R: BufRead> ScanSource for LineScanner<R> {
  fn scan(&mut self) -> Option<String> {
    let mut line = String::new();
    loop {
      line.clear();
      match self.reader.read_line(&mut line) {
        Ok(0) => return None,
        Ok(_) => {
          let trimmed = line.trim();
          if !trimmed.is_empty() {
            return Some(trimmed.to_owned());
          }
        }
        Err(e) => {
          tracing::warn!(error = %e, "scan source failed");
          return None;
        }
      }
    }
  }
}
