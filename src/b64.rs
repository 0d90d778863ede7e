//! Tolerant Base64 handling for share-link payloads.
//!
//! Subscription providers are sloppy: padding goes missing, line breaks and
//! stray punctuation end up inside the payload. `decode_base64` never fails,
//! it returns whatever bytes the valid part of the input yields.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Standard alphabet, padding optional, non-zero trailing bits accepted.
pub const LENIENT: GeneralPurpose = GeneralPurpose::new(
  &alphabet::STANDARD,
  GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true),
);

fn sextet(c: u8) -> Option<u32> {
  ALPHABET.iter().position(|&a| a == c).map(|p| p as u32)
}

fn pad_to_quad(s: &str) -> String {
  let rem = s.len() % 4;
  if rem == 0 {
    s.to_string()
  } else {
    format!("{s}{}", "=".repeat(4 - rem))
  }
}

/// Decodes to raw bytes, skipping anything outside the alphabet and stopping
/// at the first `=`.
pub fn decode_base64_bytes(s: &str) -> Vec<u8> {
  let cleaned: String = s
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
    .collect();
  let padded = pad_to_quad(&cleaned);

  let mut out = Vec::with_capacity(padded.len() / 4 * 3);
  let mut buffer: u32 = 0;
  let mut bits = 0u32;
  for c in padded.bytes() {
    if c == b'=' {
      break;
    }
    let Some(value) = sextet(c) else {
      continue;
    };
    buffer = ((buffer << 6) | value) & 0x00ff_ffff;
    bits += 6;
    if bits >= 8 {
      bits -= 8;
      out.push(((buffer >> bits) & 0xff) as u8);
    }
  }
  out
}

/// Best-effort decode into text. Invalid UTF-8 sequences are replaced.
pub fn decode_base64(s: &str) -> String {
  String::from_utf8_lossy(&decode_base64_bytes(s)).into_owned()
}

/// Reports whether `s` is plausibly a Base64 payload.
pub fn is_base64(s: &str) -> bool {
  let s = s.trim();
  if s.is_empty() {
    return false;
  }
  let padded = pad_to_quad(s);
  if padded.len() % 4 != 0 {
    return false;
  }
  if !padded
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
  {
    return false;
  }
  LENIENT.decode(&padded).is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;
  use base64::engine::general_purpose::STANDARD;

  #[test]
  fn test_decode_standard() {
    assert_eq!(decode_base64("aGVsbG8gd29ybGQ="), "hello world");
  }

  #[test]
  fn test_decode_missing_padding() {
    assert_eq!(decode_base64("aGVsbG8gd29ybGQ"), "hello world");
    assert_eq!(decode_base64("YQ"), "a");
  }

  #[test]
  fn test_decode_ignores_foreign_characters() {
    assert_eq!(decode_base64("aGVs\nbG8g\td29y bGQ="), "hello world");
    assert_eq!(decode_base64("aGVsbG8gd29ybGQ=!!~~"), "hello world");
  }

  #[test]
  fn test_decode_stops_at_padding() {
    assert_eq!(decode_base64("YQ==YWJj"), "a");
  }

  #[test]
  fn test_decode_empty_and_garbage() {
    assert_eq!(decode_base64(""), "");
    assert_eq!(decode_base64("!!!"), "");
  }

  #[test]
  fn test_round_trip_ascii() {
    for original in [
      "a",
      "ab",
      "abc",
      "aes-256-gcm:p@ss:word",
      "{\"v\":\"2\",\"add\":\"example.com\",\"port\":\"443\"}",
    ] {
      let encoded = STANDARD.encode(original);
      assert_eq!(decode_base64(&encoded), original);
      assert_eq!(decode_base64(encoded.trim_end_matches('=')), original);
    }
  }

  #[test]
  fn test_decode_utf8_payload() {
    let encoded = STANDARD.encode("节点 🇺🇸");
    assert_eq!(decode_base64(&encoded), "节点 🇺🇸");
  }

  #[test]
  fn test_is_base64() {
    assert!(is_base64("YWVzLTI1Ni1nY206cGFzcw=="));
    assert!(is_base64("YWVzLTI1Ni1nY206cGFzcw"));
    assert!(is_base64("  YWJj  "));
    assert!(!is_base64(""));
    assert!(!is_base64("   "));
    assert!(!is_base64("aes-256-gcm:pass"));
    assert!(!is_base64("YW=j"));
    assert!(!is_base64("a"));
  }
}
