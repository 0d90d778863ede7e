//! Classifies subscription lines.

use url::Url;

/// Share-link schemes the converter knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
  Vless,
  Vmess,
  Trojan,
  Ss,
  Wireguard,
}

impl Scheme {
  pub const ALL: [Scheme; 5] = [
    Scheme::Vless,
    Scheme::Vmess,
    Scheme::Trojan,
    Scheme::Ss,
    Scheme::Wireguard,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Scheme::Vless => "vless",
      Scheme::Vmess => "vmess",
      Scheme::Trojan => "trojan",
      Scheme::Ss => "ss",
      Scheme::Wireguard => "wireguard",
    }
  }

  pub fn prefix(self) -> String {
    format!("{}://", self.as_str())
  }

  /// Scheme whose literal prefix starts `text`, if any.
  pub fn detect(text: &str) -> Option<Scheme> {
    Scheme::ALL
      .into_iter()
      .find(|s| text.starts_with(&s.prefix()))
  }
}

/// Returns `true` when `text` parses as an absolute URL and, if requested,
/// carries the `wanted` prefix and/or one of the proxy scheme prefixes.
pub fn is_valid_uri(text: &str, as_proxy: bool, wanted: Option<&str>) -> bool {
  if Url::parse(text).is_err() {
    return false;
  }
  let scheme_match = wanted.map_or(true, |w| text.starts_with(&format!("{w}://")));
  if as_proxy {
    return Scheme::detect(text).is_some() && scheme_match;
  }
  scheme_match
}
