//! One share-link in, one outbound out.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{trace, warn};
use url::Url;

use crate::decode::{shadowsocks_params, vmess_params};
use crate::error::SkipReason;
use crate::params::{parse_uri_params, Protocol, ProxyParams, Security};
use crate::settings::{build_settings, ProxySettings};
use crate::stream::{build_stream_settings, StreamSettings};
use crate::template::{self, InboundOptions};
use crate::uri::{is_valid_uri, Scheme};

/// Tag given to an outbound before the assembler numbers it.
pub const PROXY_TAG: &str = "proxy";

/// Allow-list vocabulary. `Reality` is a category on top of the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
  Vless,
  Vmess,
  Shadowsocks,
  Trojan,
  Wireguard,
  Reality,
}

impl Category {
  pub fn as_str(self) -> &'static str {
    match self {
      Category::Vless => "vless",
      Category::Vmess => "vmess",
      Category::Shadowsocks => "shadowsocks",
      Category::Trojan => "trojan",
      Category::Wireguard => "wireguard",
      Category::Reality => "reality",
    }
  }
}

impl From<Protocol> for Category {
  fn from(p: Protocol) -> Self {
    match p {
      Protocol::Vless => Category::Vless,
      Protocol::Vmess => Category::Vmess,
      Protocol::Trojan => Category::Trojan,
      Protocol::Shadowsocks => Category::Shadowsocks,
      Protocol::Wireguard => Category::Wireguard,
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "vless" => Ok(Category::Vless),
      "vmess" => Ok(Category::Vmess),
      "shadowsocks" | "ss" => Ok(Category::Shadowsocks),
      "trojan" => Ok(Category::Trojan),
      "wireguard" => Ok(Category::Wireguard),
      "reality" => Ok(Category::Reality),
      other => Err(format!("unknown category: {other}")),
    }
  }
}

/// Caller-supplied filter. Reality links need both their protocol and
/// `reality` listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList(HashSet<Category>);

impl AllowList {
  /// Comma-separated categories. Unknown names are logged and dropped, so a
  /// list of only unknown names rejects everything.
  pub fn parse(list: &str) -> AllowList {
    let mut set = HashSet::new();
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
      match item.parse::<Category>() {
        Ok(c) => {
          set.insert(c);
        }
        Err(e) => warn!("ignoring allow-list entry: {e}"),
      }
    }
    AllowList(set)
  }

  pub fn contains(&self, c: Category) -> bool {
    self.0.contains(&c)
  }

  pub fn check(&self, p: &ProxyParams) -> Result<(), SkipReason> {
    let category = Category::from(p.protocol);
    if !self.contains(category) {
      return Err(SkipReason::Filtered(category));
    }
    if p.security == Security::Reality && !self.contains(Category::Reality) {
      return Err(SkipReason::Filtered(Category::Reality));
    }
    Ok(())
  }
}

impl FromIterator<Category> for AllowList {
  fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
    AllowList(iter.into_iter().collect())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mux {
  pub enabled: bool,
  pub concurrency: i32,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outbound {
  pub tag: String,
  pub protocol: Protocol,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub noKernelTun: Option<bool>,
  pub settings: ProxySettings,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub streamSettings: Option<StreamSettings>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub mux: Option<Mux>,
}

impl Outbound {
  /// Wireguard outbounds take no stream settings and no mux.
  pub fn from_params(p: &ProxyParams) -> Outbound {
    let settings = build_settings(p);
    match p.protocol {
      Protocol::Wireguard => Outbound {
        tag: PROXY_TAG.to_string(),
        protocol: p.protocol,
        noKernelTun: Some(false),
        settings,
        streamSettings: None,
        mux: None,
      },
      _ => Outbound {
        tag: PROXY_TAG.to_string(),
        protocol: p.protocol,
        noKernelTun: None,
        settings,
        streamSettings: Some(build_stream_settings(p)),
        mux: Some(Mux {
          enabled: false,
          concurrency: -1,
        }),
      },
    }
  }
}

/// Generated proxies and the template's fixed outbounds share one list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundEntry {
  Proxy(Outbound),
  Fixed(JsonValue),
}

/// Decodes and validates one line into its canonical record.
pub fn line_params(line: &str) -> Result<ProxyParams, SkipReason> {
  let uri = line.trim();
  let url = Url::parse(uri).map_err(|_| SkipReason::InvalidUri)?;
  let scheme =
    Scheme::detect(uri).ok_or_else(|| SkipReason::UnsupportedScheme(url.scheme().to_string()))?;
  if !is_valid_uri(uri, true, Some(scheme.as_str())) {
    return Err(SkipReason::InvalidUri);
  }
  trace!("decoding {} link", scheme.as_str());

  match scheme {
    Scheme::Vmess => vmess_params(uri),
    Scheme::Ss => shadowsocks_params(uri),
    Scheme::Vless | Scheme::Trojan | Scheme::Wireguard => parse_uri_params(&url),
  }
}

/// Converts one share-link into an outbound tagged [`PROXY_TAG`].
pub fn convert_line(line: &str, allow: Option<&AllowList>) -> Result<Outbound, SkipReason> {
  let params = line_params(line)?;
  if !params.transport_supported() {
    return Err(SkipReason::UnsupportedTransport {
      network: params.network.as_str().to_string(),
      security: params.security.as_str().to_string(),
    });
  }
  if let Some(allow) = allow {
    allow.check(&params)?;
  }
  Ok(Outbound::from_params(&params))
}

#[derive(Debug, Clone, Serialize)]
pub struct StandaloneConfig {
  pub log: JsonValue,
  pub outbounds: Vec<OutboundEntry>,
  pub inbounds: Vec<JsonValue>,
}

/// Self-contained config for a single link with local socks/http inbounds.
pub fn standalone_config(
  line: &str,
  allow: Option<&AllowList>,
  inbound: &InboundOptions,
) -> Result<StandaloneConfig, SkipReason> {
  let proxy = convert_line(line, allow)?;
  let mut outbounds = vec![OutboundEntry::Proxy(proxy)];
  outbounds.extend(template::basic_outbounds().into_iter().map(OutboundEntry::Fixed));
  Ok(StandaloneConfig {
    log: template::standalone_log(),
    outbounds,
    inbounds: template::generate_inbounds(inbound),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  const VLESS_WS: &str = "vless://uuid@example.com:443?type=ws&security=tls&sni=example.com";
  const VLESS_REALITY: &str =
    "vless://uuid@example.com:443?type=grpc&security=reality&sni=www.apple.com&pbk=KEY&fp=chrome";

  #[test]
  fn test_convert_line_vless() {
    let o = convert_line(VLESS_WS, None).unwrap();
    assert_eq!(o.tag, "proxy");
    assert_eq!(o.protocol, Protocol::Vless);
    assert_eq!(o.mux, Some(Mux { enabled: false, concurrency: -1 }));
    assert!(o.noKernelTun.is_none());
    assert_eq!(o.streamSettings.as_ref().unwrap().network, "ws");
  }

  #[test]
  fn test_convert_line_wireguard_shape() {
    let o = convert_line("wireguard://key@1.1.1.1:51820?address=10.0.0.2/32&publickey=pk", None).unwrap();
    let v = serde_json::to_value(&o).unwrap();
    assert_eq!(v["noKernelTun"], json!(false));
    assert!(v.get("streamSettings").is_none());
    assert!(v.get("mux").is_none());
  }

  #[test]
  fn test_skip_reasons() {
    assert_eq!(convert_line("not a uri", None), Err(SkipReason::InvalidUri));
    assert_eq!(
      convert_line("https://example.com/sub", None),
      Err(SkipReason::UnsupportedScheme("https".to_string()))
    );
    assert_eq!(
      convert_line("vless://uuid@example.com:443?type=kcp&security=none", None),
      Err(SkipReason::UnsupportedTransport {
        network: "kcp".to_string(),
        security: "none".to_string()
      })
    );
    assert_eq!(convert_line("vless://uuid@example.com", None), Err(SkipReason::InvalidPort));
    assert_eq!(convert_line("ss://rc4:pass@1.2.3.4:8388", None), Err(SkipReason::InvalidShadowsocks));
    assert_eq!(convert_line("vmess://bm90LWpzb24=", None), Err(SkipReason::VmessPayload));
  }

  #[test]
  fn test_reality_any_transport() {
    assert!(convert_line(VLESS_REALITY, None).is_ok());
    assert!(convert_line("trojan://pw@example.com:443?type=kcp&security=reality", None).is_ok());
  }

  #[test]
  fn test_allow_list() {
    let only_vless = AllowList::parse("vless");
    assert!(convert_line(VLESS_WS, Some(&only_vless)).is_ok());
    assert_eq!(
      convert_line(VLESS_REALITY, Some(&only_vless)),
      Err(SkipReason::Filtered(Category::Reality))
    );
    assert_eq!(
      convert_line("trojan://pw@example.com:443", Some(&only_vless)),
      Err(SkipReason::Filtered(Category::Trojan))
    );

    let with_reality: AllowList = [Category::Vless, Category::Reality].into_iter().collect();
    assert!(convert_line(VLESS_REALITY, Some(&with_reality)).is_ok());
  }

  #[test]
  fn test_allow_list_parse() {
    let list = AllowList::parse(" VLESS, ss ,bogus,,reality");
    assert!(list.contains(Category::Vless));
    assert!(list.contains(Category::Shadowsocks));
    assert!(list.contains(Category::Reality));
    assert!(!list.contains(Category::Vmess));
    assert_eq!(AllowList::parse(""), AllowList::default());
  }

  #[test]
  fn test_standalone_config() {
    let opts = InboundOptions {
      listen: "0.0.0.0".to_string(),
      http_port: 8080,
      socks_port: 1080,
    };
    let cfg = standalone_config(VLESS_WS, None, &opts).unwrap();
    let v = serde_json::to_value(&cfg).unwrap();
    assert_eq!(v["log"]["loglevel"], "warning");
    let tags: Vec<&str> = v["outbounds"]
      .as_array()
      .unwrap()
      .iter()
      .map(|o| o["tag"].as_str().unwrap())
      .collect();
    assert_eq!(tags, vec!["proxy", "direct", "block"]);
    assert_eq!(v["inbounds"][0]["tag"], "socks");
    assert_eq!(v["inbounds"][0]["port"], 1080);
    assert_eq!(v["inbounds"][1]["tag"], "http");
    assert_eq!(v["inbounds"][1]["listen"], "0.0.0.0");
  }
}
