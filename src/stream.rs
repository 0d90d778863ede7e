//! Transport and security (`streamSettings`) blocks.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::params::{Network, ProxyParams, Security};

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamSettings {
  pub network: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tcpSettings: Option<TcpSettings>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub wsSettings: Option<WsSettings>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub grpcSettings: Option<GrpcSettings>,
  pub security: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tlsSettings: Option<TlsSettings>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub realitySettings: Option<RealitySettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TcpSettings {
  pub header: TcpHeader,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TcpHeader {
  #[serde(rename = "type")]
  pub type_: String,
  pub request: HttpRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpRequest {
  pub version: &'static str,
  pub method: &'static str,
  pub path: Vec<String>,
  pub headers: HttpHeaders,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpHeaders {
  #[serde(rename = "Host")]
  pub host: Vec<String>,
  #[serde(rename = "User-Agent")]
  pub user_agent: Vec<String>,
  #[serde(rename = "Accept-Encoding")]
  pub accept_encoding: Vec<String>,
  #[serde(rename = "Connection")]
  pub connection: Vec<String>,
  #[serde(rename = "Pragma")]
  pub pragma: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WsSettings {
  pub path: String,
  pub headers: BTreeMap<String, String>,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrpcSettings {
  pub serviceName: String,
  pub multiMode: bool,
  pub idle_timeout: u32,
  pub health_check_timeout: u32,
  pub permit_without_stream: bool,
  pub initial_windows_size: u32,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TlsSettings {
  pub allowInsecure: bool,
  pub serverName: String,
  pub alpn: Vec<String>,
  pub show: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fingerprint: Option<String>,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealitySettings {
  pub serverName: String,
  pub fingerprint: String,
  pub show: bool,
  pub publicKey: String,
  pub shortId: String,
  pub spiderX: String,
}

fn tcp_http_header(p: &ProxyParams) -> TcpSettings {
  TcpSettings {
    header: TcpHeader {
      type_: p.header_type.clone(),
      request: HttpRequest {
        version: "1.1",
        method: "GET",
        path: vec![p.path.clone()],
        headers: HttpHeaders {
          host: vec![p.host.clone()],
          user_agent: vec![String::new()],
          accept_encoding: vec!["gzip, deflate".to_string()],
          connection: vec!["keep-alive".to_string()],
          pragma: "no-cache",
        },
      },
    },
  }
}

pub fn build_stream_settings(p: &ProxyParams) -> StreamSettings {
  let mut stream = StreamSettings {
    network: p.network.as_str().to_string(),
    tcpSettings: None,
    wsSettings: None,
    grpcSettings: None,
    security: p.security.as_str(),
    tlsSettings: None,
    realitySettings: None,
  };

  match p.network {
    Network::Tcp | Network::Http if !p.host.is_empty() => {
      stream.tcpSettings = Some(tcp_http_header(p));
    }
    Network::Ws => {
      let mut headers = BTreeMap::new();
      if !p.host.is_empty() {
        headers.insert("Host".to_string(), p.host.clone());
      }
      stream.wsSettings = Some(WsSettings {
        path: p.path.clone(),
        headers,
      });
    }
    Network::Grpc => {
      stream.grpcSettings = Some(GrpcSettings {
        serviceName: p.service_name.clone(),
        multiMode: false,
        idle_timeout: 60,
        health_check_timeout: 20,
        permit_without_stream: false,
        initial_windows_size: 0,
      });
    }
    _ => {}
  }

  match p.security {
    Security::Tls => {
      stream.tlsSettings = Some(TlsSettings {
        allowInsecure: true,
        serverName: p.sni.clone(),
        alpn: p.alpn.clone(),
        show: false,
        fingerprint: Some(p.fingerprint.clone()).filter(|fp| !fp.is_empty() && fp != "none"),
      });
    }
    Security::Reality => {
      stream.realitySettings = Some(RealitySettings {
        serverName: p.sni.clone(),
        fingerprint: p.fingerprint.clone(),
        show: false,
        publicKey: p.reality_public_key.clone(),
        shortId: p.short_id.clone(),
        spiderX: p.spider_x.clone(),
      });
    }
    Security::None => {}
  }
  stream
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::params::parse_uri_params;
  use serde_json::json;
  use url::Url;

  fn stream_json(uri: &str) -> serde_json::Value {
    let p = parse_uri_params(&Url::parse(uri).unwrap()).unwrap();
    serde_json::to_value(build_stream_settings(&p)).unwrap()
  }

  #[test]
  fn test_plain_tcp() {
    assert_eq!(
      stream_json("trojan://pw@example.com:443"),
      json!({"network": "tcp", "security": "none"})
    );
  }

  #[test]
  fn test_tcp_http_header() {
    let v = stream_json("vless://id@example.com:80?type=tcp&host=cdn.example.com&path=/a&headertype=http");
    assert_eq!(
      v["tcpSettings"],
      json!({"header": {"type": "http", "request": {
        "version": "1.1", "method": "GET", "path": ["/a"],
        "headers": {
          "Host": ["cdn.example.com"], "User-Agent": [""],
          "Accept-Encoding": ["gzip, deflate"], "Connection": ["keep-alive"],
          "Pragma": "no-cache"
        }
      }}})
    );
  }

  #[test]
  fn test_missing_type_skips_tcp_header() {
    let v = stream_json("trojan://pw@example.com:443?security=tls&sni=example.com&host=cdn.example.com");
    assert_eq!(v["network"], "tcp");
    assert!(v.get("tcpSettings").is_none());
    assert_eq!(v["tlsSettings"]["serverName"], "example.com");
  }

  #[test]
  fn test_ws_tls() {
    let v = stream_json(
      "vless://id@example.com:443?type=ws&host=cdn.example.com&path=/ray&security=tls&sni=example.com&alpn=h2,http/1.1&fp=chrome",
    );
    assert_eq!(v["network"], "ws");
    assert_eq!(v["wsSettings"], json!({"path": "/ray", "headers": {"Host": "cdn.example.com"}}));
    assert_eq!(v["security"], "tls");
    assert_eq!(
      v["tlsSettings"],
      json!({"allowInsecure": true, "serverName": "example.com", "alpn": ["h2", "http/1.1"], "show": false, "fingerprint": "chrome"})
    );
    assert!(v.get("tcpSettings").is_none());
  }

  #[test]
  fn test_ws_without_host() {
    let v = stream_json("vless://id@example.com:443?type=ws");
    assert_eq!(v["wsSettings"], json!({"path": "/", "headers": {}}));
  }

  #[test]
  fn test_tls_fingerprint_none_dropped() {
    let v = stream_json("trojan://pw@example.com:443?security=tls&fp=none");
    assert!(v["tlsSettings"].get("fingerprint").is_none());
    assert_eq!(v["tlsSettings"]["alpn"], json!([]));
  }

  #[test]
  fn test_grpc_reality() {
    let v = stream_json("vless://id@example.com:443?type=grpc&security=reality&sni=www.apple.com&fp=chrome&pbk=KEY");
    assert_eq!(
      v["grpcSettings"],
      json!({
        "serviceName": "", "multiMode": false, "idle_timeout": 60,
        "health_check_timeout": 20, "permit_without_stream": false, "initial_windows_size": 0
      })
    );
    assert_eq!(v["security"], "reality");
    assert_eq!(
      v["realitySettings"],
      json!({"serverName": "www.apple.com", "fingerprint": "chrome", "show": false, "publicKey": "KEY", "shortId": "", "spiderX": ""})
    );
    assert!(v.get("tlsSettings").is_none());
  }

  #[test]
  fn test_unknown_network_passes_through() {
    let v = stream_json("vless://id@example.com:443?type=kcp&security=reality");
    assert_eq!(v["network"], "kcp");
  }
}
