//! Fixed sections of the generated documents.

use serde_json::{json, Value as JsonValue};

pub const REMARKS: &str = "v2ray-sub2json-worker";
pub const BALANCER_TAG: &str = "xray-load-balancer";

/// Local listeners of a standalone single-link config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundOptions {
  pub listen: String,
  pub http_port: u16,
  pub socks_port: u16,
}

impl Default for InboundOptions {
  fn default() -> Self {
    InboundOptions {
      listen: "127.0.0.1".to_string(),
      http_port: 10809,
      socks_port: 10808,
    }
  }
}

pub fn generate_inbounds(opts: &InboundOptions) -> Vec<JsonValue> {
  let sniffing = json!({"enabled": true, "destOverride": ["http", "tls"], "routeOnly": false});
  let settings = json!({"auth": "noauth", "udp": true, "allowTransparent": false});
  vec![
    json!({
      "tag": "socks",
      "port": opts.socks_port,
      "listen": opts.listen,
      "protocol": "socks",
      "sniffing": sniffing,
      "settings": settings,
    }),
    json!({
      "tag": "http",
      "port": opts.http_port,
      "listen": opts.listen,
      "protocol": "http",
      "sniffing": sniffing,
      "settings": settings,
    }),
  ]
}

pub fn standalone_log() -> JsonValue {
  json!({"access": "", "error": "", "loglevel": "warning"})
}

pub fn basic_outbounds() -> Vec<JsonValue> {
  vec![
    json!({"tag": "direct", "protocol": "freedom", "settings": {}}),
    json!({"tag": "block", "protocol": "blackhole", "settings": {"response": {"type": "http"}}}),
  ]
}

pub fn log() -> JsonValue {
  json!({"access": "", "error": "", "loglevel": "none", "dnsLog": false})
}

pub fn dns() -> JsonValue {
  json!({
    "tag": "dns",
    "hosts": {
      "cloudflare-dns.com": [
        "172.67.73.38",
        "104.19.155.92",
        "172.67.73.163",
        "104.18.155.42",
        "104.16.124.175",
        "104.16.248.249",
        "104.16.249.249",
        "104.26.13.8"
      ],
      "domain:youtube.com": ["google.com"]
    },
    "servers": ["https://cloudflare-dns.com/dns-query"]
  })
}

pub fn inbounds() -> Vec<JsonValue> {
  vec![
    json!({
      "domainOverride": ["http", "tls"],
      "protocol": "socks",
      "tag": "socks-in",
      "listen": "127.0.0.1",
      "port": 10808,
      "settings": {"auth": "noauth", "udp": true, "userLevel": 8},
      "sniffing": {"enabled": true, "destOverride": ["http", "tls"]}
    }),
    json!({
      "protocol": "http",
      "tag": "http-in",
      "listen": "127.0.0.1",
      "port": 10809,
      "settings": {"userLevel": 8},
      "sniffing": {"enabled": true, "destOverride": ["http", "tls"]}
    }),
  ]
}

/// Outbounds every document carries after the generated proxies.
pub fn static_outbounds() -> Vec<JsonValue> {
  vec![
    json!({"tag": "direct", "protocol": "freedom"}),
    json!({"tag": "block", "protocol": "blackhole"}),
    json!({
      "tag": "fragment-out",
      "protocol": "freedom",
      "domainStrategy": "UseIP",
      "sniffing": {"enabled": true, "destOverride": ["http", "tls"]},
      "settings": {
        "fragment": {"packets": "tlshello", "length": "10-20", "interval": "10-20"}
      },
      "streamSettings": {
        "sockopt": {
          "tcpNoDelay": true,
          "tcpKeepAliveIdle": 100,
          "mark": 255,
          "domainStrategy": "UseIP"
        }
      }
    }),
    json!({"protocol": "dns", "tag": "dns-out"}),
    json!({
      "protocol": "vless",
      "tag": "fakeproxy-out",
      "domainStrategy": "",
      "settings": {
        "vnext": [{
          "address": "google.com",
          "port": 443,
          "users": [{
            "encryption": "none",
            "flow": "",
            "id": "UUID",
            "level": 8,
            "security": "auto"
          }]
        }]
      },
      "streamSettings": {
        "network": "ws",
        "security": "tls",
        "tlsSettings": {
          "allowInsecure": false,
          "alpn": ["h2", "http/1.1"],
          "fingerprint": "randomized",
          "publicKey": "",
          "serverName": "google.com",
          "shortId": "",
          "show": false,
          "spiderX": ""
        },
        "wsSettings": {"headers": {"Host": "google.com"}, "path": "/"}
      },
      "mux": {"concurrency": 8, "enabled": false}
    }),
  ]
}

pub fn policy() -> JsonValue {
  json!({
    "levels": {
      "8": {"connIdle": 300, "downlinkOnly": 1, "handshake": 4, "uplinkOnly": 1}
    },
    "system": {"statsOutboundUplink": true, "statsOutboundDownlink": true}
  })
}

pub fn ping_config() -> JsonValue {
  json!({
    "connectivity": "http://connectivitycheck.platform.hicloud.com/generate_204",
    "destination": "http://www.google.com/gen_204",
    "interval": "15m",
    "sampling": 10,
    "timeout": "3s"
  })
}

pub fn balancer_strategy() -> JsonValue {
  json!({"type": "leastLoad"})
}

pub fn routing_rules() -> Vec<JsonValue> {
  vec![
    json!({
      "inboundTag": ["socks-in", "http-in"],
      "type": "field",
      "port": "53",
      "outboundTag": "dns-out",
      "enabled": true
    }),
    json!({"type": "field", "outboundTag": "direct", "domain": ["regexp:.+\\.ir$"]}),
    json!({"type": "field", "port": "443", "network": "udp", "outboundTag": "block"}),
    json!({"type": "field", "outboundTag": "direct", "protocol": ["bittorrent"]}),
    json!({"type": "field", "outboundTag": "direct", "ip": ["geoip:private"]}),
    json!({"type": "field", "outboundTag": "direct", "domain": ["geosite:private"]}),
    json!({"type": "field", "outboundTag": "direct", "domain": ["geosite:category-ir"]}),
    json!({"type": "field", "outboundTag": "direct", "ip": ["geoip:ir"]}),
    json!({
      "type": "field",
      "outboundTag": "fragment-out",
      "domain": ["geosite:google", "geosite:facebook", "regexp:.+instagram\\.com$"]
    }),
    json!({
      "balancerTag": BALANCER_TAG,
      "inboundTag": ["socks-in", "http-in"],
      "type": "field"
    }),
  ]
}
