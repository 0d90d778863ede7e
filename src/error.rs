use thiserror::Error;

use crate::outbound::Category;

/// Why a single subscription line produced no outbound.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
  #[error("not a valid proxy uri")]
  InvalidUri,

  #[error("unsupported scheme: {0}")]
  UnsupportedScheme(String),

  #[error("vmess payload is not base64-encoded json")]
  VmessPayload,

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("invalid shadowsocks uri")]
  InvalidShadowsocks,

  #[error("port missing or out of range")]
  InvalidPort,

  #[error("unsupported transport {network:?} with security {security:?}")]
  UnsupportedTransport { network: String, security: String },

  #[error("excluded by allow-list: {0}")]
  Filtered(Category),
}

/// Failure of a whole conversion batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
  #[error("No valid proxies found")]
  NoValidProxies,
}
