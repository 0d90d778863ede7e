//! Converts proxy share-links (vless, vmess, trojan, ss, wireguard) into a
//! single load-balanced client configuration document.

pub mod b64;
pub mod convert;
pub mod decode;
pub mod error;
pub mod outbound;
pub mod params;
pub mod settings;
pub mod stream;
pub mod template;
pub mod uri;

pub use convert::{convert, convert_with_report, ConfigDocument, ConvertReport, Skipped};
pub use error::{ConvertError, SkipReason};
pub use outbound::{convert_line, standalone_config, AllowList, Category, Outbound};
pub use template::InboundOptions;
