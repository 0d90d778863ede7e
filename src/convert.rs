//! Assembles the load-balanced client document from a subscription blob.

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::error::{ConvertError, SkipReason};
use crate::outbound::{convert_line, AllowList, Outbound, OutboundEntry};
use crate::template;

#[allow(non_snake_case)]
#[derive(Debug, Clone, Serialize)]
pub struct BurstObservatory {
  pub pingConfig: JsonValue,
  pub subjectSelector: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Balancer {
  pub selector: Vec<String>,
  pub strategy: JsonValue,
  pub tag: String,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, Serialize)]
pub struct Routing {
  pub balancers: Vec<Balancer>,
  pub domainMatcher: String,
  pub domainStrategy: String,
  pub rules: Vec<JsonValue>,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, Serialize)]
pub struct ConfigDocument {
  pub remarks: String,
  pub log: JsonValue,
  pub dns: JsonValue,
  pub inbounds: Vec<JsonValue>,
  pub outbounds: Vec<OutboundEntry>,
  pub policy: JsonValue,
  pub burstObservatory: BurstObservatory,
  pub routing: Routing,
}

impl ConfigDocument {
  /// Template plus `proxies` in front of the static outbounds. Both selector
  /// lists are derived from the same tags, so they cannot drift apart.
  fn assemble(proxies: Vec<Outbound>) -> ConfigDocument {
    let tags: Vec<String> = proxies.iter().map(|o| o.tag.clone()).collect();
    let mut outbounds: Vec<OutboundEntry> = proxies.into_iter().map(OutboundEntry::Proxy).collect();
    outbounds.extend(template::static_outbounds().into_iter().map(OutboundEntry::Fixed));

    ConfigDocument {
      remarks: template::REMARKS.to_string(),
      log: template::log(),
      dns: template::dns(),
      inbounds: template::inbounds(),
      outbounds,
      policy: template::policy(),
      burstObservatory: BurstObservatory {
        pingConfig: template::ping_config(),
        subjectSelector: tags.clone(),
      },
      routing: Routing {
        balancers: vec![Balancer {
          selector: tags,
          strategy: template::balancer_strategy(),
          tag: template::BALANCER_TAG.to_string(),
        }],
        domainMatcher: "hybrid".to_string(),
        domainStrategy: "IPIfNonMatch".to_string(),
        rules: template::routing_rules(),
      },
    }
  }

  /// Generated proxy outbounds in tag order.
  pub fn proxies(&self) -> impl Iterator<Item = &Outbound> {
    self.outbounds.iter().filter_map(|o| match o {
      OutboundEntry::Proxy(p) => Some(p),
      OutboundEntry::Fixed(_) => None,
    })
  }
}

/// A line that produced no outbound. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
  pub line: usize,
  pub reason: SkipReason,
}

#[derive(Debug)]
pub struct ConvertReport {
  pub document: Result<ConfigDocument, ConvertError>,
  pub skipped: Vec<Skipped>,
}

/// Like [`convert`], but also reports why each non-blank line was skipped.
pub fn convert_with_report(text: &str, allow: Option<&AllowList>) -> ConvertReport {
  let (proxies, skipped) = text
    .lines()
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .fold(
      (Vec::<Outbound>::new(), Vec::<Skipped>::new()),
      |(mut proxies, mut skipped), (idx, line)| {
        match convert_line(line, allow) {
          Ok(mut outbound) => {
            outbound.tag = format!("proxy-{}", proxies.len() + 1);
            proxies.push(outbound);
          }
          Err(reason) => {
            debug!("skipping line {}: {reason}", idx + 1);
            skipped.push(Skipped {
              line: idx + 1,
              reason,
            });
          }
        }
        (proxies, skipped)
      },
    );

  info!("converted {} proxies, skipped {} lines", proxies.len(), skipped.len());
  let document = if proxies.is_empty() {
    Err(ConvertError::NoValidProxies)
  } else {
    Ok(ConfigDocument::assemble(proxies))
  };
  ConvertReport { document, skipped }
}

/// Converts a newline-separated list of share-links into one document.
/// Fails only when no line yields a proxy.
pub fn convert(text: &str, allow: Option<&AllowList>) -> Result<ConfigDocument, ConvertError> {
  convert_with_report(text, allow).document
}
