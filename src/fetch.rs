use anyhow::{Context, Result};
use base64::Engine;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use sub2json::b64::{is_base64, LENIENT};
use sub2json::uri::is_valid_uri;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct FetchOptions {
  pub timeout_ms: u64,
  pub concurrency: usize,
  pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
  /// A share-link, passed through untouched.
  Link(String),
  /// A subscription URL to download.
  Remote(String),
}

/// Splits subscription input on any line ending and classifies each line.
pub fn split_sources(sub: &str) -> Vec<Source> {
  let mut out = Vec::new();
  for line in sub.split(['\r', '\n']).map(str::trim).filter(|s| !s.is_empty()) {
    if is_valid_uri(line, true, None) {
      out.push(Source::Link(line.to_string()));
    } else if is_valid_uri(line, false, None) {
      out.push(Source::Remote(line.to_string()));
    } else {
      info!("Skipping invalid line: {line}");
    }
  }
  out
}

/// Subscription bodies are either a plain link list or one Base64 blob.
pub fn decode_body(body: &str) -> String {
  let cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
  if is_base64(&cleaned) {
    if let Ok(bytes) = LENIENT.decode(&cleaned) {
      return String::from_utf8_lossy(&bytes).into_owned();
    }
  }
  body.to_string()
}

fn build_client(opts: &FetchOptions) -> Result<Client> {
  let mut builder = Client::builder()
    .redirect(reqwest::redirect::Policy::limited(10))
    .timeout(Duration::from_millis(opts.timeout_ms.max(1)));
  if let Some(ua) = &opts.user_agent {
    builder = builder.user_agent(ua.clone());
  }
  builder.build().context("build http client")
}

async fn fetch_one(client: Client, url: String) -> Option<String> {
  let resp = match client.get(&url).send().await {
    Ok(r) => r,
    Err(e) => {
      warn!("Fetch failed for {url}: {e}");
      return None;
    }
  };
  let status = resp.status();
  if !status.is_success() {
    warn!("Fetch failed for {url}: {}", status.as_u16());
    return None;
  }
  match resp.text().await {
    Ok(body) => {
      debug!("fetched {} bytes from {url}", body.len());
      Some(decode_body(&body))
    }
    Err(e) => {
      warn!("Reading body failed for {url}: {e}");
      None
    }
  }
}

/// Resolves every line of `sub` into share-links: links are kept, URLs are
/// downloaded. A failed source is skipped, never fatal. Output keeps input
/// order.
pub async fn assemble(sub: &str, opts: &FetchOptions) -> Result<String> {
  let sources = split_sources(sub);
  if !sources.iter().any(|s| matches!(s, Source::Remote(_))) {
    return Ok(join_sources(sources.into_iter().map(|s| match s {
      Source::Link(l) | Source::Remote(l) => Some(l),
    })));
  }

  let client = build_client(opts)?;
  let sem = Arc::new(Semaphore::new(std::cmp::max(1, opts.concurrency)));
  let mut handles = Vec::with_capacity(sources.len());
  for source in sources {
    match source {
      Source::Link(link) => handles.push(tokio::spawn(async move { Some(link) })),
      Source::Remote(url) => {
        let sem = sem.clone();
        let client = client.clone();
        handles.push(tokio::spawn(async move {
          let _permit = sem.acquire_owned().await.ok()?;
          fetch_one(client, url).await
        }));
      }
    }
  }

  let mut parts = Vec::with_capacity(handles.len());
  for h in handles {
    match h.await {
      Ok(part) => parts.push(part),
      Err(e) => warn!("fetch task failed: {e}"),
    }
  }
  Ok(join_sources(parts))
}

fn join_sources(parts: impl IntoIterator<Item = Option<String>>) -> String {
  parts
    .into_iter()
    .flatten()
    .map(|p| p.trim_end().to_string())
    .filter(|p| !p.is_empty())
    .collect::<Vec<_>>()
    .join("\n")
}
