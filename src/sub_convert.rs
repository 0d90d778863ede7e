use anyhow::{anyhow, Result};
use clap::Args as ClapArgs;
use serde_json::json;
use sub2json::{convert_with_report, AllowList};
use tracing::info;

use crate::fetch::{self, FetchOptions};
use crate::input::InputArgs;

#[derive(ClapArgs, Debug, Clone)]
pub struct Args {
  #[command(flatten)]
  pub input: InputArgs,

  /// Allowed categories, comma separated: vless,vmess,shadowsocks,trojan,wireguard,reality.
  #[arg(long)]
  pub limit: Option<String>,

  /// Download lines that are subscription URLs (plain or Base64 link lists).
  #[arg(long, default_value_t = false)]
  pub fetch: bool,

  /// Request timeout per subscription URL (ms).
  #[arg(long, default_value_t = 15_000)]
  pub timeout_ms: u64,

  /// Max concurrent subscription downloads.
  #[arg(long, default_value_t = 4)]
  pub concurrency: usize,

  /// User-Agent header for subscription downloads.
  #[arg(long)]
  pub user_agent: Option<String>,

  /// Pretty-print the document.
  #[arg(long, default_value_t = false)]
  pub pretty: bool,
}

pub async fn run(args: Args) -> Result<()> {
  let raw = args.input.read().await?;
  let text = if args.fetch {
    let opts = FetchOptions {
      timeout_ms: args.timeout_ms,
      concurrency: args.concurrency,
      user_agent: args.user_agent.clone(),
    };
    fetch::assemble(&raw, &opts).await?
  } else {
    raw
  };

  let allow = args.limit.as_deref().map(AllowList::parse);
  let report = convert_with_report(&text, allow.as_ref());
  for s in &report.skipped {
    info!("line {} skipped: {}", s.line, s.reason);
  }

  match report.document {
    Ok(doc) => {
      let out = if args.pretty {
        serde_json::to_string_pretty(&doc)?
      } else {
        serde_json::to_string(&doc)?
      };
      println!("{out}");
      Ok(())
    }
    Err(e) => {
      println!("{}", json!({ "error": e.to_string() }));
      Err(anyhow!(e))
    }
  }
}
