use anyhow::Result;
use clap::Args as ClapArgs;
use sub2json::{standalone_config, AllowList, InboundOptions};
use tracing::{debug, warn};

use crate::input::InputArgs;

#[derive(ClapArgs, Debug, Clone)]
pub struct Args {
  #[command(flatten)]
  pub input: InputArgs,

  /// Allowed categories, comma separated: vless,vmess,shadowsocks,trojan,wireguard,reality.
  #[arg(long)]
  pub limit: Option<String>,

  /// Listen address of the local socks/http inbounds.
  #[arg(long, default_value = "127.0.0.1")]
  pub listen: String,

  /// Local HTTP inbound port.
  #[arg(long, default_value_t = 10809)]
  pub http_port: u16,

  /// Local SOCKS inbound port.
  #[arg(long, default_value_t = 10808)]
  pub socks_port: u16,
}

pub async fn run(args: Args) -> Result<()> {
  let input = args.input.read().await?;
  let allow = args.limit.as_deref().map(AllowList::parse);
  let inbound = InboundOptions {
    listen: args.listen,
    http_port: args.http_port,
    socks_port: args.socks_port,
  };

  let mut emitted = 0usize;
  for line in input.lines().map(str::trim).filter(|s| !s.is_empty()) {
    match standalone_config(line, allow.as_ref(), &inbound) {
      Ok(cfg) => {
        println!("{}", serde_json::to_string(&cfg)?);
        emitted += 1;
      }
      Err(reason) => debug!("skipping {line}: {reason}"),
    }
  }
  if emitted == 0 {
    warn!("no line produced a config");
  }
  Ok(())
}
