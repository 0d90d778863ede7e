use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, BufReader};

#[derive(ClapArgs, Debug, Clone)]
pub struct InputArgs {
  /// Read subscription text from stdin.
  #[arg(long, default_value_t = false)]
  pub stdin: bool,

  /// Subscription text provided directly as an argument. Prefer --stdin for large inputs.
  #[arg(long)]
  pub text: Option<String>,

  /// Read subscription text from a file.
  #[arg(long, conflicts_with = "text")]
  pub file: Option<PathBuf>,
}

impl InputArgs {
  /// Falls back to stdin when no other source is given.
  pub async fn read(&self) -> Result<String> {
    if let Some(path) = &self.file {
      return tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()));
    }
    if let (false, Some(text)) = (self.stdin, &self.text) {
      return Ok(text.clone());
    }
    let mut buf = String::new();
    let mut stdin = BufReader::new(tokio::io::stdin());
    stdin.read_to_string(&mut buf).await.context("read stdin")?;
    Ok(buf)
  }
}
