use clap::Parser;
use tracing_subscriber::EnvFilter;

use twisterlang::config::DaemonConfig;
use twisterlang::daemon;
use twisterlang::error::Result;

#[derive(Parser, Debug)]
#[command(name = "twisterlangd")]
#[command(about = "TwisterLang envelope daemon")]
struct Cli {
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    #[arg(long, env = "TWISTERLANG_TOKEN")]
    token: Option<String>,

    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,twisterlang=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let file = match &cli.config {
        Some(path) => DaemonConfig::from_file(path)?,
        None => DaemonConfig::default(),
    };

    let host = cli
        .host
        .or(file.host)
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = cli.port.or(file.port).unwrap_or(7878);
    let token = cli.token.or(file.token).unwrap_or_default();

    daemon::run(&host, port, &token).await
}
