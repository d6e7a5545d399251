use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use maintrack::config::Config;

fn parse_port_arg(args: &[String], flag: &str) -> Option<u16> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return args[i + 1].parse::<u16>().ok();
        }
        i += 1;
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let mut config = Config::from_env();

    // CLI flag overrides the environment
    let args: Vec<String> = std::env::args().collect();
    if let Some(port) = parse_port_arg(&args, "--http-port") {
        config.http_port = port;
    }

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "maintrack",
        "maintrack starting: RUST_LOG='{}', http_port={}",
        rust_log, config.http_port
    );

    maintrack::server::run(config).await
}
