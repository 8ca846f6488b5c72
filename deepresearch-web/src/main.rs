//! Deep Research Web Server

use clap::Parser;
use deepresearch_core::API_KEY_ENV;
use deepresearch_web::server::DeepResearchServerBuilder;
use deepresearch_web::{init_logging, WebConfig};
use std::path::PathBuf;

/// Deep Research Web Server - clarify, rewrite and research over HTTP
#[derive(Parser)]
#[command(name = "deepresearch-web")]
#[command(about = "HTTP interface for the Deep Research workflow")]
#[command(version)]
struct Args {
    /// Server host to bind to (overrides DEEPRESEARCH_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on (overrides DEEPRESEARCH_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Research configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds an idle research session is kept
    #[arg(long)]
    session_ttl: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    let mut config = WebConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.dev_mode |= args.dev;
    if args.config.is_some() {
        config.config_path = args.config;
    }
    if let Some(ttl) = args.session_ttl {
        config.session_ttl_seconds = ttl;
    }

    if let Err(e) = init_logging(&args.log_level, config.dev_mode) {
        eprintln!("⚠️  {}", e);
    }

    println!("🚀 Starting Deep Research Web Server");
    println!("📍 Server: http://{}", config.address());
    println!("🔧 Development mode: {}", config.dev_mode);
    if let Some(path) = &config.config_path {
        println!("📄 Configuration: {}", path.display());
    }

    if std::env::var(API_KEY_ENV).is_err() {
        println!("⚠️  {} is not set; the provider key must come from the configuration file", API_KEY_ENV);
    }

    let server = match DeepResearchServerBuilder::new().config(config).build() {
        Ok(server) => server,
        Err(e) => {
            eprintln!("❌ Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("❌ Server failed: {}", e);
        std::process::exit(1);
    }
}
