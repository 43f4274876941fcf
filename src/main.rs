use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use mws_http_client::{
    Config, MwsRequest, RequestDispatcher, RequestSigner, ReqwestTransport, SystemClock,
};

/// Sign a request with signature version 2 and POST it to the configured endpoint
#[derive(Parser)]
#[command(about, version)]
struct Args {
    /// TOML configuration file
    #[arg(long, short, default_value = "mws.toml")]
    config: PathBuf,

    /// Print the signed body instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Request parameters as `Name=Value`
    #[arg(required = true, value_parser = parse_pair)]
    params: Vec<(String, String)>,
}

fn parse_pair(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected Name=Value, got {:?}", arg)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mws_http_client=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    dotenv::dotenv().ok();

    let config = Config::load(&args.config)?;
    tracing::info!("Loaded config from {}", args.config.display());

    let context = config.signing_context()?;
    let signer = RequestSigner::new(Arc::new(SystemClock));

    let mut request = MwsRequest::new();
    config.credentials.apply(&mut request);
    request.augment(args.params);
    request.sign(&signer, &context);

    let transport = ReqwestTransport::new(config.http.timeout(), config.http.user_agent.as_deref())?;
    let dispatcher = RequestDispatcher::new(context, Arc::new(transport));

    if args.dry_run {
        let outgoing = dispatcher.prepare(&request)?;
        println!("POST {}", outgoing.url);
        println!("{}", outgoing.body);
        return Ok(());
    }

    let body = dispatcher.send(&request).await?;
    std::io::stdout().write_all(&body)?;
    Ok(())
}
