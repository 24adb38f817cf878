use std::env;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        if let Err(e) = networth::api::run_http_server(port).await {
            tracing::error!(error = %e, "server stopped");
            eprintln!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    match networth::api::run_cli(raw_args) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
