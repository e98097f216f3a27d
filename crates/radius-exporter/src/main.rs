use clap::Parser;
use radius_exporter::{AppState, Cli, Collector, Config, StatusClient, http};
use std::process;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            if cli.validate {
                eprintln!("❌ Configuration validation failed!");
                eprintln!("   Error: {}", e);
            } else {
                eprintln!("Error loading configuration: {}", e);
            }
            process::exit(1);
        }
    };

    let prepared = config.listen_addr().and_then(|addr| {
        Ok((addr, config.client_config()?, config.access_policy()?))
    });
    let (listen_addr, client_config, policy) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    if cli.validate {
        println!("✓ Configuration validated successfully!");
        println!();
        println!("Configuration summary:");
        println!("  Listen: {}", listen_addr);
        println!("  Telemetry path: {}", config.telemetry_path);
        println!("  Status server: {}", client_config.server);
        println!("  Timeout: {} ms", config.radius_timeout);
        println!("  Retry interval: {} ms", config.radius_retry_interval);
        println!("  Log level: {}", config.log_level);
        println!(
            "  Access control: {}",
            if policy.is_open() { "none" } else { "enabled" }
        );
        println!();

        if !client_config.home_servers.is_empty() {
            println!("Home servers:");
            for target in &client_config.home_servers {
                println!("  ✓ {} (statistics {})", target, target.statistics);
            }
        }

        process::exit(0);
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("FreeRADIUS Exporter v{}", env!("CARGO_PKG_VERSION"));
    info!(
        server = %client_config.server,
        home_servers = client_config.home_servers.len(),
        timeout_ms = config.radius_timeout,
        "Status server configured"
    );
    if policy.is_open() {
        warn!("No auth token or allowed IPs configured, metrics are open to everyone");
    }

    let client = match StatusClient::new(client_config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build status requests");
            process::exit(1);
        }
    };

    let collector = Collector::new(client);
    info!(families = collector.describe().len(), "Metric families registered");

    let state = AppState::new(collector, policy, config.telemetry_path.clone());
    if let Err(e) = http::serve(listen_addr, state).await {
        error!(error = %e, "Server error");
        process::exit(1);
    }
}
