use clap::Parser;
use pingora_core::server::configuration::Opt;
use pingora_core::server::Server;
use raw2jpg::config::Config;
use raw2jpg::server::{http_service, ServiceState};
use std::path::PathBuf;

/// raw2jpg - camera RAW to JPEG conversion and watermarking service
#[derive(Parser, Debug)]
#[command(name = "raw2jpg")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults apply when it does not exist)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration (file, ${VAR} substitution, PORT override)
    let config = Config::load(&args.config).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::process::exit(1);
    });

    if args.test {
        println!("Configuration OK");
        return;
    }

    // Initialize logging subsystem
    if let Err(e) = raw2jpg::logging::init_subscriber(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    tracing::info!(
        config_file = %args.config.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        threads = config.server.threads,
        max_body_bytes = config.server.max_body_bytes,
        "Configuration loaded successfully"
    );

    let state = ServiceState::from_config(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to initialize service");
        std::process::exit(1);
    });

    // Create Pingora server
    let mut server = Server::new(Some(Opt::default())).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to create Pingora server");
        std::process::exit(1);
    });
    server.bootstrap();

    let service = http_service(&config.server, state);

    tracing::info!(
        address = %config.server.listen_addr(),
        "Starting raw2jpg"
    );

    // Register service with server
    server.add_service(service);

    // Run server forever (blocks until shutdown)
    server.run_forever();
}
