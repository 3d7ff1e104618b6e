//! Quiz server example
//!
//! Run with: cargo run --example quiz_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example quiz_server                    # binds to 0.0.0.0:3001
//!   cargo run --example quiz_server localhost          # binds to 127.0.0.1:3001
//!   cargo run --example quiz_server 127.0.0.1:3002     # binds to 127.0.0.1:3002
//!
//! Clients speak JSON frames of the form {"event": <name>, "data": {...}}
//! over a WebSocket connection. A host sends `initializeQuiz`, `startQuiz`,
//! and `nextQuestion`; participants send `joinQuiz` and `submitAnswer`.

use std::net::SocketAddr;

use quizsync::{QuizServer, ServerConfig};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:3001
/// - "localhost:3002" -> 127.0.0.1:3002
/// - "127.0.0.1" -> 127.0.0.1:3001
/// - "0.0.0.0:3001" -> 0.0.0.0:3001
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 3001;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: quiz_server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:3001)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => SocketAddr::from(([0, 0, 0, 0], 3001)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizsync=debug".parse()?)
                .add_directive("quiz_server=debug".parse()?),
        )
        .init();

    let config = ServerConfig {
        bind_addr,
        ..ServerConfig::default()
    };

    println!("Starting quiz server on {}", config.bind_addr);
    println!();
    println!("Connect a WebSocket client and send, for example:");
    println!(r#"  {{"event":"joinQuiz","data":{{"roomCode":"12345678","username":"alice"}}}}"#);
    println!();

    let server = QuizServer::new(config);

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutting down...");
        })
        .await?;

    Ok(())
}
