extern crate getopts;

use std::{process, sync::Arc};

use axum::{extract::Request, ServiceExt};
use getopts::Options;
use tracing_subscriber::EnvFilter;

use mutable::web::config::Config;
use mutable::web::server::{make_app, AppState};

const PKG_NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

#[tokio::main]
async fn main() {
    println!("{} v{}", PKG_NAME, VERSION);

    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options::new();

    opts.optflag("h", "help", "print this help message");
    opts.optopt("c", "config-file", "Configuration file name", "CONFIG");
    opts.optopt("b", "bind-address-and-port", "The address:port to bind to", "BIND_ADDRESS_AND_PORT");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("Invalid options\n{}", f);
            process::exit(1);
        }
    };

    let program = args[0].clone();

    if matches.opt_present("help") {
        print_usage(&program, opts);
        process::exit(0);
    }

    let Some(config_file_name) = matches.opt_str("config-file")
    else {
        println!("no -c|--config-file option");
        print_usage(&program, opts);
        process::exit(1);
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("mutable=info,tower_http=warn"))
                .unwrap(),
        )
        .init();

    let config = match Config::read(&config_file_name) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{:#}", err);
            process::exit(1);
        }
    };

    let bind_address_and_port = matches.opt_str("bind-address-and-port")
        .unwrap_or_else(|| config.bind_address.clone());

    let listener = match tokio::net::TcpListener::bind(&bind_address_and_port).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("failed to bind to {}: {}", bind_address_and_port, err);
            process::exit(1);
        }
    };

    tracing::info!("listening on {}", bind_address_and_port);

    let app = make_app(AppState {
        config: Arc::new(config),
    });

    if let Err(err) = axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await {
        eprintln!("server failed: {}", err);
        process::exit(1);
    }
}
