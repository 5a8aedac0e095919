use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod proxy;
mod routing;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg).map_err(|e| e as Box<dyn std::error::Error>)?;

    // Multi-threaded runtime; worker count defaults to the number of CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let upstream = Arc::new(proxy::HttpsUpstream::new());
    let state = Arc::new(config::AppState::new(cfg, upstream));

    logger::log_server_start(&addr, &state.config);

    server::run_server(listener, state, server::shutdown_signal()).await;
    Ok(())
}
