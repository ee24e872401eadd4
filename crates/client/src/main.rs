//! SellHub - command-line seller console
//!
//! Signs in against the marketplace backend and keeps the session in the
//! platform config directory between runs.

#[cfg(not(target_arch = "wasm32"))]
mod cli;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> std::process::ExitCode {
    sellhub_client::logging::init();
    cli::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
