mod error;
mod hook;
mod server;
mod services;
mod version;
mod vmi;

use clap::Parser;
use hook::DomainHook;
use permhook_core::HOOK_SOCKETS_SHARED_DIRECTORY;
use permhook_enforcer::EnforcerConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use version::HookVersion;

#[derive(Parser)]
#[command(name = "permhook-daemon")]
#[command(about = "Disk permission hook sidecar")]
struct Cli {
    /// Hook API version to serve
    #[arg(long = "version", value_enum, default_value_t = HookVersion::V1alpha2)]
    hook_version: HookVersion,

    /// Directory the hook socket is created in
    #[arg(long, default_value = HOOK_SOCKETS_SHARED_DIRECTORY)]
    socket_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("starting permission-hook-sidecar");

    let socket_path = cli.socket_dir.join(server::SOCKET_NAME);
    let listener = server::bind(&socket_path)?;

    let hook = Arc::new(DomainHook::new(EnforcerConfig::default()));

    tracing::info!(
        "Starting hook server exposing 'info' and '{}' services on socket {:?}",
        cli.hook_version,
        socket_path
    );

    let result = server::serve(listener, cli.hook_version, hook, server::shutdown_signal()).await;

    if let Err(e) = std::fs::remove_file(&socket_path) {
        tracing::warn!(path = ?socket_path, error = %e, "failed to remove hook socket");
    }

    result?;
    Ok(())
}
