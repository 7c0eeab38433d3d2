use crate::hook::DomainHook;
use crate::services::{InfoService, V1alpha1Callbacks, V1alpha2Callbacks};
use crate::version::HookVersion;
use permhook_core::info::info_server::InfoServer;
use permhook_core::{v1alpha1, v1alpha2};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::net::UnixListener;
use tokio::signal::unix::{SignalKind, signal};
use tokio_stream::wrappers::UnixListenerStream;
use tonic::transport::Server;

pub const SOCKET_NAME: &str = "permission-hook.sock";

/// Binds the hook socket. Fails if the path is taken or its directory is missing.
pub fn bind(path: &Path) -> std::io::Result<UnixListener> {
    UnixListener::bind(path).inspect_err(|e| {
        tracing::error!(
            path = ?path,
            error = %e,
            "failed to initialize socket, check whether the directory exists and the socket name is not already taken"
        );
    })
}

/// Serves the info service and the callbacks server for `version` until
/// `shutdown` resolves.
pub async fn serve(
    listener: UnixListener,
    version: HookVersion,
    hook: Arc<DomainHook>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), tonic::transport::Error> {
    let router = Server::builder().add_service(InfoServer::new(InfoService::new(version)));
    let router = match version {
        HookVersion::V1alpha1 => router.add_service(
            v1alpha1::callbacks_server::CallbacksServer::new(V1alpha1Callbacks::new(hook)),
        ),
        HookVersion::V1alpha2 => router.add_service(
            v1alpha2::callbacks_server::CallbacksServer::new(V1alpha2Callbacks::new(hook)),
        ),
    };

    router
        .serve_with_incoming_shutdown(UnixListenerStream::new(listener), shutdown)
        .await
}

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
