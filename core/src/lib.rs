//! Wire types for the hook sidecar protocol.
//!
//! The package names are part of the gRPC method paths the orchestrator dials,
//! so they must not change.

pub mod info {
    tonic::include_proto!("kubevirt.hooks.info");

    pub const ON_DEFINE_DOMAIN_HOOK_POINT: &str = "OnDefineDomain";
    pub const PRE_CLOUD_INIT_ISO_HOOK_POINT: &str = "PreCloudInitIso";
}

pub mod v1alpha1 {
    tonic::include_proto!("kubevirt.hooks.v1alpha1");

    pub const VERSION: &str = "v1alpha1";
}

pub mod v1alpha2 {
    tonic::include_proto!("kubevirt.hooks.v1alpha2");

    pub const VERSION: &str = "v1alpha2";
}

/// Directory the orchestrator scans for hook sockets.
pub const HOOK_SOCKETS_SHARED_DIRECTORY: &str = "/var/run/kubevirt-hooks";
