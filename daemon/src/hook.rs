//! Version independent callback logic shared by every callbacks server.

use crate::error::HookError;
use crate::vmi::VirtualMachineInstance;
use permhook_domain::{Document, DomainTransform, Identity};
use permhook_enforcer::{DiskPermissionEnforcer, EnforcerConfig, HostOps, MetadataOps};
use std::sync::Arc;

pub const HOOK_NAME: &str = "disk-permission";

pub struct DomainHook {
    config: EnforcerConfig,
    ops: Arc<dyn MetadataOps>,
    transform: Arc<dyn DomainTransform>,
}

impl DomainHook {
    pub fn new(config: EnforcerConfig) -> Self {
        Self::with_parts(config, Arc::new(HostOps), Arc::new(Identity))
    }

    pub fn with_parts(
        config: EnforcerConfig,
        ops: Arc<dyn MetadataOps>,
        transform: Arc<dyn DomainTransform>,
    ) -> Self {
        Self {
            config,
            ops,
            transform,
        }
    }

    /// Repairs the disk images and returns the domain description to use.
    ///
    /// Both payloads must parse before anything on disk is touched. When the
    /// transform leaves the document unchanged the input bytes are returned as
    /// they came in.
    pub async fn on_define_domain(
        &self,
        vmi: &[u8],
        domain_xml: &[u8],
    ) -> Result<Vec<u8>, HookError> {
        let vmi = VirtualMachineInstance::from_slice(vmi)?;
        let mut domain = Document::parse(domain_xml).map_err(HookError::MalformedDomain)?;

        tracing::info!(
            hook = HOOK_NAME,
            vmi = vmi.name(),
            namespace = vmi.namespace(),
            uid = vmi.metadata.uid.as_deref().unwrap_or_default(),
            fields = vmi.rest.len(),
            "defining domain"
        );

        let enforcer = DiskPermissionEnforcer::with_ops(self.config.clone(), Arc::clone(&self.ops));
        let report = tokio::task::spawn_blocking(move || enforcer.enforce()).await??;
        tracing::debug!(hook = HOOK_NAME, ?report, "disk images repaired");

        let original = domain.clone();
        self.transform
            .apply(&mut domain)
            .map_err(HookError::Transform)?;

        if domain == original {
            return Ok(domain_xml.to_vec());
        }
        domain.to_xml().map_err(HookError::Transform)
    }

    pub fn pre_cloud_init_iso(&self, cloud_init_data: Vec<u8>) -> Vec<u8> {
        tracing::debug!(
            hook = HOOK_NAME,
            size = cloud_init_data.len(),
            "passing cloud-init data through"
        );
        cloud_init_data
    }
}
