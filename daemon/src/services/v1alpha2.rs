use super::into_status;
use crate::hook::{DomainHook, HOOK_NAME};
use permhook_core::v1alpha2::callbacks_server::Callbacks;
use permhook_core::v1alpha2::{
    OnDefineDomainParams, OnDefineDomainResult, PreCloudInitIsoParams, PreCloudInitIsoResult,
    VERSION,
};
use std::sync::Arc;
use tonic::{Request, Response, Status};

pub struct V1alpha2Callbacks {
    hook: Arc<DomainHook>,
}

impl V1alpha2Callbacks {
    pub fn new(hook: Arc<DomainHook>) -> Self {
        Self { hook }
    }
}

#[tonic::async_trait]
impl Callbacks for V1alpha2Callbacks {
    async fn on_define_domain(
        &self,
        request: Request<OnDefineDomainParams>,
    ) -> Result<Response<OnDefineDomainResult>, Status> {
        let params = request.into_inner();
        tracing::info!(hook = HOOK_NAME, version = VERSION, "OnDefineDomain called");

        let domain_xml = self
            .hook
            .on_define_domain(&params.vmi, &params.domain_xml)
            .await
            .map_err(into_status)?;

        Ok(Response::new(OnDefineDomainResult { domain_xml }))
    }

    async fn pre_cloud_init_iso(
        &self,
        request: Request<PreCloudInitIsoParams>,
    ) -> Result<Response<PreCloudInitIsoResult>, Status> {
        let params = request.into_inner();

        Ok(Response::new(PreCloudInitIsoResult {
            cloud_init_data: self.hook.pre_cloud_init_iso(params.cloud_init_data),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::tests::{DOMAIN, FailingModeOps, VMI, mode_of, unprivileged_hook, write_image};
    use crate::services::V1alpha1Callbacks;
    use permhook_core::v1alpha1;
    use permhook_core::v1alpha1::callbacks_server::Callbacks as _;
    use permhook_domain::Identity;
    use permhook_enforcer::EnforcerConfig;
    use tempfile::TempDir;

    fn params(vmi: &[u8], domain_xml: &[u8]) -> Request<OnDefineDomainParams> {
        Request::new(OnDefineDomainParams {
            domain_xml: domain_xml.to_vec(),
            vmi: vmi.to_vec(),
        })
    }

    #[tokio::test]
    async fn test_on_define_domain_fixes_images() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("disk0.img");
        let lock = dir.path().join("disk0.img.lock");
        write_image(&image, 0o640);
        write_image(&lock, 0o640);

        let service = V1alpha2Callbacks::new(Arc::new(unprivileged_hook(dir.path())));
        let result = service
            .on_define_domain(params(VMI, DOMAIN))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(result.domain_xml, DOMAIN);
        assert_eq!(mode_of(&image), 0o666);
        assert_eq!(mode_of(&lock), 0o640);
    }

    #[tokio::test]
    async fn test_malformed_domain_keeps_serving() {
        let dir = TempDir::new().unwrap();
        let service = V1alpha2Callbacks::new(Arc::new(unprivileged_hook(dir.path())));

        let status = service
            .on_define_domain(params(VMI, b"<domain><name></domain>"))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let result = service.on_define_domain(params(VMI, DOMAIN)).await.unwrap();
        assert_eq!(result.into_inner().domain_xml, DOMAIN);
    }

    #[tokio::test]
    async fn test_mode_failure_is_internal() {
        let dir = TempDir::new().unwrap();
        write_image(&dir.path().join("disk0.img"), 0o640);

        let hook = DomainHook::with_parts(
            EnforcerConfig {
                root: dir.path().to_path_buf(),
                ..Default::default()
            },
            Arc::new(FailingModeOps),
            Arc::new(Identity),
        );
        let service = V1alpha2Callbacks::new(Arc::new(hook));

        let status = service
            .on_define_domain(params(VMI, DOMAIN))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Internal);
    }

    #[tokio::test]
    async fn test_versions_behave_the_same() {
        let dir = TempDir::new().unwrap();
        write_image(&dir.path().join("disk0.img"), 0o600);
        let hook = Arc::new(unprivileged_hook(dir.path()));

        let v2 = V1alpha2Callbacks::new(hook.clone())
            .on_define_domain(params(VMI, DOMAIN))
            .await
            .unwrap()
            .into_inner();
        let v1 = V1alpha1Callbacks::new(hook)
            .on_define_domain(Request::new(v1alpha1::OnDefineDomainParams {
                domain_xml: DOMAIN.to_vec(),
                vmi: VMI.to_vec(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(v1.domain_xml, v2.domain_xml);
    }

    #[tokio::test]
    async fn test_pre_cloud_init_iso_is_unchanged() {
        let service = V1alpha2Callbacks::new(Arc::new(DomainHook::new(EnforcerConfig::default())));
        let data = br#"{"userData":"I2Nsb3VkLWNvbmZpZw=="}"#.to_vec();

        let result = service
            .pre_cloud_init_iso(Request::new(PreCloudInitIsoParams {
                cloud_init_data: data.clone(),
                vmi: VMI.to_vec(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(result.cloud_init_data, data);
    }
}
