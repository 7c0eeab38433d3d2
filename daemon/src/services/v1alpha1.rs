use super::into_status;
use crate::hook::{DomainHook, HOOK_NAME};
use permhook_core::v1alpha1::callbacks_server::Callbacks;
use permhook_core::v1alpha1::{OnDefineDomainParams, OnDefineDomainResult, VERSION};
use std::sync::Arc;
use tonic::{Request, Response, Status};

pub struct V1alpha1Callbacks {
    hook: Arc<DomainHook>,
}

impl V1alpha1Callbacks {
    pub fn new(hook: Arc<DomainHook>) -> Self {
        Self { hook }
    }
}

#[tonic::async_trait]
impl Callbacks for V1alpha1Callbacks {
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
}
