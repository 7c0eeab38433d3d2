use crate::version::HookVersion;
use permhook_core::info::info_server::Info;
use permhook_core::info::{
    HookPoint, InfoParams, InfoResult, ON_DEFINE_DOMAIN_HOOK_POINT, PRE_CLOUD_INIT_ISO_HOOK_POINT,
};
use tonic::{Request, Response, Status};

const NAME: &str = "permission-hook";
const PRIORITY: i32 = 1;

pub struct InfoService {
    version: HookVersion,
}

impl InfoService {
    pub fn new(version: HookVersion) -> Self {
        Self { version }
    }

    fn hook_points(&self) -> Vec<HookPoint> {
        let mut names = vec![ON_DEFINE_DOMAIN_HOOK_POINT];
        if self.version.supports_pre_cloud_init() {
            names.push(PRE_CLOUD_INIT_ISO_HOOK_POINT);
        }
        names
            .into_iter()
            .map(|name| HookPoint {
                name: name.to_string(),
                priority: PRIORITY,
            })
            .collect()
    }
}

#[tonic::async_trait]
impl Info for InfoService {
    async fn info(&self, request: Request<InfoParams>) -> Result<Response<InfoResult>, Status> {
        let params = request.into_inner();
        tracing::info!(
            supported_versions = ?params.supported_versions,
            "permission info method has been called"
        );

        Ok(Response::new(InfoResult {
            name: NAME.to_string(),
            versions: vec![self.version.to_string()],
            hook_points: self.hook_points(),
        }))
    }
}
