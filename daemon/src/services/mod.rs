mod info;
mod v1alpha1;
mod v1alpha2;

pub use info::InfoService;
pub use v1alpha1::V1alpha1Callbacks;
pub use v1alpha2::V1alpha2Callbacks;

use crate::error::HookError;
use tonic::Status;

fn into_status(err: HookError) -> Status {
    tracing::error!(hook = crate::hook::HOOK_NAME, error = %err, "callback failed");
    Status::from(err)
}
