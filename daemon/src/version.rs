use clap::ValueEnum;
use permhook_core::{v1alpha1, v1alpha2};
use std::fmt;

/// Hook API version served on the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HookVersion {
    #[value(name = "v1alpha1")]
    V1alpha1,
    #[value(name = "v1alpha2")]
    V1alpha2,
}

impl HookVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookVersion::V1alpha1 => v1alpha1::VERSION,
            HookVersion::V1alpha2 => v1alpha2::VERSION,
        }
    }

    /// v1alpha1 has no PreCloudInitIso callback.
    pub fn supports_pre_cloud_init(&self) -> bool {
        matches!(self, HookVersion::V1alpha2)
    }
}

impl fmt::Display for HookVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
