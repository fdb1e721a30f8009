use async_trait::async_trait;

use crate::detect::SoftwareFamily;
use crate::error::FeedError;
use crate::feed::CanonicalItem;

/// One request's upstream coordinates. Constructed once, never mutated.
#[derive(Debug, Clone)]
pub struct InstanceRef {
    pub host: String,
    pub credential: String,
    pub family: SoftwareFamily,
}

impl InstanceRef {
    pub fn new(
        host: impl Into<String>,
        credential: impl Into<String>,
        family: SoftwareFamily,
    ) -> Self {
        Self {
            host: host.into(),
            credential: credential.into(),
            family,
        }
    }
}

/// The authenticated account a timeline belongs to.
#[derive(Debug, Clone)]
pub struct Account {
    /// Fully qualified handle (`user@host`), or the bare instance host when
    /// identity lookup was absorbed.
    pub handle: String,
    pub instance_host: String,
}

/// Qualify a bare local handle with its instance host.
pub fn qualify_handle(handle: &str, host: &str) -> String {
    if handle.contains('@') {
        handle.to_owned()
    } else {
        format!("{handle}@{host}")
    }
}

/// Common capability of the two family adapters.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// Resolve whose timeline this is.
    async fn fetch_account(&self, instance: &InstanceRef) -> Result<Account, FeedError>;

    /// Retrieve the first page of the home timeline, normalized.
    async fn fetch_timeline(&self, instance: &InstanceRef)
        -> Result<Vec<CanonicalItem>, FeedError>;

    fn name(&self) -> &'static str;
}
