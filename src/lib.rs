// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod content;
pub mod detect;
pub mod error;
pub mod feed;
pub mod media;
pub mod upstream;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::detect::SoftwareFamily;
pub use crate::error::FeedError;
pub use crate::feed::{CanonicalItem, FeedMetadata};
pub use crate::upstream::types::{Account, InstanceRef, TimelineSource};
