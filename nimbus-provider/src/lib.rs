//! Declarative resource provider for the Nimbus cloud.
//!
//! Resource definitions are flat attribute maps. Each handler validates the
//! definition against its schema, issues the API calls through `nimbus-sdk`,
//! waits for the resource lifecycle to settle, and flattens the response
//! back into the attribute map. The classic/VPC platform split is resolved
//! once at provider construction.

pub mod data;
pub mod error;
pub mod filter;
pub mod provider;
pub mod resource;
pub mod retry;
pub mod schema;
pub mod waiter;

pub use data::ResourceData;
pub use error::{ProviderError, Result};
pub use provider::{Provider, Settings};
