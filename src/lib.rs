//! # Exchange Directory Connector
//!
//! Exposes Exchange mailbox and distribution-group objects as a uniform set
//! of CRUD operations to an identity-management orchestrator. The
//! orchestrator never talks to the directory itself: it first asks an
//! operation for its metadata (field picklists and parameter contracts
//! derived from the schema registry), then executes it with serialized
//! parameters.
//!
//! ## Architecture
//!
//! - [`registry`] - static per-class property tables with capability tags
//! - [`resolver`] - derives picklists and mandatory/optional/prohibited
//!   parameter contracts from the registry
//! - [`session`] - at-most-one remote session, fingerprinted by connection
//!   parameters, reopened on change or detected brokenness
//! - [`cache`] - memoized bulk listings reused by dependent reads
//! - [`dispatcher`] - the per-operation pipeline: parse, validate, ensure
//!   session, consult cache, invoke remote, shape result
//!
//! The remote wire protocol and authentication mechanics live behind the
//! [`session::RemoteSessionProvider`] and [`remote::RemoteGateway`] traits.
//!
//! ## Example
//!
//! ```ignore
//! use exchange_connector::prelude::*;
//!
//! let ctx = ConnectorContext::new(provider, gateway)?;
//!
//! // Discover what the update operation accepts.
//! let meta = ctx.metadata(EntityClass::Mailbox, OperationKind::Update)?;
//!
//! // Execute it.
//! let records = ctx
//!     .execute(
//!         EntityClass::Mailbox,
//!         OperationKind::Update,
//!         &system_params,
//!         &serde_json::json!({ "Alias": "jdoe", "DisplayName": "John Doe" }),
//!     )
//!     .await?;
//! ```

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod record;
pub mod registry;
pub mod remote;
pub mod resolver;
pub mod session;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```
/// use exchange_connector::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cache::EntityCache;
    pub use crate::config::{AuthMethod, ExchangeConfig};
    pub use crate::dispatcher::{ConnectorContext, Metadata};
    pub use crate::error::{ConnectorError, ConnectorResult};
    pub use crate::record::{FieldValue, Record};
    pub use crate::registry::{EntityClassSchema, PropertyDescriptor, SchemaRegistry};
    pub use crate::remote::{RemoteCommand, RemoteError, RemoteGateway};
    pub use crate::resolver::{Allowance, FieldPicklist, OperationContract};
    pub use crate::session::{
        ConnectionFingerprint, RemoteSessionProvider, SessionHandle, SessionManager,
    };
    pub use crate::types::{
        CachedEntityType, Capability, CapabilitySet, EntityClass, OperationKind,
    };
}

// Re-export async_trait for provider and gateway implementors.
pub use async_trait::async_trait;
