//! Remote directory operation boundary.
//!
//! One remote command per entity/action pair, invoked through an opaque
//! gateway that owns the wire protocol. The connector builds the parameter
//! map, the gateway returns records (possibly none) or a remote error.

use async_trait::async_trait;

use crate::record::Record;
use crate::session::SessionHandle;
use crate::types::{EntityClass, OperationKind};

/// Name of the remote identity parameter the key field maps onto.
pub const IDENTITY_PARAMETER: &str = "Identity";

/// Name of the non-interactive confirmation flag. Deletions and removals
/// always pass it as `false` so the remote layer never prompts.
pub const CONFIRM_PARAMETER: &str = "Confirm";

/// A remote directory command, one per entity/action pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemoteCommand(&'static str);

impl RemoteCommand {
    /// The command name on the wire.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0
    }

    /// The command for an entity/action pair, or `None` when the class does
    /// not support the operation.
    #[must_use]
    pub fn for_operation(class: EntityClass, op: OperationKind) -> Option<Self> {
        use EntityClass as C;
        use OperationKind as O;
        let name = match (class, op) {
            (C::Mailbox, O::Read) => "Get-Mailbox",
            (C::Mailbox, O::Create) => "New-Mailbox",
            (C::Mailbox, O::Update) => "Set-Mailbox",
            (C::Mailbox, O::Delete) => "Remove-Mailbox",
            (C::Mailbox, O::Enable) => "Enable-Mailbox",
            (C::Mailbox, O::Disable) => "Disable-Mailbox",

            (C::DistributionGroup, O::Read) => "Get-DistributionGroup",
            (C::DistributionGroup, O::Create) => "New-DistributionGroup",
            (C::DistributionGroup, O::Update) => "Set-DistributionGroup",
            (C::DistributionGroup, O::Delete) => "Remove-DistributionGroup",

            (C::DistributionGroupMember, O::Read) => "Get-DistributionGroupMember",
            (C::DistributionGroupMember, O::Add) => "Add-DistributionGroupMember",
            (C::DistributionGroupMember, O::Remove) => "Remove-DistributionGroupMember",

            (C::MailboxPermission, O::Read) => "Get-MailboxPermission",
            (C::MailboxPermission, O::Add) => "Add-MailboxPermission",
            (C::MailboxPermission, O::Remove) => "Remove-MailboxPermission",

            (C::MailboxAutoReply, O::Read) => "Get-MailboxAutoReplyConfiguration",
            (C::MailboxAutoReply, O::Update) => "Set-MailboxAutoReplyConfiguration",

            _ => return None,
        };
        Some(Self(name))
    }
}

impl std::fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error reported by the remote directory for a failed command.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Gateway executing remote directory commands over an open session.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Invoke `command` with `params` over `session`.
    ///
    /// Returns the result records; commands with no output (membership
    /// add/remove) return an empty list.
    async fn invoke(
        &self,
        session: &SessionHandle,
        command: RemoteCommand,
        params: Record,
    ) -> Result<Vec<Record>, RemoteError>;
}

// Shared gateways delegate, matching the session-provider boundary.
#[async_trait]
impl<T: RemoteGateway + ?Sized> RemoteGateway for std::sync::Arc<T> {
    async fn invoke(
        &self,
        session: &SessionHandle,
        command: RemoteCommand,
        params: Record,
    ) -> Result<Vec<Record>, RemoteError> {
        self.as_ref().invoke(session, command, params).await
    }
}
