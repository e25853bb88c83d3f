//! Core enums: entity classes, capability tags, and operation kinds.
//!
//! Everything here is a closed enumeration so the resolver and dispatcher
//! can match exhaustively instead of comparing ad hoc strings.

use serde::{Deserialize, Serialize};

/// A category of directory object exposed by the connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    /// A user mailbox.
    Mailbox,
    /// A mail-enabled distribution group.
    DistributionGroup,
    /// A membership record of a distribution group.
    DistributionGroupMember,
    /// An access-rights record on a mailbox.
    MailboxPermission,
    /// The auto-reply (out-of-office) configuration of a mailbox.
    MailboxAutoReply,
}

impl EntityClass {
    /// All entity classes, in schema-table order.
    pub const ALL: [EntityClass; 5] = [
        EntityClass::Mailbox,
        EntityClass::DistributionGroup,
        EntityClass::DistributionGroupMember,
        EntityClass::MailboxPermission,
        EntityClass::MailboxAutoReply,
    ];

    /// Canonical class name as used in metadata and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityClass::Mailbox => "Mailbox",
            EntityClass::DistributionGroup => "DistributionGroup",
            EntityClass::DistributionGroupMember => "DistributionGroupMember",
            EntityClass::MailboxPermission => "MailboxPermission",
            EntityClass::MailboxAutoReply => "MailboxAutoReply",
        }
    }
}

impl std::fmt::Display for EntityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Marker on a field indicating which operations may read or write it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Returned by default when the caller requests no explicit field list.
    Default,
    /// Visible to the IDM orchestrator at all.
    Idm,
    /// The single identifying field of the class.
    Key,
    /// Writable through the update operation.
    Set,
    /// Writable through the create operation.
    Create,
    /// Accepted by the enable operation.
    Enable,
    /// Accepted by the disable operation.
    Disable,
    /// Accepted by the add operation (membership/permission grant).
    Add,
    /// Accepted by the remove operation (membership/permission revoke).
    Remove,
}

impl Capability {
    /// All capabilities, in declaration order. Order is load-bearing for
    /// [`CapabilitySet::iter`] and the picklist summary text.
    pub const ALL: [Capability; 9] = [
        Capability::Default,
        Capability::Idm,
        Capability::Key,
        Capability::Set,
        Capability::Create,
        Capability::Enable,
        Capability::Disable,
        Capability::Add,
        Capability::Remove,
    ];

    fn bit(self) -> u16 {
        match self {
            Capability::Default => 1 << 0,
            Capability::Idm => 1 << 1,
            Capability::Key => 1 << 2,
            Capability::Set => 1 << 3,
            Capability::Create => 1 << 4,
            Capability::Enable => 1 << 5,
            Capability::Disable => 1 << 6,
            Capability::Add => 1 << 7,
            Capability::Remove => 1 << 8,
        }
    }

    /// Human-readable label used in picklist capability summaries.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Capability::Default => "Default",
            Capability::Idm => "Idm",
            Capability::Key => "Key",
            Capability::Set => "Set",
            Capability::Create => "Create",
            Capability::Enable => "Enable",
            Capability::Disable => "Disable",
            Capability::Add => "Add",
            Capability::Remove => "Remove",
        }
    }
}

/// A set of [`Capability`] tags, stored as a bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build a set from a slice of capabilities.
    #[must_use]
    pub fn of(caps: &[Capability]) -> Self {
        let mut set = Self::empty();
        for cap in caps {
            set.insert(*cap);
        }
        set
    }

    /// Add a capability.
    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    /// Check membership.
    #[must_use]
    pub fn contains(&self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    /// Whether no capability is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate the contained capabilities in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.contains(*c))
    }

    /// Summary text for UI/discovery, e.g. `"Default | Key"`.
    #[must_use]
    pub fn summary(&self) -> String {
        self.iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// The kind of operation the orchestrator invokes on an entity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Read,
    Create,
    Update,
    Delete,
    Enable,
    Disable,
    Add,
    Remove,
}

impl OperationKind {
    /// Canonical operation name for logs and error context.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Read => "read",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Enable => "enable",
            OperationKind::Disable => "disable",
            OperationKind::Add => "add",
            OperationKind::Remove => "remove",
        }
    }

    /// The CRUD semantics bucket this operation falls into.
    #[must_use]
    pub fn semantics(&self) -> OperationSemantics {
        match self {
            OperationKind::Read => OperationSemantics::Read,
            OperationKind::Create | OperationKind::Add => OperationSemantics::Create,
            OperationKind::Update | OperationKind::Enable | OperationKind::Disable => {
                OperationSemantics::Update
            }
            OperationKind::Delete | OperationKind::Remove => OperationSemantics::Delete,
        }
    }

    /// The capability a field must carry to be accepted by this operation.
    /// `None` for read (which uses the picklist path instead of a contract)
    /// and for delete (which takes only the key).
    #[must_use]
    pub fn relevant_capability(&self) -> Option<Capability> {
        match self {
            OperationKind::Read | OperationKind::Delete => None,
            OperationKind::Create => Some(Capability::Create),
            OperationKind::Update => Some(Capability::Set),
            OperationKind::Enable => Some(Capability::Enable),
            OperationKind::Disable => Some(Capability::Disable),
            OperationKind::Add => Some(Capability::Add),
            OperationKind::Remove => Some(Capability::Remove),
        }
    }

    /// Whether the remote call must carry the non-interactive confirmation
    /// flag. Deletions and removals run unattended; prompts would hang them.
    #[must_use]
    pub fn suppresses_prompts(&self) -> bool {
        matches!(
            self.semantics(),
            OperationSemantics::Delete
        )
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CRUD semantics bucket of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationSemantics {
    Create,
    Read,
    Update,
    Delete,
}

/// Entity types whose full listings are memoized by the entity cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachedEntityType {
    Mailboxes,
    DistributionGroups,
}

impl CachedEntityType {
    /// Name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CachedEntityType::Mailboxes => "mailboxes",
            CachedEntityType::DistributionGroups => "distribution_groups",
        }
    }
}

impl std::fmt::Display for CachedEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
