//! Property schema registry.
//!
//! A static per-entity-class table of field descriptors and capability tags.
//! Loaded once at startup, validated (exactly one key field per class), and
//! shared read-only by the resolver and the dispatcher.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, ConnectorResult};
use crate::types::{Capability, CapabilitySet, EntityClass};

/// A field of an entity class together with its capability tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Field name as exposed to the orchestrator and the remote directory.
    pub name: String,
    /// What the field may be used for.
    pub capabilities: CapabilitySet,
}

impl PropertyDescriptor {
    /// Create a descriptor from a name and capability list.
    pub fn new(name: impl Into<String>, caps: &[Capability]) -> Self {
        Self {
            name: name.into(),
            capabilities: CapabilitySet::of(caps),
        }
    }

    /// Whether this field carries the given capability.
    #[must_use]
    pub fn has(&self, cap: Capability) -> bool {
        self.capabilities.contains(cap)
    }
}

/// The complete field table of one entity class. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityClassSchema {
    /// The entity class this schema describes.
    pub class: EntityClass,
    /// Field descriptors in declaration order.
    pub properties: Vec<PropertyDescriptor>,
}

impl EntityClassSchema {
    /// Look up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// The single field tagged [`Capability::Key`].
    ///
    /// The registry validates the exactly-one invariant at load, so lookups
    /// against a loaded registry cannot fail.
    #[must_use]
    pub fn key(&self) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.has(Capability::Key))
    }

    /// Names of fields tagged [`Capability::Default`], in table order.
    #[must_use]
    pub fn default_fields(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|p| p.has(Capability::Default))
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// Registry of all entity class schemas.
///
/// Built once at connector startup via [`SchemaRegistry::builtin`]; a
/// misconfigured table is an invariant violation and fails construction
/// rather than surfacing at request time.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<EntityClass, EntityClassSchema>,
}

impl SchemaRegistry {
    /// Build a registry from raw schemas, deriving implied tags and
    /// validating invariants.
    pub fn load(schemas: Vec<EntityClassSchema>) -> ConnectorResult<Self> {
        let mut map = HashMap::with_capacity(schemas.len());
        for mut schema in schemas {
            // Default always implies Idm. Derived here so table authors
            // never state it twice.
            for prop in &mut schema.properties {
                if prop.has(Capability::Default) {
                    prop.capabilities.insert(Capability::Idm);
                }
            }

            let key_count = schema
                .properties
                .iter()
                .filter(|p| p.has(Capability::Key))
                .count();
            if key_count != 1 {
                return Err(ConnectorError::schema(
                    schema.class.as_str(),
                    format!("expected exactly one key field, found {key_count}"),
                ));
            }

            map.insert(schema.class, schema);
        }
        Ok(Self { schemas: map })
    }

    /// Build the registry from the built-in property tables.
    pub fn builtin() -> ConnectorResult<Self> {
        Self::load(builtin_schemas())
    }

    /// Get the schema for an entity class.
    pub fn schema(&self, class: EntityClass) -> ConnectorResult<&EntityClassSchema> {
        self.schemas
            .get(&class)
            .ok_or_else(|| ConnectorError::schema(class.as_str(), "class not registered"))
    }

    /// Name of the key field of an entity class.
    pub fn key_field(&self, class: EntityClass) -> ConnectorResult<&str> {
        let schema = self.schema(class)?;
        schema
            .key()
            .map(|p| p.name.as_str())
            .ok_or_else(|| ConnectorError::schema(class.as_str(), "no key field"))
    }
}

fn prop(name: &'static str, caps: &[Capability]) -> PropertyDescriptor {
    PropertyDescriptor::new(name, caps)
}

/// The static property tables for the supported entity classes.
fn builtin_schemas() -> Vec<EntityClassSchema> {
    use Capability::{Add, Create, Default, Enable, Idm, Key, Remove, Set};

    vec![
        EntityClassSchema {
            class: EntityClass::Mailbox,
            properties: vec![
                prop("Alias", &[Key, Default, Create, Enable]),
                prop("Name", &[Default, Create, Set]),
                prop("DisplayName", &[Default, Create, Set]),
                prop("PrimarySmtpAddress", &[Default, Create, Set]),
                prop("UserPrincipalName", &[Default, Create]),
                prop("Database", &[Idm, Create, Enable]),
                prop("EmailAddresses", &[Idm, Set]),
                prop("RecipientTypeDetails", &[Default]),
                prop("HiddenFromAddressListsEnabled", &[Idm, Set]),
                prop("LitigationHoldEnabled", &[Idm, Set]),
                prop("IssueWarningQuota", &[Idm, Set]),
                prop("ProhibitSendQuota", &[Idm, Set]),
                prop("CustomAttribute1", &[Idm, Set]),
                prop("CustomAttribute2", &[Idm, Set]),
                prop("Guid", &[Default]),
                prop("ExchangeGuid", &[Idm]),
                prop("WhenCreated", &[Idm]),
                prop("WhenChanged", &[Idm]),
            ],
        },
        EntityClassSchema {
            class: EntityClass::DistributionGroup,
            properties: vec![
                prop("Alias", &[Key, Default, Create]),
                prop("Name", &[Default, Create, Set]),
                prop("DisplayName", &[Default, Create, Set]),
                prop("Type", &[Default, Create]),
                prop("PrimarySmtpAddress", &[Default, Create, Set]),
                prop("ManagedBy", &[Idm, Create, Set]),
                prop("MemberJoinRestriction", &[Idm, Set]),
                prop("MemberDepartRestriction", &[Idm, Set]),
                prop("HiddenFromAddressListsEnabled", &[Idm, Set]),
                prop("RequireSenderAuthenticationEnabled", &[Idm, Set]),
                prop("Notes", &[Idm, Set]),
                prop("Guid", &[Default]),
                prop("RecipientTypeDetails", &[Idm]),
                prop("WhenCreated", &[Idm]),
            ],
        },
        EntityClassSchema {
            class: EntityClass::DistributionGroupMember,
            properties: vec![
                prop("Identity", &[Key, Default]),
                prop("Member", &[Default, Add, Remove]),
                prop("MemberType", &[Idm]),
                prop("BypassSecurityGroupManagerCheck", &[Idm, Add, Remove]),
            ],
        },
        EntityClassSchema {
            class: EntityClass::MailboxPermission,
            properties: vec![
                prop("Identity", &[Key, Default]),
                prop("User", &[Default, Add, Remove]),
                prop("AccessRights", &[Default, Add, Remove]),
                prop("Deny", &[Idm, Add]),
                prop("InheritanceType", &[Idm, Add, Remove]),
                prop("IsInherited", &[Idm]),
                prop("PermissionId", &[Default]),
            ],
        },
        EntityClassSchema {
            class: EntityClass::MailboxAutoReply,
            properties: vec![
                prop("Identity", &[Key, Default]),
                prop("AutoReplyState", &[Default, Set]),
                prop("InternalMessage", &[Default, Set]),
                prop("ExternalMessage", &[Default, Set]),
                prop("ExternalAudience", &[Idm, Set]),
                prop("StartTime", &[Idm, Set]),
                prop("EndTime", &[Idm, Set]),
            ],
        },
    ]
}
