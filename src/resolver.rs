//! Parameter-allowance resolver.
//!
//! Derives machine-readable metadata from the schema registry: the field
//! picklist for read operations and the mandatory/optional/prohibited
//! parameter contract for mutating operations. Pure functions over the
//! registry; no I/O.

use serde::{Deserialize, Serialize};

use crate::registry::EntityClassSchema;
use crate::types::{Capability, OperationSemantics};

/// Name of the free-text filter entry appended to filterable picklists.
pub const FILTER_FIELD: &str = "Filter";

/// Per-field classification for a given mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allowance {
    Mandatory,
    Optional,
    Prohibited,
}

/// One parameter of an operation contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractParameter {
    pub name: String,
    pub allowance: Allowance,
}

/// The parameter contract of a mutating operation. Built fresh per metadata
/// request; not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContract {
    pub semantics: OperationSemantics,
    pub parameters: Vec<ContractParameter>,
}

impl OperationContract {
    /// Allowance of a named parameter. Fields the schema does not know are
    /// prohibited; there is no allow-everything fallback.
    #[must_use]
    pub fn allowance(&self, name: &str) -> Allowance {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map_or(Allowance::Prohibited, |p| p.allowance)
    }

    /// Names of all mandatory parameters.
    #[must_use]
    pub fn mandatory(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.allowance == Allowance::Mandatory)
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// One entry of a read-operation field picklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PicklistField {
    pub name: String,
    /// Human-readable capability summary, e.g. `"Default | Key"`.
    pub capabilities: String,
    /// Whether the field belongs to the default selection.
    pub selected: bool,
}

/// Field picklist returned for read-operation metadata requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldPicklist {
    pub fields: Vec<PicklistField>,
    /// Whether a free-text filter expression is accepted.
    pub can_filter: bool,
}

impl FieldPicklist {
    /// Names of the default selection, key field first.
    #[must_use]
    pub fn default_selection(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.selected)
            .map(|f| f.name.as_str())
            .collect()
    }
}

/// Build the field picklist for a read operation on `schema`.
///
/// The default selection is exactly the `Default`-tagged fields, with the key
/// field placed first regardless of table order. When `can_filter` is set, a
/// free-text [`FILTER_FIELD`] entry is appended.
#[must_use]
pub fn resolve_read_metadata(schema: &EntityClassSchema, can_filter: bool) -> FieldPicklist {
    let key_name = schema.key().map(|p| p.name.as_str());

    let mut fields: Vec<PicklistField> = Vec::with_capacity(schema.properties.len() + 1);

    // Key first.
    if let Some(key) = schema.key() {
        fields.push(PicklistField {
            name: key.name.clone(),
            capabilities: key.capabilities.summary(),
            selected: true,
        });
    }

    for p in &schema.properties {
        if Some(p.name.as_str()) == key_name {
            continue;
        }
        if !p.has(Capability::Idm) {
            continue;
        }
        fields.push(PicklistField {
            name: p.name.clone(),
            capabilities: p.capabilities.summary(),
            selected: p.has(Capability::Default),
        });
    }

    if can_filter {
        fields.push(PicklistField {
            name: FILTER_FIELD.to_string(),
            capabilities: "Filter".to_string(),
            selected: false,
        });
    }

    FieldPicklist { fields, can_filter }
}

/// Build the parameter contract for a mutating operation on `schema`.
///
/// The key field is always mandatory. Every other field is prohibited unless
/// it carries `relevant`, in which case it is optional — or mandatory when
/// named in `mandatory_overrides` (class-specific create promotions).
#[must_use]
pub fn resolve_operation_contract(
    schema: &EntityClassSchema,
    semantics: OperationSemantics,
    relevant: Option<Capability>,
    mandatory_overrides: &[&str],
) -> OperationContract {
    let parameters = schema
        .properties
        .iter()
        .map(|p| {
            let allowance = if p.has(Capability::Key) {
                Allowance::Mandatory
            } else {
                match relevant {
                    Some(cap) if p.has(cap) => {
                        if mandatory_overrides.contains(&p.name.as_str()) {
                            Allowance::Mandatory
                        } else {
                            Allowance::Optional
                        }
                    }
                    _ => Allowance::Prohibited,
                }
            };
            ContractParameter {
                name: p.name.clone(),
                allowance,
            }
        })
        .collect();

    OperationContract {
        semantics,
        parameters,
    }
}
