//! CRUD operation dispatcher.
//!
//! One pass per invocation: metadata requests resolve against the registry
//! only (no network); execute requests parse and validate the serialized
//! parameters, ensure a session, consult or fill the entity cache where
//! applicable, build the remote parameter map, invoke the remote command,
//! and shape the result. Validation failures are raised before any remote
//! side effect.
//!
//! The context object owns the session manager and the cache explicitly
//! instead of reading them from ambient globals, which also makes the
//! mutual-exclusion boundaries visible: the session mutex inside
//! [`SessionManager`] and the per-collection mutexes inside [`EntityCache`].

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::EntityCache;
use crate::config::ExchangeConfig;
use crate::error::{ConnectorError, ConnectorResult};
use crate::record::{FieldValue, Record};
use crate::registry::SchemaRegistry;
use crate::remote::{RemoteCommand, RemoteGateway, CONFIRM_PARAMETER, IDENTITY_PARAMETER};
use crate::resolver::{
    resolve_operation_contract, resolve_read_metadata, Allowance, FieldPicklist, OperationContract,
};
use crate::session::{RemoteSessionProvider, SessionHandle, SessionManager};
use crate::types::{CachedEntityType, EntityClass, OperationKind};

/// Derived correlation key column of permission records.
pub const PERMISSION_ID_FIELD: &str = "PermissionId";

/// Metadata returned for a `GetMeta` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Metadata {
    /// Field picklist of a read operation.
    Picklist(FieldPicklist),
    /// Parameter contract of a mutating operation.
    Contract(OperationContract),
}

/// Fields a create/add/remove operation promotes to mandatory beyond the key.
fn mandatory_overrides(class: EntityClass, op: OperationKind) -> &'static [&'static str] {
    use EntityClass as C;
    use OperationKind as O;
    match (class, op) {
        (C::Mailbox, O::Create) => &["Name"],
        (C::DistributionGroup, O::Create) => &["Name", "Type"],
        (C::DistributionGroupMember, O::Add | O::Remove) => &["Member"],
        (C::MailboxPermission, O::Add | O::Remove) => &["User", "AccessRights"],
        _ => &[],
    }
}

/// Whether the class supports a free-text filter expression on reads.
fn supports_filter(class: EntityClass) -> bool {
    matches!(
        class,
        EntityClass::Mailbox | EntityClass::DistributionGroup
    )
}

/// The cached collection a dependent read iterates, if any.
fn dependent_collection(class: EntityClass) -> Option<CachedEntityType> {
    match class {
        EntityClass::DistributionGroupMember => Some(CachedEntityType::DistributionGroups),
        EntityClass::MailboxPermission | EntityClass::MailboxAutoReply => {
            Some(CachedEntityType::Mailboxes)
        }
        EntityClass::Mailbox | EntityClass::DistributionGroup => None,
    }
}

/// The cached collection a bulk read fills, if any.
fn bulk_collection(class: EntityClass) -> Option<CachedEntityType> {
    match class {
        EntityClass::Mailbox => Some(CachedEntityType::Mailboxes),
        EntityClass::DistributionGroup => Some(CachedEntityType::DistributionGroups),
        _ => None,
    }
}

/// Connector context: registry, session manager, cache, and remote gateway,
/// passed into every operation instead of living in globals.
pub struct ConnectorContext<P, G> {
    registry: SchemaRegistry,
    sessions: SessionManager<P>,
    cache: EntityCache,
    gateway: G,
}

impl<P, G> ConnectorContext<P, G>
where
    P: RemoteSessionProvider,
    G: RemoteGateway,
{
    /// Create a context with the built-in schema tables.
    ///
    /// Registry misconfiguration surfaces here, at startup, never at request
    /// time.
    pub fn new(provider: P, gateway: G) -> ConnectorResult<Self> {
        Ok(Self {
            registry: SchemaRegistry::builtin()?,
            sessions: SessionManager::new(provider),
            cache: EntityCache::new(),
            gateway,
        })
    }

    /// The loaded schema registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Resolve operation metadata. Registry and resolver only; no network.
    pub fn metadata(&self, class: EntityClass, op: OperationKind) -> ConnectorResult<Metadata> {
        if RemoteCommand::for_operation(class, op).is_none() {
            return Err(ConnectorError::UnsupportedOperation {
                class,
                operation: op,
            });
        }
        let schema = self.registry.schema(class)?;
        match op {
            OperationKind::Read => Ok(Metadata::Picklist(resolve_read_metadata(
                schema,
                supports_filter(class),
            ))),
            _ => Ok(Metadata::Contract(resolve_operation_contract(
                schema,
                op.semantics(),
                op.relevant_capability(),
                mandatory_overrides(class, op),
            ))),
        }
    }

    /// Execute an operation.
    ///
    /// `system_params` carries the serialized connection configuration,
    /// `function_params` the operation input: for reads an optional `Fields`
    /// list and `Filter` expression, for mutations the parameter record.
    pub async fn execute(
        &self,
        class: EntityClass,
        op: OperationKind,
        system_params: &Value,
        function_params: &Value,
    ) -> ConnectorResult<Vec<Record>> {
        let command = RemoteCommand::for_operation(class, op).ok_or(
            ConnectorError::UnsupportedOperation {
                class,
                operation: op,
            },
        )?;

        let config: ExchangeConfig = serde_json::from_value(system_params.clone())
            .map_err(|e| ConnectorError::invalid_input(format!("system parameters: {e}")))?;
        config.validate()?;

        debug!(class = %class, operation = %op, command = %command, "executing operation");

        match op {
            OperationKind::Read => self.execute_read(class, command, &config, function_params).await,
            _ => {
                self.execute_mutation(class, op, command, &config, function_params)
                    .await
            }
        }
    }

    /// Close the remote session and drop all cached collections.
    pub async fn unload(&self) {
        self.sessions.close_session().await;
        self.cache.clear_all().await;
        info!("connector context unloaded");
    }

    /// Drop all cached collections so the next read re-lists the directory.
    pub async fn refresh(&self) {
        self.cache.clear_all().await;
    }

    // ------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------

    async fn execute_read(
        &self,
        class: EntityClass,
        command: RemoteCommand,
        config: &ExchangeConfig,
        function_params: &Value,
    ) -> ConnectorResult<Vec<Record>> {
        let request = ReadRequest::parse(function_params)?;
        if request.filter.is_some() && !supports_filter(class) {
            return Err(ConnectorError::invalid_input(format!(
                "class {class} does not accept a filter expression"
            )));
        }

        let schema = self.registry.schema(class)?;
        let key_field = self.registry.key_field(class)?.to_string();
        let table_order: Vec<String> =
            schema.properties.iter().map(|p| p.name.clone()).collect();

        // Empty selection substitutes the class's default fields.
        let selection: Vec<String> = if request.fields.is_empty() {
            schema.default_fields().iter().map(|s| s.to_string()).collect()
        } else {
            request.fields.clone()
        };

        let session = self.sessions.ensure_session(config).await?;

        let raw = if let Some(cached) = bulk_collection(class) {
            self.read_bulk(class, command, config, &session, cached, request.filter.as_deref())
                .await?
        } else {
            self.read_dependent(class, command, config, &session).await?
        };

        Ok(raw
            .into_iter()
            .map(|record| shape_record(&record, &key_field, &selection, &table_order))
            .collect())
    }

    /// Bulk listing of mailboxes or distribution groups.
    ///
    /// Unfiltered reads fill and serve from the cache; filtered reads pass
    /// the filter expression to the remote command and bypass the cache.
    async fn read_bulk(
        &self,
        class: EntityClass,
        command: RemoteCommand,
        config: &ExchangeConfig,
        session: &SessionHandle,
        cached: CachedEntityType,
        filter: Option<&str>,
    ) -> ConnectorResult<Vec<Record>> {
        if let Some(filter) = filter {
            let mut params = listing_params(config);
            params.set("Filter", filter);
            return self.invoke(class, OperationKind::Read, command, session, params).await;
        }

        self.cache
            .fill(cached, || async move {
                self.invoke(class, OperationKind::Read, command, session, listing_params(config))
                    .await
            })
            .await?;
        Ok(self.cache.snapshot(cached).await)
    }

    /// Expansion read over a cached parent collection: one remote call per
    /// cached parent, tolerating an empty (but filled) collection.
    async fn read_dependent(
        &self,
        class: EntityClass,
        command: RemoteCommand,
        config: &ExchangeConfig,
        session: &SessionHandle,
    ) -> ConnectorResult<Vec<Record>> {
        let parent_type = dependent_collection(class)
            .ok_or(ConnectorError::UnsupportedOperation {
                class,
                operation: OperationKind::Read,
            })?;

        // Ensure the parent listing is filled without re-fetching it on
        // every expansion.
        let (parent_class, parent_command) = match parent_type {
            CachedEntityType::Mailboxes => (
                EntityClass::Mailbox,
                RemoteCommand::for_operation(EntityClass::Mailbox, OperationKind::Read)
                    .expect("mailbox read command exists"),
            ),
            CachedEntityType::DistributionGroups => (
                EntityClass::DistributionGroup,
                RemoteCommand::for_operation(EntityClass::DistributionGroup, OperationKind::Read)
                    .expect("group read command exists"),
            ),
        };
        self.cache
            .fill(parent_type, || async move {
                self.invoke(
                    parent_class,
                    OperationKind::Read,
                    parent_command,
                    session,
                    listing_params(config),
                )
                .await
            })
            .await?;

        let parent_key = self.registry.key_field(parent_class)?.to_string();
        let parents = self.cache.snapshot(parent_type).await;

        let mut out = Vec::new();
        for parent in &parents {
            let Some(identity) = parent.get_text(&parent_key) else {
                warn!(class = %parent_class, "cached record lacks key field, skipping");
                continue;
            };
            let params = Record::new().with(IDENTITY_PARAMETER, identity);
            let records = self
                .invoke(class, OperationKind::Read, command, session, params)
                .await?;
            for mut record in records {
                // The expansion key is the parent identity.
                record.set(IDENTITY_PARAMETER, identity);
                if class == EntityClass::MailboxPermission {
                    attach_permission_id(&mut record);
                }
                out.push(record);
            }
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Mutation path
    // ------------------------------------------------------------------

    async fn execute_mutation(
        &self,
        class: EntityClass,
        op: OperationKind,
        command: RemoteCommand,
        config: &ExchangeConfig,
        function_params: &Value,
    ) -> ConnectorResult<Vec<Record>> {
        let schema = self.registry.schema(class)?;
        let contract = resolve_operation_contract(
            schema,
            op.semantics(),
            op.relevant_capability(),
            mandatory_overrides(class, op),
        );

        let input = Record::from_json_object(function_params)?;
        validate_against_contract(class, op, &contract, &input)?;
        if class == EntityClass::MailboxAutoReply {
            validate_auto_reply_window(&input)?;
        }

        let key_field = self.registry.key_field(class)?.to_string();
        let params = build_remote_params(op, &key_field, input)?;

        let session = self.sessions.ensure_session(config).await?;
        let records = self.invoke(class, op, command, &session, params.clone()).await?;

        info!(class = %class, operation = %op, command = %command, "remote mutation succeeded");

        if records.is_empty() {
            // Commands without output get a constructed confirmation record.
            let mut confirmation = Record::new();
            if let Some(identity) = params.get(IDENTITY_PARAMETER).cloned() {
                confirmation.set(key_field, identity);
            }
            confirmation.set("Operation", op.as_str());
            confirmation.set("Completed", true);
            return Ok(vec![confirmation]);
        }
        Ok(records)
    }

    /// Invoke a remote command, translating gateway errors into the
    /// connector taxonomy with operation context.
    async fn invoke(
        &self,
        class: EntityClass,
        op: OperationKind,
        command: RemoteCommand,
        session: &SessionHandle,
        params: Record,
    ) -> ConnectorResult<Vec<Record>> {
        self.gateway
            .invoke(session, command, params.clone())
            .await
            .map_err(|err| {
                // Parameter names only; values may carry directory data and
                // credentials never reach this map.
                let fields: Vec<&str> = params.names().collect();
                warn!(
                    class = %class,
                    operation = %op,
                    command = %command,
                    parameters = ?fields,
                    error = %err,
                    "remote operation failed"
                );
                ConnectorError::Remote {
                    class,
                    operation: op,
                    command: command.name().to_string(),
                    message: err.message,
                }
            })
    }
}

/// Parsed read request: explicit field selection and optional filter.
#[derive(Debug, Default)]
struct ReadRequest {
    fields: Vec<String>,
    filter: Option<String>,
}

impl ReadRequest {
    fn parse(value: &Value) -> ConnectorResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let map = value.as_object().ok_or_else(|| {
            ConnectorError::invalid_input("read parameters must be a JSON object or null")
        })?;

        let mut request = Self::default();
        for (name, raw) in map {
            match name.as_str() {
                "Fields" => {
                    let items = raw.as_array().ok_or_else(|| {
                        ConnectorError::invalid_input("'Fields' must be an array of strings")
                    })?;
                    for item in items {
                        let field = item.as_str().ok_or_else(|| {
                            ConnectorError::invalid_input("'Fields' must be an array of strings")
                        })?;
                        request.fields.push(field.to_string());
                    }
                }
                "Filter" => {
                    request.filter = Some(
                        raw.as_str()
                            .ok_or_else(|| {
                                ConnectorError::invalid_input("'Filter' must be a string")
                            })?
                            .to_string(),
                    );
                }
                other => {
                    return Err(ConnectorError::invalid_input(format!(
                        "unknown read parameter '{other}'"
                    )))
                }
            }
        }
        Ok(request)
    }
}

/// Parameter map for a bulk listing: page size and optional scope filter.
fn listing_params(config: &ExchangeConfig) -> Record {
    let mut params = Record::new().with("ResultSize", i64::from(config.page_size));
    if let Some(scope) = &config.recipient_scope {
        params.set("OrganizationalUnit", scope.as_str());
    }
    params
}

/// Reject prohibited and missing-mandatory parameters before any remote call.
fn validate_against_contract(
    class: EntityClass,
    op: OperationKind,
    contract: &OperationContract,
    input: &Record,
) -> ConnectorResult<()> {
    for name in input.names() {
        if contract.allowance(name) == Allowance::Prohibited {
            return Err(ConnectorError::ProhibitedParameter {
                class,
                operation: op,
                parameter: name.to_string(),
            });
        }
    }
    for name in contract.mandatory() {
        if !input.has(name) {
            return Err(ConnectorError::MissingMandatoryParameter {
                class,
                operation: op,
                parameter: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Map the key field to the remote identity parameter, pass the remaining
/// fields through verbatim, and force the non-interactive confirmation flag
/// on deletions and removals.
fn build_remote_params(
    op: OperationKind,
    key_field: &str,
    mut input: Record,
) -> ConnectorResult<Record> {
    let key_value = input.remove(key_field).ok_or_else(|| {
        // Contract validation guarantees the key; this is a programming
        // error, not a client error.
        ConnectorError::invalid_input(format!("key field '{key_field}' vanished after validation"))
    })?;

    let mut params = Record::new();
    params.set(IDENTITY_PARAMETER, key_value);
    for (name, value) in input.iter() {
        params.set(name, value.clone());
    }
    if op.suppresses_prompts() {
        params.set(CONFIRM_PARAMETER, false);
    }
    Ok(params)
}

/// Shape one result record: key field first, then the selected fields in
/// registry order, null-filling fields the remote record lacks.
fn shape_record(
    record: &Record,
    key_field: &str,
    selection: &[String],
    table_order: &[String],
) -> Record {
    let mut shaped = Record::new();
    shaped.set(
        key_field,
        record.get(key_field).cloned().unwrap_or(FieldValue::Null),
    );

    // Selected fields follow registry table order, not request order.
    let ordered: Vec<&str> = table_order
        .iter()
        .map(String::as_str)
        .filter(|name| *name != key_field && selection.iter().any(|s| s == name))
        .collect();
    let extra: Vec<&str> = selection
        .iter()
        .map(String::as_str)
        .filter(|name| *name != key_field && !ordered.contains(name))
        .collect();

    for name in ordered.into_iter().chain(extra) {
        shaped.set(
            name,
            record.get(name).cloned().unwrap_or(FieldValue::Null),
        );
    }
    shaped
}

/// Check the scheduled auto-reply window: both bounds must be RFC 3339
/// timestamps and the start must precede the end.
fn validate_auto_reply_window(input: &Record) -> ConnectorResult<()> {
    let parse = |name: &str| -> ConnectorResult<Option<DateTime<FixedOffset>>> {
        match input.get_text(name) {
            None => Ok(None),
            Some(raw) => DateTime::parse_from_rfc3339(raw).map(Some).map_err(|e| {
                ConnectorError::invalid_input(format!("'{name}' is not a valid timestamp: {e}"))
            }),
        }
    };
    let start = parse("StartTime")?;
    let end = parse("EndTime")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(ConnectorError::invalid_input(
                "'StartTime' must precede 'EndTime'",
            ));
        }
    }
    Ok(())
}

/// Attach the deterministic synthetic key to a permission record.
///
/// Hashed over the record without the key column itself so re-reading the
/// same permission yields the same identifier.
fn attach_permission_id(record: &mut Record) {
    record.remove(PERMISSION_ID_FIELD);
    let id = record.derived_key();
    record.set(PERMISSION_ID_FIELD, id);
}
