//! End-to-end dispatcher scenarios against spy collaborators.
//!
//! The spy provider and gateway record every invocation so tests can assert
//! not only on results but on which remote calls were (or were not) made.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use exchange_connector::async_trait;
use exchange_connector::prelude::*;

fn system_params() -> Value {
    json!({
        "auth": {
            "mode": "credentials",
            "connection_uri": "https://exchange.local/powershell",
            "username": "svc-idm",
            "password": "pw"
        },
        "page_size": 500
    })
}

fn cert_system_params() -> Value {
    json!({
        "auth": {
            "mode": "certificate",
            "app_id": "11111111-2222-3333-4444-555555555555",
            "organization": "contoso.onmicrosoft.test",
            "certificate_thumbprint": "AABBCC"
        }
    })
}

#[derive(Default)]
struct SpyProvider {
    opens: AtomicUsize,
    closes: AtomicUsize,
}

#[async_trait]
impl RemoteSessionProvider for SpyProvider {
    async fn open(&self, config: &ExchangeConfig) -> ConnectorResult<SessionHandle> {
        config.validate()?;
        let n = self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(SessionHandle::new(format!("session-{n}")))
    }

    async fn close(&self, _handle: &SessionHandle) -> ConnectorResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn is_connected(&self, _handle: &SessionHandle) -> bool {
        true
    }
}

/// Gateway spy: canned responses per command name, every invocation recorded.
#[derive(Default)]
struct SpyGateway {
    responses: Mutex<HashMap<&'static str, Vec<Vec<Record>>>>,
    invocations: Mutex<Vec<(String, Record)>>,
}

impl SpyGateway {
    fn respond(&self, command: &'static str, records: Vec<Record>) {
        self.responses
            .lock()
            .unwrap()
            .entry(command)
            .or_default()
            .push(records);
    }

    fn invocations(&self) -> Vec<(String, Record)> {
        self.invocations.lock().unwrap().clone()
    }

    fn invocation_count(&self, command: &str) -> usize {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == command)
            .count()
    }
}

#[async_trait]
impl RemoteGateway for SpyGateway {
    async fn invoke(
        &self,
        _session: &SessionHandle,
        command: RemoteCommand,
        params: Record,
    ) -> Result<Vec<Record>, RemoteError> {
        self.invocations
            .lock()
            .unwrap()
            .push((command.name().to_string(), params));
        let mut responses = self.responses.lock().unwrap();
        match responses.get_mut(command.name()) {
            Some(queue) if !queue.is_empty() => Ok(queue.remove(0)),
            _ => Ok(Vec::new()),
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn context() -> (
    ConnectorContext<Arc<SpyProvider>, Arc<SpyGateway>>,
    Arc<SpyProvider>,
    Arc<SpyGateway>,
) {
    init_tracing();
    let provider = Arc::new(SpyProvider::default());
    let gateway = Arc::new(SpyGateway::default());
    let ctx = ConnectorContext::new(provider.clone(), gateway.clone()).unwrap();
    (ctx, provider, gateway)
}

fn mailbox(alias: &str, display_name: &str) -> Record {
    Record::new()
        .with("Alias", alias)
        .with("DisplayName", display_name)
        .with("Name", display_name)
        .with("PrimarySmtpAddress", format!("{alias}@contoso.test"))
        .with("UserPrincipalName", format!("{alias}@contoso.test"))
        .with("RecipientTypeDetails", "UserMailbox")
        .with("Guid", format!("guid-{alias}"))
}

#[tokio::test]
async fn read_mailboxes_defaults_key_first() {
    let (ctx, _provider, gateway) = context();
    gateway.respond("Get-Mailbox", vec![mailbox("jdoe", "John Doe")]);

    let records = ctx
        .execute(
            EntityClass::Mailbox,
            OperationKind::Read,
            &system_params(),
            &Value::Null,
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    let names: Vec<_> = records[0].names().collect();
    assert_eq!(
        names,
        vec![
            "Alias",
            "Name",
            "DisplayName",
            "PrimarySmtpAddress",
            "UserPrincipalName",
            "RecipientTypeDetails",
            "Guid",
        ]
    );
    assert_eq!(records[0].get_text("Alias"), Some("jdoe"));
}

#[tokio::test]
async fn read_respects_explicit_field_selection() {
    let (ctx, _provider, gateway) = context();
    gateway.respond("Get-Mailbox", vec![mailbox("jdoe", "John Doe")]);

    let records = ctx
        .execute(
            EntityClass::Mailbox,
            OperationKind::Read,
            &system_params(),
            &json!({ "Fields": ["DisplayName"] }),
        )
        .await
        .unwrap();

    let names: Vec<_> = records[0].names().collect();
    assert_eq!(names, vec!["Alias", "DisplayName"]);
}

#[tokio::test]
async fn bulk_read_fills_cache_once() {
    let (ctx, _provider, gateway) = context();
    gateway.respond("Get-Mailbox", vec![mailbox("jdoe", "John Doe")]);

    for _ in 0..3 {
        let records = ctx
            .execute(
                EntityClass::Mailbox,
                OperationKind::Read,
                &system_params(),
                &Value::Null,
            )
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    assert_eq!(gateway.invocation_count("Get-Mailbox"), 1);
}

#[tokio::test]
async fn refresh_clears_cache_for_refetch() {
    let (ctx, _provider, gateway) = context();
    gateway.respond("Get-Mailbox", vec![mailbox("jdoe", "John Doe")]);
    gateway.respond("Get-Mailbox", vec![mailbox("asmith", "Anna Smith")]);

    ctx.execute(
        EntityClass::Mailbox,
        OperationKind::Read,
        &system_params(),
        &Value::Null,
    )
    .await
    .unwrap();

    ctx.refresh().await;

    let records = ctx
        .execute(
            EntityClass::Mailbox,
            OperationKind::Read,
            &system_params(),
            &Value::Null,
        )
        .await
        .unwrap();
    assert_eq!(records[0].get_text("Alias"), Some("asmith"));
    assert_eq!(gateway.invocation_count("Get-Mailbox"), 2);
}

#[tokio::test]
async fn filtered_read_bypasses_cache() {
    let (ctx, _provider, gateway) = context();
    gateway.respond("Get-Mailbox", vec![mailbox("jdoe", "John Doe")]);
    gateway.respond("Get-Mailbox", vec![mailbox("jdoe", "John Doe")]);

    ctx.execute(
        EntityClass::Mailbox,
        OperationKind::Read,
        &system_params(),
        &json!({ "Filter": "Alias -like 'j*'" }),
    )
    .await
    .unwrap();

    let (_, params) = &gateway.invocations()[0];
    assert_eq!(params.get_text("Filter"), Some("Alias -like 'j*'"));

    // Second filtered read goes remote again.
    ctx.execute(
        EntityClass::Mailbox,
        OperationKind::Read,
        &system_params(),
        &json!({ "Filter": "Alias -like 'j*'" }),
    )
    .await
    .unwrap();
    assert_eq!(gateway.invocation_count("Get-Mailbox"), 2);
}

#[tokio::test]
async fn session_reused_across_operations() {
    let (ctx, provider, gateway) = context();
    gateway.respond("Get-Mailbox", vec![]);

    ctx.execute(
        EntityClass::Mailbox,
        OperationKind::Read,
        &system_params(),
        &Value::Null,
    )
    .await
    .unwrap();
    ctx.execute(
        EntityClass::Mailbox,
        OperationKind::Update,
        &system_params(),
        &json!({ "Alias": "jdoe", "DisplayName": "John" }),
    )
    .await
    .unwrap();

    assert_eq!(provider.opens.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn auth_mode_change_reopens_session() {
    let (ctx, provider, gateway) = context();
    gateway.respond("Get-Mailbox", vec![]);

    ctx.execute(
        EntityClass::Mailbox,
        OperationKind::Read,
        &system_params(),
        &Value::Null,
    )
    .await
    .unwrap();
    ctx.execute(
        EntityClass::Mailbox,
        OperationKind::Update,
        &cert_system_params(),
        &json!({ "Alias": "jdoe", "DisplayName": "John" }),
    )
    .await
    .unwrap();

    assert_eq!(provider.opens.load(Ordering::SeqCst), 2);
    assert_eq!(provider.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn update_with_prohibited_field_never_goes_remote() {
    let (ctx, provider, gateway) = context();

    let err = ctx
        .execute(
            EntityClass::Mailbox,
            OperationKind::Update,
            &system_params(),
            // Guid is readable but not tagged for update.
            &json!({ "Alias": "jdoe", "Guid": "abc" }),
        )
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "PROHIBITED_PARAMETER");
    assert!(gateway.invocations().is_empty());
    assert_eq!(provider.opens.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn create_without_mandatory_name_rejected() {
    let (ctx, _provider, gateway) = context();

    let err = ctx
        .execute(
            EntityClass::DistributionGroup,
            OperationKind::Create,
            &system_params(),
            &json!({ "Alias": "staff", "Type": "Distribution" }),
        )
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "MISSING_MANDATORY_PARAMETER");
    assert!(err.to_string().contains("'Name'"));
    assert!(gateway.invocations().is_empty());
}

#[tokio::test]
async fn delete_passes_non_interactive_confirmation() {
    let (ctx, _provider, gateway) = context();
    gateway.respond("Remove-DistributionGroup", vec![]);

    ctx.execute(
        EntityClass::DistributionGroup,
        OperationKind::Delete,
        &system_params(),
        &json!({ "Alias": "staff" }),
    )
    .await
    .unwrap();

    let (command, params) = &gateway.invocations()[0];
    assert_eq!(command, "Remove-DistributionGroup");
    assert_eq!(params.get_text("Identity"), Some("staff"));
    assert_eq!(params.get("Confirm"), Some(&FieldValue::Bool(false)));
}

#[tokio::test]
async fn update_maps_key_to_identity_and_passes_rest_verbatim() {
    let (ctx, _provider, gateway) = context();
    gateway.respond("Set-Mailbox", vec![mailbox("jdoe", "Johnny Doe")]);

    let records = ctx
        .execute(
            EntityClass::Mailbox,
            OperationKind::Update,
            &system_params(),
            &json!({
                "Alias": "jdoe",
                "DisplayName": "Johnny Doe",
                "HiddenFromAddressListsEnabled": true
            }),
        )
        .await
        .unwrap();

    let (_, params) = &gateway.invocations()[0];
    assert_eq!(params.get_text("Identity"), Some("jdoe"));
    assert!(!params.has("Alias"));
    assert_eq!(params.get_text("DisplayName"), Some("Johnny Doe"));
    assert_eq!(
        params.get("HiddenFromAddressListsEnabled"),
        Some(&FieldValue::Bool(true))
    );
    assert!(!params.has("Confirm"));
    assert_eq!(records[0].get_text("DisplayName"), Some("Johnny Doe"));
}

#[tokio::test]
async fn membership_add_returns_confirmation_record() {
    let (ctx, _provider, gateway) = context();
    // Add-DistributionGroupMember returns nothing on the wire.

    let records = ctx
        .execute(
            EntityClass::DistributionGroupMember,
            OperationKind::Add,
            &system_params(),
            &json!({ "Identity": "staff", "Member": "jdoe" }),
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get_text("Identity"), Some("staff"));
    assert_eq!(records[0].get_text("Operation"), Some("add"));
    assert_eq!(records[0].get("Completed"), Some(&FieldValue::Bool(true)));

    let (command, params) = &gateway.invocations()[0];
    assert_eq!(command, "Add-DistributionGroupMember");
    assert_eq!(params.get_text("Member"), Some("jdoe"));
}

#[tokio::test]
async fn membership_remove_requires_member_and_confirms() {
    let (ctx, _provider, gateway) = context();

    let err = ctx
        .execute(
            EntityClass::DistributionGroupMember,
            OperationKind::Remove,
            &system_params(),
            &json!({ "Identity": "staff" }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "MISSING_MANDATORY_PARAMETER");

    ctx.execute(
        EntityClass::DistributionGroupMember,
        OperationKind::Remove,
        &system_params(),
        &json!({ "Identity": "staff", "Member": "jdoe" }),
    )
    .await
    .unwrap();

    let (_, params) = gateway.invocations().pop().unwrap();
    assert_eq!(params.get("Confirm"), Some(&FieldValue::Bool(false)));
}

#[tokio::test]
async fn member_expansion_uses_cached_groups() {
    let (ctx, _provider, gateway) = context();
    gateway.respond(
        "Get-DistributionGroup",
        vec![
            Record::new().with("Alias", "staff").with("Name", "Staff"),
            Record::new().with("Alias", "execs").with("Name", "Execs"),
        ],
    );
    gateway.respond(
        "Get-DistributionGroupMember",
        vec![Record::new().with("Member", "jdoe")],
    );
    gateway.respond(
        "Get-DistributionGroupMember",
        vec![Record::new().with("Member", "asmith")],
    );

    let records = ctx
        .execute(
            EntityClass::DistributionGroupMember,
            OperationKind::Read,
            &system_params(),
            &Value::Null,
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get_text("Identity"), Some("staff"));
    assert_eq!(records[0].get_text("Member"), Some("jdoe"));
    assert_eq!(records[1].get_text("Identity"), Some("execs"));

    // The group listing was fetched once; expansion reused the cache.
    assert_eq!(gateway.invocation_count("Get-DistributionGroup"), 1);
    assert_eq!(gateway.invocation_count("Get-DistributionGroupMember"), 2);

    // A second expansion does not re-list groups.
    gateway.respond("Get-DistributionGroupMember", vec![]);
    gateway.respond("Get-DistributionGroupMember", vec![]);
    ctx.execute(
        EntityClass::DistributionGroupMember,
        OperationKind::Read,
        &system_params(),
        &Value::Null,
    )
    .await
    .unwrap();
    assert_eq!(gateway.invocation_count("Get-DistributionGroup"), 1);
}

#[tokio::test]
async fn member_expansion_tolerates_empty_directory() {
    let (ctx, _provider, gateway) = context();
    gateway.respond("Get-DistributionGroup", vec![]);

    let records = ctx
        .execute(
            EntityClass::DistributionGroupMember,
            OperationKind::Read,
            &system_params(),
            &Value::Null,
        )
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(gateway.invocation_count("Get-DistributionGroupMember"), 0);
}

#[tokio::test]
async fn auto_reply_read_iterates_cached_mailboxes() {
    let (ctx, _provider, gateway) = context();
    gateway.respond("Get-Mailbox", vec![mailbox("jdoe", "John Doe")]);
    gateway.respond(
        "Get-MailboxAutoReplyConfiguration",
        vec![Record::new()
            .with("AutoReplyState", "Scheduled")
            .with("InternalMessage", "out of office")],
    );

    let records = ctx
        .execute(
            EntityClass::MailboxAutoReply,
            OperationKind::Read,
            &system_params(),
            &Value::Null,
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get_text("Identity"), Some("jdoe"));
    assert_eq!(records[0].get_text("AutoReplyState"), Some("Scheduled"));
}

#[tokio::test]
async fn auto_reply_update_rejects_inverted_window() {
    let (ctx, _provider, gateway) = context();

    let err = ctx
        .execute(
            EntityClass::MailboxAutoReply,
            OperationKind::Update,
            &system_params(),
            &json!({
                "Identity": "jdoe",
                "AutoReplyState": "Scheduled",
                "StartTime": "2026-09-15T18:00:00+00:00",
                "EndTime": "2026-09-01T08:00:00+00:00"
            }),
        )
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "INVALID_INPUT");
    assert!(gateway.invocations().is_empty());
}

#[tokio::test]
async fn permission_read_synthesizes_stable_derived_key() {
    let (ctx, _provider, gateway) = context();
    gateway.respond("Get-Mailbox", vec![mailbox("jdoe", "John Doe")]);
    let permission = Record::new()
        .with("User", "CONTOSO\\admin")
        .with("AccessRights", vec!["FullAccess".to_string()]);
    gateway.respond("Get-MailboxPermission", vec![permission.clone()]);

    let first = ctx
        .execute(
            EntityClass::MailboxPermission,
            OperationKind::Read,
            &system_params(),
            &Value::Null,
        )
        .await
        .unwrap();
    let key = first[0].get_text("PermissionId").unwrap().to_string();
    assert_eq!(key.len(), 64);

    // Same record on a re-read yields the same synthetic key.
    gateway.respond("Get-MailboxPermission", vec![permission]);
    let second = ctx
        .execute(
            EntityClass::MailboxPermission,
            OperationKind::Read,
            &system_params(),
            &Value::Null,
        )
        .await
        .unwrap();
    assert_eq!(second[0].get_text("PermissionId"), Some(key.as_str()));

    // A one-field change yields a different key.
    gateway.respond(
        "Get-MailboxPermission",
        vec![Record::new()
            .with("User", "CONTOSO\\other")
            .with("AccessRights", vec!["FullAccess".to_string()])],
    );
    let third = ctx
        .execute(
            EntityClass::MailboxPermission,
            OperationKind::Read,
            &system_params(),
            &Value::Null,
        )
        .await
        .unwrap();
    assert_ne!(third[0].get_text("PermissionId"), Some(key.as_str()));
}

#[tokio::test]
async fn remote_failure_carries_operation_context() {
    struct FailingGateway;

    #[async_trait]
    impl RemoteGateway for FailingGateway {
        async fn invoke(
            &self,
            _session: &SessionHandle,
            _command: RemoteCommand,
            _params: Record,
        ) -> Result<Vec<Record>, RemoteError> {
            Err(RemoteError::new("mailbox database offline"))
        }
    }

    let provider = Arc::new(SpyProvider::default());
    let ctx = ConnectorContext::new(provider, FailingGateway).unwrap();

    let err = ctx
        .execute(
            EntityClass::Mailbox,
            OperationKind::Update,
            &system_params(),
            &json!({ "Alias": "jdoe", "DisplayName": "John" }),
        )
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "REMOTE_OPERATION_ERROR");
    let message = err.to_string();
    assert!(message.contains("Set-Mailbox"));
    assert!(message.contains("Mailbox"));
    assert!(message.contains("mailbox database offline"));
}

#[tokio::test]
async fn failed_bulk_fetch_leaves_cache_retryable() {
    struct FlakyGateway {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RemoteGateway for FlakyGateway {
        async fn invoke(
            &self,
            _session: &SessionHandle,
            command: RemoteCommand,
            _params: Record,
        ) -> Result<Vec<Record>, RemoteError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RemoteError::new("throttled"))
            } else {
                assert_eq!(command.name(), "Get-Mailbox");
                Ok(vec![Record::new().with("Alias", "jdoe")])
            }
        }
    }

    let provider = Arc::new(SpyProvider::default());
    let ctx = ConnectorContext::new(
        provider,
        FlakyGateway {
            calls: AtomicUsize::new(0),
        },
    )
    .unwrap();

    let err = ctx
        .execute(
            EntityClass::Mailbox,
            OperationKind::Read,
            &system_params(),
            &Value::Null,
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "REMOTE_OPERATION_ERROR");

    // The failed fill did not mark the cache filled; the next read refetches.
    let records = ctx
        .execute(
            EntityClass::Mailbox,
            OperationKind::Read,
            &system_params(),
            &Value::Null,
        )
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn metadata_requires_no_network() {
    let (ctx, provider, gateway) = context();

    for class in EntityClass::ALL {
        for op in [
            OperationKind::Read,
            OperationKind::Create,
            OperationKind::Update,
            OperationKind::Delete,
            OperationKind::Enable,
            OperationKind::Disable,
            OperationKind::Add,
            OperationKind::Remove,
        ] {
            let _ = ctx.metadata(class, op);
        }
    }

    assert_eq!(provider.opens.load(Ordering::SeqCst), 0);
    assert!(gateway.invocations().is_empty());
}

#[tokio::test]
async fn metadata_shapes_per_operation() {
    let (ctx, _provider, _gateway) = context();

    match ctx.metadata(EntityClass::Mailbox, OperationKind::Read).unwrap() {
        Metadata::Picklist(picklist) => {
            assert!(picklist.can_filter);
            assert_eq!(picklist.default_selection().first().copied(), Some("Alias"));
        }
        Metadata::Contract(_) => panic!("read metadata must be a picklist"),
    }

    match ctx
        .metadata(EntityClass::DistributionGroup, OperationKind::Create)
        .unwrap()
    {
        Metadata::Contract(contract) => {
            assert_eq!(contract.allowance("Name"), Allowance::Mandatory);
            assert_eq!(contract.allowance("Type"), Allowance::Mandatory);
            assert_eq!(contract.allowance("Notes"), Allowance::Prohibited);
        }
        Metadata::Picklist(_) => panic!("create metadata must be a contract"),
    }

    let err = ctx
        .metadata(EntityClass::MailboxAutoReply, OperationKind::Delete)
        .unwrap_err();
    assert_eq!(err.error_code(), "UNSUPPORTED_OPERATION");
}

#[tokio::test]
async fn unload_closes_session_and_clears_cache() {
    let (ctx, provider, gateway) = context();
    gateway.respond("Get-Mailbox", vec![mailbox("jdoe", "John Doe")]);

    ctx.execute(
        EntityClass::Mailbox,
        OperationKind::Read,
        &system_params(),
        &Value::Null,
    )
    .await
    .unwrap();

    ctx.unload().await;
    assert_eq!(provider.closes.load(Ordering::SeqCst), 1);

    // Next read refills the cache over a fresh session.
    gateway.respond("Get-Mailbox", vec![mailbox("jdoe", "John Doe")]);
    ctx.execute(
        EntityClass::Mailbox,
        OperationKind::Read,
        &system_params(),
        &Value::Null,
    )
    .await
    .unwrap();
    assert_eq!(provider.opens.load(Ordering::SeqCst), 2);
    assert_eq!(gateway.invocation_count("Get-Mailbox"), 2);
}

#[tokio::test]
async fn malformed_system_params_rejected() {
    let (ctx, _provider, gateway) = context();

    let err = ctx
        .execute(
            EntityClass::Mailbox,
            OperationKind::Read,
            &json!({ "auth": { "mode": "credentials" } }),
            &Value::Null,
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
    assert!(gateway.invocations().is_empty());
}

#[tokio::test]
async fn filter_rejected_on_dependent_class() {
    let (ctx, _provider, gateway) = context();

    let err = ctx
        .execute(
            EntityClass::MailboxPermission,
            OperationKind::Read,
            &system_params(),
            &json!({ "Filter": "x" }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
    assert!(gateway.invocations().is_empty());
}

#[test]
fn system_params_deserialize_into_config() {
    let config: ExchangeConfig = serde_json::from_value(system_params()).unwrap();
    config.validate().unwrap();
    match config.auth {
        AuthMethod::Credentials { username, .. } => assert_eq!(username, "svc-idm"),
        AuthMethod::Certificate { .. } => panic!("wrong variant"),
    }
}
