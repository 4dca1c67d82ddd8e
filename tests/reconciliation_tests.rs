mod common;

use common::{days_from_today, fixture, today};
use polisa::application::reconciliation::{ContractReconciler, ReconciliationConfig};
use polisa::application::worker::ReconciliationWorker;
use polisa::domain::contract::{Contract, ContractStatus};
use polisa::domain::money::Money;
use polisa::domain::party::Client;
use polisa::domain::ports::{ClientStore, ContractStore};
use rust_decimal_macros::dec;
use uuid::Uuid;

async fn store_contract(
    fx: &common::Fixture,
    start_offset_days: i64,
    end_offset_days: i64,
) -> Contract {
    let mut contract = Contract::new(
        fx.client_id,
        fx.service_id,
        days_from_today(start_offset_days),
        days_from_today(end_offset_days),
        Money::new(dec!(10000), "RUB").unwrap(),
        None,
        None,
    )
    .unwrap();
    contract.register("CTR-001", fx.agent_id).unwrap();
    fx.contracts.store(contract.clone()).await.unwrap();
    contract
}

#[tokio::test]
async fn overdue_pass_flags_and_notifies_once() {
    let fx = fixture().await;
    let contract = store_contract(&fx, -400, -30).await;

    let count = fx.reconciler.process_overdue().await.unwrap();
    assert_eq!(count, 1);

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert!(stored.is_flagged_problem());
    assert!(matches!(
        stored.status(),
        ContractStatus::Overdue | ContractStatus::Problematic
    ));
    assert!(stored.notes().unwrap().contains("Problem: Contract is overdue"));

    let sent = fx.notifications.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].email, "ivan.petrov@example.com");
    assert!(sent[0].subject.contains("просрочен"));
    assert!(sent[0].body.contains("CTR-001"));
}

#[tokio::test]
async fn overdue_pass_is_idempotent_for_problem_flag() {
    let fx = fixture().await;
    let contract = store_contract(&fx, -400, -30).await;

    fx.reconciler.process_overdue().await.unwrap();
    fx.reconciler.process_overdue().await.unwrap();

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert!(stored.is_flagged_problem());
    // The problem note was appended exactly once.
    assert_eq!(
        stored
            .notes()
            .unwrap()
            .matches("Problem: Contract is overdue")
            .count(),
        1
    );
}

#[tokio::test]
async fn overdue_pass_skips_clients_without_email() {
    let fx = fixture().await;

    let mut silent = Client::new("Без Почты", "");
    silent.phone = Some("+7 900 000-00-00".to_string());
    let silent_id = silent.id;
    fx.clients.store(silent).await.unwrap();

    let mut contract = Contract::new(
        silent_id,
        fx.service_id,
        days_from_today(-400),
        days_from_today(-30),
        Money::new(dec!(10000), "RUB").unwrap(),
        None,
        None,
    )
    .unwrap();
    contract.register("CTR-002", fx.agent_id).unwrap();
    fx.contracts.store(contract.clone()).await.unwrap();

    let count = fx.reconciler.process_overdue().await.unwrap();
    assert_eq!(count, 1);

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert!(stored.is_flagged_problem());
    assert!(fx.notifications.sent().await.is_empty());
}

#[tokio::test]
async fn unpaid_pass_flags_old_registered_contracts() {
    let fx = fixture().await;
    let contract = store_contract(&fx, 0, 365).await;

    // Zero-day threshold makes the just-created contract eligible.
    let reconciler = ContractReconciler::new(
        fx.contracts.clone(),
        fx.verifications.clone(),
        fx.clients.clone(),
        fx.notifications.clone(),
        ReconciliationConfig {
            unpaid_threshold_days: 0,
            ..ReconciliationConfig::default()
        },
    );

    let count = reconciler.process_unpaid().await.unwrap();
    assert_eq!(count, 1);

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert!(stored.is_flagged_problem());
    assert_eq!(stored.status(), ContractStatus::Problematic);
    assert!(
        stored
            .notes()
            .unwrap()
            .contains("Contract unpaid for more than 0 days")
    );

    let sent = fx.notifications.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("Требуется оплата"));
    assert!(sent[0].body.contains("10000.00 RUB"));
}

#[tokio::test]
async fn unpaid_pass_ignores_recent_contracts() {
    let fx = fixture().await;
    store_contract(&fx, 0, 365).await;

    // Default 7-day threshold: a fresh contract is not flagged.
    let count = fx.reconciler.process_unpaid().await.unwrap();
    assert_eq!(count, 0);
    assert!(fx.notifications.sent().await.is_empty());
}

#[tokio::test]
async fn renewal_pass_reminds_without_flagging() {
    let fx = fixture().await;

    let mut contract = store_contract(&fx, -300, 20).await;
    contract.mark_as_paid();
    contract.activate().unwrap();
    fx.contracts.store(contract.clone()).await.unwrap();

    let count = fx.reconciler.process_requiring_renewal().await.unwrap();
    assert_eq!(count, 1);

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), ContractStatus::Active);
    assert!(!stored.is_flagged_problem());

    let sent = fx.notifications.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("Напоминание"));
}

#[tokio::test]
async fn expired_pass_marks_and_notifies() {
    let fx = fixture().await;
    let contract = store_contract(&fx, -400, -30).await;

    let count = fx.reconciler.process_expired().await.unwrap();
    assert_eq!(count, 1);

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), ContractStatus::Expired);

    let sent = fx.notifications.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("истек"));

    // Terminal now: a second expired pass finds nothing.
    let count = fx.reconciler.process_expired().await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn data_integrity_pass_flags_missing_verifications() {
    let fx = fixture().await;
    let contract = store_contract(&fx, 0, 365).await;

    let count = fx.reconciler.process_data_integrity().await.unwrap();
    assert_eq!(count, 1);

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert!(stored.is_flagged_problem());
    assert!(
        stored
            .notes()
            .unwrap()
            .contains("No approved verification for: FullName, Passport")
    );
}

#[tokio::test]
async fn data_integrity_pass_reports_pending_required() {
    let fx = fixture().await;
    fx.approve_mandatory_documents().await;
    fx.add_pending_verification("Passport").await;
    let contract = store_contract(&fx, 0, 365).await;

    let count = fx.reconciler.process_data_integrity().await.unwrap();
    assert_eq!(count, 1);

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert!(
        stored
            .notes()
            .unwrap()
            .contains("Pending verification for: Passport")
    );
}

#[tokio::test]
async fn data_integrity_pass_leaves_valid_contracts_alone() {
    let fx = fixture().await;
    fx.approve_mandatory_documents().await;
    let contract = store_contract(&fx, 0, 365).await;

    let count = fx.reconciler.process_data_integrity().await.unwrap();
    assert_eq!(count, 0);

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert!(!stored.is_flagged_problem());
    assert_eq!(stored.status(), ContractStatus::Registered);
}

#[tokio::test]
async fn data_integrity_pass_detects_draft_without_number() {
    let fx = fixture().await;
    fx.approve_mandatory_documents().await;

    let contract = Contract::new(
        fx.client_id,
        fx.service_id,
        today(),
        days_from_today(365),
        Money::new(dec!(10000), "RUB").unwrap(),
        None,
        None,
    )
    .unwrap();
    fx.contracts.store(contract.clone()).await.unwrap();

    let count = fx.reconciler.process_data_integrity().await.unwrap();
    assert_eq!(count, 1);

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert!(stored.notes().unwrap().contains("Missing contract number"));
}

#[tokio::test]
async fn data_integrity_counts_only_broken_contracts() {
    let fx = fixture().await;
    fx.approve_mandatory_documents().await;

    // A contract for a client with no verifications on file is flagged;
    // the seeded client's contract with approved documents is not.
    let orphan_client = Uuid::new_v4();
    let mut orphan = Contract::new(
        orphan_client,
        fx.service_id,
        today(),
        days_from_today(365),
        Money::new(dec!(10000), "RUB").unwrap(),
        None,
        None,
    )
    .unwrap();
    orphan.register("CTR-ORPHAN", fx.agent_id).unwrap();
    fx.contracts.store(orphan).await.unwrap();

    store_contract(&fx, 0, 365).await;

    let count = fx.reconciler.process_data_integrity().await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn full_run_against_long_overdue_contract() {
    let fx = fixture().await;
    let contract = store_contract(&fx, -430, -400).await;

    let report = fx.reconciler.run().await.unwrap();
    assert_eq!(report.overdue, 1);
    assert_eq!(report.unpaid, 0);
    assert_eq!(report.renewal_due, 0);
    assert_eq!(report.expired, 1);
    // Already flagged by the overdue pass, still counted here.
    assert_eq!(report.data_integrity, 1);
    assert_eq!(report.total(), 3);

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert!(stored.is_flagged_problem());
    assert_eq!(stored.status(), ContractStatus::Expired);

    // Overdue and expired passes each notify once.
    let sent = fx.notifications.sent().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|n| n.email == "ivan.petrov@example.com"));

    // A second run only repeats the data-integrity count: the contract is
    // now Expired and out of the overdue/expired populations.
    let report = fx.reconciler.run().await.unwrap();
    assert_eq!(report.overdue, 0);
    assert_eq!(report.expired, 0);
    assert_eq!(report.data_integrity, 1);
}

fn reconciler_for(fx: &common::Fixture) -> ContractReconciler {
    ContractReconciler::new(
        fx.contracts.clone(),
        fx.verifications.clone(),
        fx.clients.clone(),
        fx.notifications.clone(),
        ReconciliationConfig::default(),
    )
}

#[tokio::test]
async fn worker_runs_after_start_delay() {
    let fx = fixture().await;
    let contract = store_contract(&fx, -400, -30).await;

    let worker = ReconciliationWorker::new(
        reconciler_for(&fx),
        std::time::Duration::from_millis(10),
        std::time::Duration::from_secs(3600),
    );
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert!(stored.is_flagged_problem());
    assert_eq!(stored.status(), ContractStatus::Expired);
}

#[tokio::test]
async fn worker_shutdown_before_first_run_does_nothing() {
    let fx = fixture().await;
    let contract = store_contract(&fx, -400, -30).await;

    let worker = ReconciliationWorker::new(
        reconciler_for(&fx),
        std::time::Duration::from_secs(3600),
        std::time::Duration::from_secs(3600),
    );
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    let stored = fx.contracts.get(contract.id()).await.unwrap().unwrap();
    assert!(!stored.is_flagged_problem());
    assert_eq!(stored.status(), ContractStatus::Registered);
}
