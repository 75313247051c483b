use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement, TransactionTrait};

use engine::{
    CashbackLedger, CashbackStatus, CycleTag, DebtLedger, Engine, EngineError, GroupStatus,
    LinkedKind, LinkedTransactionCmd, MoneyCents, RecordTransactionCmd, TransactionKind,
    TransactionStatus, Workflow, WorkflowArgs,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn occurred_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
}

fn march() -> CycleTag {
    CycleTag::new(2025, 3).unwrap()
}

fn refund_of(parent_id: Uuid, amount: rust_decimal::Decimal) -> LinkedTransactionCmd {
    let workflow =
        Workflow::from_linked_type("refund", WorkflowArgs::default().amount(amount)).unwrap();
    LinkedTransactionCmd::new(parent_id, workflow)
}

struct Fixture {
    engine: Engine,
    db: DatabaseConnection,
    account_id: Uuid,
    person_id: Uuid,
    parent_id: Uuid,
}

/// Account at 500.00 after an expense of 100.00 that accrued 5.00 cashback
/// (ledger 20.00 / 80.00) and 30.00 debt (ledger 30.00 / 30.00).
async fn refund_scenario() -> Fixture {
    let (engine, db) = engine_with_db().await;
    let account = engine
        .new_account("A1", MoneyCents::new(700_00))
        .await
        .unwrap();
    let person = engine.new_person("Bob").await.unwrap();

    engine
        .record_transaction(
            RecordTransactionCmd::new(
                account.id,
                TransactionKind::Expense,
                MoneyCents::new(100_00),
                occurred_at(),
            )
            .cashback(MoneyCents::new(15_00)),
        )
        .await
        .unwrap();
    engine
        .set_cashback_budget(account.id, &march(), MoneyCents::new(100_00))
        .await
        .unwrap();

    let parent = engine
        .record_transaction(
            RecordTransactionCmd::new(
                account.id,
                TransactionKind::Expense,
                MoneyCents::new(100_00),
                occurred_at(),
            )
            .person_id(person.id)
            .category_id("groceries")
            .cashback(MoneyCents::new(5_00))
            .debt(MoneyCents::new(30_00)),
        )
        .await
        .unwrap();

    Fixture {
        engine,
        db,
        account_id: account.id,
        person_id: person.id,
        parent_id: parent.id,
    }
}

async fn count(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

async fn exec(db: &DatabaseConnection, sql: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, sql.to_string()))
        .await
        .unwrap();
}

#[derive(Debug, PartialEq)]
struct Snapshot {
    balance: MoneyCents,
    parent_status: TransactionStatus,
    cashback_status: CashbackStatus,
    cashback: CashbackLedger,
    debt: DebtLedger,
    transactions: i64,
    groups: i64,
}

async fn snapshot(fx: &Fixture) -> Snapshot {
    Snapshot {
        balance: fx.engine.account(fx.account_id).await.unwrap().balance,
        parent_status: fx.engine.transaction(fx.parent_id).await.unwrap().status,
        cashback_status: fx
            .engine
            .cashback_movement(fx.parent_id)
            .await
            .unwrap()
            .status,
        cashback: fx
            .engine
            .cashback_ledger(fx.account_id, &march())
            .await
            .unwrap(),
        debt: fx
            .engine
            .debt_ledger(fx.person_id, &march())
            .await
            .unwrap(),
        transactions: count(&fx.db, "transactions").await,
        groups: count(&fx.db, "linked_groups").await,
    }
}

#[tokio::test]
async fn scenario_setup_matches_ledgers() {
    let fx = refund_scenario().await;
    let before = snapshot(&fx).await;
    assert_eq!(before.balance, MoneyCents::new(500_00));
    assert_eq!(before.parent_status, TransactionStatus::Active);
    assert_eq!(before.cashback_status, CashbackStatus::Active);
    assert_eq!(before.cashback.total_cashback, MoneyCents::new(20_00));
    assert_eq!(before.cashback.remaining_budget, MoneyCents::new(80_00));
    assert_eq!(before.debt.new_debt, MoneyCents::new(30_00));
    assert_eq!(before.debt.net_debt, MoneyCents::new(30_00));
    assert_eq!(before.transactions, 2);
    assert_eq!(before.groups, 0);
}

#[tokio::test]
async fn refund_reverses_every_ledger() {
    let fx = refund_scenario().await;

    let outcome = fx
        .engine
        .process_linked(refund_of(fx.parent_id, dec!(100.00)))
        .await
        .unwrap();
    assert_eq!(outcome.created_transaction_ids.len(), 1);

    let refund = fx
        .engine
        .transaction(outcome.created_transaction_ids[0])
        .await
        .unwrap();
    assert_eq!(refund.kind, TransactionKind::Income);
    assert_eq!(refund.amount, MoneyCents::new(100_00));
    assert_eq!(refund.status, TransactionStatus::Active);
    assert_eq!(refund.account_id, fx.account_id);
    assert_eq!(refund.person_id, Some(fx.person_id));
    assert_eq!(refund.linked_group_id, Some(outcome.group_id));
    assert_eq!(refund.category_id, None);
    assert!(
        refund
            .notes
            .as_deref()
            .unwrap()
            .contains(&fx.parent_id.to_string())
    );

    let after = snapshot(&fx).await;
    assert_eq!(after.parent_status, TransactionStatus::Canceled);
    assert_eq!(after.balance, MoneyCents::new(600_00));
    assert_eq!(after.cashback_status, CashbackStatus::Invalidated);
    assert_eq!(after.cashback.total_cashback, MoneyCents::new(15_00));
    assert_eq!(after.cashback.remaining_budget, MoneyCents::new(85_00));
    assert_eq!(after.debt.new_debt, MoneyCents::ZERO);
    assert_eq!(after.debt.net_debt, MoneyCents::ZERO);
    assert_eq!(after.transactions, 3);
    assert_eq!(after.groups, 1);

    let movement = fx.engine.cashback_movement(fx.parent_id).await.unwrap();
    assert_eq!(movement.note.as_deref(), Some("Refunded transaction"));
}

#[tokio::test]
async fn group_lists_exactly_the_created_transactions() {
    let fx = refund_scenario().await;

    let outcome = fx
        .engine
        .process_linked(refund_of(fx.parent_id, dec!(40)))
        .await
        .unwrap();

    let group = fx.engine.linked_group(outcome.group_id).await.unwrap();
    assert_eq!(group.kind, LinkedKind::Refund);
    assert_eq!(group.status, GroupStatus::Settled);
    assert_eq!(group.master_transaction_id, fx.parent_id);
    assert_eq!(group.related_transaction_ids, outcome.created_transaction_ids);
}

#[tokio::test]
async fn partial_refund_moves_balance_by_refunded_amount_only() {
    let fx = refund_scenario().await;

    fx.engine
        .process_linked(refund_of(fx.parent_id, dec!(12.345)))
        .await
        .unwrap();

    let account = fx.engine.account(fx.account_id).await.unwrap();
    assert_eq!(account.balance, MoneyCents::new(512_35));
    // Cashback and debt are reversed in full whatever the refunded amount.
    let debt = fx
        .engine
        .debt_ledger(fx.person_id, &march())
        .await
        .unwrap();
    assert_eq!(debt.net_debt, MoneyCents::ZERO);
}

#[tokio::test]
async fn income_parent_is_reversed_by_an_expense() {
    let (engine, _db) = engine_with_db().await;
    let account = engine
        .new_account("Salary", MoneyCents::new(1_000_00))
        .await
        .unwrap();
    let parent = engine
        .record_transaction(RecordTransactionCmd::new(
            account.id,
            TransactionKind::Income,
            MoneyCents::new(200_00),
            occurred_at(),
        ))
        .await
        .unwrap();
    assert_eq!(
        engine.account(account.id).await.unwrap().balance,
        MoneyCents::new(1_200_00)
    );

    let outcome = engine
        .process_linked(refund_of(parent.id, dec!(50)))
        .await
        .unwrap();

    let refund = engine
        .transaction(outcome.created_transaction_ids[0])
        .await
        .unwrap();
    assert_eq!(refund.kind, TransactionKind::Expense);
    assert_eq!(
        engine.account(account.id).await.unwrap().balance,
        MoneyCents::new(1_150_00)
    );
}

#[tokio::test]
async fn full_refund_task_uses_parent_amount() {
    let fx = refund_scenario().await;
    let workflow = Workflow::from_task_type("FULL_REFUND", WorkflowArgs::default()).unwrap();

    let outcome = fx
        .engine
        .process_linked(LinkedTransactionCmd::new(fx.parent_id, workflow))
        .await
        .unwrap();

    let refund = fx
        .engine
        .transaction(outcome.created_transaction_ids[0])
        .await
        .unwrap();
    assert_eq!(refund.amount, MoneyCents::new(100_00));
    assert_eq!(
        fx.engine.account(fx.account_id).await.unwrap().balance,
        MoneyCents::new(600_00)
    );
}

#[tokio::test]
async fn full_refund_task_with_amount_refunds_that_amount() {
    let fx = refund_scenario().await;
    let workflow = Workflow::from_task_type(
        "FULL_REFUND",
        WorkflowArgs::default().amount(dec!(40)),
    )
    .unwrap();

    let outcome = fx
        .engine
        .process_linked(LinkedTransactionCmd::new(fx.parent_id, workflow))
        .await
        .unwrap();

    let refund = fx
        .engine
        .transaction(outcome.created_transaction_ids[0])
        .await
        .unwrap();
    assert_eq!(refund.amount, MoneyCents::new(40_00));
    assert_eq!(
        fx.engine.account(fx.account_id).await.unwrap().balance,
        MoneyCents::new(540_00)
    );
}

#[tokio::test]
async fn partial_refund_task_moves_balance_by_amount() {
    let fx = refund_scenario().await;
    let workflow = Workflow::from_task_type(
        "PARTIAL_REFUND",
        WorkflowArgs::default().amount(dec!(25.50)),
    )
    .unwrap();

    fx.engine
        .process_linked(LinkedTransactionCmd::new(fx.parent_id, workflow))
        .await
        .unwrap();

    let after = snapshot(&fx).await;
    assert_eq!(after.balance, MoneyCents::new(525_50));
    assert_eq!(after.parent_status, TransactionStatus::Canceled);
    assert_eq!(after.groups, 1);
}

#[tokio::test]
async fn person_override_is_used_for_the_refund() {
    let fx = refund_scenario().await;
    let carol = fx.engine.new_person("Carol").await.unwrap();
    let workflow = Workflow::from_linked_type(
        "refund",
        WorkflowArgs::default()
            .amount(dec!(10))
            .person_id(carol.id)
            .notes("returned"),
    )
    .unwrap();

    let outcome = fx
        .engine
        .process_linked(LinkedTransactionCmd::new(fx.parent_id, workflow))
        .await
        .unwrap();

    let refund = fx
        .engine
        .transaction(outcome.created_transaction_ids[0])
        .await
        .unwrap();
    assert_eq!(refund.person_id, Some(carol.id));
    let group = fx.engine.linked_group(outcome.group_id).await.unwrap();
    assert_eq!(group.notes.as_deref(), Some("returned"));
    // Debt is still taken off the parent's person.
    let debt = fx
        .engine
        .debt_ledger(fx.person_id, &march())
        .await
        .unwrap();
    assert_eq!(debt.new_debt, MoneyCents::ZERO);
}

#[tokio::test]
async fn unknown_person_override_changes_nothing() {
    let fx = refund_scenario().await;
    let before = snapshot(&fx).await;
    let workflow = Workflow::from_linked_type(
        "refund",
        WorkflowArgs::default()
            .amount(dec!(10))
            .person_id(Uuid::new_v4()),
    )
    .unwrap();

    let err = fx
        .engine
        .process_linked(LinkedTransactionCmd::new(fx.parent_id, workflow))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::KeyNotFound("person not exists".to_string()));
    assert_eq!(snapshot(&fx).await, before);
}

#[tokio::test]
async fn missing_parent_is_not_found() {
    let (engine, db) = engine_with_db().await;

    let err = engine
        .process_linked(refund_of(Uuid::new_v4(), dec!(1)))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );
    assert_eq!(count(&db, "linked_groups").await, 0);
}

#[tokio::test]
async fn second_refund_of_the_same_parent_is_rejected() {
    let fx = refund_scenario().await;
    fx.engine
        .process_linked(refund_of(fx.parent_id, dec!(100)))
        .await
        .unwrap();
    let after_first = snapshot(&fx).await;

    let err = fx
        .engine
        .process_linked(refund_of(fx.parent_id, dec!(100)))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InvalidArgument("transaction already canceled".to_string())
    );
    assert_eq!(snapshot(&fx).await, after_first);
}

#[tokio::test]
async fn concurrent_refunds_apply_once() {
    let fx = refund_scenario().await;

    let (first, second) = tokio::join!(
        fx.engine
            .process_linked(refund_of(fx.parent_id, dec!(100))),
        fx.engine
            .process_linked(refund_of(fx.parent_id, dec!(100))),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(EngineError::InvalidArgument(msg)) if msg == "transaction already canceled"
    )));

    let after = snapshot(&fx).await;
    assert_eq!(after.balance, MoneyCents::new(600_00));
    assert_eq!(after.cashback.total_cashback, MoneyCents::new(15_00));
    assert_eq!(after.debt.net_debt, MoneyCents::ZERO);
    assert_eq!(after.groups, 1);
}

#[tokio::test]
async fn unimplemented_workflows_leave_no_group() {
    let fx = refund_scenario().await;
    let before = snapshot(&fx).await;

    for workflow in [
        Workflow::Split,
        Workflow::Loan,
        Workflow::Batch,
        Workflow::Settle,
        Workflow::CancelOrder,
    ] {
        let kind = workflow.kind();
        let err = fx
            .engine
            .process_linked(LinkedTransactionCmd::new(fx.parent_id, workflow))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::NotImplemented(format!("{} workflow", kind.as_str()))
        );
    }

    assert_eq!(snapshot(&fx).await, before);
}

#[tokio::test]
async fn failure_at_any_step_rolls_everything_back() {
    let steps = [
        ("transactions", "INSERT"),
        ("linked_groups", "UPDATE"),
        ("transactions", "UPDATE"),
        ("cashback_movements", "UPDATE"),
        ("cashback_ledgers", "UPDATE"),
        ("debt_ledgers", "UPDATE"),
        ("accounts", "UPDATE"),
    ];

    for (table, event) in steps {
        let fx = refund_scenario().await;
        let before = snapshot(&fx).await;
        exec(
            &fx.db,
            &format!(
                "CREATE TRIGGER fail_step BEFORE {event} ON {table} \
                 BEGIN SELECT RAISE(ABORT, 'forced failure'); END"
            ),
        )
        .await;

        let err = fx
            .engine
            .process_linked(refund_of(fx.parent_id, dec!(100)))
            .await
            .unwrap_err();
        assert!(
            matches!(err, EngineError::Database(_)),
            "{event} on {table}: {err:?}"
        );

        exec(&fx.db, "DROP TRIGGER fail_step").await;
        assert_eq!(snapshot(&fx).await, before, "{event} on {table}");
    }
}

#[tokio::test]
async fn missing_cashback_ledger_is_skipped() {
    let fx = refund_scenario().await;
    exec(&fx.db, "DELETE FROM cashback_ledgers").await;

    fx.engine
        .process_linked(refund_of(fx.parent_id, dec!(100)))
        .await
        .unwrap();

    let movement = fx.engine.cashback_movement(fx.parent_id).await.unwrap();
    assert_eq!(movement.status, CashbackStatus::Invalidated);
    assert_eq!(count(&fx.db, "cashback_ledgers").await, 0);
    assert_eq!(
        fx.engine.account(fx.account_id).await.unwrap().balance,
        MoneyCents::new(600_00)
    );
}

#[tokio::test]
async fn debt_is_reversed_in_the_movement_cycle() {
    let fx = refund_scenario().await;
    let february = CycleTag::new(2025, 2).unwrap();
    exec(
        &fx.db,
        "UPDATE debt_movements SET cycle_tag = '2025-02'",
    )
    .await;
    exec(
        &fx.db,
        &format!(
            "INSERT INTO debt_ledgers (id, person_id, cycle_tag, new_debt_minor, net_debt_minor, updated_at) \
             VALUES ('{}', '{}', '2025-02', 5000, 5000, '2025-02-28T00:00:00+00:00')",
            Uuid::new_v4(),
            fx.person_id
        ),
    )
    .await;

    fx.engine
        .process_linked(refund_of(fx.parent_id, dec!(100)))
        .await
        .unwrap();

    let feb = fx
        .engine
        .debt_ledger(fx.person_id, &february)
        .await
        .unwrap();
    assert_eq!(feb.new_debt, MoneyCents::new(20_00));
    assert_eq!(feb.net_debt, MoneyCents::new(20_00));
    let mar = fx
        .engine
        .debt_ledger(fx.person_id, &march())
        .await
        .unwrap();
    assert_eq!(mar.net_debt, MoneyCents::new(30_00));
}

#[tokio::test]
async fn expired_deadline_rolls_back() {
    let fx = refund_scenario().await;
    let before = snapshot(&fx).await;

    // Holding the only pooled connection keeps the workflow waiting.
    let blocker = fx.db.begin().await.unwrap();
    let err = fx
        .engine
        .process_linked_within(
            refund_of(fx.parent_id, dec!(100)),
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();
    blocker.rollback().await.unwrap();

    assert_eq!(
        err,
        EngineError::DeadlineExceeded(Duration::from_millis(50))
    );
    assert_eq!(snapshot(&fx).await, before);
}

#[tokio::test]
async fn deadline_expiry_mid_unit_of_work_leaves_nothing_applied() {
    for micros in (1..=3_000).step_by(200) {
        let fx = refund_scenario().await;
        let before = snapshot(&fx).await;
        let deadline = Duration::from_micros(micros);

        let result = fx
            .engine
            .process_linked_within(refund_of(fx.parent_id, dec!(100)), deadline)
            .await;

        let after = snapshot(&fx).await;
        match result {
            Ok(_) => {
                assert_eq!(after.balance, MoneyCents::new(600_00), "{micros}us");
                assert_eq!(after.parent_status, TransactionStatus::Canceled, "{micros}us");
            }
            Err(err) => {
                assert_eq!(err, EngineError::DeadlineExceeded(deadline), "{micros}us");
                assert_eq!(after, before, "{micros}us");
            }
        }
    }
}

#[tokio::test]
async fn engine_default_deadline_is_applied() {
    let (_, db) = engine_with_db().await;
    let engine = Engine::builder()
        .database(db.clone())
        .deadline(Duration::from_millis(20))
        .build()
        .await
        .unwrap();
    assert_eq!(engine.default_deadline(), Some(Duration::from_millis(20)));

    let blocker = db.begin().await.unwrap();
    let err = engine
        .process_linked(refund_of(Uuid::new_v4(), dec!(1)))
        .await
        .unwrap_err();
    blocker.rollback().await.unwrap();

    assert_eq!(
        err,
        EngineError::DeadlineExceeded(Duration::from_millis(20))
    );
}

#[tokio::test]
async fn zero_deadline_is_rejected() {
    let err = Engine::builder()
        .deadline(Duration::ZERO)
        .build()
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidArgument("deadline must be > 0".to_string())
    );
}
