use chrono::{TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Currency, DepositStatus, DepositType, Engine, EngineError, MovementCategory, MovementKind,
    NewDepositCmd, NewTransactionCmd, TransactionDirection, TransactionStatus,
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

async fn confirmed_tx(
    engine: &Engine,
    direction: TransactionDirection,
    amount_minor: i64,
    currency: Currency,
) -> String {
    engine
        .create_transaction(
            NewTransactionCmd::new(direction, amount_minor, currency, "movement", "transfer")
                .status(TransactionStatus::Confirmed),
        )
        .await
        .unwrap()
        .code
}

async fn confirmed_deposit(engine: &Engine, amount_minor: i64, currency: Currency) -> String {
    engine
        .create_deposit(
            NewDepositCmd::new(
                amount_minor,
                currency,
                DepositType::Cash,
                "Treasury",
                "cash deposit",
            )
            .status(DepositStatus::Confirmed),
        )
        .await
        .unwrap()
        .deposit
        .code
}

#[tokio::test]
async fn balance_adds_income_and_deposits_minus_expense() {
    let (engine, _db) = engine_with_db().await;
    confirmed_tx(&engine, TransactionDirection::Income, 100, Currency::Usd).await;
    confirmed_tx(&engine, TransactionDirection::Expense, 30, Currency::Usd).await;
    confirmed_deposit(&engine, 20, Currency::Usd).await;

    let balance = engine.balance(Currency::Usd).await.unwrap();
    assert_eq!(balance.current_balance_minor, 90);
    assert_eq!(balance.total_income_minor, 100);
    assert_eq!(balance.total_expense_minor, 30);
    assert_eq!(balance.total_deposits_minor, 20);
    assert!(balance.last_movement_at.is_some());

    assert_eq!(engine.balance(Currency::Usd).await.unwrap(), balance);
}

#[tokio::test]
async fn only_confirmed_records_of_the_currency_count() {
    let (engine, _db) = engine_with_db().await;
    confirmed_tx(&engine, TransactionDirection::Income, 100, Currency::Usd).await;
    confirmed_tx(&engine, TransactionDirection::Income, 700, Currency::Eur).await;
    engine
        .create_transaction(NewTransactionCmd::new(
            TransactionDirection::Income,
            5000,
            Currency::Usd,
            "not yet",
            "cash",
        ))
        .await
        .unwrap();
    engine
        .create_deposit(
            NewDepositCmd::new(40, Currency::Usd, DepositType::Check, "Bank", "bounced")
                .status(DepositStatus::Rejected),
        )
        .await
        .unwrap();

    let usd = engine.balance(Currency::Usd).await.unwrap();
    assert_eq!(usd.current_balance_minor, 100);
    assert_eq!(usd.total_deposits_minor, 0);

    let pen = engine.balance(Currency::Pen).await.unwrap();
    assert_eq!(pen.current_balance_minor, 0);
    assert_eq!(pen.last_movement_at, None);
}

#[tokio::test]
async fn unsupported_currency_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.balance_for("XYZ").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidCurrency(_)));
    assert!(err.is_validation());

    let mxn = engine.balance_for("mxn").await.unwrap();
    assert_eq!(mxn.currency, Currency::Mxn);
    assert_eq!(mxn.current_balance_minor, 0);
}

#[tokio::test]
async fn all_balances_isolate_a_failing_currency() {
    let (engine, db) = engine_with_db().await;
    confirmed_tx(&engine, TransactionDirection::Income, 100, Currency::Usd).await;
    confirmed_deposit(&engine, 50, Currency::Eur).await;

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO transactions \
         (id, code, description, amount_minor, direction, currency, status, occurred_at, \
          payment_method, created_at, updated_at) \
         VALUES (?, 'XX001', 'broken', 10, 'sideways', 'PEN', 'confirmed', ?, 'cash', ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            "2026-01-05T10:00:00+00:00".into(),
            "2026-01-05T10:00:00+00:00".into(),
            "2026-01-05T10:00:00+00:00".into(),
        ],
    ))
    .await
    .unwrap();

    let err = engine.balance(Currency::Pen).await.unwrap_err();
    assert!(matches!(err, EngineError::Aggregation(_)));

    let entries = engine.all_balances().await;
    let currencies: Vec<Currency> = entries.iter().map(|e| e.balance.currency).collect();
    assert_eq!(currencies, Currency::ALL);

    let pen = &entries[2];
    assert_eq!(pen.balance.current_balance_minor, 0);
    assert!(pen.error.is_some());

    assert_eq!(entries[0].balance.current_balance_minor, 100);
    assert_eq!(entries[0].error, None);
    assert_eq!(entries[1].balance.total_deposits_minor, 50);
    assert!(entries[3..].iter().all(|e| e.error.is_none()));
}

#[tokio::test]
async fn movements_merge_and_sort_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let first = confirmed_tx(&engine, TransactionDirection::Income, 100, Currency::Pen).await;
    let second = confirmed_deposit(&engine, 20, Currency::Pen).await;
    let third = confirmed_tx(&engine, TransactionDirection::Expense, 30, Currency::Pen).await;
    confirmed_tx(&engine, TransactionDirection::Income, 999, Currency::Usd).await;

    let movements = engine.recent_movements(Currency::Pen, 10).await.unwrap();
    let codes: Vec<&str> = movements.iter().map(|m| m.code.as_str()).collect();
    assert_eq!(codes, [third.as_str(), second.as_str(), first.as_str()]);
    assert_eq!(movements[0].kind, MovementKind::Expense);
    assert_eq!(movements[1].kind, MovementKind::Deposit);
    assert_eq!(movements[1].category, MovementCategory::Deposit);
    assert_eq!(movements[2].category, MovementCategory::Transaction);

    let latest = engine.recent_movements(Currency::Pen, 1).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].code, third);
}

#[tokio::test]
async fn movement_limit_bounds() {
    let (engine, _db) = engine_with_db().await;

    for limit in [0, 101] {
        let err = engine
            .recent_movements(Currency::Usd, limit)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidLimit(_)));
    }
    for limit in [1, 100] {
        assert!(engine.recent_movements(Currency::Usd, limit).await.is_ok());
    }
    assert!(matches!(
        engine.balance_summary(Currency::Usd, 0).await,
        Err(EngineError::InvalidLimit(_))
    ));
}

#[tokio::test]
async fn statistics_and_summary() {
    let (engine, _db) = engine_with_db().await;
    confirmed_tx(&engine, TransactionDirection::Income, 100, Currency::Eur).await;
    confirmed_tx(&engine, TransactionDirection::Income, 300, Currency::Eur).await;
    confirmed_tx(&engine, TransactionDirection::Expense, 50, Currency::Eur).await;

    let stats = engine.statistics(Currency::Eur).await.unwrap();
    assert_eq!(stats.income.count, 2);
    assert_eq!(stats.income.total_minor, 400);
    assert_eq!(stats.income.average_minor, 200.0);
    assert_eq!(stats.expense.count, 1);
    assert_eq!(stats.deposits.count, 0);
    assert_eq!(stats.deposits.average_minor, 0.0);

    let before = Utc::now();
    let summary = engine.balance_summary(Currency::Eur, 2).await.unwrap();
    assert_eq!(summary.balance.current_balance_minor, 350);
    assert_eq!(summary.recent_movements.len(), 2);
    assert_eq!(summary.statistics, stats);
    assert!(summary.queried_at >= before);
}

#[tokio::test]
async fn last_movement_is_the_latest_creation() {
    let (engine, _db) = engine_with_db().await;
    let old = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    engine
        .create_transaction(
            NewTransactionCmd::new(
                TransactionDirection::Income,
                10,
                Currency::Usd,
                "backdated",
                "cash",
            )
            .status(TransactionStatus::Confirmed)
            .occurred_at(old),
        )
        .await
        .unwrap();
    confirmed_deposit(&engine, 5, Currency::Usd).await;

    // occurred_at is ignored, creation time decides
    let balance = engine.balance(Currency::Usd).await.unwrap();
    let last = balance.last_movement_at.unwrap();
    assert!(last > Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
}
