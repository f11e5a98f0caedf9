use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;

use engine::{
    Currency, DepositType, Engine, EngineError, NewDepositCmd, NewTransactionCmd,
    TransactionDirection,
};
use migration::MigratorTrait;

async fn fresh_engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn feb(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, day, 12, 0, 0).unwrap()
}

fn income_on(at: DateTime<Utc>, amount_minor: i64, currency: Currency) -> NewTransactionCmd {
    NewTransactionCmd::new(
        TransactionDirection::Income,
        amount_minor,
        currency,
        "consulting",
        "transfer",
    )
    .occurred_at(at)
}

#[tokio::test]
async fn monthly_summary_uses_occurrence_date() {
    let engine = fresh_engine().await;
    engine
        .create_transaction(income_on(feb(3), 100, Currency::Usd))
        .await
        .unwrap();
    engine
        .create_transaction(income_on(feb(20), 40, Currency::Pen))
        .await
        .unwrap();
    engine
        .create_transaction(income_on(feb(25), 60, Currency::Usd))
        .await
        .unwrap();
    // January, outside the window
    engine
        .create_transaction(income_on(
            Utc.with_ymd_and_hms(2026, 1, 31, 23, 0, 0).unwrap(),
            1000,
            Currency::Usd,
        ))
        .await
        .unwrap();
    engine
        .create_deposit(
            NewDepositCmd::new(
                75,
                Currency::Eur,
                DepositType::CounterDeposit,
                "Branch",
                "counter",
            )
            .occurred_at(feb(10)),
        )
        .await
        .unwrap();

    let dashboard = engine.dashboard_at(&feb(15)).await.unwrap();
    let monthly = &dashboard.monthly;
    assert_eq!(monthly.month, "2026-02");
    assert_eq!(monthly.income.count, 3);
    assert_eq!(monthly.income.totals_by_currency[&Currency::Usd], 160);
    assert_eq!(monthly.income.totals_by_currency[&Currency::Pen], 40);
    assert_eq!(monthly.expense.count, 0);
    assert_eq!(monthly.expense.last_code, None);
    assert_eq!(monthly.deposits.count, 1);
    assert_eq!(monthly.deposits.totals_by_currency[&Currency::Eur], 75);

    assert_eq!(dashboard.totals.income, 4);
    assert_eq!(dashboard.totals.expense, 0);
    assert_eq!(dashboard.totals.deposits, 1);
}

#[tokio::test]
async fn monthly_total_overflow_is_reported_not_panicked() {
    let engine = fresh_engine().await;
    for day in [3, 4] {
        engine
            .create_transaction(income_on(feb(day), i64::MAX, Currency::Usd))
            .await
            .unwrap();
    }

    let err = engine.dashboard_at(&feb(15)).await.unwrap_err();
    assert!(matches!(err, EngineError::Aggregation(_)));
    assert!(err.is_internal());
}

#[tokio::test]
async fn last_code_is_the_last_created_not_the_greatest() {
    let engine = fresh_engine().await;
    engine
        .create_transaction(income_on(feb(2), 10, Currency::Usd).code("IN010"))
        .await
        .unwrap();
    engine
        .create_transaction(income_on(feb(3), 10, Currency::Usd).code("IN002"))
        .await
        .unwrap();

    let dashboard = engine.dashboard_at(&feb(15)).await.unwrap();
    assert_eq!(dashboard.monthly.income.last_code.as_deref(), Some("IN002"));
}

#[tokio::test]
async fn recent_activity_is_by_creation_time() {
    let engine = fresh_engine().await;
    let linked = engine
        .create_transaction(
            NewTransactionCmd::new(
                TransactionDirection::Expense,
                300,
                Currency::Usd,
                "supplier",
                "cash",
            )
            .occurred_at(Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap()),
        )
        .await
        .unwrap();
    for day in 1..=6 {
        engine
            .create_transaction(income_on(feb(day), 10, Currency::Usd))
            .await
            .unwrap();
    }
    engine
        .create_deposit(
            NewDepositCmd::new(300, Currency::Usd, DepositType::Transfer, "Supplier", "refund")
                .transaction_id(linked.id.clone()),
        )
        .await
        .unwrap();

    let dashboard = engine.dashboard_at(&feb(15)).await.unwrap();
    let recent = &dashboard.recent;

    let codes: Vec<&str> = recent.income.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, ["IN006", "IN005", "IN004", "IN003", "IN002"]);

    // backdated, yet still the most recent expense
    assert_eq!(recent.expense.len(), 1);
    assert_eq!(recent.expense[0].code, "EX001");
    assert_eq!(dashboard.monthly.expense.count, 0);

    let related = recent.deposits[0].related_transaction.as_ref().unwrap();
    assert_eq!(related.id, linked.id);
    assert_eq!(related.code, "EX001");
}
