use std::time::Duration;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AttachmentInput, CodeCategory, Currency, DepositType, Engine, EngineError, NewDepositCmd,
    NewTransactionCmd, TransactionDirection, TransactionStatus, UpdateDepositCmd,
    UpdateTransactionCmd,
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

fn income(amount_minor: i64) -> NewTransactionCmd {
    NewTransactionCmd::new(
        TransactionDirection::Income,
        amount_minor,
        Currency::Usd,
        "Invoice payment",
        "transfer",
    )
}

fn expense(amount_minor: i64) -> NewTransactionCmd {
    NewTransactionCmd::new(
        TransactionDirection::Expense,
        amount_minor,
        Currency::Usd,
        "Office rent",
        "cash",
    )
}

fn deposit(amount_minor: i64, currency: Currency) -> NewDepositCmd {
    NewDepositCmd::new(
        amount_minor,
        currency,
        DepositType::Transfer,
        "ACME S.A.C.",
        "Supplier advance",
    )
}

async fn insert_raw_transaction(db: &DatabaseConnection, code: &str, direction: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO transactions \
         (id, code, description, amount_minor, direction, currency, status, occurred_at, \
          payment_method, created_at, updated_at) \
         VALUES (?, ?, 'imported', 100, ?, 'USD', 'confirmed', ?, 'cash', ?, ?)",
        vec![
            Uuid::new_v4().to_string().into(),
            code.into(),
            direction.into(),
            "2026-01-05T10:00:00+00:00".into(),
            "2026-01-05T10:00:00+00:00".into(),
            "2026-01-05T10:00:00+00:00".into(),
        ],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn first_codes_start_at_one() {
    let (engine, _db) = engine_with_db().await;

    let tx = engine.create_transaction(income(1000)).await.unwrap();
    assert_eq!(tx.code, "IN001");
    let tx = engine.create_transaction(expense(500)).await.unwrap();
    assert_eq!(tx.code, "EX001");
    let dep = engine
        .create_deposit(deposit(200, Currency::Pen))
        .await
        .unwrap();
    assert_eq!(dep.deposit.code, "DE001");
}

#[tokio::test]
async fn income_and_expense_sequences_are_independent() {
    let (engine, _db) = engine_with_db().await;

    for _ in 0..3 {
        engine.create_transaction(income(100)).await.unwrap();
    }
    let ex = engine.create_transaction(expense(100)).await.unwrap();
    let inc = engine.create_transaction(income(100)).await.unwrap();

    assert_eq!(ex.code, "EX001");
    assert_eq!(inc.code, "IN004");
    assert_eq!(
        engine
            .peek_next_code(CodeCategory::Expense)
            .await
            .unwrap()
            .to_string(),
        "EX002"
    );
}

#[tokio::test]
async fn deposits_share_one_sequence_across_currencies() {
    let (engine, _db) = engine_with_db().await;

    let codes: Vec<String> = {
        let mut codes = Vec::new();
        for currency in [Currency::Usd, Currency::Pen, Currency::Eur] {
            let created = engine.create_deposit(deposit(10, currency)).await.unwrap();
            codes.push(created.deposit.code);
        }
        codes
    };
    assert_eq!(codes, ["DE001", "DE002", "DE003"]);
}

#[tokio::test]
async fn sequence_continues_from_existing_records() {
    let (engine, db) = engine_with_db().await;
    insert_raw_transaction(&db, "IN041", "income").await;
    insert_raw_transaction(&db, "IN007", "income").await;

    let next = engine.peek_next_code(CodeCategory::Income).await.unwrap();
    assert_eq!(next.to_string(), "IN042");

    let tx = engine.create_transaction(income(100)).await.unwrap();
    assert_eq!(tx.code, "IN042");
}

#[tokio::test]
async fn malformed_stored_code_is_reported() {
    let (engine, db) = engine_with_db().await;
    insert_raw_transaction(&db, "INX12", "income").await;

    let err = engine.create_transaction(income(100)).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidCode(_)));
}

#[tokio::test]
async fn explicit_code_raises_the_sequence() {
    let (engine, _db) = engine_with_db().await;

    let tx = engine
        .create_transaction(income(100).code("IN007"))
        .await
        .unwrap();
    assert_eq!(tx.code, "IN007");

    let next = engine.create_transaction(income(100)).await.unwrap();
    assert_eq!(next.code, "IN008");

    let err = engine
        .create_transaction(income(100).code("IN007"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("code".to_string()));

    let err = engine
        .create_transaction(income(100).code("EX009"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCode(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_distinct_contiguous_codes() {
    let path = std::env::temp_dir().join(format!("unifypay-{}.db", Uuid::new_v4()));
    let db = Database::connect(format!("sqlite:{}?mode=rwc", path.display()))
        .await
        .unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    let mut handles = Vec::new();
    for amount in 1..=20 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            // a writer that loses the database lock gets a store error and tries again
            for _ in 0..100 {
                match engine.create_transaction(income(amount)).await {
                    Err(EngineError::Database(_)) => {
                        tokio::time::sleep(Duration::from_millis(10)).await
                    }
                    other => return other,
                }
            }
            engine.create_transaction(income(amount)).await
        }));
    }

    let mut codes = Vec::new();
    for handle in handles {
        codes.push(handle.await.unwrap().unwrap().code);
    }
    codes.sort();
    let expected: Vec<String> = (1..=20).map(|n| format!("IN{n:03}")).collect();
    assert_eq!(codes, expected);
    assert_eq!(
        engine
            .peek_next_code(CodeCategory::Income)
            .await
            .unwrap()
            .to_string(),
        "IN021"
    );

    drop(engine);
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn duplicate_id_is_a_conflict() {
    let (engine, _db) = engine_with_db().await;
    let id = Uuid::new_v4().to_string();

    engine
        .create_transaction(income(100).id(id.clone()))
        .await
        .unwrap();
    let err = engine
        .create_transaction(expense(100).id(id))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("id".to_string()));
}

#[tokio::test]
async fn caller_ids_are_opaque_strings() {
    let (engine, _db) = engine_with_db().await;

    let tx = engine
        .create_transaction(income(100).id("TXN-2024-001"))
        .await
        .unwrap();
    assert_eq!(tx.id, "TXN-2024-001");
    assert_eq!(engine.transaction("TXN-2024-001").await.unwrap().code, "IN001");

    let updated = engine
        .update_transaction(
            "TXN-2024-001",
            UpdateTransactionCmd {
                amount_minor: Some(300),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount_minor, 300);

    let dep = engine
        .create_deposit(
            deposit(100, Currency::Usd)
                .id("DEP-7")
                .transaction_id("TXN-2024-001"),
        )
        .await
        .unwrap();
    assert_eq!(dep.deposit.id, "DEP-7");
    assert_eq!(
        dep.related_transaction.map(|related| related.id).as_deref(),
        Some("TXN-2024-001")
    );

    // blank ids are generated
    let generated = engine.create_transaction(income(1).id("  ")).await.unwrap();
    assert!(Uuid::parse_str(&generated.id).is_ok());

    engine.delete_transaction("TXN-2024-001").await.unwrap();
    assert!(matches!(
        engine.transaction("TXN-2024-001").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.deposit("not-a-deposit").await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn records_reject_balance_only_currencies() {
    let (engine, _db) = engine_with_db().await;

    let mut cmd = income(100);
    cmd.currency = Currency::Mxn;
    let err = engine.create_transaction(cmd).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidCurrency(_)));

    let err = engine
        .create_deposit(deposit(100, Currency::Cop))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCurrency(_)));
}

#[tokio::test]
async fn required_fields_and_amounts_are_validated() {
    let (engine, _db) = engine_with_db().await;

    let cmd = NewTransactionCmd::new(
        TransactionDirection::Income,
        100,
        Currency::Usd,
        "  ",
        "cash",
    );
    let err = engine.create_transaction(cmd).await.unwrap_err();
    assert_eq!(err, EngineError::MissingField("description".to_string()));

    let err = engine.create_transaction(income(-1)).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    // nothing was written, so the sequence is untouched
    let tx = engine.create_transaction(income(100)).await.unwrap();
    assert_eq!(tx.code, "IN001");
}

#[tokio::test]
async fn update_keeps_code_and_direction() {
    let (engine, _db) = engine_with_db().await;
    let tx = engine.create_transaction(income(100)).await.unwrap();

    let updated = engine
        .update_transaction(
            &tx.id,
            UpdateTransactionCmd {
                amount_minor: Some(250),
                status: Some(TransactionStatus::Confirmed),
                notes: Some("paid late".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.code, "IN001");
    assert_eq!(updated.direction, TransactionDirection::Income);
    assert_eq!(updated.amount_minor, 250);
    assert_eq!(updated.status, TransactionStatus::Confirmed);
    assert_eq!(updated.notes.as_deref(), Some("paid late"));
    let by_code = engine.transaction_by_code("IN001").await.unwrap();
    assert_eq!(by_code.id, tx.id);
    assert_eq!(by_code.amount_minor, 250);
}

#[tokio::test]
async fn list_filters_by_direction_in_creation_order() {
    let (engine, _db) = engine_with_db().await;
    engine.create_transaction(income(1)).await.unwrap();
    engine.create_transaction(expense(2)).await.unwrap();
    engine.create_transaction(income(3)).await.unwrap();

    let all = engine.list_transactions(None).await.unwrap();
    let codes: Vec<&str> = all.iter().map(|t| t.code.as_str()).collect();
    assert_eq!(codes, ["IN001", "EX001", "IN002"]);

    let incomes = engine
        .list_transactions(Some(TransactionDirection::Income))
        .await
        .unwrap();
    assert_eq!(incomes.len(), 2);
    assert!(
        incomes
            .iter()
            .all(|t| t.direction == TransactionDirection::Income)
    );
}

#[tokio::test]
async fn delete_then_lookup_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let tx = engine.create_transaction(income(100)).await.unwrap();

    engine.delete_transaction(&tx.id).await.unwrap();
    assert!(matches!(
        engine.transaction(&tx.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.delete_transaction(&tx.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn deleted_codes_are_not_handed_out_again() {
    let (engine, _db) = engine_with_db().await;
    engine.create_transaction(income(1)).await.unwrap();
    let last = engine.create_transaction(income(2)).await.unwrap();
    assert_eq!(last.code, "IN002");

    engine.delete_transaction(&last.id).await.unwrap();

    let next = engine.create_transaction(income(3)).await.unwrap();
    assert_eq!(next.code, "IN003");
}

#[tokio::test]
async fn deposit_reference_must_exist_on_write() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_deposit(deposit(100, Currency::Usd).transaction_id("TXN-404"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidField("referenced transaction not found".to_string())
    );

    let created = engine
        .create_deposit(deposit(100, Currency::Usd))
        .await
        .unwrap();
    let err = engine
        .update_deposit(
            &created.deposit.id,
            UpdateDepositCmd {
                transaction_id: Some(Some("TXN-404".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField(_)));
}

#[tokio::test]
async fn dangling_reference_resolves_to_none() {
    let (engine, _db) = engine_with_db().await;
    let tx = engine.create_transaction(expense(500)).await.unwrap();

    let created = engine
        .create_deposit(deposit(500, Currency::Usd).transaction_id(tx.id.clone()))
        .await
        .unwrap();
    let related = created.related_transaction.unwrap();
    assert_eq!(related.code, "EX001");
    assert_eq!(related.description, "Office rent");

    engine.delete_transaction(&tx.id).await.unwrap();

    let fetched = engine.deposit(&created.deposit.id).await.unwrap();
    assert_eq!(fetched.deposit.transaction_id, Some(tx.id));
    assert_eq!(fetched.related_transaction, None);
    assert_eq!(engine.list_deposits().await.unwrap().len(), 1);
}

#[tokio::test]
async fn deposit_reference_can_be_removed() {
    let (engine, _db) = engine_with_db().await;
    let tx = engine.create_transaction(expense(500)).await.unwrap();
    let created = engine
        .create_deposit(deposit(500, Currency::Usd).transaction_id(tx.id.clone()))
        .await
        .unwrap();

    // leaving the field out keeps the link
    let kept = engine
        .update_deposit(
            &created.deposit.id,
            UpdateDepositCmd {
                notes: Some("checked".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(kept.deposit.transaction_id.as_deref(), Some(tx.id.as_str()));

    let cleared = engine
        .update_deposit(
            &created.deposit.id,
            UpdateDepositCmd {
                transaction_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.deposit.transaction_id, None);
    assert_eq!(cleared.related_transaction, None);

    let fetched = engine.deposit(&created.deposit.id).await.unwrap();
    assert_eq!(fetched.deposit.transaction_id, None);
}

#[tokio::test]
async fn attachments_are_validated_and_stored() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_deposit(deposit(100, Currency::Eur).attachment(AttachmentInput {
            data_url: "data:text/plain;base64,aGVsbG8=".to_string(),
            name: None,
        }))
        .await
        .unwrap();
    let attachment = engine
        .deposit_attachment(&created.deposit.id)
        .await
        .unwrap();
    assert_eq!(attachment.mime_type, "text/plain");
    assert_eq!(attachment.size_bytes, 5);
    assert!(attachment.name.starts_with("receipt_"));
    assert_eq!(attachment.bytes().unwrap(), b"hello");

    let err = engine
        .create_transaction(income(100).attachment(AttachmentInput {
            data_url: "data:application/zip;base64,aGVsbG8=".to_string(),
            name: Some("archive.zip".to_string()),
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAttachment(_)));

    let tx = engine.create_transaction(income(100)).await.unwrap();
    assert!(matches!(
        engine.transaction_attachment(&tx.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
