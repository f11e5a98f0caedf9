//! Record store schema.
//!
//! - `transactions`: income/expense records, each with a unique sequential code
//! - `deposits`: deposits, each with a unique sequential code and an optional
//!   weak reference to a transaction
//!
//! `deposits.transaction_id` deliberately has no foreign key: deleting a
//! transaction leaves the reference dangling and reads resolve it to nothing.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Code,
    Description,
    AmountMinor,
    Direction,
    Currency,
    Status,
    OccurredAt,
    PaymentMethod,
    Reference,
    Notes,
    AttachmentData,
    AttachmentMime,
    AttachmentSize,
    AttachmentName,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Deposits {
    Table,
    Id,
    Code,
    AmountMinor,
    Currency,
    OccurredAt,
    Recipient,
    Bank,
    AccountNumber,
    DepositType,
    Status,
    Description,
    SupportingDocument,
    Notes,
    TransactionId,
    AttachmentData,
    AttachmentMime,
    AttachmentSize,
    AttachmentName,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Direction).string().not_null())
                    .col(ColumnDef::new(Transactions::Currency).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::PaymentMethod)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Reference).string())
                    .col(ColumnDef::new(Transactions::Notes).string())
                    .col(ColumnDef::new(Transactions::AttachmentData).text())
                    .col(ColumnDef::new(Transactions::AttachmentMime).string())
                    .col(ColumnDef::new(Transactions::AttachmentSize).big_integer())
                    .col(ColumnDef::new(Transactions::AttachmentName).string())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-currency-status")
                    .table(Transactions::Table)
                    .col(Transactions::Currency)
                    .col(Transactions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-direction-occurred_at")
                    .table(Transactions::Table)
                    .col(Transactions::Direction)
                    .col(Transactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Deposits
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Deposits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Deposits::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Deposits::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Deposits::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Deposits::Currency).string().not_null())
                    .col(ColumnDef::new(Deposits::OccurredAt).timestamp().not_null())
                    .col(ColumnDef::new(Deposits::Recipient).string().not_null())
                    .col(ColumnDef::new(Deposits::Bank).string())
                    .col(ColumnDef::new(Deposits::AccountNumber).string())
                    .col(ColumnDef::new(Deposits::DepositType).string().not_null())
                    .col(
                        ColumnDef::new(Deposits::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Deposits::Description).string().not_null())
                    .col(ColumnDef::new(Deposits::SupportingDocument).string())
                    .col(ColumnDef::new(Deposits::Notes).string())
                    .col(ColumnDef::new(Deposits::TransactionId).string())
                    .col(ColumnDef::new(Deposits::AttachmentData).text())
                    .col(ColumnDef::new(Deposits::AttachmentMime).string())
                    .col(ColumnDef::new(Deposits::AttachmentSize).big_integer())
                    .col(ColumnDef::new(Deposits::AttachmentName).string())
                    .col(ColumnDef::new(Deposits::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Deposits::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-deposits-currency-status")
                    .table(Deposits::Table)
                    .col(Deposits::Currency)
                    .col(Deposits::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-deposits-occurred_at")
                    .table(Deposits::Table)
                    .col(Deposits::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-deposits-transaction_id")
                    .table(Deposits::Table)
                    .col(Deposits::TransactionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Deposits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        Ok(())
    }
}
