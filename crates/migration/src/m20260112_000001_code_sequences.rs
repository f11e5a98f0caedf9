//! Per-category counters for sequential record codes.
//!
//! Rows are created lazily by the engine the first time a category allocates
//! a code, seeded from the highest code already stored for that category.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum CodeSequences {
    Table,
    Category,
    LastValue,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CodeSequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CodeSequences::Category)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CodeSequences::LastValue)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CodeSequences::Table).to_owned())
            .await
    }
}
