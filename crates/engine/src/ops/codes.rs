//! Sequential code allocation.
//!
//! Each category keeps its last ordinal in `code_sequences`. Allocation bumps
//! the counter with a single `UPDATE` inside the caller's DB transaction, so
//! two writers can never read the same value. A missing counter row is seeded
//! from the greatest code already stored in the category, which keeps
//! existing data on its sequence.

use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, prelude::*, sea_query::Expr};

use crate::{
    Code, CodeCategory, EngineError, ResultEngine, code_sequences, deposits, transactions,
};

use super::Engine;

impl Engine {
    /// The code the next record of `category` would receive.
    ///
    /// Read-only: nothing is reserved, so a concurrent create may take it.
    pub async fn peek_next_code(&self, category: CodeCategory) -> ResultEngine<Code> {
        let counter = code_sequences::Entity::find_by_id(category.as_str())
            .one(&self.database)
            .await?;
        let last = match counter {
            Some(row) => counter_value(category, row.last_value)?,
            None => last_stored_ordinal(&self.database, category).await?,
        };
        Code::new(category, last + 1)
    }
}

/// Hands out the next code of `category`.
pub(crate) async fn allocate_code<C: ConnectionTrait>(
    db: &C,
    category: CodeCategory,
) -> ResultEngine<Code> {
    let bumped = code_sequences::Entity::update_many()
        .col_expr(
            code_sequences::Column::LastValue,
            Expr::col(code_sequences::Column::LastValue).add(1),
        )
        .filter(code_sequences::Column::Category.eq(category.as_str()))
        .exec(db)
        .await?;

    let code = if bumped.rows_affected == 0 {
        let last = last_stored_code(db, category).await?;
        let code = Code::next_after(category, last.as_deref())?;
        insert_counter(db, category, code.ordinal()).await?;
        code
    } else {
        let row = code_sequences::Entity::find_by_id(category.as_str())
            .one(db)
            .await?
            .ok_or_else(|| {
                EngineError::Corrupted(format!("{} counter vanished", category.as_str()))
            })?;
        Code::new(category, counter_value(category, row.last_value)?)?
    };

    tracing::debug!(%code, "allocated code");
    Ok(code)
}

/// Makes sure the counter of `code`'s category is at least `code`'s ordinal,
/// so a caller-chosen code is never handed out again.
pub(crate) async fn reserve_code<C: ConnectionTrait>(db: &C, code: Code) -> ResultEngine<()> {
    let category = code.category();
    let ordinal = ordinal_to_i64(code.ordinal())?;

    let raised = code_sequences::Entity::update_many()
        .col_expr(code_sequences::Column::LastValue, Expr::value(ordinal))
        .filter(code_sequences::Column::Category.eq(category.as_str()))
        .filter(code_sequences::Column::LastValue.lt(ordinal))
        .exec(db)
        .await?;
    if raised.rows_affected > 0 {
        return Ok(());
    }

    let exists = code_sequences::Entity::find_by_id(category.as_str())
        .one(db)
        .await?
        .is_some();
    if !exists {
        let last = last_stored_ordinal(db, category).await?;
        insert_counter(db, category, last.max(code.ordinal())).await?;
    }
    Ok(())
}

/// Greatest stored code of `category`, compared as text.
///
/// Codes share a fixed prefix and a zero-padded suffix, so the text order
/// matches the numeric order up to `999`.
pub(crate) async fn last_stored_code<C: ConnectionTrait>(
    db: &C,
    category: CodeCategory,
) -> ResultEngine<Option<String>> {
    let code = match category {
        CodeCategory::Income | CodeCategory::Expense => {
            let direction = match category {
                CodeCategory::Income => "income",
                _ => "expense",
            };
            transactions::Entity::find()
                .filter(transactions::Column::Direction.eq(direction))
                .order_by_desc(transactions::Column::Code)
                .one(db)
                .await?
                .map(|model| model.code)
        }
        CodeCategory::Deposit => deposits::Entity::find()
            .order_by_desc(deposits::Column::Code)
            .one(db)
            .await?
            .map(|model| model.code),
    };
    Ok(code)
}

async fn last_stored_ordinal<C: ConnectionTrait>(
    db: &C,
    category: CodeCategory,
) -> ResultEngine<u64> {
    match last_stored_code(db, category).await? {
        Some(code) => Ok(Code::parse_in(&code, category)?.ordinal()),
        None => Ok(0),
    }
}

async fn insert_counter<C: ConnectionTrait>(
    db: &C,
    category: CodeCategory,
    last_value: u64,
) -> ResultEngine<()> {
    code_sequences::ActiveModel {
        category: ActiveValue::Set(category.as_str().to_string()),
        last_value: ActiveValue::Set(ordinal_to_i64(last_value)?),
    }
    .insert(db)
    .await
    .map_err(|err| EngineError::from_write(err, "code"))?;
    Ok(())
}

fn counter_value(category: CodeCategory, last_value: i64) -> ResultEngine<u64> {
    u64::try_from(last_value).map_err(|_| {
        EngineError::Corrupted(format!(
            "{} counter is negative: {last_value}",
            category.as_str()
        ))
    })
}

fn ordinal_to_i64(ordinal: u64) -> ResultEngine<i64> {
    i64::try_from(ordinal).map_err(|_| EngineError::InvalidCode("ordinal too large".to_string()))
}
