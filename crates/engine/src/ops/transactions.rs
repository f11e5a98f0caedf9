use chrono::Utc;

use sea_orm::{ActiveModelTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Attachment, Code, CodeCategory, EngineError, NewTransactionCmd, ResultEngine, Transaction,
    TransactionDirection, UpdateTransactionCmd, transactions,
    util::{ensure_amount, optional_text, record_id, required_text},
};

use super::{
    Engine,
    codes::{allocate_code, reserve_code},
    with_tx,
};

const ATTACHMENT_STEM: &str = "attachment";

impl Engine {
    /// Creates a transaction, allocating its code from the direction's
    /// sequence unless the caller supplied one.
    ///
    /// Validation (currency, amount, required fields, attachment, code
    /// format) happens before anything is written.
    pub async fn create_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Transaction> {
        cmd.currency.ensure_record()?;
        ensure_amount(cmd.amount_minor)?;
        let description = required_text(&cmd.description, "description")?;
        let payment_method = required_text(&cmd.payment_method, "payment_method")?;
        let attachment = cmd
            .attachment
            .as_ref()
            .map(|input| Attachment::from_input(input, ATTACHMENT_STEM))
            .transpose()?;
        let category = CodeCategory::from(cmd.direction);
        let requested_code = cmd
            .code
            .as_deref()
            .map(|code| Code::parse_in(code, category))
            .transpose()?;

        let now = Utc::now();
        let id = record_id(cmd.id.as_deref());

        let tx = with_tx!(self, |db_tx| {
            let id_taken = transactions::Entity::find_by_id(id.as_str())
                .one(&db_tx)
                .await?
                .is_some();
            if id_taken {
                return Err(EngineError::ExistingKey("id".to_string()));
            }

            let code = match requested_code {
                Some(code) => {
                    let code_taken = transactions::Entity::find()
                        .filter(transactions::Column::Code.eq(code.to_string()))
                        .one(&db_tx)
                        .await?
                        .is_some();
                    if code_taken {
                        return Err(EngineError::ExistingKey("code".to_string()));
                    }
                    reserve_code(&db_tx, code).await?;
                    code
                }
                None => allocate_code(&db_tx, category).await?,
            };

            let tx = Transaction {
                id,
                code: code.to_string(),
                description,
                amount_minor: cmd.amount_minor,
                direction: cmd.direction,
                currency: cmd.currency,
                status: cmd.status,
                occurred_at: cmd.occurred_at.unwrap_or(now),
                payment_method,
                reference: optional_text(cmd.reference.as_deref()),
                notes: optional_text(cmd.notes.as_deref()),
                attachment,
                created_at: now,
                updated_at: now,
            };
            transactions::ActiveModel::from(&tx)
                .insert(&db_tx)
                .await
                .map_err(|err| EngineError::from_write(err, "code"))?;
            Ok::<_, EngineError>(tx)
        })?;

        tracing::debug!(code = %tx.code, id = %tx.id, "transaction created");
        Ok(tx)
    }

    /// Returns a transaction by id.
    pub async fn transaction(&self, id: &str) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction".to_string()))?;
        Transaction::try_from(model)
    }

    /// Returns a transaction by its code (`IN001`, `EX014`, ...).
    pub async fn transaction_by_code(&self, code: &str) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find()
            .filter(transactions::Column::Code.eq(code.trim()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {}", code.trim())))?;
        Transaction::try_from(model)
    }

    /// Lists transactions in creation order, optionally restricted to one
    /// direction.
    pub async fn list_transactions(
        &self,
        direction: Option<TransactionDirection>,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find();
        if let Some(direction) = direction {
            query = query.filter(transactions::Column::Direction.eq(direction.as_str()));
        }
        query
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(transactions::Column::Code)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// Applies a partial update. The code and direction never change.
    pub async fn update_transaction(
        &self,
        id: &str,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<Transaction> {
        if let Some(currency) = cmd.currency {
            currency.ensure_record()?;
        }
        if let Some(amount_minor) = cmd.amount_minor {
            ensure_amount(amount_minor)?;
        }
        let description = cmd
            .description
            .as_deref()
            .map(|s| required_text(s, "description"))
            .transpose()?;
        let payment_method = cmd
            .payment_method
            .as_deref()
            .map(|s| required_text(s, "payment_method"))
            .transpose()?;
        let attachment = cmd
            .attachment
            .as_ref()
            .map(|input| Attachment::from_input(input, ATTACHMENT_STEM))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction".to_string()))?;
            let mut tx = Transaction::try_from(model)?;

            if let Some(description) = description {
                tx.description = description;
            }
            if let Some(amount_minor) = cmd.amount_minor {
                tx.amount_minor = amount_minor;
            }
            if let Some(currency) = cmd.currency {
                tx.currency = currency;
            }
            if let Some(status) = cmd.status {
                tx.status = status;
            }
            if let Some(occurred_at) = cmd.occurred_at {
                tx.occurred_at = occurred_at;
            }
            if let Some(payment_method) = payment_method {
                tx.payment_method = payment_method;
            }
            if cmd.reference.is_some() {
                tx.reference = optional_text(cmd.reference.as_deref());
            }
            if cmd.notes.is_some() {
                tx.notes = optional_text(cmd.notes.as_deref());
            }
            if attachment.is_some() {
                tx.attachment = attachment;
            }
            tx.updated_at = Utc::now();

            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            Ok(tx)
        })
    }

    /// Deletes a transaction.
    ///
    /// Deposits pointing at it are left alone; their reference resolves to
    /// nothing from now on.
    pub async fn delete_transaction(&self, id: &str) -> ResultEngine<()> {
        let result = transactions::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("transaction".to_string()));
        }
        tracing::debug!(id, "transaction deleted");
        Ok(())
    }

    /// Returns the file attached to a transaction.
    pub async fn transaction_attachment(&self, id: &str) -> ResultEngine<Attachment> {
        self.transaction(id)
            .await?
            .attachment
            .ok_or_else(|| EngineError::KeyNotFound("attachment".to_string()))
    }
}
