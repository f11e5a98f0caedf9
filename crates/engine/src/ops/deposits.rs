use std::collections::HashMap;

use chrono::Utc;

use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Attachment, Code, CodeCategory, Deposit, DepositWithRelated, EngineError, NewDepositCmd,
    RelatedTransaction, ResultEngine, UpdateDepositCmd, deposits, transactions,
    util::{ensure_amount, optional_text, record_id, required_text},
};

use super::{
    Engine,
    codes::{allocate_code, reserve_code},
    with_tx,
};

const ATTACHMENT_STEM: &str = "receipt";

impl Engine {
    /// Creates a deposit with the next `DE` code unless the caller supplied
    /// one.
    ///
    /// A `transaction_id`, when given, must point at an existing transaction.
    pub async fn create_deposit(&self, cmd: NewDepositCmd) -> ResultEngine<DepositWithRelated> {
        cmd.currency.ensure_record()?;
        ensure_amount(cmd.amount_minor)?;
        let recipient = required_text(&cmd.recipient, "recipient")?;
        let description = required_text(&cmd.description, "description")?;
        let attachment = cmd
            .attachment
            .as_ref()
            .map(|input| Attachment::from_input(input, ATTACHMENT_STEM))
            .transpose()?;
        let requested_code = cmd
            .code
            .as_deref()
            .map(|code| Code::parse_in(code, CodeCategory::Deposit))
            .transpose()?;

        let now = Utc::now();
        let id = record_id(cmd.id.as_deref());
        let transaction_id = optional_text(cmd.transaction_id.as_deref());

        let created = with_tx!(self, |db_tx| {
            let id_taken = deposits::Entity::find_by_id(id.as_str())
                .one(&db_tx)
                .await?
                .is_some();
            if id_taken {
                return Err(EngineError::ExistingKey("id".to_string()));
            }

            let related = match transaction_id.as_deref() {
                Some(transaction_id) => Some(require_related(&db_tx, transaction_id).await?),
                None => None,
            };

            let code = match requested_code {
                Some(code) => {
                    let code_taken = deposits::Entity::find()
                        .filter(deposits::Column::Code.eq(code.to_string()))
                        .one(&db_tx)
                        .await?
                        .is_some();
                    if code_taken {
                        return Err(EngineError::ExistingKey("code".to_string()));
                    }
                    reserve_code(&db_tx, code).await?;
                    code
                }
                None => allocate_code(&db_tx, CodeCategory::Deposit).await?,
            };

            let deposit = Deposit {
                id,
                code: code.to_string(),
                amount_minor: cmd.amount_minor,
                currency: cmd.currency,
                occurred_at: cmd.occurred_at.unwrap_or(now),
                recipient,
                bank: optional_text(cmd.bank.as_deref()),
                account_number: optional_text(cmd.account_number.as_deref()),
                deposit_type: cmd.deposit_type,
                status: cmd.status,
                description,
                supporting_document: optional_text(cmd.supporting_document.as_deref()),
                notes: optional_text(cmd.notes.as_deref()),
                transaction_id,
                attachment,
                created_at: now,
                updated_at: now,
            };
            deposits::ActiveModel::from(&deposit)
                .insert(&db_tx)
                .await
                .map_err(|err| EngineError::from_write(err, "code"))?;

            Ok::<_, EngineError>(DepositWithRelated {
                deposit,
                related_transaction: related,
            })
        })?;

        tracing::debug!(code = %created.deposit.code, id = %created.deposit.id, "deposit created");
        Ok(created)
    }

    /// Returns a deposit by id, with its related transaction resolved.
    pub async fn deposit(&self, id: &str) -> ResultEngine<DepositWithRelated> {
        let model = deposits::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("deposit".to_string()))?;
        let deposit = Deposit::try_from(model)?;
        self.with_related(vec![deposit])
            .await?
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound("deposit".to_string()))
    }

    /// Returns a deposit by its code (`DE001`, ...).
    pub async fn deposit_by_code(&self, code: &str) -> ResultEngine<DepositWithRelated> {
        let model = deposits::Entity::find()
            .filter(deposits::Column::Code.eq(code.trim()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("deposit {}", code.trim())))?;
        let deposit = Deposit::try_from(model)?;
        self.with_related(vec![deposit])
            .await?
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound(format!("deposit {}", code.trim())))
    }

    /// Lists deposits in creation order.
    pub async fn list_deposits(&self) -> ResultEngine<Vec<DepositWithRelated>> {
        let deposits = deposits::Entity::find()
            .order_by_asc(deposits::Column::CreatedAt)
            .order_by_asc(deposits::Column::Code)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Deposit::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        self.with_related(deposits).await
    }

    /// Applies a partial update. The code never changes.
    pub async fn update_deposit(
        &self,
        id: &str,
        cmd: UpdateDepositCmd,
    ) -> ResultEngine<DepositWithRelated> {
        if let Some(currency) = cmd.currency {
            currency.ensure_record()?;
        }
        if let Some(amount_minor) = cmd.amount_minor {
            ensure_amount(amount_minor)?;
        }
        let recipient = cmd
            .recipient
            .as_deref()
            .map(|s| required_text(s, "recipient"))
            .transpose()?;
        let description = cmd
            .description
            .as_deref()
            .map(|s| required_text(s, "description"))
            .transpose()?;
        let attachment = cmd
            .attachment
            .as_ref()
            .map(|input| Attachment::from_input(input, ATTACHMENT_STEM))
            .transpose()?;

        let deposit = with_tx!(self, |db_tx| {
            let model = deposits::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("deposit".to_string()))?;
            let mut deposit = Deposit::try_from(model)?;

            match cmd.transaction_id.as_ref().map(|id| optional_text(id.as_deref())) {
                Some(Some(transaction_id)) => {
                    require_related(&db_tx, &transaction_id).await?;
                    deposit.transaction_id = Some(transaction_id);
                }
                Some(None) => deposit.transaction_id = None,
                None => {}
            }
            if let Some(amount_minor) = cmd.amount_minor {
                deposit.amount_minor = amount_minor;
            }
            if let Some(currency) = cmd.currency {
                deposit.currency = currency;
            }
            if let Some(occurred_at) = cmd.occurred_at {
                deposit.occurred_at = occurred_at;
            }
            if let Some(recipient) = recipient {
                deposit.recipient = recipient;
            }
            if cmd.bank.is_some() {
                deposit.bank = optional_text(cmd.bank.as_deref());
            }
            if cmd.account_number.is_some() {
                deposit.account_number = optional_text(cmd.account_number.as_deref());
            }
            if let Some(deposit_type) = cmd.deposit_type {
                deposit.deposit_type = deposit_type;
            }
            if let Some(status) = cmd.status {
                deposit.status = status;
            }
            if let Some(description) = description {
                deposit.description = description;
            }
            if cmd.supporting_document.is_some() {
                deposit.supporting_document = optional_text(cmd.supporting_document.as_deref());
            }
            if cmd.notes.is_some() {
                deposit.notes = optional_text(cmd.notes.as_deref());
            }
            if attachment.is_some() {
                deposit.attachment = attachment;
            }
            deposit.updated_at = Utc::now();

            deposits::ActiveModel::from(&deposit).update(&db_tx).await?;
            Ok::<_, EngineError>(deposit)
        })?;

        self.with_related(vec![deposit])
            .await?
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound("deposit".to_string()))
    }

    /// Deletes a deposit. The referenced transaction, if any, is untouched.
    pub async fn delete_deposit(&self, id: &str) -> ResultEngine<()> {
        let result = deposits::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("deposit".to_string()));
        }
        tracing::debug!(id, "deposit deleted");
        Ok(())
    }

    /// Returns the file attached to a deposit.
    pub async fn deposit_attachment(&self, id: &str) -> ResultEngine<Attachment> {
        self.deposit(id)
            .await?
            .deposit
            .attachment
            .ok_or_else(|| EngineError::KeyNotFound("attachment".to_string()))
    }

    /// Pairs each deposit with the summary of the transaction it references.
    pub(crate) async fn with_related(
        &self,
        deposits: Vec<Deposit>,
    ) -> ResultEngine<Vec<DepositWithRelated>> {
        let related = related_transactions(&self.database, &deposits).await?;
        Ok(deposits
            .into_iter()
            .map(|deposit| {
                let related_transaction = deposit
                    .transaction_id
                    .as_ref()
                    .and_then(|id| related.get(id).cloned());
                DepositWithRelated {
                    deposit,
                    related_transaction,
                }
            })
            .collect())
    }
}

/// Looks up every transaction referenced by `deposits` in one query.
///
/// Dangling references are simply absent from the map.
async fn related_transactions<C: ConnectionTrait>(
    db: &C,
    deposits: &[Deposit],
) -> ResultEngine<HashMap<String, RelatedTransaction>> {
    let mut ids: Vec<String> = deposits
        .iter()
        .filter_map(|d| d.transaction_id.clone())
        .collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = transactions::Entity::find()
        .filter(transactions::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(models
        .into_iter()
        .map(|model| {
            let related = RelatedTransaction {
                id: model.id.clone(),
                code: model.code,
                description: model.description,
            };
            (model.id, related)
        })
        .collect())
}

async fn require_related<C: ConnectionTrait>(
    db: &C,
    transaction_id: &str,
) -> ResultEngine<RelatedTransaction> {
    let model = transactions::Entity::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            EngineError::InvalidField("referenced transaction not found".to_string())
        })?;
    Ok(RelatedTransaction {
        id: model.id,
        code: model.code,
        description: model.description,
    })
}
