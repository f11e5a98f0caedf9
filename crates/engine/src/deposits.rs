//! Deposit primitives.
//!
//! A deposit may point at a [`Transaction`](crate::Transaction) through
//! `transaction_id`. The reference is weak: it is checked when written,
//! resolved when read, and never cascades.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Attachment, Currency, EngineError, util::model_currency};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositType {
    Transfer,
    Cash,
    Check,
    CounterDeposit,
}

impl DepositType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Cash => "cash",
            Self::Check => "check",
            Self::CounterDeposit => "counter_deposit",
        }
    }
}

impl TryFrom<&str> for DepositType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "transfer" => Ok(Self::Transfer),
            "cash" => Ok(Self::Cash),
            "check" => Ok(Self::Check),
            "counter_deposit" => Ok(Self::CounterDeposit),
            other => Err(EngineError::InvalidField(format!(
                "invalid deposit type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    Confirmed,
    #[default]
    Pending,
    Rejected,
}

impl DepositStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for DepositStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "confirmed" => Ok(Self::Confirmed),
            "pending" => Ok(Self::Pending),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidField(format!(
                "invalid deposit status: {other}"
            ))),
        }
    }
}

/// Summary of the transaction a deposit points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTransaction {
    pub id: String,
    pub code: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: String,
    pub code: String,
    pub amount_minor: i64,
    pub currency: Currency,
    pub occurred_at: DateTime<Utc>,
    pub recipient: String,
    pub bank: Option<String>,
    pub account_number: Option<String>,
    pub deposit_type: DepositType,
    pub status: DepositStatus,
    pub description: String,
    pub supporting_document: Option<String>,
    pub notes: Option<String>,
    pub transaction_id: Option<String>,
    pub attachment: Option<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A deposit with its transaction reference resolved.
///
/// `related_transaction` is `None` both when the deposit has no reference and
/// when the referenced transaction no longer exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositWithRelated {
    pub deposit: Deposit,
    pub related_transaction: Option<RelatedTransaction>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deposits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub code: String,
    pub amount_minor: i64,
    pub currency: String,
    pub occurred_at: DateTimeUtc,
    pub recipient: String,
    pub bank: Option<String>,
    pub account_number: Option<String>,
    pub deposit_type: String,
    pub status: String,
    pub description: String,
    pub supporting_document: Option<String>,
    pub notes: Option<String>,
    pub transaction_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub attachment_data: Option<String>,
    pub attachment_mime: Option<String>,
    pub attachment_size: Option<i64>,
    pub attachment_name: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Deposit> for ActiveModel {
    fn from(deposit: &Deposit) -> Self {
        let attachment = deposit.attachment.as_ref();
        Self {
            id: ActiveValue::Set(deposit.id.clone()),
            code: ActiveValue::Set(deposit.code.clone()),
            amount_minor: ActiveValue::Set(deposit.amount_minor),
            currency: ActiveValue::Set(deposit.currency.code().to_string()),
            occurred_at: ActiveValue::Set(deposit.occurred_at),
            recipient: ActiveValue::Set(deposit.recipient.clone()),
            bank: ActiveValue::Set(deposit.bank.clone()),
            account_number: ActiveValue::Set(deposit.account_number.clone()),
            deposit_type: ActiveValue::Set(deposit.deposit_type.as_str().to_string()),
            status: ActiveValue::Set(deposit.status.as_str().to_string()),
            description: ActiveValue::Set(deposit.description.clone()),
            supporting_document: ActiveValue::Set(deposit.supporting_document.clone()),
            notes: ActiveValue::Set(deposit.notes.clone()),
            transaction_id: ActiveValue::Set(deposit.transaction_id.clone()),
            attachment_data: ActiveValue::Set(attachment.map(|a| a.data.clone())),
            attachment_mime: ActiveValue::Set(attachment.map(|a| a.mime_type.clone())),
            attachment_size: ActiveValue::Set(attachment.map(|a| a.size_bytes)),
            attachment_name: ActiveValue::Set(attachment.map(|a| a.name.clone())),
            created_at: ActiveValue::Set(deposit.created_at),
            updated_at: ActiveValue::Set(deposit.updated_at),
        }
    }
}

impl TryFrom<Model> for Deposit {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let corrupted =
            |err: EngineError| EngineError::Corrupted(format!("deposit {}: {err}", model.code));
        Ok(Self {
            currency: model_currency(&model.currency).map_err(corrupted)?,
            deposit_type: DepositType::try_from(model.deposit_type.as_str()).map_err(corrupted)?,
            status: DepositStatus::try_from(model.status.as_str()).map_err(corrupted)?,
            attachment: Attachment::from_columns(
                model.attachment_data,
                model.attachment_mime,
                model.attachment_size,
                model.attachment_name,
            ),
            id: model.id,
            transaction_id: model.transaction_id,
            code: model.code,
            amount_minor: model.amount_minor,
            occurred_at: model.occurred_at,
            recipient: model.recipient,
            bank: model.bank,
            account_number: model.account_number,
            description: model.description,
            supporting_document: model.supporting_document,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
