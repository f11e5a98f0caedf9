//! Transaction primitives.
//!
//! A `Transaction` is a single income or expense. Its code (`IN…`/`EX…`)
//! encodes the direction, so neither can change after creation.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Attachment, Code, CodeCategory, Currency, EngineError, util::model_currency};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionDirection {
    Income,
    Expense,
}

impl TransactionDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionDirection {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidField(format!(
                "invalid transaction direction: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Confirmed,
    #[default]
    Pending,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "confirmed" => Ok(Self::Confirmed),
            "pending" => Ok(Self::Pending),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidField(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub code: String,
    pub description: String,
    pub amount_minor: i64,
    pub direction: TransactionDirection,
    pub currency: Currency,
    pub status: TransactionStatus,
    pub occurred_at: DateTime<Utc>,
    pub payment_method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub attachment: Option<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Category of the code sequence this transaction draws from.
    pub fn code_category(&self) -> CodeCategory {
        self.direction.into()
    }

    /// Parsed form of `code`.
    pub fn parsed_code(&self) -> Result<Code, EngineError> {
        Code::parse_in(&self.code, self.code_category())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub code: String,
    pub description: String,
    pub amount_minor: i64,
    pub direction: String,
    pub currency: String,
    pub status: String,
    pub occurred_at: DateTimeUtc,
    pub payment_method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
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

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        let attachment = tx.attachment.as_ref();
        Self {
            id: ActiveValue::Set(tx.id.clone()),
            code: ActiveValue::Set(tx.code.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            direction: ActiveValue::Set(tx.direction.as_str().to_string()),
            currency: ActiveValue::Set(tx.currency.code().to_string()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            payment_method: ActiveValue::Set(tx.payment_method.clone()),
            reference: ActiveValue::Set(tx.reference.clone()),
            notes: ActiveValue::Set(tx.notes.clone()),
            attachment_data: ActiveValue::Set(attachment.map(|a| a.data.clone())),
            attachment_mime: ActiveValue::Set(attachment.map(|a| a.mime_type.clone())),
            attachment_size: ActiveValue::Set(attachment.map(|a| a.size_bytes)),
            attachment_name: ActiveValue::Set(attachment.map(|a| a.name.clone())),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let corrupted = |err: EngineError| {
            EngineError::Corrupted(format!("transaction {}: {err}", model.code))
        };
        Ok(Self {
            direction: TransactionDirection::try_from(model.direction.as_str())
                .map_err(corrupted)?,
            currency: model_currency(&model.currency).map_err(corrupted)?,
            status: TransactionStatus::try_from(model.status.as_str()).map_err(corrupted)?,
            attachment: Attachment::from_columns(
                model.attachment_data,
                model.attachment_mime,
                model.attachment_size,
                model.attachment_name,
            ),
            id: model.id,
            code: model.code,
            description: model.description,
            amount_minor: model.amount_minor,
            occurred_at: model.occurred_at,
            payment_method: model.payment_method,
            reference: model.reference,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
