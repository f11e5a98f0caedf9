//! Command structs for engine operations.
//!
//! These types group parameters for write operations (create/update of
//! transactions and deposits), keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, Utc};

use crate::{
    AttachmentInput, Currency, DepositStatus, DepositType, TransactionDirection,
    TransactionStatus,
};

/// Create a transaction.
///
/// `id` and `code` are generated when absent; `occurred_at` defaults to the
/// creation time. A given `id` is stored as is.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub amount_minor: i64,
    pub direction: TransactionDirection,
    pub currency: Currency,
    pub status: TransactionStatus,
    pub occurred_at: Option<DateTime<Utc>>,
    pub payment_method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub attachment: Option<AttachmentInput>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        direction: TransactionDirection,
        amount_minor: i64,
        currency: Currency,
        description: impl Into<String>,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            code: None,
            description: description.into(),
            amount_minor,
            direction,
            currency,
            status: TransactionStatus::default(),
            occurred_at: None,
            payment_method: payment_method.into(),
            reference: None,
            notes: None,
            attachment: None,
        }
    }

    #[must_use]
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn attachment(mut self, attachment: AttachmentInput) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Partial update of a transaction. `None` leaves a field untouched.
///
/// Code and direction are not updatable.
#[derive(Clone, Debug, Default)]
pub struct UpdateTransactionCmd {
    pub description: Option<String>,
    pub amount_minor: Option<i64>,
    pub currency: Option<Currency>,
    pub status: Option<TransactionStatus>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub attachment: Option<AttachmentInput>,
}

/// Create a deposit.
#[derive(Clone, Debug)]
pub struct NewDepositCmd {
    pub id: Option<String>,
    pub code: Option<String>,
    pub amount_minor: i64,
    pub currency: Currency,
    pub occurred_at: Option<DateTime<Utc>>,
    pub recipient: String,
    pub bank: Option<String>,
    pub account_number: Option<String>,
    pub deposit_type: DepositType,
    pub status: DepositStatus,
    pub description: String,
    pub supporting_document: Option<String>,
    pub notes: Option<String>,
    pub transaction_id: Option<String>,
    pub attachment: Option<AttachmentInput>,
}

impl NewDepositCmd {
    #[must_use]
    pub fn new(
        amount_minor: i64,
        currency: Currency,
        deposit_type: DepositType,
        recipient: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            code: None,
            amount_minor,
            currency,
            occurred_at: None,
            recipient: recipient.into(),
            bank: None,
            account_number: None,
            deposit_type,
            status: DepositStatus::default(),
            description: description.into(),
            supporting_document: None,
            notes: None,
            transaction_id: None,
            attachment: None,
        }
    }

    #[must_use]
    pub fn status(mut self, status: DepositStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    #[must_use]
    pub fn bank(mut self, bank: impl Into<String>, account_number: impl Into<String>) -> Self {
        self.bank = Some(bank.into());
        self.account_number = Some(account_number.into());
        self
    }

    #[must_use]
    pub fn attachment(mut self, attachment: AttachmentInput) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Partial update of a deposit. `None` leaves a field untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateDepositCmd {
    pub amount_minor: Option<i64>,
    pub currency: Option<Currency>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub recipient: Option<String>,
    pub bank: Option<String>,
    pub account_number: Option<String>,
    pub deposit_type: Option<DepositType>,
    pub status: Option<DepositStatus>,
    pub description: Option<String>,
    pub supporting_document: Option<String>,
    pub notes: Option<String>,
    /// `Some(None)` unlinks the deposit from its transaction.
    pub transaction_id: Option<Option<String>>,
    pub attachment: Option<AttachmentInput>,
}
