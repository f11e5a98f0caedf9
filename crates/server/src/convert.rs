//! Mapping between engine values and wire types.

use api_types::{
    AttachmentView, Currency as ApiCurrency,
    deposit::{
        DepositStatus as ApiDepositStatus, DepositType as ApiDepositType, DepositView,
        RelatedTransactionView,
    },
    transaction::{
        TransactionDirection as ApiDirection, TransactionStatus as ApiTxStatus, TransactionView,
    },
};
use chrono::{DateTime, FixedOffset, Utc};
use engine::{
    Attachment, AttachmentInput, Currency, DepositStatus, DepositType, DepositWithRelated,
    RelatedTransaction, Transaction, TransactionDirection, TransactionStatus,
};

pub(crate) fn currency(currency: Currency) -> ApiCurrency {
    match currency {
        Currency::Usd => ApiCurrency::Usd,
        Currency::Eur => ApiCurrency::Eur,
        Currency::Pen => ApiCurrency::Pen,
        Currency::Mxn => ApiCurrency::Mxn,
        Currency::Cop => ApiCurrency::Cop,
    }
}

pub(crate) fn direction(direction: TransactionDirection) -> ApiDirection {
    match direction {
        TransactionDirection::Income => ApiDirection::Income,
        TransactionDirection::Expense => ApiDirection::Expense,
    }
}

pub(crate) fn direction_in(direction: ApiDirection) -> TransactionDirection {
    match direction {
        ApiDirection::Income => TransactionDirection::Income,
        ApiDirection::Expense => TransactionDirection::Expense,
    }
}

pub(crate) fn tx_status(status: TransactionStatus) -> ApiTxStatus {
    match status {
        TransactionStatus::Confirmed => ApiTxStatus::Confirmed,
        TransactionStatus::Pending => ApiTxStatus::Pending,
        TransactionStatus::Cancelled => ApiTxStatus::Cancelled,
    }
}

pub(crate) fn tx_status_in(status: ApiTxStatus) -> TransactionStatus {
    match status {
        ApiTxStatus::Confirmed => TransactionStatus::Confirmed,
        ApiTxStatus::Pending => TransactionStatus::Pending,
        ApiTxStatus::Cancelled => TransactionStatus::Cancelled,
    }
}

pub(crate) fn deposit_status(status: DepositStatus) -> ApiDepositStatus {
    match status {
        DepositStatus::Confirmed => ApiDepositStatus::Confirmed,
        DepositStatus::Pending => ApiDepositStatus::Pending,
        DepositStatus::Rejected => ApiDepositStatus::Rejected,
    }
}

pub(crate) fn deposit_status_in(status: ApiDepositStatus) -> DepositStatus {
    match status {
        ApiDepositStatus::Confirmed => DepositStatus::Confirmed,
        ApiDepositStatus::Pending => DepositStatus::Pending,
        ApiDepositStatus::Rejected => DepositStatus::Rejected,
    }
}

pub(crate) fn deposit_type(kind: DepositType) -> ApiDepositType {
    match kind {
        DepositType::Transfer => ApiDepositType::Transfer,
        DepositType::Cash => ApiDepositType::Cash,
        DepositType::Check => ApiDepositType::Check,
        DepositType::CounterDeposit => ApiDepositType::CounterDeposit,
    }
}

pub(crate) fn deposit_type_in(kind: ApiDepositType) -> DepositType {
    match kind {
        ApiDepositType::Transfer => DepositType::Transfer,
        ApiDepositType::Cash => DepositType::Cash,
        ApiDepositType::Check => DepositType::Check,
        ApiDepositType::CounterDeposit => DepositType::CounterDeposit,
    }
}

pub(crate) fn utc(value: DateTime<FixedOffset>) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

pub(crate) fn attachment_input(upload: api_types::AttachmentUpload) -> AttachmentInput {
    AttachmentInput {
        data_url: upload.data_url,
        name: upload.name,
    }
}

pub(crate) fn attachment(attachment: Attachment) -> AttachmentView {
    AttachmentView {
        name: attachment.name,
        mime_type: attachment.mime_type,
        size_bytes: attachment.size_bytes,
        encoding: engine::ATTACHMENT_ENCODING.to_string(),
    }
}

pub(crate) fn related(related: RelatedTransaction) -> RelatedTransactionView {
    RelatedTransactionView {
        id: related.id,
        code: related.code,
        description: related.description,
    }
}

pub(crate) fn transaction(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        code: tx.code,
        description: tx.description,
        amount_minor: tx.amount_minor,
        direction: direction(tx.direction),
        currency: currency(tx.currency),
        status: tx_status(tx.status),
        occurred_at: tx.occurred_at,
        payment_method: tx.payment_method,
        reference: tx.reference,
        notes: tx.notes,
        attachment: tx.attachment.map(attachment),
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

pub(crate) fn deposit(item: DepositWithRelated) -> DepositView {
    let DepositWithRelated {
        deposit,
        related_transaction,
    } = item;
    DepositView {
        id: deposit.id,
        code: deposit.code,
        amount_minor: deposit.amount_minor,
        currency: currency(deposit.currency),
        occurred_at: deposit.occurred_at,
        recipient: deposit.recipient,
        bank: deposit.bank,
        account_number: deposit.account_number,
        deposit_type: deposit_type(deposit.deposit_type),
        status: deposit_status(deposit.status),
        description: deposit.description,
        supporting_document: deposit.supporting_document,
        notes: deposit.notes,
        transaction_id: deposit.transaction_id,
        related_transaction: related_transaction.map(related),
        attachment: deposit.attachment.map(attachment),
        created_at: deposit.created_at,
        updated_at: deposit.updated_at,
    }
}
