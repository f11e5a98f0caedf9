use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Response envelope shared by every endpoint.
///
/// `count` is only set on list responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            count: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            count: None,
        }
    }
}

impl<T> Envelope<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(items.len()),
            data: Some(items),
            error: None,
        }
    }
}

/// Empty payload, serialized as `{}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Pen,
    Mxn,
    Cop,
}

/// Raw file sent along a record: `data:<mime>;base64,<payload>`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AttachmentUpload {
    pub data_url: String,
    pub name: Option<String>,
}

/// Attachment metadata. The content is served by `GET …/{id}/attachment`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AttachmentView {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub encoding: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NextCode {
    pub code: String,
}

/// Keeps an explicit `null` apart from a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionDirection {
        Income,
        Expense,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Confirmed,
        Pending,
        Cancelled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// Any non-blank string. A UUID is generated when absent.
        pub id: Option<String>,
        /// Generated from the direction's sequence when absent.
        pub code: Option<String>,
        pub description: String,
        pub amount_minor: i64,
        pub direction: TransactionDirection,
        /// `PEN`, `USD` or `EUR`, any case.
        pub currency: String,
        pub status: Option<TransactionStatus>,
        /// RFC3339 timestamp. Defaults to now.
        pub occurred_at: Option<DateTime<FixedOffset>>,
        pub payment_method: String,
        pub reference: Option<String>,
        pub notes: Option<String>,
        pub attachment: Option<AttachmentUpload>,
    }

    /// Partial update. Code and direction cannot be changed, so sending
    /// them is rejected like any other unknown field.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct TransactionUpdate {
        pub description: Option<String>,
        pub amount_minor: Option<i64>,
        pub currency: Option<String>,
        pub status: Option<TransactionStatus>,
        pub occurred_at: Option<DateTime<FixedOffset>>,
        pub payment_method: Option<String>,
        pub reference: Option<String>,
        pub notes: Option<String>,
        pub attachment: Option<AttachmentUpload>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
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
        pub attachment: Option<AttachmentView>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod deposit {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DepositType {
        Transfer,
        Cash,
        Check,
        CounterDeposit,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DepositStatus {
        Confirmed,
        Pending,
        Rejected,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositNew {
        pub id: Option<String>,
        pub code: Option<String>,
        pub amount_minor: i64,
        pub currency: String,
        pub occurred_at: Option<DateTime<FixedOffset>>,
        pub recipient: String,
        pub bank: Option<String>,
        pub account_number: Option<String>,
        pub deposit_type: DepositType,
        pub status: Option<DepositStatus>,
        pub description: String,
        pub supporting_document: Option<String>,
        pub notes: Option<String>,
        /// Must reference an existing transaction.
        pub transaction_id: Option<String>,
        pub attachment: Option<AttachmentUpload>,
    }

    /// Partial update. The code cannot be changed.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct DepositUpdate {
        pub amount_minor: Option<i64>,
        pub currency: Option<String>,
        pub occurred_at: Option<DateTime<FixedOffset>>,
        pub recipient: Option<String>,
        pub bank: Option<String>,
        pub account_number: Option<String>,
        pub deposit_type: Option<DepositType>,
        pub status: Option<DepositStatus>,
        pub description: Option<String>,
        pub supporting_document: Option<String>,
        pub notes: Option<String>,
        /// Absent leaves the reference alone, `null` removes it.
        #[serde(
            default,
            deserialize_with = "super::nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub transaction_id: Option<Option<String>>,
        pub attachment: Option<AttachmentUpload>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RelatedTransactionView {
        pub id: String,
        pub code: String,
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositView {
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
        /// `null` when no transaction is referenced or it no longer exists.
        pub related_transaction: Option<RelatedTransactionView>,
        pub attachment: Option<AttachmentView>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod balance {
    use super::*;

    /// `?limit=` (or `?limite=`) of the movement endpoints. Kept as text so a
    /// malformed value is reported like any other invalid limit.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LimitQuery {
        #[serde(alias = "limite")]
        pub limit: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub currency: Currency,
        pub current_balance_minor: i64,
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
        pub total_deposits_minor: i64,
        pub last_movement_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceEntry {
        #[serde(flatten)]
        pub balance: BalanceView,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub error: Option<String>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MovementKind {
        Income,
        Expense,
        Deposit,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MovementCategory {
        Transaction,
        Deposit,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementView {
        pub code: String,
        pub description: String,
        pub amount_minor: i64,
        pub kind: MovementKind,
        pub category: MovementCategory,
        pub at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DirectionStatsView {
        pub count: u64,
        pub total_minor: i64,
        pub average_minor: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatisticsView {
        pub income: DirectionStatsView,
        pub expense: DirectionStatsView,
        pub deposits: DirectionStatsView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub balance: BalanceView,
        pub recent_movements: Vec<MovementView>,
        pub statistics: StatisticsView,
        pub queried_at: DateTime<Utc>,
    }
}

pub mod dashboard {
    use std::collections::BTreeMap;

    use super::*;
    use crate::deposit::{DepositStatus, DepositType, RelatedTransactionView};
    use crate::transaction::TransactionStatus;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySummaryView {
        pub count: u64,
        pub totals_by_currency: BTreeMap<Currency, i64>,
        pub last_code: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlySummaryView {
        /// `YYYY-MM`
        pub month: String,
        pub start: DateTime<Utc>,
        pub end: DateTime<Utc>,
        pub income: CategorySummaryView,
        pub expense: CategorySummaryView,
        pub deposits: CategorySummaryView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionActivityView {
        pub code: String,
        pub description: String,
        pub amount_minor: i64,
        pub currency: Currency,
        pub status: TransactionStatus,
        pub occurred_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositActivityView {
        pub code: String,
        pub description: String,
        pub amount_minor: i64,
        pub currency: Currency,
        pub status: DepositStatus,
        pub recipient: String,
        pub deposit_type: DepositType,
        pub occurred_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
        pub related_transaction: Option<RelatedTransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecentActivityView {
        pub income: Vec<TransactionActivityView>,
        pub expense: Vec<TransactionActivityView>,
        pub deposits: Vec<DepositActivityView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TotalCountsView {
        pub income: u64,
        pub expense: u64,
        pub deposits: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardView {
        pub monthly: MonthlySummaryView,
        pub recent: RecentActivityView,
        pub totals: TotalCountsView,
        pub generated_at: DateTime<Utc>,
    }
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
        pub environment: String,
        pub timestamp: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ServiceInfo {
        pub name: String,
        pub version: String,
        pub endpoints: Vec<String>,
    }
}
