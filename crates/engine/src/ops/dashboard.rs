use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, prelude::*};

use crate::{
    Currency, Deposit, DepositStatus, DepositType, EngineError, RelatedTransaction, ResultEngine,
    Transaction, TransactionDirection, TransactionStatus, deposits, transactions,
};

use super::Engine;

/// Records listed per category in the recent activity.
const RECENT_ACTIVITY_LIMIT: u64 = 5;

/// Sum of amounts per currency.
pub type TotalsByCurrency = BTreeMap<Currency, i64>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategorySummary {
    pub count: u64,
    pub totals_by_currency: TotalsByCurrency,
    /// Code of the last record in creation order, not the greatest code.
    pub last_code: Option<String>,
}

impl CategorySummary {
    fn from_records<'a>(
        records: impl IntoIterator<Item = (&'a str, Currency, i64)>,
    ) -> ResultEngine<Self> {
        let mut summary = Self::default();
        for (code, currency, amount_minor) in records {
            summary.count += 1;
            let total = summary.totals_by_currency.entry(currency).or_insert(0);
            *total = total.checked_add(amount_minor).ok_or_else(|| {
                EngineError::Aggregation(format!("{currency} monthly total overflow"))
            })?;
            summary.last_code = Some(code.to_string());
        }
        Ok(summary)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub income: CategorySummary,
    pub expense: CategorySummary,
    pub deposits: CategorySummary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionActivity {
    pub code: String,
    pub description: String,
    pub amount_minor: i64,
    pub currency: Currency,
    pub status: TransactionStatus,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionActivity {
    fn from(tx: Transaction) -> Self {
        Self {
            code: tx.code,
            description: tx.description,
            amount_minor: tx.amount_minor,
            currency: tx.currency,
            status: tx.status,
            occurred_at: tx.occurred_at,
            created_at: tx.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositActivity {
    pub code: String,
    pub description: String,
    pub amount_minor: i64,
    pub currency: Currency,
    pub status: DepositStatus,
    pub recipient: String,
    pub deposit_type: DepositType,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub related_transaction: Option<RelatedTransaction>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecentActivity {
    pub income: Vec<TransactionActivity>,
    pub expense: Vec<TransactionActivity>,
    pub deposits: Vec<DepositActivity>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TotalCounts {
    pub income: u64,
    pub expense: u64,
    pub deposits: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    pub monthly: MonthlySummary,
    pub recent: RecentActivity,
    pub totals: TotalCounts,
    pub generated_at: DateTime<Utc>,
}

/// First and last instant (`.999` ms) of the calendar month containing `now`,
/// in `now`'s time zone.
pub fn month_window<Tz: TimeZone>(
    now: &DateTime<Tz>,
) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let tz = now.timezone();
    let local = now.naive_local();
    let (year, month) = (local.year(), local.month());
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    let start = month_start(&tz, year, month)?;
    let next = month_start(&tz, next_year, next_month)?;
    Ok((start, next - TimeDelta::milliseconds(1)))
}

fn month_start<Tz: TimeZone>(tz: &Tz, year: i32, month: u32) -> ResultEngine<DateTime<Utc>> {
    let midnight = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| EngineError::Aggregation(format!("invalid month {year}-{month:02}")))?;
    resolve_local(tz, midnight)
        .or_else(|| resolve_local(tz, midnight + TimeDelta::hours(1)))
        .ok_or_else(|| EngineError::Aggregation(format!("no local start for {year}-{month:02}")))
}

// Midnight may fall in a DST gap; take the earliest valid instant.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

impl Engine {
    /// Dashboard for the current month in the server's local time.
    pub async fn dashboard(&self) -> ResultEngine<Dashboard> {
        self.dashboard_at(&Local::now()).await
    }

    /// Dashboard for the month containing `now`.
    pub async fn dashboard_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ResultEngine<Dashboard> {
        let (start, end) = month_window(now)?;
        let month = {
            let local = now.naive_local();
            format!("{:04}-{:02}", local.year(), local.month())
        };

        let income = self
            .month_transactions(TransactionDirection::Income, start, end)
            .await?;
        let expense = self
            .month_transactions(TransactionDirection::Expense, start, end)
            .await?;
        let month_deposits = deposits::Entity::find()
            .filter(deposits::Column::OccurredAt.gte(start))
            .filter(deposits::Column::OccurredAt.lte(end))
            .order_by_asc(deposits::Column::CreatedAt)
            .order_by_asc(deposits::Column::Code)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Deposit::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        let monthly = MonthlySummary {
            month,
            start,
            end,
            income: CategorySummary::from_records(
                income.iter().map(|t| (t.code.as_str(), t.currency, t.amount_minor)),
            )?,
            expense: CategorySummary::from_records(
                expense.iter().map(|t| (t.code.as_str(), t.currency, t.amount_minor)),
            )?,
            deposits: CategorySummary::from_records(
                month_deposits
                    .iter()
                    .map(|d| (d.code.as_str(), d.currency, d.amount_minor)),
            )?,
        };

        let recent = RecentActivity {
            income: self.recent_transactions(TransactionDirection::Income).await?,
            expense: self.recent_transactions(TransactionDirection::Expense).await?,
            deposits: self.recent_deposits().await?,
        };

        let totals = TotalCounts {
            income: self.count_transactions(TransactionDirection::Income).await?,
            expense: self.count_transactions(TransactionDirection::Expense).await?,
            deposits: deposits::Entity::find().count(&self.database).await?,
        };

        Ok(Dashboard {
            monthly,
            recent,
            totals,
            generated_at: Utc::now(),
        })
    }

    async fn month_transactions(
        &self,
        direction: TransactionDirection,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<Vec<Transaction>> {
        transactions::Entity::find()
            .filter(transactions::Column::Direction.eq(direction.as_str()))
            .filter(transactions::Column::OccurredAt.gte(start))
            .filter(transactions::Column::OccurredAt.lte(end))
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(transactions::Column::Code)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn recent_transactions(
        &self,
        direction: TransactionDirection,
    ) -> ResultEngine<Vec<TransactionActivity>> {
        transactions::Entity::find()
            .filter(transactions::Column::Direction.eq(direction.as_str()))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Code)
            .limit(RECENT_ACTIVITY_LIMIT)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| Transaction::try_from(model).map(TransactionActivity::from))
            .collect()
    }

    async fn recent_deposits(&self) -> ResultEngine<Vec<DepositActivity>> {
        let recent = deposits::Entity::find()
            .order_by_desc(deposits::Column::CreatedAt)
            .order_by_desc(deposits::Column::Code)
            .limit(RECENT_ACTIVITY_LIMIT)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Deposit::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(self
            .with_related(recent)
            .await?
            .into_iter()
            .map(|item| DepositActivity {
                code: item.deposit.code,
                description: item.deposit.description,
                amount_minor: item.deposit.amount_minor,
                currency: item.deposit.currency,
                status: item.deposit.status,
                recipient: item.deposit.recipient,
                deposit_type: item.deposit.deposit_type,
                occurred_at: item.deposit.occurred_at,
                created_at: item.deposit.created_at,
                related_transaction: item.related_transaction,
            })
            .collect())
    }

    async fn count_transactions(&self, direction: TransactionDirection) -> ResultEngine<u64> {
        Ok(transactions::Entity::find()
            .filter(transactions::Column::Direction.eq(direction.as_str()))
            .count(&self.database)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn window_covers_the_whole_month() {
        let now = Utc.with_ymd_and_hms(2026, 2, 14, 10, 30, 0).unwrap();
        let (start, end) = month_window(&now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 59).unwrap() + TimeDelta::milliseconds(999)
        );
    }

    #[test]
    fn december_rolls_into_next_year() {
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).unwrap();
        let (start, end) = month_window(&now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(
            end + TimeDelta::milliseconds(1),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn window_follows_the_local_calendar() {
        // 2026-03-01 02:00 UTC is still February in Lima (UTC-5).
        let lima = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = Utc
            .with_ymd_and_hms(2026, 3, 1, 2, 0, 0)
            .unwrap()
            .with_timezone(&lima);
        let (start, end) = month_window(&now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 2, 1, 5, 0, 0).unwrap());
        assert_eq!(
            end + TimeDelta::milliseconds(1),
            Utc.with_ymd_and_hms(2026, 3, 1, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn last_code_follows_input_order() {
        let summary = CategorySummary::from_records([
            ("IN010", Currency::Usd, 100),
            ("IN002", Currency::Pen, 50),
            ("IN003", Currency::Usd, 25),
        ])
        .unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.last_code.as_deref(), Some("IN003"));
        assert_eq!(summary.totals_by_currency[&Currency::Usd], 125);
        assert_eq!(summary.totals_by_currency[&Currency::Pen], 50);
    }

    #[test]
    fn monthly_total_overflow_is_an_aggregation_error() {
        let err = CategorySummary::from_records([
            ("IN001", Currency::Usd, i64::MAX),
            ("IN002", Currency::Usd, 1),
        ])
        .unwrap_err();
        assert!(matches!(err, EngineError::Aggregation(_)));
    }
}
