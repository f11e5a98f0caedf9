//! Balances derived from the confirmed records of a currency.
//!
//! Nothing here is stored: every call re-aggregates `transactions` and
//! `deposits`, so two reads without a write in between always agree.

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, Statement, prelude::*};

use crate::{
    Currency, DepositStatus, EngineError, ResultEngine, TransactionDirection, TransactionStatus,
    deposits, transactions,
};

use super::Engine;

/// Largest `limit` accepted by the movement queries.
pub const MAX_MOVEMENTS_LIMIT: u64 = 100;
/// Movements returned when no `limit` is given.
pub const DEFAULT_MOVEMENTS_LIMIT: u64 = 10;
/// Movements embedded in a balance summary when no `limit` is given.
pub const DEFAULT_SUMMARY_LIMIT: u64 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyBalance {
    pub currency: Currency,
    pub current_balance_minor: i64,
    pub total_income_minor: i64,
    pub total_expense_minor: i64,
    pub total_deposits_minor: i64,
    pub last_movement_at: Option<DateTime<Utc>>,
}

impl CurrencyBalance {
    fn zero(currency: Currency) -> Self {
        Self {
            currency,
            current_balance_minor: 0,
            total_income_minor: 0,
            total_expense_minor: 0,
            total_deposits_minor: 0,
            last_movement_at: None,
        }
    }
}

/// One row of [`Engine::all_balances`].
///
/// When the currency failed, totals are zero and `error` carries the reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceEntry {
    pub balance: CurrencyBalance,
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementKind {
    Income,
    Expense,
    Deposit,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Deposit => "deposit",
        }
    }
}

impl From<TransactionDirection> for MovementKind {
    fn from(direction: TransactionDirection) -> Self {
        match direction {
            TransactionDirection::Income => Self::Income,
            TransactionDirection::Expense => Self::Expense,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementCategory {
    Transaction,
    Deposit,
}

impl MovementCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::Deposit => "deposit",
        }
    }
}

/// A confirmed transaction or deposit seen as a generic balance movement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Movement {
    pub code: String,
    pub description: String,
    pub amount_minor: i64,
    pub kind: MovementKind,
    pub category: MovementCategory,
    pub at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DirectionStats {
    pub count: u64,
    pub total_minor: i64,
    pub average_minor: f64,
}

impl DirectionStats {
    fn new(count: u64, total_minor: i64) -> Self {
        let average_minor = if count == 0 {
            0.0
        } else {
            total_minor as f64 / count as f64
        };
        Self {
            count,
            total_minor,
            average_minor,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BalanceStatistics {
    pub income: DirectionStats,
    pub expense: DirectionStats,
    pub deposits: DirectionStats,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BalanceSummary {
    pub balance: CurrencyBalance,
    pub recent_movements: Vec<Movement>,
    pub statistics: BalanceStatistics,
    pub queried_at: DateTime<Utc>,
}

/// Confirmed totals of one currency, as read from the store.
#[derive(Clone, Copy, Debug, Default)]
struct Totals {
    income: (u64, i64),
    expense: (u64, i64),
    deposits: (u64, i64),
}

/// Turns per-currency results into report rows, isolating the failed ones.
pub fn collect_balances(
    results: Vec<(Currency, ResultEngine<CurrencyBalance>)>,
) -> Vec<BalanceEntry> {
    results
        .into_iter()
        .map(|(currency, result)| match result {
            Ok(balance) => BalanceEntry {
                balance,
                error: None,
            },
            Err(err) => {
                tracing::warn!(%currency, error = %err, "balance unavailable");
                BalanceEntry {
                    balance: CurrencyBalance::zero(currency),
                    error: Some(err.to_string()),
                }
            }
        })
        .collect()
}

impl Engine {
    /// Balance of `currency`: `income + deposits - expense` over confirmed
    /// records.
    pub async fn balance(&self, currency: Currency) -> ResultEngine<CurrencyBalance> {
        self.compute_balance(currency).await.map_err(aggregation)
    }

    /// Like [`Engine::balance`], parsing the currency code first.
    pub async fn balance_for(&self, currency: &str) -> ResultEngine<CurrencyBalance> {
        let currency = Currency::try_from(currency)?;
        self.balance(currency).await
    }

    /// Balance of every currency in [`Currency::ALL`], in that order.
    ///
    /// A currency that fails to aggregate is reported with zero totals and
    /// an error; the others are unaffected.
    pub async fn all_balances(&self) -> Vec<BalanceEntry> {
        let mut results = Vec::with_capacity(Currency::ALL.len());
        for currency in Currency::ALL {
            results.push((currency, self.balance(currency).await));
        }
        collect_balances(results)
    }

    /// The latest confirmed movements of `currency`, newest first.
    pub async fn recent_movements(
        &self,
        currency: Currency,
        limit: u64,
    ) -> ResultEngine<Vec<Movement>> {
        ensure_limit(limit)?;
        self.load_movements(currency, limit)
            .await
            .map_err(aggregation)
    }

    /// Count, total and average per direction and for deposits.
    pub async fn statistics(&self, currency: Currency) -> ResultEngine<BalanceStatistics> {
        let totals = confirmed_totals(&self.database, currency)
            .await
            .map_err(aggregation)?;
        Ok(BalanceStatistics {
            income: DirectionStats::new(totals.income.0, totals.income.1),
            expense: DirectionStats::new(totals.expense.0, totals.expense.1),
            deposits: DirectionStats::new(totals.deposits.0, totals.deposits.1),
        })
    }

    /// Balance, recent movements and statistics in one report.
    pub async fn balance_summary(
        &self,
        currency: Currency,
        limit: u64,
    ) -> ResultEngine<BalanceSummary> {
        ensure_limit(limit)?;
        let balance = self.balance(currency).await?;
        let recent_movements = self.recent_movements(currency, limit).await?;
        let statistics = self.statistics(currency).await?;
        Ok(BalanceSummary {
            balance,
            recent_movements,
            statistics,
            queried_at: Utc::now(),
        })
    }

    async fn compute_balance(&self, currency: Currency) -> ResultEngine<CurrencyBalance> {
        let totals = confirmed_totals(&self.database, currency).await?;

        let last_transaction = transactions::Entity::find()
            .filter(transactions::Column::Currency.eq(currency.code()))
            .filter(transactions::Column::Status.eq(TransactionStatus::Confirmed.as_str()))
            .order_by_desc(transactions::Column::CreatedAt)
            .one(&self.database)
            .await?
            .map(|model| model.created_at);
        let last_deposit = deposits::Entity::find()
            .filter(deposits::Column::Currency.eq(currency.code()))
            .filter(deposits::Column::Status.eq(DepositStatus::Confirmed.as_str()))
            .order_by_desc(deposits::Column::CreatedAt)
            .one(&self.database)
            .await?
            .map(|model| model.created_at);

        let (income, expense, deposited) = (totals.income.1, totals.expense.1, totals.deposits.1);
        let current_balance_minor = income
            .checked_add(deposited)
            .and_then(|sum| sum.checked_sub(expense))
            .ok_or_else(|| EngineError::Aggregation(format!("{currency} balance overflow")))?;

        Ok(CurrencyBalance {
            currency,
            current_balance_minor,
            total_income_minor: income,
            total_expense_minor: expense,
            total_deposits_minor: deposited,
            last_movement_at: last_transaction.max(last_deposit),
        })
    }

    async fn load_movements(&self, currency: Currency, limit: u64) -> ResultEngine<Vec<Movement>> {
        let transactions = transactions::Entity::find()
            .filter(transactions::Column::Currency.eq(currency.code()))
            .filter(transactions::Column::Status.eq(TransactionStatus::Confirmed.as_str()))
            .order_by_desc(transactions::Column::CreatedAt)
            .limit(limit)
            .all(&self.database)
            .await?;
        let deposits = deposits::Entity::find()
            .filter(deposits::Column::Currency.eq(currency.code()))
            .filter(deposits::Column::Status.eq(DepositStatus::Confirmed.as_str()))
            .order_by_desc(deposits::Column::CreatedAt)
            .limit(limit)
            .all(&self.database)
            .await?;

        let mut movements = Vec::with_capacity(transactions.len() + deposits.len());
        for model in transactions {
            let direction = TransactionDirection::try_from(model.direction.as_str())?;
            movements.push(Movement {
                code: model.code,
                description: model.description,
                amount_minor: model.amount_minor,
                kind: direction.into(),
                category: MovementCategory::Transaction,
                at: model.created_at,
            });
        }
        for model in deposits {
            movements.push(Movement {
                code: model.code,
                description: model.description,
                amount_minor: model.amount_minor,
                kind: MovementKind::Deposit,
                category: MovementCategory::Deposit,
                at: model.created_at,
            });
        }

        movements.sort_by(|a, b| b.at.cmp(&a.at));
        movements.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(movements)
    }
}

pub(crate) fn ensure_limit(limit: u64) -> ResultEngine<()> {
    if limit == 0 || limit > MAX_MOVEMENTS_LIMIT {
        return Err(EngineError::InvalidLimit(format!(
            "limit must be between 1 and {MAX_MOVEMENTS_LIMIT}, got {limit}"
        )));
    }
    Ok(())
}

fn aggregation(err: EngineError) -> EngineError {
    match err {
        EngineError::Aggregation(_) => err,
        other => EngineError::Aggregation(other.to_string()),
    }
}

async fn confirmed_totals<C: ConnectionTrait>(db: &C, currency: Currency) -> ResultEngine<Totals> {
    let backend = db.get_database_backend();
    let mut totals = Totals::default();

    let stmt = Statement::from_sql_and_values(
        backend,
        "SELECT direction, COUNT(*) AS count, COALESCE(SUM(amount_minor), 0) AS sum \
         FROM transactions \
         WHERE currency = ? AND status = ? \
         GROUP BY direction"
            .to_string(),
        vec![
            currency.code().into(),
            TransactionStatus::Confirmed.as_str().into(),
        ],
    );
    for row in db.query_all(stmt).await? {
        let direction: String = row.try_get("", "direction")?;
        let count: i64 = row.try_get("", "count")?;
        let sum: i64 = row.try_get("", "sum")?;
        let count = u64::try_from(count).unwrap_or_default();
        match TransactionDirection::try_from(direction.as_str())? {
            TransactionDirection::Income => totals.income = (count, sum),
            TransactionDirection::Expense => totals.expense = (count, sum),
        }
    }

    let stmt = Statement::from_sql_and_values(
        backend,
        "SELECT COUNT(*) AS count, COALESCE(SUM(amount_minor), 0) AS sum \
         FROM deposits \
         WHERE currency = ? AND status = ?"
            .to_string(),
        vec![
            currency.code().into(),
            DepositStatus::Confirmed.as_str().into(),
        ],
    );
    if let Some(row) = db.query_one(stmt).await? {
        let count: i64 = row.try_get("", "count")?;
        let sum: i64 = row.try_get("", "sum")?;
        totals.deposits = (u64::try_from(count).unwrap_or_default(), sum);
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(currency: Currency, income: i64) -> CurrencyBalance {
        CurrencyBalance {
            total_income_minor: income,
            current_balance_minor: income,
            ..CurrencyBalance::zero(currency)
        }
    }

    #[test]
    fn failed_currency_is_zeroed_and_others_kept() {
        let entries = collect_balances(vec![
            (Currency::Usd, Ok(balance(Currency::Usd, 100))),
            (
                Currency::Pen,
                Err(EngineError::Aggregation("boom".to_string())),
            ),
            (Currency::Cop, Ok(balance(Currency::Cop, 0))),
        ]);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].balance.current_balance_minor, 100);
        assert_eq!(entries[0].error, None);
        assert_eq!(entries[1].balance, CurrencyBalance::zero(Currency::Pen));
        assert_eq!(
            entries[1].error.as_deref(),
            Some("Error computing balance: boom")
        );
        assert_eq!(entries[2].error, None);
    }

    #[test]
    fn limit_bounds() {
        assert!(ensure_limit(0).is_err());
        assert!(ensure_limit(1).is_ok());
        assert!(ensure_limit(MAX_MOVEMENTS_LIMIT).is_ok());
        assert!(matches!(
            ensure_limit(MAX_MOVEMENTS_LIMIT + 1),
            Err(EngineError::InvalidLimit(_))
        ));
    }

    #[test]
    fn averages_are_zero_when_empty() {
        assert_eq!(DirectionStats::new(0, 0).average_minor, 0.0);
        assert_eq!(DirectionStats::new(4, 1000).average_minor, 250.0);
    }

    #[test]
    fn aggregation_errors_are_not_wrapped_twice() {
        let err = aggregation(EngineError::Aggregation("x".to_string()));
        assert_eq!(err, EngineError::Aggregation("x".to_string()));
        let err = aggregation(EngineError::Corrupted("row".to_string()));
        assert_eq!(
            err,
            EngineError::Aggregation("Corrupted record: row".to_string())
        );
    }
}
