use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod balances;
mod codes;
mod dashboard;
mod deposits;
mod transactions;

pub use balances::{
    BalanceEntry, BalanceStatistics, BalanceSummary, CurrencyBalance, DEFAULT_MOVEMENTS_LIMIT,
    DEFAULT_SUMMARY_LIMIT, DirectionStats, MAX_MOVEMENTS_LIMIT, Movement, MovementCategory,
    MovementKind, collect_balances,
};
pub use dashboard::{
    CategorySummary, Dashboard, DepositActivity, MonthlySummary, RecentActivity, TotalCounts,
    TotalsByCurrency, TransactionActivity, month_window,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every record, code and aggregation operation.
///
/// The engine is stateless apart from its connection: every read goes to the
/// database, so balances are always computed from the current records.
#[derive(Debug, Clone)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The underlying connection.
    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
