pub use attachment::{
    ALLOWED_MIME_TYPES, ATTACHMENT_ENCODING, Attachment, AttachmentInput, MAX_ATTACHMENT_BYTES,
};
pub use codes::{Code, CodeCategory};
pub use commands::{NewDepositCmd, NewTransactionCmd, UpdateDepositCmd, UpdateTransactionCmd};
pub use currency::Currency;
pub use deposits::{Deposit, DepositStatus, DepositType, DepositWithRelated, RelatedTransaction};
pub use error::EngineError;
pub use ops::{
    BalanceEntry, BalanceStatistics, BalanceSummary, CategorySummary, CurrencyBalance,
    DEFAULT_MOVEMENTS_LIMIT, DEFAULT_SUMMARY_LIMIT, Dashboard, DepositActivity, DirectionStats,
    Engine, EngineBuilder, MAX_MOVEMENTS_LIMIT, MonthlySummary, Movement, MovementCategory,
    MovementKind, RecentActivity, TotalCounts, TotalsByCurrency, TransactionActivity,
    collect_balances, month_window,
};
pub use transactions::{Transaction, TransactionDirection, TransactionStatus};

mod attachment;
mod code_sequences;
mod codes;
mod commands;
mod currency;
mod deposits;
mod error;
mod ops;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
