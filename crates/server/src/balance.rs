//! Balance API endpoints

use api_types::{
    Envelope,
    balance::{
        BalanceEntry, BalanceView, DirectionStatsView, LimitQuery, MovementCategory as ApiCategory,
        MovementKind as ApiKind, MovementView, StatisticsView, SummaryView,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use engine::{
    BalanceStatistics, Currency, CurrencyBalance, DEFAULT_MOVEMENTS_LIMIT, DEFAULT_SUMMARY_LIMIT,
    DirectionStats, EngineError, Movement, MovementCategory, MovementKind,
};

use crate::{ServerError, convert, server::ServerState};

fn balance_view(balance: CurrencyBalance) -> BalanceView {
    BalanceView {
        currency: convert::currency(balance.currency),
        current_balance_minor: balance.current_balance_minor,
        total_income_minor: balance.total_income_minor,
        total_expense_minor: balance.total_expense_minor,
        total_deposits_minor: balance.total_deposits_minor,
        last_movement_at: balance.last_movement_at,
    }
}

fn movement_view(movement: Movement) -> MovementView {
    MovementView {
        code: movement.code,
        description: movement.description,
        amount_minor: movement.amount_minor,
        kind: match movement.kind {
            MovementKind::Income => ApiKind::Income,
            MovementKind::Expense => ApiKind::Expense,
            MovementKind::Deposit => ApiKind::Deposit,
        },
        category: match movement.category {
            MovementCategory::Transaction => ApiCategory::Transaction,
            MovementCategory::Deposit => ApiCategory::Deposit,
        },
        at: movement.at,
    }
}

fn stats_view(stats: DirectionStats) -> DirectionStatsView {
    DirectionStatsView {
        count: stats.count,
        total_minor: stats.total_minor,
        average_minor: stats.average_minor,
    }
}

fn statistics_view(stats: BalanceStatistics) -> StatisticsView {
    StatisticsView {
        income: stats_view(stats.income),
        expense: stats_view(stats.expense),
        deposits: stats_view(stats.deposits),
    }
}

/// `?limit=` as given, or `default`. The range is checked by the engine.
fn parse_limit(raw: Option<&str>, default: u64) -> Result<u64, EngineError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| {
            EngineError::InvalidLimit(format!("limit must be a whole number, got {value}"))
        }),
    }
}

pub async fn all(State(state): State<ServerState>) -> Json<Envelope<Vec<BalanceEntry>>> {
    let entries = state
        .engine
        .all_balances()
        .await
        .into_iter()
        .map(|entry| BalanceEntry {
            balance: balance_view(entry.balance),
            error: entry.error,
        })
        .collect();
    Json(Envelope::list(entries))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(currency): Path<String>,
) -> Result<Json<Envelope<BalanceView>>, ServerError> {
    let balance = state.engine.balance_for(&currency).await?;
    Ok(Json(Envelope::ok(balance_view(balance))))
}

pub async fn movements(
    State(state): State<ServerState>,
    Path(currency): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Envelope<Vec<MovementView>>>, ServerError> {
    let currency = Currency::try_from(currency.as_str())?;
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_MOVEMENTS_LIMIT)?;
    let movements = state.engine.recent_movements(currency, limit).await?;
    Ok(Json(Envelope::list(
        movements.into_iter().map(movement_view).collect(),
    )))
}

pub async fn summary(
    State(state): State<ServerState>,
    Path(currency): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Envelope<SummaryView>>, ServerError> {
    let currency = Currency::try_from(currency.as_str())?;
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_SUMMARY_LIMIT)?;
    let summary = state.engine.balance_summary(currency, limit).await?;
    Ok(Json(Envelope::ok(SummaryView {
        balance: balance_view(summary.balance),
        recent_movements: summary
            .recent_movements
            .into_iter()
            .map(movement_view)
            .collect(),
        statistics: statistics_view(summary.statistics),
        queried_at: summary.queried_at,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_parses() {
        assert_eq!(parse_limit(None, 10).unwrap(), 10);
        assert_eq!(parse_limit(Some(" "), 5).unwrap(), 5);
        assert_eq!(parse_limit(Some("100"), 10).unwrap(), 100);
        assert!(matches!(
            parse_limit(Some("-1"), 10),
            Err(EngineError::InvalidLimit(_))
        ));
        assert!(matches!(
            parse_limit(Some("ten"), 10),
            Err(EngineError::InvalidLimit(_))
        ));
    }
}
