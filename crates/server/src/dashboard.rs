use api_types::{
    Envelope,
    dashboard::{
        CategorySummaryView, DashboardView, DepositActivityView, MonthlySummaryView,
        RecentActivityView, TotalCountsView, TransactionActivityView,
    },
};
use axum::{Json, extract::State};
use engine::{CategorySummary, DepositActivity, TransactionActivity};

use crate::{ServerError, convert, server::ServerState};

fn category_view(summary: CategorySummary) -> CategorySummaryView {
    CategorySummaryView {
        count: summary.count,
        totals_by_currency: summary
            .totals_by_currency
            .into_iter()
            .map(|(currency, total)| (convert::currency(currency), total))
            .collect(),
        last_code: summary.last_code,
    }
}

fn transaction_activity(item: TransactionActivity) -> TransactionActivityView {
    TransactionActivityView {
        code: item.code,
        description: item.description,
        amount_minor: item.amount_minor,
        currency: convert::currency(item.currency),
        status: convert::tx_status(item.status),
        occurred_at: item.occurred_at,
        created_at: item.created_at,
    }
}

fn deposit_activity(item: DepositActivity) -> DepositActivityView {
    DepositActivityView {
        code: item.code,
        description: item.description,
        amount_minor: item.amount_minor,
        currency: convert::currency(item.currency),
        status: convert::deposit_status(item.status),
        recipient: item.recipient,
        deposit_type: convert::deposit_type(item.deposit_type),
        occurred_at: item.occurred_at,
        created_at: item.created_at,
        related_transaction: item.related_transaction.map(convert::related),
    }
}

pub async fn get(
    State(state): State<ServerState>,
) -> Result<Json<Envelope<DashboardView>>, ServerError> {
    let dashboard = state.engine.dashboard().await?;

    let monthly = dashboard.monthly;
    let recent = dashboard.recent;
    Ok(Json(Envelope::ok(DashboardView {
        monthly: MonthlySummaryView {
            month: monthly.month,
            start: monthly.start,
            end: monthly.end,
            income: category_view(monthly.income),
            expense: category_view(monthly.expense),
            deposits: category_view(monthly.deposits),
        },
        recent: RecentActivityView {
            income: recent.income.into_iter().map(transaction_activity).collect(),
            expense: recent.expense.into_iter().map(transaction_activity).collect(),
            deposits: recent.deposits.into_iter().map(deposit_activity).collect(),
        },
        totals: TotalCountsView {
            income: dashboard.totals.income,
            expense: dashboard.totals.expense,
            deposits: dashboard.totals.deposits,
        },
        generated_at: dashboard.generated_at,
    })))
}
