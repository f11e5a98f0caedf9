//! Transactions API endpoints

use api_types::{
    Empty, Envelope, NextCode,
    transaction::{TransactionNew, TransactionUpdate, TransactionView},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use engine::{
    CodeCategory, Currency, NewTransactionCmd, TransactionDirection, TransactionStatus,
    UpdateTransactionCmd,
};

use crate::{ServerError, attachment_response, convert, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<TransactionView>>>, ServerError> {
    list_direction(&state, None).await
}

pub async fn list_income(
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<TransactionView>>>, ServerError> {
    list_direction(&state, Some(TransactionDirection::Income)).await
}

pub async fn list_expense(
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<TransactionView>>>, ServerError> {
    list_direction(&state, Some(TransactionDirection::Expense)).await
}

async fn list_direction(
    state: &ServerState,
    direction: Option<TransactionDirection>,
) -> Result<Json<Envelope<Vec<TransactionView>>>, ServerError> {
    let txs = state.engine.list_transactions(direction).await?;
    Ok(Json(Envelope::list(
        txs.into_iter().map(convert::transaction).collect(),
    )))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let tx = state.engine.transaction(&id).await?;
    Ok(Json(Envelope::ok(convert::transaction(tx))))
}

pub async fn get_by_code(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let tx = state.engine.transaction_by_code(&code).await?;
    Ok(Json(Envelope::ok(convert::transaction(tx))))
}

/// `direction` is `income` or `expense`.
pub async fn next_code(
    State(state): State<ServerState>,
    Path(direction): Path<String>,
) -> Result<Json<Envelope<NextCode>>, ServerError> {
    let direction = TransactionDirection::try_from(direction.trim().to_lowercase().as_str())?;
    let code = state
        .engine
        .peek_next_code(CodeCategory::from(direction))
        .await?;
    Ok(Json(Envelope::ok(NextCode {
        code: code.to_string(),
    })))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<TransactionView>>), ServerError> {
    let Json(payload) = payload?;

    let currency = Currency::for_record(&payload.currency)?;
    let mut cmd = NewTransactionCmd::new(
        convert::direction_in(payload.direction),
        payload.amount_minor,
        currency,
        payload.description,
        payload.payment_method,
    )
    .status(
        payload
            .status
            .map(convert::tx_status_in)
            .unwrap_or(TransactionStatus::Pending),
    );
    cmd.id = payload.id;
    cmd.code = payload.code;
    cmd.occurred_at = payload.occurred_at.map(convert::utc);
    cmd.reference = payload.reference;
    cmd.notes = payload.notes;
    cmd.attachment = payload.attachment.map(convert::attachment_input);

    let tx = state.engine.create_transaction(cmd).await?;
    tracing::info!(code = %tx.code, "transaction registered");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(convert::transaction(tx))),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<TransactionUpdate>, JsonRejection>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let Json(payload) = payload?;

    let currency = payload
        .currency
        .as_deref()
        .map(Currency::for_record)
        .transpose()?;
    let cmd = UpdateTransactionCmd {
        description: payload.description,
        amount_minor: payload.amount_minor,
        currency,
        status: payload.status.map(convert::tx_status_in),
        occurred_at: payload.occurred_at.map(convert::utc),
        payment_method: payload.payment_method,
        reference: payload.reference,
        notes: payload.notes,
        attachment: payload.attachment.map(convert::attachment_input),
    };

    let tx = state.engine.update_transaction(&id, cmd).await?;
    Ok(Json(Envelope::ok(convert::transaction(tx))))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Empty>>, ServerError> {
    state.engine.delete_transaction(&id).await?;
    Ok(Json(Envelope::ok(Empty {})))
}

pub async fn attachment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Response, ServerError> {
    let attachment = state.engine.transaction_attachment(&id).await?;
    attachment_response(attachment)
}
