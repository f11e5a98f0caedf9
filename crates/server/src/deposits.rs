//! Deposits API endpoints

use api_types::{
    Empty, Envelope, NextCode,
    deposit::{DepositNew, DepositUpdate, DepositView},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use engine::{CodeCategory, Currency, DepositStatus, NewDepositCmd, UpdateDepositCmd};

use crate::{ServerError, attachment_response, convert, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<DepositView>>>, ServerError> {
    let deposits = state.engine.list_deposits().await?;
    Ok(Json(Envelope::list(
        deposits.into_iter().map(convert::deposit).collect(),
    )))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<DepositView>>, ServerError> {
    let deposit = state.engine.deposit(&id).await?;
    Ok(Json(Envelope::ok(convert::deposit(deposit))))
}

pub async fn get_by_code(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Result<Json<Envelope<DepositView>>, ServerError> {
    let deposit = state.engine.deposit_by_code(&code).await?;
    Ok(Json(Envelope::ok(convert::deposit(deposit))))
}

pub async fn next_code(
    State(state): State<ServerState>,
) -> Result<Json<Envelope<NextCode>>, ServerError> {
    let code = state.engine.peek_next_code(CodeCategory::Deposit).await?;
    Ok(Json(Envelope::ok(NextCode {
        code: code.to_string(),
    })))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<DepositNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<DepositView>>), ServerError> {
    let Json(payload) = payload?;

    let currency = Currency::for_record(&payload.currency)?;
    let mut cmd = NewDepositCmd::new(
        payload.amount_minor,
        currency,
        convert::deposit_type_in(payload.deposit_type),
        payload.recipient,
        payload.description,
    )
    .status(
        payload
            .status
            .map(convert::deposit_status_in)
            .unwrap_or(DepositStatus::Pending),
    );
    cmd.id = payload.id;
    cmd.code = payload.code;
    cmd.occurred_at = payload.occurred_at.map(convert::utc);
    cmd.bank = payload.bank;
    cmd.account_number = payload.account_number;
    cmd.supporting_document = payload.supporting_document;
    cmd.notes = payload.notes;
    cmd.transaction_id = payload.transaction_id;
    cmd.attachment = payload.attachment.map(convert::attachment_input);

    let created = state.engine.create_deposit(cmd).await?;
    tracing::info!(code = %created.deposit.code, "deposit registered");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(convert::deposit(created))),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<DepositUpdate>, JsonRejection>,
) -> Result<Json<Envelope<DepositView>>, ServerError> {
    let Json(payload) = payload?;

    let currency = payload
        .currency
        .as_deref()
        .map(Currency::for_record)
        .transpose()?;
    let cmd = UpdateDepositCmd {
        amount_minor: payload.amount_minor,
        currency,
        occurred_at: payload.occurred_at.map(convert::utc),
        recipient: payload.recipient,
        bank: payload.bank,
        account_number: payload.account_number,
        deposit_type: payload.deposit_type.map(convert::deposit_type_in),
        status: payload.status.map(convert::deposit_status_in),
        description: payload.description,
        supporting_document: payload.supporting_document,
        notes: payload.notes,
        transaction_id: payload.transaction_id,
        attachment: payload.attachment.map(convert::attachment_input),
    };

    let deposit = state.engine.update_deposit(&id, cmd).await?;
    Ok(Json(Envelope::ok(convert::deposit(deposit))))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Empty>>, ServerError> {
    state.engine.delete_deposit(&id).await?;
    Ok(Json(Envelope::ok(Empty {})))
}

pub async fn attachment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Response, ServerError> {
    let attachment = state.engine.deposit_attachment(&id).await?;
    attachment_response(attachment)
}
