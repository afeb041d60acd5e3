use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use taskdeck_shared::{
    ChatsDto, SendMessageArgs, SendMessageResult, SuccessDto, TaskCreate, TaskDto, TaskIdArg,
    TaskUpdateArgs,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

type JsonBody<T> = Result<Json<T>, JsonRejection>;

#[instrument(skip(state))]
pub async fn tasks_list(State(state): State<AppState>) -> Json<Vec<TaskDto>> {
    let tasks = state.list();
    info!(count = tasks.len(), "tasks_list served");
    Json(tasks)
}

#[instrument(skip(state, payload))]
pub async fn task_add(
    State(state): State<AppState>,
    payload: JsonBody<TaskCreate>,
) -> Result<Json<TaskDto>, ApiError> {
    let Json(create) = payload?;
    info!(
        has_title = create.title.is_some(),
        has_description = create.description.is_some(),
        has_due = create.due_date.is_some(),
        "task_add invoked"
    );
    Ok(Json(state.add(create)?))
}

#[instrument(skip(state, payload))]
pub async fn task_update(
    State(state): State<AppState>,
    payload: JsonBody<TaskUpdateArgs>,
) -> Result<Json<SuccessDto>, ApiError> {
    let Json(args) = payload?;
    info!(id = ?args.id, "task_update invoked");
    state.update(args)?;
    Ok(Json(SuccessDto::ok()))
}

#[instrument(skip(state, payload))]
pub async fn task_delete(
    State(state): State<AppState>,
    payload: JsonBody<TaskIdArg>,
) -> Result<Json<SuccessDto>, ApiError> {
    let Json(args) = payload?;
    info!(id = ?args.id, "task_delete invoked");
    state.delete(args)?;
    Ok(Json(SuccessDto::ok()))
}

#[instrument(skip(state))]
pub async fn inbox_list(State(state): State<AppState>) -> Json<ChatsDto> {
    Json(state.chats())
}

#[instrument(skip(state, payload))]
pub async fn inbox_send(
    State(state): State<AppState>,
    payload: JsonBody<SendMessageArgs>,
) -> Result<(StatusCode, Json<SendMessageResult>), ApiError> {
    let Json(args) = payload?;
    info!(chat_id = ?args.chat_id, "inbox_send invoked");
    let result = state.send(args)?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn healthz() -> &'static str {
    "ok"
}
