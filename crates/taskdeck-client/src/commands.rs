//! Subcommand handlers.
//!
//! Every mutation goes through the task's [`TaskController`] so the terminal
//! follows the same commit and toggle rules as an interactive view.

use anyhow::{Context, anyhow};
use chrono::{Datelike, NaiveDate};
use taskdeck_core::TaskId;
use tracing::{debug, info, instrument};

use crate::api::{HttpTaskApi, TaskApi};
use crate::board::{SyncReport, TaskBoard};
use crate::calendar::MonthCursor;
use crate::cli::Command;
use crate::controller::{TaskCall, TaskController};
use crate::render::Renderer;

#[instrument(skip(api, board, renderer, command))]
pub async fn dispatch(
    api: &HttpTaskApi,
    board: &mut TaskBoard,
    renderer: &Renderer,
    command: Command,
) -> anyhow::Result<()> {
    debug!(?command, "dispatching");

    match command {
        Command::Inbox => {
            let chats = api.list_chats().await.context("failed to fetch inbox")?;
            renderer.print_chats(&chats)
        }
        Command::Send { chat_id, message } => {
            let sent = api
                .send_message(chat_id, message)
                .await
                .with_context(|| format!("failed to send to chat {chat_id}"))?;
            info!(chat_id, message_id = sent.message.id, "message sent");
            println!("sent to {} at {}", sent.chat.title, sent.message.time);
            Ok(())
        }
        task_command => {
            board.refresh(api).await.context("failed to fetch tasks")?;
            run_task_command(api, board, renderer, task_command).await
        }
    }
}

async fn run_task_command(
    api: &HttpTaskApi,
    board: &mut TaskBoard,
    renderer: &Renderer,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::List => renderer.print_task_table(board, board.now()),
        Command::Info { id } => {
            let row = find_row(board, &id)?;
            renderer.print_task_info(row, board.now())
        }
        Command::Add {
            title,
            description,
            due,
        } => add(api, board, renderer, title, description, due).await,
        Command::Toggle { id } => {
            let call = find_row_mut(board, &id)?.toggle_completion();
            send(api, board, call).await?;
            renderer.print_task_table(board, board.now())
        }
        Command::Rename { id, title } => {
            let row = find_row_mut(board, &id)?;
            row.begin_title_edit();
            row.set_title_buffer(title);
            let call = row.commit_title();
            send_if_changed(api, board, call).await?;
            renderer.print_task_table(board, board.now())
        }
        Command::Describe { id, text } => {
            let row = find_row_mut(board, &id)?;
            row.begin_description_edit();
            row.set_description_buffer(text);
            let call = row.commit_description();
            send_if_changed(api, board, call).await?;
            let row = find_row(board, &id)?;
            renderer.print_task_info(row, board.now())
        }
        Command::Due { id, date } => {
            let row = find_row_mut(board, &id)?;
            let call = pick_date(row, date)?;
            send_if_changed(api, board, call).await?;
            renderer.print_task_table(board, board.now())
        }
        Command::Rm { id } => {
            let row = find_row_mut(board, &id)?;
            row.toggle_options();
            let call = row.delete();
            send(api, board, call).await?;
            renderer.print_task_table(board, board.now())
        }
        Command::Calendar { id, year, month } => {
            let row = find_row_mut(board, &id)?;
            if year.is_some() || month.is_some() {
                let current = row.view().calendar_cursor;
                let year = year.unwrap_or(current.year());
                let month = month.map_or(current.month(), |m| m - 1);
                let cursor = MonthCursor::new(year, month)
                    .ok_or_else(|| anyhow!("invalid month: {month}"))?;
                row.show_month(cursor);
            }
            row.open_calendar();
            renderer.print_calendar(row)
        }
        Command::Inbox | Command::Send { .. } => Ok(()),
    }
}

/// Creates a placeholder, then confirms it the way a user would: pick the
/// date while unconfirmed, type the title, commit.
async fn add(
    api: &HttpTaskApi,
    board: &mut TaskBoard,
    renderer: &Renderer,
    title: String,
    description: Option<String>,
    due: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let id = board
        .create_placeholder(api)
        .await
        .context("failed to create task")?;
    let row = board
        .row_mut(&id)
        .ok_or_else(|| anyhow!("created task {id} missing from list"))?;

    if let Some(date) = due {
        pick_date(row, date)?;
    }
    row.set_title_buffer(title);
    let call = row.commit_title();
    send_if_changed(api, board, call).await?;

    if let Some(text) = description {
        let row = find_row_mut(board, id.as_str())?;
        row.begin_description_edit();
        row.set_description_buffer(text);
        let call = row.commit_description();
        send_if_changed(api, board, call).await?;
    }

    info!(id = %id, "task added");
    let row = find_row(board, id.as_str())?;
    renderer.print_task_info(row, board.now())
}

fn pick_date(row: &mut TaskController, date: NaiveDate) -> anyhow::Result<Option<TaskCall>> {
    row.open_calendar();
    row.show_month(MonthCursor::containing(date));
    let call = row.select_day(date.day());
    if row.view().selected_due != Some(date) {
        return Err(anyhow!("could not select {date}"));
    }
    Ok(call)
}

async fn send<A: TaskApi>(api: &A, board: &mut TaskBoard, call: TaskCall) -> anyhow::Result<()> {
    check_sync(board.execute(api, call).await)
}

async fn send_if_changed<A: TaskApi>(
    api: &A,
    board: &mut TaskBoard,
    call: Option<TaskCall>,
) -> anyhow::Result<()> {
    match board.apply(api, call).await {
        Some(report) => check_sync(report),
        None => {
            debug!("nothing changed");
            Ok(())
        }
    }
}

fn check_sync(report: SyncReport) -> anyhow::Result<()> {
    match report {
        SyncReport::Synced => Ok(()),
        SyncReport::CallFailed(err) => Err(anyhow!(err).context("task update failed")),
        SyncReport::RefreshFailed(err) => {
            Err(anyhow!(err).context("task updated but the list could not be refreshed"))
        }
    }
}

fn find_row<'a>(board: &'a TaskBoard, id: &str) -> anyhow::Result<&'a TaskController> {
    board
        .row(&TaskId::from(id))
        .ok_or_else(|| anyhow!("no task with id {id}"))
}

fn find_row_mut<'a>(board: &'a mut TaskBoard, id: &str) -> anyhow::Result<&'a mut TaskController> {
    board
        .row_mut(&TaskId::from(id))
        .ok_or_else(|| anyhow!("no task with id {id}"))
}
