use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use taskdeck_client::api::{ApiError, HttpTaskApi, TaskApi};
use taskdeck_client::board::{SyncReport, TaskBoard};
use taskdeck_client::controller::TaskCall;
use taskdeck_client::view_config::TaskRowConfig;
use taskdeck_core::{SENTINEL_TITLE, TaskId};
use taskdeck_server::AppState;
use taskdeck_shared::{TaskCreate, TaskDto, TaskIdArg, TaskPatch, TaskUpdateArgs};
use tokio::net::TcpListener;

/// Talks to server state directly and records every call.
struct InProcessApi {
    state: AppState,
    log: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
}

impl InProcessApi {
    fn new(state: AppState) -> Self {
        Self {
            state,
            log: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.lock().expect("log lock").push(entry.into());
    }

    fn calls(&self, prefix: &str) -> usize {
        self.log
            .lock()
            .expect("log lock")
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .count()
    }

    fn check_write(&self) -> Result<(), ApiError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(ApiError::Status {
                status: 500,
                message: "store unavailable".into(),
            })
        } else {
            Ok(())
        }
    }
}

fn rejected(err: impl std::fmt::Display) -> ApiError {
    ApiError::Status {
        status: 400,
        message: err.to_string(),
    }
}

impl TaskApi for InProcessApi {
    async fn list(&self) -> Result<Vec<TaskDto>, ApiError> {
        self.record("list");
        Ok(self.state.list())
    }

    async fn create(&self, create: TaskCreate) -> Result<TaskDto, ApiError> {
        self.record("create");
        self.check_write()?;
        self.state.add(create).map_err(rejected)
    }

    async fn update(&self, id: &str, patch: TaskPatch) -> Result<(), ApiError> {
        self.record(format!("patch {id}"));
        self.check_write()?;
        self.state
            .update(TaskUpdateArgs::new(id, patch))
            .map_err(rejected)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("delete {id}"));
        self.check_write()?;
        self.state.delete(TaskIdArg::new(id)).map_err(rejected)
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 9, 30, 0)
        .single()
        .expect("instant")
}

fn board() -> TaskBoard {
    TaskBoard::with_clock(TaskRowConfig::default(), Arc::new(now))
}

fn seeded_api() -> InProcessApi {
    InProcessApi::new(AppState::seeded(now(), chrono_tz::UTC))
}

#[tokio::test]
async fn placeholder_is_confirmed_with_a_single_patch() {
    let api = InProcessApi::new(AppState::empty());
    let mut board = board();

    let id = board.create_placeholder(&api).await.expect("create");
    let row = board.row_mut(&id).expect("placeholder row");
    assert!(row.view().is_expanded);
    assert!(row.view().title.is_editing());
    assert_eq!(row.task().title, SENTINEL_TITLE);

    row.open_calendar();
    row.next_month();
    assert_eq!(row.select_day(29), None);
    row.set_title_buffer("Renew passport");
    let call = row.commit_title();
    assert!(!row.view().title.is_editing());

    let report = board.apply(&api, call).await.expect("a call was issued");
    assert!(report.is_synced());
    assert_eq!(api.calls("patch"), 1);

    let stored = api.state.list();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Renew passport");
    assert_eq!(stored[0].due_date.as_deref(), Some("2024-02-29T00:00:00.000Z"));

    let row = board.row(&id).expect("row after refresh");
    assert!(!row.is_unconfirmed());
    assert_eq!(row.date_label(), "29/02/2024");
    let status = row.due_report(now()).expect("confirmed due date");
    assert_eq!(status.status.to_string(), "50 Days left");
}

#[tokio::test]
async fn completion_toggle_round_trips() {
    let api = seeded_api();
    let mut board = board();
    board.refresh(&api).await.expect("list");

    let code_review = TaskId::new("3");
    let call = board
        .row_mut(&code_review)
        .expect("seeded row")
        .toggle_completion();
    assert!(board.execute(&api, call).await.is_synced());
    assert!(board.row(&code_review).expect("row").task().is_completed);

    let call = board
        .row_mut(&code_review)
        .expect("seeded row")
        .toggle_completion();
    assert!(board.execute(&api, call).await.is_synced());
    assert!(!board.row(&code_review).expect("row").task().is_completed);
}

#[tokio::test]
async fn delete_from_options_menu_drops_the_row() {
    let api = seeded_api();
    let mut board = board();
    board.refresh(&api).await.expect("list");

    let row = board.row_mut(&TaskId::new("2")).expect("seeded row");
    row.toggle_options();
    let call = row.delete();
    assert_eq!(call, TaskCall::Delete { id: TaskId::new("2") });

    assert!(board.execute(&api, call.clone()).await.is_synced());
    assert!(board.row(&TaskId::new("2")).is_none());
    assert_eq!(board.rows().len(), 2);

    // A second delete of the same id is still a success.
    assert!(board.execute(&api, call).await.is_synced());
}

#[tokio::test]
async fn failed_call_keeps_local_state_and_is_not_retried() {
    let api = seeded_api();
    let mut board = board();
    board.refresh(&api).await.expect("list");
    api.fail_writes.store(true, Ordering::SeqCst);

    let row = board.row_mut(&TaskId::new("1")).expect("seeded row");
    row.begin_title_edit();
    row.set_title_buffer("Proposal v2");
    let call = row.commit_title().expect("title changed");

    let lists_before = api.calls("list");
    let report = board.execute(&api, call).await;
    assert!(matches!(report, SyncReport::CallFailed(_)));
    assert_eq!(report.error().and_then(ApiError::status), Some(500));
    assert_eq!(api.calls("patch"), 1);
    assert_eq!(api.calls("list"), lists_before);

    let row = board.row(&TaskId::new("1")).expect("row");
    assert_eq!(row.task().title, "Proposal v2");
    assert_eq!(api.state.list()[0].title, "Complete project proposal");
}

#[tokio::test]
async fn store_rejections_surface_as_bad_requests() {
    let api = InProcessApi::new(AppState::empty());
    let err = api
        .create(TaskCreate::default())
        .await
        .expect_err("title is required");
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("title"));
}

#[tokio::test]
async fn refresh_overrides_optimistic_state() {
    let api = seeded_api();
    let mut board = board();
    board.refresh(&api).await.expect("list");

    let row = board.row_mut(&TaskId::new("1")).expect("seeded row");
    row.toggle_completion();
    assert!(row.task().is_completed);

    api.state
        .update(TaskUpdateArgs::new(
            "1",
            TaskPatch {
                title: Some("Changed on the server".into()),
                ..TaskPatch::default()
            },
        ))
        .expect("server update");
    board.refresh(&api).await.expect("list");

    let row = board.row(&TaskId::new("1")).expect("row");
    assert_eq!(row.task().title, "Changed on the server");
    assert!(!row.task().is_completed);
}

#[tokio::test]
async fn seeded_rows_classify_against_the_clock() {
    let api = seeded_api();
    let mut board = board();
    board.refresh(&api).await.expect("list");

    let labels: Vec<String> = board
        .rows()
        .iter()
        .map(|row| {
            row.due_report(board.now())
                .map(|report| report.status.to_string())
                .unwrap_or_default()
        })
        .collect();
    assert_eq!(labels, vec!["2 Days left", "1 Days Overdue", "1 Day left"]);
}

#[tokio::test]
async fn http_api_drives_a_live_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(taskdeck_server::serve(
        listener,
        AppState::seeded(now(), chrono_tz::UTC),
        std::future::pending(),
    ));
    let api = HttpTaskApi::new(format!("http://{addr}/"));
    let mut board = board();

    let id = board.create_placeholder(&api).await.expect("create");
    assert_eq!(board.rows().len(), 4);
    assert_eq!(board.rows()[0].id(), &id);

    let row = board.row_mut(&id).expect("placeholder row");
    row.set_title_buffer("Call the embassy");
    let call = row.commit_title();
    assert!(board.apply(&api, call).await.expect("patch issued").is_synced());
    assert_eq!(board.rows()[0].task().title, "Call the embassy");

    let err = api
        .create(TaskCreate::default())
        .await
        .expect_err("title is required");
    assert_eq!(err.status(), Some(400));

    let chats = api.list_chats().await.expect("inbox");
    assert_eq!(chats.chats.len(), 2);
    let sent = api.send_message(1, "On it").await.expect("send");
    assert_eq!(sent.chat.content, "On it");
}
