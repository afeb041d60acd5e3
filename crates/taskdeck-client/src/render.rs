use std::io::{self, IsTerminal, Write};

use chrono::{DateTime, Utc};
use taskdeck_shared::ChatsDto;
use unicode_width::UnicodeWidthStr;

use crate::board::TaskBoard;
use crate::calendar::{CalendarCell, WEEKDAY_LABELS, weeks};
use crate::controller::TaskController;
use crate::due::DueTone;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self {
            color: color && io::stdout().is_terminal(),
        }
    }

    #[tracing::instrument(skip(self, board, now))]
    pub fn print_task_table(&self, board: &TaskBoard, now: DateTime<Utc>) -> anyhow::Result<()> {
        self.write_task_table(io::stdout().lock(), board, now)
    }

    pub fn write_task_table<W: Write>(
        &self,
        out: W,
        board: &TaskBoard,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let headers = vec![
            "ID".to_string(),
            "Done".to_string(),
            "Title".to_string(),
            "Status".to_string(),
            "Date".to_string(),
        ];

        let mut rows = Vec::with_capacity(board.rows().len());

        for row in board.rows() {
            let task = row.task();
            let done = if task.is_completed { "[x]" } else { "[ ]" };
            let title = if task.is_completed {
                self.paint(&task.title, "9")
            } else {
                task.title.clone()
            };
            let date = if row.view().selected_due.is_some() {
                row.date_label()
            } else {
                String::new()
            };

            rows.push(vec![
                self.paint(task.id.as_str(), "33"),
                done.to_string(),
                title,
                self.status_cell(row, now),
                date,
            ]);
        }

        write_table(out, headers, rows)
    }

    #[tracing::instrument(skip(self, row, now), fields(id = %row.id()))]
    pub fn print_task_info(&self, row: &TaskController, now: DateTime<Utc>) -> anyhow::Result<()> {
        self.write_task_info(io::stdout().lock(), row, now)
    }

    pub fn write_task_info<W: Write>(
        &self,
        mut out: W,
        row: &TaskController,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let task = row.task();
        writeln!(out, "id          {}", task.id)?;
        writeln!(out, "title       {}", task.title)?;
        writeln!(out, "completed   {}", if task.is_completed { "yes" } else { "no" })?;
        writeln!(out, "date        {}", row.date_label())?;
        let status = self.status_cell(row, now);
        if !status.is_empty() {
            writeln!(out, "status      {status}")?;
        }
        writeln!(out, "description {}", row.description_label())?;
        writeln!(out, "bookmarks   {}", row.view().bookmarks.labels().join(", "))?;
        Ok(())
    }

    #[tracing::instrument(skip(self, row), fields(id = %row.id()))]
    pub fn print_calendar(&self, row: &TaskController) -> anyhow::Result<()> {
        self.write_calendar(io::stdout().lock(), row)
    }

    /// Month header, weekday labels, then one line per week. The selected
    /// day is bracketed.
    pub fn write_calendar<W: Write>(&self, mut out: W, row: &TaskController) -> anyhow::Result<()> {
        writeln!(out, "{}", row.view().calendar_cursor.title())?;
        let labels = WEEKDAY_LABELS
            .iter()
            .map(|label| format!(" {label:>2} "))
            .collect::<String>();
        writeln!(out, "{}", labels.trim_end())?;

        for week in weeks(&row.calendar_grid()) {
            let line = week
                .iter()
                .map(|cell| match cell {
                    CalendarCell::Empty => "    ".to_string(),
                    CalendarCell::Day { day, selected: true } => {
                        self.paint(&format!("[{day:>2}]"), "34")
                    }
                    CalendarCell::Day { day, .. } => format!(" {day:>2} "),
                })
                .collect::<String>();
            writeln!(out, "{}", line.trim_end())?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, chats))]
    pub fn print_chats(&self, chats: &ChatsDto) -> anyhow::Result<()> {
        self.write_chats(io::stdout().lock(), chats)
    }

    pub fn write_chats<W: Write>(&self, out: W, chats: &ChatsDto) -> anyhow::Result<()> {
        let headers = vec![
            "Chat".to_string(),
            "Title".to_string(),
            "Last".to_string(),
            "Unread".to_string(),
            "Preview".to_string(),
        ];

        let rows = chats
            .chats
            .iter()
            .map(|chat| {
                let unread = chat
                    .messages
                    .iter()
                    .filter(|message| !message.read && !message.is_current_user)
                    .count();
                let last = chat
                    .messages
                    .iter()
                    .max_by(|a, b| a.timestamp.cmp(&b.timestamp))
                    .map(|message| message.time.clone())
                    .unwrap_or_default();
                let unread = if unread > 0 {
                    self.paint(&unread.to_string(), "31")
                } else {
                    String::new()
                };
                vec![
                    self.paint(&chat.id.to_string(), "33"),
                    chat.title.clone(),
                    last,
                    unread,
                    chat.content.clone(),
                ]
            })
            .collect();

        write_table(out, headers, rows)
    }

    fn status_cell(&self, row: &TaskController, now: DateTime<Utc>) -> String {
        match row.due_report(now) {
            Some(report) => {
                let text = report.status.to_string();
                match report.tone {
                    DueTone::Warning => self.paint(&text, "31"),
                    DueTone::Neutral => text,
                }
            }
            None => String::new(),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let line = headers
        .iter()
        .zip(&widths)
        .map(|(header, &width)| format!("{header:width$}"))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(writer, "{}", line.trim_end())?;

    let rule = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(writer, "{rule}")?;

    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let visible = UnicodeWidthStr::width(strip_ansi(cell).as_str());
                format!("{cell}{}", " ".repeat(width.saturating_sub(visible)))
            })
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line.trim_end())?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use taskdeck_shared::TaskDto;

    use super::*;
    use crate::view_config::TaskRowConfig;

    fn plain() -> Renderer {
        Renderer { color: false }
    }

    fn board() -> TaskBoard {
        let now = Utc
            .with_ymd_and_hms(2024, 1, 10, 9, 0, 0)
            .single()
            .expect("instant");
        let mut board = TaskBoard::with_clock(TaskRowConfig::default(), Arc::new(move || now));
        board.reconcile(vec![
            TaskDto {
                id: "2".into(),
                title: "Team meeting".into(),
                description: String::new(),
                due_date: Some("2024-01-08T00:00:00.000Z".into()),
                is_completed: true,
            },
            TaskDto {
                id: "1".into(),
                title: "Draft".into(),
                description: String::new(),
                due_date: Some("2024-02-14T00:00:00.000Z".into()),
                is_completed: false,
            },
        ]);
        board
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn table_shows_status_and_date() {
        let board = board();
        let now = board.now();
        let text = render(|buf| plain().write_task_table(buf, &board, now));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "ID Done Title        Status         Date");
        assert_eq!(lines[2], "2  [x]  Team meeting 2 Days Overdue 08/01/2024");
        assert_eq!(lines[3], "1  [ ]  Draft        35 Days left   14/02/2024");
    }

    #[test]
    fn calendar_brackets_selected_day() {
        let board = board();
        let row = board.row(&"1".into()).expect("row 1");
        let text = render(|buf| plain().write_calendar(buf, row));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "February 2024");
        assert_eq!(lines[1], "  M   T   W  Th   F   S   S");
        assert_eq!(lines[2], "              1   2   3   4");
        assert_eq!(lines[4], " 12  13 [14] 15  16  17  18");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn strip_ansi_removes_escape_sequences() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m"), "red");
    }
}
