//! Demo records loaded at startup when `server.seed` is on.

use chrono::{DateTime, Duration, Utc};

use crate::inbox::{CURRENT_USER, Chat, Message, Participant};
use crate::task::{Task, TaskId};

pub fn demo_tasks(now: DateTime<Utc>) -> Vec<Task> {
    vec![
        Task {
            id: TaskId::new("1"),
            title: "Complete project proposal".into(),
            description: "Write and submit the project proposal document with all requirements and timeline.".into(),
            due_date: Some(now + Duration::days(2)),
            is_completed: false,
        },
        Task {
            id: TaskId::new("2"),
            title: "Team meeting".into(),
            description: "Weekly sync with the development team to discuss progress and blockers.".into(),
            due_date: Some(now - Duration::days(1)),
            is_completed: true,
        },
        Task {
            id: TaskId::new("3"),
            title: "Code review".into(),
            description: "Review pull requests and provide feedback to the team.".into(),
            due_date: Some(now + Duration::days(1)),
            is_completed: false,
        },
    ]
}

fn participant(id: u64, name: &str, role: &str) -> Participant {
    Participant {
        id,
        name: name.into(),
        role: role.into(),
    }
}

fn message(
    id: u64,
    sender: &str,
    content: &str,
    time: &str,
    timestamp: DateTime<Utc>,
    read: bool,
) -> Message {
    Message {
        id,
        sender: sender.into(),
        content: content.into(),
        time: time.into(),
        is_current_user: sender == CURRENT_USER,
        timestamp,
        read,
    }
}

pub fn demo_chats(now: DateTime<Utc>) -> Vec<Chat> {
    vec![
        Chat {
            id: 4,
            title: "FastVisa Support".into(),
            name: "FastVisa Support".into(),
            content: "Hello! How can we assist you with your visa application today?".into(),
            participants: vec![
                participant(1, "FastVisa Support", "Support Agent"),
                participant(2, CURRENT_USER, "Customer"),
            ],
            messages: vec![
                message(
                    1,
                    "FastVisa Support",
                    "Hello! Welcome to FastVisa Support. How can we assist you with your visa application today?",
                    "13:45",
                    now,
                    false,
                ),
                message(
                    2,
                    CURRENT_USER,
                    "Hi! I need help with my tourist visa application for Japan.",
                    "13:47",
                    now - Duration::minutes(5),
                    true,
                ),
                message(
                    3,
                    "FastVisa Support",
                    "I'd be happy to help! Could you please share your application reference number?",
                    "13:48",
                    now - Duration::minutes(2),
                    false,
                ),
            ],
        },
        Chat {
            id: 1,
            title: "Team Collaboration".into(),
            name: "John Doe".into(),
            content: "Hi there! Just wanted to check in about the project timeline. Do you think we can have the first draft ready by Friday?".into(),
            participants: vec![
                participant(1, "John Doe", "Project Manager"),
                participant(2, "Sarah Wilson", "Designer"),
                participant(3, "Alex Johnson", "Developer"),
            ],
            messages: vec![
                message(
                    1,
                    "Sarah Wilson",
                    "I've uploaded the latest design assets to the shared drive.",
                    "10:30",
                    now - Duration::hours(2),
                    true,
                ),
                message(
                    2,
                    CURRENT_USER,
                    "Thanks Sarah! The designs look great. Alex, how long do you think the implementation will take?",
                    "10:35",
                    now - Duration::minutes(90),
                    true,
                ),
                message(
                    3,
                    "Alex Johnson",
                    "I should be able to implement this in about 2 days. I'll keep you updated on the progress.",
                    "10:40",
                    now - Duration::hours(1),
                    true,
                ),
                message(
                    4,
                    "John Doe",
                    "Perfect! Let's aim to have everything ready by Friday then.",
                    "10:42",
                    now - Duration::minutes(30),
                    false,
                ),
            ],
        },
    ]
}
