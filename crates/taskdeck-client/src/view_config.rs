use chrono_tz::Tz;
use taskdeck_core::config::Config;

/// Presentation settings shared by every task row.
///
/// Colors are CSS hex strings so a web or native host can use them as is;
/// the terminal renderer maps tones to ANSI codes instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRowConfig {
    /// Overdue and due-soon status text. Default `#EB5757`.
    pub warning_color: String,
    /// Status text for dues further out. Default `#6B7280`.
    pub neutral_color: String,
    /// Date and description icons once a value is set. Default `#2F80ED`.
    pub accent_color: String,
    /// Date and description icons while empty. Default `#4F4F4F`.
    pub icon_neutral_color: String,
    /// strftime pattern for chosen dates. Default `%d/%m/%Y`.
    pub date_format: String,
    /// Shown, and treated as empty, when a task has no description.
    /// Default `No Description`.
    pub empty_description: String,
    /// Date field text before a date is picked. Default `Set Date`.
    pub empty_date: String,
    /// Days ahead that still count as due soon. Default `2`.
    pub due_soon_days: i64,
    /// Zone whose midnights separate days. Default UTC.
    pub timezone: Tz,
}

impl Default for TaskRowConfig {
    fn default() -> Self {
        Self {
            warning_color: "#EB5757".to_string(),
            neutral_color: "#6B7280".to_string(),
            accent_color: "#2F80ED".to_string(),
            icon_neutral_color: "#4F4F4F".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            empty_description: "No Description".to_string(),
            empty_date: "Set Date".to_string(),
            due_soon_days: 2,
            timezone: chrono_tz::UTC,
        }
    }
}

impl TaskRowConfig {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            due_soon_days: cfg.due_soon_days()?,
            timezone: cfg.timezone()?,
            ..Self::default()
        })
    }

    pub fn has_description(&self, description: &str) -> bool {
        let trimmed = description.trim();
        !trimmed.is_empty() && trimmed != self.empty_description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_description_counts_as_empty() {
        let cfg = TaskRowConfig::default();
        assert!(!cfg.has_description(""));
        assert!(!cfg.has_description("No Description"));
        assert!(cfg.has_description("Ship it"));
    }

    #[test]
    fn reads_window_and_zone_from_rc() {
        let mut cfg = Config::default();
        cfg.apply_overrides([
            ("due.soon_days".to_string(), "4".to_string()),
            ("timezone".to_string(), "Asia/Tokyo".to_string()),
        ]);
        let row = TaskRowConfig::from_config(&cfg).expect("row config");
        assert_eq!(row.due_soon_days, 4);
        assert_eq!(row.timezone, chrono_tz::Asia::Tokyo);
        assert_eq!(row.warning_color, "#EB5757");
    }
}
