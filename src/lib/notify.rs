//! User-visible notifications (toasts).
//!
//! Titles are `RichText`: ordered plain and highlighted segments. Highlights
//! come from message placeholders, so sinks decide how to emphasize them
//! (bold on a terminal, `<strong>` in markup) and sinks without rich support
//! get the flattened plain text.

use colored::Colorize;
use std::{
    fmt,
    io::Write,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tracing::{error, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Strong(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RichText {
    segments: Vec<Segment>,
}

impl RichText {
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        let mut rich = Self::default();
        rich.push_text(text);
        rich
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(&text);
        } else {
            self.segments.push(Segment::Text(text));
        }
    }

    pub fn push_strong(&mut self, text: impl Into<String>) {
        self.segments.push(Segment::Strong(text.into()));
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn has_highlight(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Strong(_)))
    }

    /// Flattens the text, dropping emphasis.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) | Segment::Strong(text) => text.as_str(),
            })
            .collect()
    }

    /// Escaped markup with highlights wrapped in `<strong>`.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => escape_html(text),
                Segment::Strong(text) => format!("<strong>{}</strong>", escape_html(text)),
            })
            .collect()
    }
}

impl From<&str> for RichText {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for RichText {
    fn from(text: String) -> Self {
        Self::plain(text)
    }
}

impl fmt::Display for RichText {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.plain_text())
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    #[must_use]
    pub const fn default_duration(self) -> Duration {
        match self {
            Self::Success | Self::Info => Duration::from_millis(3000),
            Self::Warning => Duration::from_millis(4000),
            Self::Error => Duration::from_millis(5000),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub title: RichText,
    pub description: Option<String>,
    pub duration: Duration,
}

impl Notification {
    #[must_use]
    pub fn new(level: Level, title: impl Into<RichText>, description: Option<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description,
            duration: level.default_duration(),
        }
    }
}

/// A sink that displays notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    /// Whether highlighted segments can be rendered distinctly.
    fn supports_rich(&self) -> bool {
        false
    }
}

/// Convenience front for a `Notifier` that also logs what it shows.
#[derive(Clone)]
pub struct Toaster {
    sink: Arc<dyn Notifier>,
}

impl Toaster {
    #[must_use]
    pub fn new(sink: Arc<dyn Notifier>) -> Self {
        Self { sink }
    }

    pub fn success(&self, message: &str, description: Option<String>) {
        info!(title = message, description = ?description, "success");
        self.sink
            .notify(Notification::new(Level::Success, message, description));
    }

    pub fn info(&self, message: &str, description: Option<String>) {
        info!(title = message, description = ?description, "info");
        self.sink
            .notify(Notification::new(Level::Info, message, description));
    }

    pub fn warning(&self, message: &str, description: Option<String>) {
        warn!(title = message, description = ?description, "warning");
        self.sink
            .notify(Notification::new(Level::Warning, message, description));
    }

    pub fn error(&self, message: &str, description: Option<String>) {
        error!(title = message, description = ?description, "error");
        self.sink
            .notify(Notification::new(Level::Error, message, description));
    }

    /// Sends a highlighted success title, flattening it for plain sinks.
    pub fn success_rich(&self, title: RichText, description: Option<String>) {
        let title = if self.sink.supports_rich() {
            title
        } else {
            RichText::plain(title.plain_text())
        };
        info!(title = %title, description = ?description, "success");
        self.sink
            .notify(Notification::new(Level::Success, title, description));
    }
}

/// Writes notifications to stderr, colored when the terminal allows it.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl TerminalNotifier {
    fn render_title(title: &RichText) -> String {
        title
            .segments()
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.normal().to_string(),
                Segment::Strong(text) => text.bold().to_string(),
            })
            .collect()
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.level {
            Level::Success => "✔".green(),
            Level::Info => "ℹ".blue(),
            Level::Warning => "!".yellow(),
            Level::Error => "✖".red(),
        };
        let title = Self::render_title(&notification.title);
        let mut stderr = std::io::stderr().lock();
        // A closed stderr leaves nowhere to report to.
        let _ = writeln!(stderr, "{marker} {title}");
        if let Some(description) = notification.description {
            let _ = writeln!(stderr, "  {}", description.dimmed());
        }
    }

    fn supports_rich(&self) -> bool {
        colored::control::SHOULD_COLORIZE.should_colorize()
    }
}

/// Keeps notifications in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    rich: bool,
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rich_support() -> Self {
        Self {
            rich: true,
            notifications: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }

    fn supports_rich(&self) -> bool {
        self.rich
    }
}
