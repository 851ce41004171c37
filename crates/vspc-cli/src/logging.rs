use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use time::OffsetDateTime;
use time::macros::format_description;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// One captured event, kept so a failed command can replay what led up to it.
#[derive(Clone, Debug)]
pub struct TrailEntry {
    pub timestamp: String,
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl TrailEntry {
    pub fn format_line(&self) -> String {
        let mut line = format!(
            "{} {:<5} {} {}",
            self.timestamp, self.level, self.target, self.message
        );
        if !self.fields.is_empty() {
            let extras: Vec<String> = self
                .fields
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            line.push_str(" | ");
            line.push_str(&extras.join(" "));
        }
        line
    }
}

/// Bounded ring of recent events; the oldest entry is dropped first.
#[derive(Clone)]
pub struct LogTrail {
    entries: Arc<Mutex<VecDeque<TrailEntry>>>,
    capacity: usize,
}

impl LogTrail {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn entries(&self) -> Vec<TrailEntry> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn push(&self, entry: TrailEntry) {
        if self.capacity == 0 {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() == self.capacity {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }
}

pub struct TrailLayer {
    trail: LogTrail,
}

impl TrailLayer {
    pub fn new(trail: LogTrail) -> Self {
        Self { trail }
    }
}

impl<S: Subscriber> Layer<S> for TrailLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = TrailVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();
        self.trail.push(TrailEntry {
            timestamp: clock_time(OffsetDateTime::now_utc()),
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct TrailVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl TrailVisitor {
    fn record(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for TrailVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record(field, value.to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.record(field, format!("{value:?}"));
    }
}

fn clock_time(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(format_description!("[hour]:[minute]:[second].[subsecond digits:3]"))
        .unwrap_or_else(|_| timestamp.unix_timestamp().to_string())
}
