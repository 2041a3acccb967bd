//! Session counters.
//!
//! Labels are flattened into sorted key vectors to keep deterministic ordering.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for an exact label set (0 if never incremented).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Sum across all label sets.
    pub fn total(&self) -> u64 {
        self.map.iter().map(|r| r.value().load(Ordering::Relaxed)).sum()
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        let mut rows: Vec<(String, u64)> = self
            .map
            .iter()
            .map(|r| {
                let label_str = r
                    .key()
                    .iter()
                    .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                    .collect::<Vec<_>>()
                    .join(",");
                (label_str, r.value().load(Ordering::Relaxed))
            })
            .collect();
        rows.sort();
        for (label_str, val) in rows {
            if label_str.is_empty() {
                let _ = writeln!(out, "{} {}", name, val);
            } else {
                let _ = writeln!(out, "{}{{{}}} {}", name, label_str, val);
            }
        }
    }
}

#[derive(Default)]
pub struct SessionMetrics {
    /// label `outcome`: ok | auth | error | cancelled
    pub connect_attempts: CounterVec,
    pub retries_scheduled: CounterVec,
    /// label `event`
    pub frames_dispatched: CounterVec,
    /// label `reason`: decode | malformed | unsubscribed
    pub frames_dropped: CounterVec,
    pub emits_dropped: CounterVec,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.connect_attempts
            .render("sociohub_realtime_connect_attempts_total", &mut out);
        self.retries_scheduled
            .render("sociohub_realtime_retries_scheduled_total", &mut out);
        self.frames_dispatched
            .render("sociohub_realtime_frames_dispatched_total", &mut out);
        self.frames_dropped
            .render("sociohub_realtime_frames_dropped_total", &mut out);
        self.emits_dropped
            .render("sociohub_realtime_emits_dropped_total", &mut out);
        out
    }
}
