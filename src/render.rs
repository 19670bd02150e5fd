// src/render.rs
//
// Renderer collaborator: idempotent re-render of the latest snapshot, called
// after every page and once more at completion. Cosmetics live out here, not
// in the engine.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::sink::Snapshot;

pub trait Render {
    fn render(&mut self, snapshot: &Snapshot<'_>);
}

/// Log-based renderer: one summary line per render, newest matches at debug.
#[derive(Debug)]
pub struct LogRenderer {
    /// How many of the newest matches to list per render.
    pub listing: usize,
    seen: usize,
}

impl Default for LogRenderer {
    fn default() -> Self {
        Self { listing: 10, seen: 0 }
    }
}

impl Render for LogRenderer {
    fn render(&mut self, snapshot: &Snapshot<'_>) {
        info!(
            matches = snapshot.results.len(),
            scanned = snapshot.scanned,
            done = snapshot.done,
            "results"
        );
        let new = &snapshot.results[self.seen.min(snapshot.results.len())..];
        for rec in new.iter().take(self.listing) {
            debug!(name = %rec.name, link = %rec.link, "match");
        }
        self.seen = snapshot.results.len();
    }
}

/// Writes the whole snapshot as JSON on every render; the file always holds
/// the latest state.
#[derive(Debug)]
pub struct JsonRenderer {
    path: PathBuf,
}

impl JsonRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Render for JsonRenderer {
    fn render(&mut self, snapshot: &Snapshot<'_>) {
        match serde_json::to_string_pretty(snapshot) {
            Ok(json) => {
                if let Err(err) = fs::write(&self.path, json) {
                    warn!(path = %self.path.display(), %err, "snapshot write failed");
                }
            }
            Err(err) => warn!(%err, "snapshot serialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ResultSink;
    use crate::table::{Record, Value};

    #[test]
    fn json_renderer_overwrites_with_latest_state() {
        let dir = std::env::temp_dir().join("menescraper-render-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snapshot.json");

        let mut sink = ResultSink::new();
        let mut renderer = JsonRenderer::new(&path);
        renderer.render(&sink.snapshot());
        let first = fs::read_to_string(&path).unwrap();
        assert!(first.contains("\"done\": false"));

        sink.add(Record {
            name: "A".into(),
            link: String::new(),
            values: vec![Value::Num(1.0)],
        });
        sink.note_page(20);
        sink.finish();
        renderer.render(&sink.snapshot());
        let second = fs::read_to_string(&path).unwrap();
        assert!(second.contains("\"scanned\": 20"));
        assert!(second.contains("\"done\": true"));

        fs::remove_file(&path).ok();
    }
}
