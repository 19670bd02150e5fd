// src/sink.rs
//
// Accumulates accepted records in discovery order across the whole crawl.
// The scanned counter is the operator's denominator: every body row seen,
// filtered out or not. Snapshots are safe to take at any time and the export
// is plain delimited text any CSV reader consumes.

use serde::Serialize;

use crate::schema::ColumnSchema;
use crate::table::Record;

#[derive(Debug, Default)]
pub struct ResultSink {
    results: Vec<Record>,
    scanned: u64,
    done: bool,
}

/// A read of accumulated results plus metadata; never mutates crawl state.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub results: &'a [Record],
    pub scanned: u64,
    pub done: bool,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one record. Order of acceptance is preserved forever; nothing
    /// is deduplicated or re-sorted.
    pub fn add(&mut self, record: Record) {
        self.results.push(record);
    }

    /// Count one page's body rows, matches and non-matches alike.
    pub fn note_page(&mut self, per_page: usize) {
        self.scanned += per_page as u64;
    }

    /// Freeze the crawl; later snapshots report `done = true`.
    pub fn finish(&mut self) {
        self.done = true;
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            results: &self.results,
            scanned: self.scanned,
            done: self.done,
        }
    }

    /// Delimited export: `#, Name, <fields>, Link`, every cell quoted with
    /// internal quotes doubled, LF rows.
    pub fn export_csv(&self, schema: &ColumnSchema) -> String {
        let mut lines = Vec::with_capacity(self.results.len() + 1);

        let mut header = vec!["#".to_string(), "Name".to_string()];
        header.extend(schema.fields.iter().map(|f| f.label.to_string()));
        header.push("Link".to_string());
        lines.push(csv_row(&header));

        for (i, rec) in self.results.iter().enumerate() {
            let mut row = vec![(i + 1).to_string(), rec.name.clone()];
            row.extend((0..schema.fields.len()).map(|f| rec.display(f)));
            row.push(rec.link.clone());
            lines.push(csv_row(&row));
        }
        lines.join("\n")
    }

    /// Fixed filename pattern for the downloadable export.
    pub fn export_filename(schema: &ColumnSchema) -> String {
        format!("{}_filtered.csv", schema.name)
    }
}

fn csv_row(cells: &[String]) -> String {
    cells
        .iter()
        .map(|c| format!("\"{}\"", c.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use crate::table::{Record, Value};

    fn rec(name: &str, price: f64) -> Record {
        Record {
            name: name.into(),
            link: format!("https://meneger.net/team/{name}"),
            values: vec![Value::Num(f64::NAN), Value::Num(f64::NAN), Value::Num(price)],
        }
    }

    #[test]
    fn order_is_stable_across_snapshots() {
        let mut sink = ResultSink::new();
        for n in ["A", "B", "C"] {
            sink.add(rec(n, 1.0));
        }
        for _ in 0..3 {
            let names: Vec<_> = sink.snapshot().results.iter().map(|r| r.name.clone()).collect();
            assert_eq!(names, ["A", "B", "C"]);
        }
    }

    #[test]
    fn scanned_counts_all_rows_not_matches() {
        let mut sink = ResultSink::new();
        sink.note_page(20);
        for i in 0..3 {
            sink.add(rec(&format!("t{i}"), 100.0));
        }
        sink.note_page(20);
        for i in 3..5 {
            sink.add(rec(&format!("t{i}"), 100.0));
        }
        let snap = sink.snapshot();
        assert_eq!(snap.scanned, 40);
        assert_eq!(snap.results.len(), 5);
        assert!(!snap.done);
    }

    #[test]
    fn finish_flips_done_without_losing_entries() {
        let mut sink = ResultSink::new();
        sink.add(rec("A", 1.0));
        sink.note_page(7);
        assert!(!sink.snapshot().done);
        sink.finish();
        let snap = sink.snapshot();
        assert!(snap.done);
        assert_eq!(snap.results.len(), 1);
        assert_eq!(snap.scanned, 7);
    }

    #[test]
    fn csv_quotes_everything_and_doubles_quotes() {
        let mut sink = ResultSink::new();
        let mut r = rec("Dream \"Team\"", 900000.0);
        r.link = "https://meneger.net/team/9".into();
        sink.add(r);
        let schema = schema::teams();
        let csv = sink.export_csv(&schema);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"#\",\"Name\",\"Players\",\"Power\",\"Price\",\"Link\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"1\",\"Dream \"\"Team\"\"\",\"\",\"\",\"900000\",\"https://meneger.net/team/9\""
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn export_filename_pattern() {
        assert_eq!(ResultSink::export_filename(&schema::players()), "players_filtered.csv");
    }
}
