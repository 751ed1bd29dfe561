//! Plain-text rendering of map entries for the terminal.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use munifor_map::classify::classify;
use munifor_map_models::{Entry, EntryRef};

const TITLE_WIDTH: usize = 40;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

fn location(entry: EntryRef<'_>) -> String {
    entry.position().map_or_else(
        || "(no location)".to_string(),
        |p| format!("{:.5}, {:.5}", p.lat, p.lng),
    )
}

/// Column header matching [`entry_line`].
#[must_use]
pub fn header() -> String {
    format!(
        "{:<12} {:<12} {:<TITLE_WIDTH$} {}",
        "ID", "STATUS", "TITLE", "LOCATION"
    )
}

/// One table row for an entry.
#[must_use]
pub fn entry_line(entry: EntryRef<'_>) -> String {
    format!(
        "{:<12} {:<12} {:<TITLE_WIDTH$} {}",
        truncate(entry.id(), 12),
        truncate(entry.status_label(), 12),
        truncate(entry.title(), TITLE_WIDTH),
        location(entry)
    )
}

/// `status: count` summary, one per line.
#[must_use]
pub fn status_summary(counts: &BTreeMap<String, usize>) -> String {
    let mut out = String::new();
    for (status, count) in counts {
        let _ = writeln!(out, "  {status:<14} {count}");
    }
    out
}

/// Multi-line detail view of a selected entry, including its pin style.
#[must_use]
pub fn detail(entry: &Entry) -> String {
    let view = entry.as_entry_ref();
    let style = classify(view);
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", entry.data_type(), view.id());
    match entry {
        Entry::Report(r) => {
            let _ = writeln!(out, "  title:       {}", r.title);
            let _ = writeln!(out, "  type:        {}", r.report_type);
            let _ = writeln!(out, "  status:      {}", r.status);
            if let Some(d) = &r.description {
                let _ = writeln!(out, "  description: {d}");
            }
        }
        Entry::Task(t) => {
            let _ = writeln!(out, "  title:       {}", t.title);
            let _ = writeln!(out, "  type:        {}", t.task_type);
            let _ = writeln!(out, "  priority:    {}", t.priority);
            let _ = writeln!(out, "  status:      {}", t.status);
        }
        Entry::Progress(p) => {
            let _ = writeln!(out, "  worker:      {}", p.worker_name);
            let _ = writeln!(out, "  status:      {}", p.status);
            if let Some(d) = &p.description {
                let _ = writeln!(out, "  notes:       {d}");
            }
        }
    }
    let _ = writeln!(out, "  location:    {}", location(view));
    let _ = writeln!(
        out,
        "  pin:         {} fill {} border {}",
        style.glyph, style.fill, style.border
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use munifor_map_models::MapDataset;

    fn dataset() -> MapDataset {
        serde_json::from_value(serde_json::json!({
            "reports": [
                { "id": "r1", "type": "bache", "status": "Pendiente", "title": "Bache", "lat": -12.5, "lng": -77.25 },
                { "id": "r2", "type": "basura", "status": "Pendiente",
                  "title": "Un título muy largo que no cabe en la columna reservada" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn rows_show_location_or_placeholder() {
        let data = dataset();
        let rows: Vec<String> = data
            .entries(munifor_issue_models::DataType::Report)
            .map(entry_line)
            .collect();
        assert!(rows[0].ends_with("-12.50000, -77.25000"));
        assert!(rows[1].ends_with("(no location)"));
        assert!(rows[1].contains("..."));
    }

    #[test]
    fn detail_includes_pin_style() {
        let data = dataset();
        let entry = Entry::Report(data.reports[0].clone());
        let text = detail(&entry);
        assert!(text.starts_with("report r1"));
        assert!(text.contains("pin:         road fill #e74c3c border #f59e42"));
    }

    #[test]
    fn summary_lists_each_status() {
        let mut counts = BTreeMap::new();
        counts.insert("Pendiente".to_string(), 2);
        counts.insert("Rechazado".to_string(), 1);
        let text = status_summary(&counts);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Pendiente"));
    }
}
