//! Icon classification.
//!
//! Maps an entry's category and secondary attribute to a
//! [`MarkerDescriptor`]. Reports are styled by (type, status), tasks by
//! (type, priority) and progress updates by status alone with a fixed
//! white border and glyph. Anything outside the lookup tables gets the
//! grey "unknown" swatch instead of an unstyled pin; fill and border fall
//! back independently.

use munifor_issue_models::{
    DataType, ProgressStatus, ReportStatus, ReportType, Tag, TaskPriority, TaskType,
};
use munifor_map_models::{Color, EntryRef, Glyph, MarkerDescriptor};

/// Fill used when the category is not in the lookup table.
pub const UNKNOWN_FILL: Color = Color("#7f8c8d");

/// Border used when the status or priority is not in the lookup table.
pub const UNKNOWN_BORDER: Color = Color("#2c3e50");

/// Border of every progress pin.
pub const PROGRESS_BORDER: Color = Color("#ffffff");

const fn report_style(report_type: ReportType) -> (Color, Glyph) {
    match report_type {
        ReportType::Pothole => (Color("#e74c3c"), Glyph::Road),
        ReportType::Streetlight => (Color("#f1c40f"), Glyph::Lightbulb),
        ReportType::Trash => (Color("#27ae60"), Glyph::Trash),
        ReportType::Other => (Color("#3498db"), Glyph::CircleInfo),
    }
}

const fn report_border(status: ReportStatus) -> Color {
    match status {
        ReportStatus::Pending => Color("#f59e42"),
        ReportStatus::Reviewed => Color("#3b82f6"),
        ReportStatus::Accepted => Color("#10b981"),
        ReportStatus::Completed => Color("#6b7280"),
        ReportStatus::Rejected => Color("#ef4444"),
    }
}

const fn task_style(task_type: TaskType) -> (Color, Glyph) {
    match task_type {
        TaskType::Repair => (Color("#e67e22"), Glyph::Wrench),
        TaskType::Maintenance => (Color("#8e44ad"), Glyph::Gear),
        TaskType::Collection => (Color("#16a085"), Glyph::Truck),
        TaskType::Supervision => (Color("#34495e"), Glyph::ClipboardCheck),
    }
}

const fn priority_border(priority: TaskPriority) -> Color {
    match priority {
        TaskPriority::High => Color("#dc2626"),
        TaskPriority::Medium => Color("#f59e0b"),
        TaskPriority::Low => Color("#22c55e"),
    }
}

const fn progress_fill(status: ProgressStatus) -> Color {
    match status {
        ProgressStatus::Pending => Color("#f39c12"),
        ProgressStatus::InProgress => Color("#2980b9"),
        ProgressStatus::Finalized => Color("#2ecc71"),
    }
}

/// Styles a citizen report.
#[must_use]
pub fn classify_report(
    report_type: &Tag<ReportType>,
    status: &Tag<ReportStatus>,
) -> MarkerDescriptor {
    let (fill, glyph) = report_type.known().map_or_else(
        || {
            log::debug!("No report style for type {report_type:?}, using fallback");
            (UNKNOWN_FILL, Glyph::Question)
        },
        report_style,
    );
    let border = status.known().map_or(UNKNOWN_BORDER, report_border);

    MarkerDescriptor {
        fill,
        border,
        glyph,
    }
}

/// Styles an operator task. Task status does not affect the pin.
#[must_use]
pub fn classify_task(task_type: &Tag<TaskType>, priority: &Tag<TaskPriority>) -> MarkerDescriptor {
    let (fill, glyph) = task_type.known().map_or_else(
        || {
            log::debug!("No task style for type {task_type:?}, using fallback");
            (UNKNOWN_FILL, Glyph::Question)
        },
        task_style,
    );
    let border = priority.known().map_or(UNKNOWN_BORDER, priority_border);

    MarkerDescriptor {
        fill,
        border,
        glyph,
    }
}

/// Styles a worker progress update.
#[must_use]
pub fn classify_progress(status: &Tag<ProgressStatus>) -> MarkerDescriptor {
    MarkerDescriptor {
        fill: status.known().map_or(UNKNOWN_FILL, progress_fill),
        border: PROGRESS_BORDER,
        glyph: Glyph::PersonDigging,
    }
}

/// Styles any entry according to its collection.
#[must_use]
pub fn classify(entry: EntryRef<'_>) -> MarkerDescriptor {
    match entry {
        EntryRef::Report(r) => classify_report(&r.report_type, &r.status),
        EntryRef::Task(t) => classify_task(&t.task_type, &t.priority),
        EntryRef::Progress(p) => classify_progress(&p.status),
    }
}

/// Styles raw labels, lower-casing both before lookup.
///
/// For progress the category is ignored and `attribute` is the progress
/// status.
#[must_use]
pub fn classify_labels(data_type: DataType, category: &str, attribute: &str) -> MarkerDescriptor {
    match data_type {
        DataType::Report => classify_report(&Tag::parse(category), &Tag::parse(attribute)),
        DataType::Task => classify_task(&Tag::parse(category), &Tag::parse(attribute)),
        DataType::Progress => classify_progress(&Tag::parse(attribute)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use munifor_issue_models::Taxonomy;

    #[test]
    fn pending_pothole_style_is_stable() {
        for _ in 0..3 {
            let d = classify_labels(DataType::Report, "bache", "pendiente");
            assert_eq!(d.fill, Color("#e74c3c"));
            assert_eq!(d.border, Color("#f59e42"));
            assert_eq!(d.glyph, Glyph::Road);
        }
    }

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!(
            classify_labels(DataType::Task, "REPARACIÓN", "alta"),
            classify_labels(DataType::Task, "Reparación", "Alta"),
        );
    }

    #[test]
    fn every_known_report_combination_avoids_fallbacks() {
        for t in ReportType::all() {
            for s in ReportStatus::all() {
                let d = classify_report(&Tag::Known(*t), &Tag::Known(*s));
                assert_ne!(d.fill, UNKNOWN_FILL, "{t:?}");
                assert_ne!(d.border, UNKNOWN_BORDER, "{s:?}");
                assert_ne!(d.glyph, Glyph::Question);
            }
        }
    }

    #[test]
    fn every_known_task_combination_avoids_fallbacks() {
        for t in TaskType::all() {
            for p in TaskPriority::all() {
                let d = classify_task(&Tag::Known(*t), &Tag::Known(*p));
                assert_ne!(d.fill, UNKNOWN_FILL, "{t:?}");
                assert_ne!(d.border, UNKNOWN_BORDER, "{p:?}");
            }
        }
    }

    #[test]
    fn unknown_category_and_attribute_fall_back_independently() {
        let d = classify_labels(DataType::Report, "grafiti", "Pendiente");
        assert_eq!(d.fill, UNKNOWN_FILL);
        assert_eq!(d.glyph, Glyph::Question);
        assert_eq!(d.border, Color("#f59e42"));

        let d = classify_labels(DataType::Report, "basura", "archivado");
        assert_eq!(d.fill, Color("#27ae60"));
        assert_eq!(d.border, UNKNOWN_BORDER);
    }

    #[test]
    fn progress_pins_have_fixed_border_and_glyph() {
        for s in ProgressStatus::all() {
            let d = classify_progress(&Tag::Known(*s));
            assert_eq!(d.border, PROGRESS_BORDER);
            assert_eq!(d.glyph, Glyph::PersonDigging);
            assert_ne!(d.fill, UNKNOWN_FILL);
        }
        let d = classify_labels(DataType::Progress, "", "desconocido");
        assert_eq!(d.fill, UNKNOWN_FILL);
        assert_eq!(d.border, PROGRESS_BORDER);
    }
}
