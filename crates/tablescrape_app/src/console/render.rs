//! Turns view models into terminal lines. Only the parts that changed since
//! the previous view are printed again.

use tablescrape_core::{AppViewModel, StatusLevel, TablePreview};

pub fn render(previous: Option<&AppViewModel>, view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    let tables_changed = previous.map_or(true, |prev| {
        prev.table_labels != view.table_labels || prev.selected != view.selected
    });
    if tables_changed && !view.table_labels.is_empty() {
        lines.extend(table_list(view));
    }

    let preview_changed = previous.map_or(true, |prev| prev.preview != view.preview);
    if preview_changed {
        if let Some(preview) = &view.preview {
            lines.extend(preview_grid(preview));
        }
    }

    if previous.map_or(true, |prev| prev.status != view.status) {
        lines.push(format!("[{}] {}", level_tag(view.status.level), view.status.text));
    }

    lines
}

fn table_list(view: &AppViewModel) -> Vec<String> {
    view.table_labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let marker = if view.selected == Some(index) { '>' } else { ' ' };
            format!("{marker} {label}")
        })
        .collect()
}

fn preview_grid(preview: &TablePreview) -> Vec<String> {
    let mut widths: Vec<usize> = preview.columns.iter().map(|c| c.chars().count()).collect();
    for row in &preview.rows {
        for (col, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(col) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut lines = vec![preview.summary.clone()];
    lines.push(grid_line(&preview.columns, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(preview.rows.iter().map(|row| grid_line(row, &widths)));
    lines
}

fn grid_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn level_tag(level: StatusLevel) -> &'static str {
    match level {
        StatusLevel::Info => "info",
        StatusLevel::Success => "ok",
        StatusLevel::Warning => "warn",
        StatusLevel::Error => "error",
    }
}
