use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use tablescrape_core::{FetchResult, Table};

const MAX_COLSPAN: usize = 1_000;
const MAX_ROWSPAN: usize = 65_534;

pub trait TableExtractor: Send + Sync {
    fn extract(&self, html: &str) -> FetchResult;
}

/// Extracts every `<table>` element in document order:
/// - `<thead>` rows, or leading all-`<th>` rows, become the header
/// - `colspan`/`rowspan` are expanded within each section
/// - `<tfoot>` rows follow the body
/// - tables without any row are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlTableExtractor;

impl TableExtractor for HtmlTableExtractor {
    fn extract(&self, html: &str) -> FetchResult {
        let doc = Html::parse_document(html);
        let Ok(selector) = Selector::parse("table") else {
            return Vec::new();
        };
        doc.select(&selector).filter_map(parse_table).collect()
    }
}

#[derive(Debug)]
struct RawCell {
    text: String,
    is_header: bool,
    colspan: usize,
    rowspan: usize,
}

type RawRow = Vec<RawCell>;

#[derive(Debug, Default)]
struct Sections {
    head: Vec<RawRow>,
    body: Vec<RawRow>,
    foot: Vec<RawRow>,
}

fn parse_table(table: ElementRef<'_>) -> Option<Table> {
    let mut sections = collect_sections(table);
    if sections.head.is_empty() {
        let leading = sections
            .body
            .iter()
            .take_while(|row| !row.is_empty() && row.iter().all(|c| c.is_header))
            .count();
        sections.head = sections.body.drain(..leading).collect();
    }

    let header = combine_header_rows(expand_spans(sections.head));
    let mut rows = expand_spans(sections.body);
    rows.extend(expand_spans(sections.foot));
    // Rows without cells vanish in expand_spans; what is left may be nothing.
    let header_is_empty = header.as_ref().map_or(true, Vec::is_empty);
    if header_is_empty && rows.is_empty() {
        return None;
    }
    Some(Table::from_text_rows(header, rows))
}

fn collect_sections(table: ElementRef<'_>) -> Sections {
    let mut sections = Sections::default();
    for child in child_elements(*table) {
        match child.value().name() {
            "thead" => sections.head.extend(rows_of(child)),
            "tbody" => sections.body.extend(rows_of(child)),
            "tfoot" => sections.foot.extend(rows_of(child)),
            "tr" => sections.body.push(parse_row(child)),
            _ => {}
        }
    }
    sections
}

fn child_elements<'a>(node: NodeRef<'a, Node>) -> impl Iterator<Item = ElementRef<'a>> {
    node.children().filter_map(ElementRef::wrap)
}

fn rows_of(section: ElementRef<'_>) -> impl Iterator<Item = RawRow> + '_ {
    child_elements(*section)
        .filter(|el| el.value().name() == "tr")
        .map(parse_row)
}

fn parse_row(tr: ElementRef<'_>) -> RawRow {
    child_elements(*tr)
        .filter_map(|cell| {
            let is_header = match cell.value().name() {
                "th" => true,
                "td" => false,
                _ => return None,
            };
            Some(RawCell {
                text: cell_text(cell),
                is_header,
                colspan: span_attr(cell, "colspan", MAX_COLSPAN),
                rowspan: span_attr(cell, "rowspan", MAX_ROWSPAN),
            })
        })
        .collect()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    let raw: String = cell.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Missing, zero or malformed spans count as 1.
fn span_attr(cell: ElementRef<'_>, name: &str, max: usize) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .map_or(1, |n| n.min(max))
}

/// Lays out one section's rows on a grid, duplicating spanned values.
fn expand_spans(rows: Vec<RawRow>) -> Vec<Vec<String>> {
    // Per column: value still owed to following rows and how many rows remain.
    let mut carried: Vec<Option<(String, usize)>> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for row in rows {
        let mut out: Vec<String> = Vec::new();
        let mut cells = row.into_iter();
        let mut col = 0;
        loop {
            if let Some(slot) = carried.get_mut(col) {
                if let Some((text, remaining)) = slot.take() {
                    out.push(text.clone());
                    if remaining > 1 {
                        *slot = Some((text, remaining - 1));
                    }
                    col += 1;
                    continue;
                }
            }
            let Some(cell) = cells.next() else {
                break;
            };
            for _ in 0..cell.colspan {
                if cell.rowspan > 1 {
                    if carried.len() <= col {
                        carried.resize(col + 1, None);
                    }
                    carried[col] = Some((cell.text.clone(), cell.rowspan - 1));
                }
                out.push(cell.text.clone());
                col += 1;
            }
        }

        // Spans from earlier rows that reach past this row's last cell.
        while col < carried.len() {
            match carried[col].take() {
                Some((text, remaining)) => {
                    out.push(text.clone());
                    if remaining > 1 {
                        carried[col] = Some((text, remaining - 1));
                    }
                }
                None => out.push(String::new()),
            }
            col += 1;
        }
        while matches!(carried.last(), Some(None)) {
            carried.pop();
        }

        if !out.is_empty() {
            grid.push(out);
        }
    }
    grid
}

/// Joins stacked header rows per column, skipping blanks and labels
/// already used for that column.
fn combine_header_rows(rows: Vec<Vec<String>>) -> Option<Vec<String>> {
    if rows.is_empty() {
        return None;
    }
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let names = (0..width)
        .map(|col| {
            let mut parts: Vec<&str> = Vec::new();
            for part in rows.iter().filter_map(|r| r.get(col)) {
                if !part.is_empty() && !parts.contains(&part.as_str()) {
                    parts.push(part.as_str());
                }
            }
            parts.join(" ")
        })
        .collect();
    Some(names)
}
