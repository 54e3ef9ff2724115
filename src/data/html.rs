//! HTML table extraction.
//!
//! Turns every `<table>` in a document into a `RawTable`:
//! - the header is the first row made only of `th` cells
//! - `rowspan`/`colspan` are expanded so each record has one value per column
//! - citation markers (`sup.reference`), `style` and `script` text is dropped
//! - whitespace (including non-breaking spaces) is collapsed

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::domain::{RawRecord, RawTable};

/// A parsed table plus the classes of its `<table>` element.
#[derive(Debug, Clone)]
pub struct HtmlTable {
    pub classes: Vec<String>,
    pub table: RawTable,
}

impl HtmlTable {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Parse every table in document order.
pub fn parse_tables(html: &str) -> Result<Vec<HtmlTable>, String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("table").map_err(|e| format!("invalid table selector: {e}"))?;

    Ok(doc
        .select(&selector)
        .map(|el| HtmlTable {
            classes: el.value().classes().map(str::to_string).collect(),
            table: extract_table(el),
        })
        .collect())
}

struct Cell {
    text: String,
    is_header: bool,
    rowspan: usize,
    colspan: usize,
}

fn extract_table(table: ElementRef<'_>) -> RawTable {
    let rows: Vec<Vec<Cell>> = table_rows(table)
        .into_iter()
        .map(row_cells)
        .filter(|cells| !cells.is_empty())
        .collect();

    let header_pos = rows
        .iter()
        .position(|cells| cells.iter().all(|c| c.is_header));

    let mut headers = match header_pos {
        Some(pos) => expand_header(&rows[pos]),
        None => Vec::new(),
    };

    let body_start = header_pos.map_or(0, |pos| pos + 1);
    let body = expand_body(
        rows[body_start..]
            .iter()
            .filter(|cells| !cells.iter().all(|c| c.is_header)),
    );

    // Headerless tables get positional names, like most dataframe readers.
    if headers.is_empty() {
        let width = body.iter().map(Vec::len).max().unwrap_or(0);
        headers = (0..width).map(|i| i.to_string()).collect();
    }

    let width = headers.len();
    let records = body
        .into_iter()
        .map(|mut fields| {
            fields.resize(width, String::new());
            RawRecord::new(fields)
        })
        .collect();

    RawTable::new(headers, records)
}

/// Rows belonging to this table only (not to nested tables).
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => {
                rows.extend(
                    child
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|el| el.value().name() == "tr"),
                );
            }
            _ => {}
        }
    }
    rows
}

fn row_cells(row: ElementRef<'_>) -> Vec<Cell> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(|el| Cell {
            text: cell_text(el),
            is_header: el.value().name() == "th",
            rowspan: span_attr(el, "rowspan"),
            colspan: span_attr(el, "colspan"),
        })
        .collect()
}

/// Largest `colspan` a browser honors.
const MAX_COLSPAN: usize = 1000;
/// Largest `rowspan` a browser honors.
const MAX_ROWSPAN: usize = 65534;

fn span_attr(el: ElementRef<'_>, name: &str) -> usize {
    let max = if name == "colspan" { MAX_COLSPAN } else { MAX_ROWSPAN };
    el.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, max)
}

fn expand_header(cells: &[Cell]) -> Vec<String> {
    let mut out = Vec::new();
    for cell in cells {
        for _ in 0..cell.colspan {
            out.push(cell.text.clone());
        }
    }
    out
}

/// Expand `rowspan`/`colspan` into a dense grid.
fn expand_body<'a>(rows: impl Iterator<Item = &'a Vec<Cell>>) -> Vec<Vec<String>> {
    // Per column: (rows still covered, text carried down).
    let mut carry: Vec<(usize, String)> = Vec::new();
    let mut out = Vec::new();

    for cells in rows {
        let mut fields = Vec::new();
        let mut cells = cells.iter();
        let mut col = 0usize;

        loop {
            if col < carry.len() && carry[col].0 > 0 {
                carry[col].0 -= 1;
                fields.push(carry[col].1.clone());
                col += 1;
                continue;
            }
            let Some(cell) = cells.next() else { break };
            for _ in 0..cell.colspan {
                if cell.rowspan > 1 {
                    if col >= carry.len() {
                        carry.resize(col + 1, (0, String::new()));
                    }
                    carry[col] = (cell.rowspan - 1, cell.text.clone());
                }
                fields.push(cell.text.clone());
                col += 1;
            }
        }

        // Spans reaching past the last explicit cell of this row.
        while col < carry.len() {
            if carry[col].0 > 0 {
                carry[col].0 -= 1;
                fields.push(carry[col].1.clone());
            } else {
                fields.push(String::new());
            }
            col += 1;
        }
        while fields.last().is_some_and(String::is_empty) {
            fields.pop();
        }

        out.push(fields);
    }

    out
}

fn cell_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(el, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else { continue };
                let name = child_el.value().name();
                if name == "br" {
                    out.push(' ');
                    continue;
                }
                if is_skipped(child_el) {
                    continue;
                }
                collect_text(child_el, out);
            }
            _ => {}
        }
    }
}

fn is_skipped(el: ElementRef<'_>) -> bool {
    match el.value().name() {
        "style" | "script" => true,
        "sup" => el.value().classes().any(|c| c == "reference"),
        _ => false,
    }
}
