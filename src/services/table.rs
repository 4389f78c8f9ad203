//! HTML table extraction.
//!
//! Lifts every `<table>` in a document into a [`RawTable`]: header levels and
//! body rows laid out on a grid, with `colspan`/`rowspan` cells repeated into
//! every position they cover.

use scraper::{ElementRef, Html, Selector};

use crate::models::RawTable;
use crate::utils::normalize_whitespace;

/// Upper bounds for `colspan`/`rowspan`, as browsers apply them.
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

#[derive(Debug, Clone)]
struct Cell {
    text: String,
    is_header: bool,
    colspan: usize,
    rowspan: usize,
}

/// Stateless table parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableParser;

impl TableParser {
    /// Parse every table in the document, in document order.
    pub fn parse_tables(document: &Html) -> Vec<RawTable> {
        let Ok(table_selector) = Selector::parse("table") else {
            return Vec::new();
        };
        document
            .select(&table_selector)
            .map(Self::parse_table)
            .collect()
    }

    /// Parse one `<table>` element, ignoring rows of nested tables.
    pub fn parse_table(table: ElementRef<'_>) -> RawTable {
        let mut head_rows = Vec::new();
        let mut body_rows = Vec::new();

        for section in table.children().filter_map(ElementRef::wrap) {
            match section.value().name() {
                "thead" => head_rows.extend(Self::section_rows(section)),
                "tbody" | "tfoot" => body_rows.extend(Self::section_rows(section)),
                "tr" => body_rows.push(Self::row_cells(section)),
                _ => {}
            }
        }

        // Without <thead>, leading all-<th> rows are the header.
        if head_rows.is_empty() {
            let leading = body_rows
                .iter()
                .take_while(|row| row.iter().all(|c| c.is_header))
                .count();
            head_rows = body_rows.drain(..leading).collect();
        }

        RawTable {
            headers: Self::expand(&head_rows),
            rows: Self::expand(&body_rows),
        }
    }

    fn section_rows(section: ElementRef<'_>) -> Vec<Vec<Cell>> {
        section
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "tr")
            .map(Self::row_cells)
            .filter(|cells| !cells.is_empty())
            .collect()
    }

    fn row_cells(row: ElementRef<'_>) -> Vec<Cell> {
        row.children()
            .filter_map(ElementRef::wrap)
            .filter_map(|el| {
                let is_header = match el.value().name() {
                    "th" => true,
                    "td" => false,
                    _ => return None,
                };
                Some(Cell {
                    text: normalize_whitespace(&el.text().collect::<String>()),
                    is_header,
                    colspan: span(el, "colspan").min(MAX_COLSPAN),
                    rowspan: span(el, "rowspan").min(MAX_ROWSPAN),
                })
            })
            .collect()
    }

    /// Lay rows out on a grid, repeating spanned cells into each slot.
    fn expand(rows: &[Vec<Cell>]) -> Vec<Vec<String>> {
        let mut grid: Vec<Vec<Option<String>>> = vec![Vec::new(); rows.len()];

        for (r, row) in rows.iter().enumerate() {
            let mut col = 0;
            for cell in row {
                while grid[r].get(col).is_some_and(Option::is_some) {
                    col += 1;
                }
                let last_row = r.saturating_add(cell.rowspan).min(rows.len());
                for slot_row in &mut grid[r..last_row] {
                    if slot_row.len() < col + cell.colspan {
                        slot_row.resize(col + cell.colspan, None);
                    }
                    for slot in &mut slot_row[col..col + cell.colspan] {
                        *slot = Some(cell.text.clone());
                    }
                }
                col += cell.colspan;
            }
        }

        grid.into_iter()
            .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
            .collect()
    }
}

fn span(el: ElementRef<'_>, attr: &str) -> usize {
    el.value()
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn parse(html: &str) -> Vec<RawTable> {
        TableParser::parse_tables(&Html::parse_document(html))
    }

    #[test]
    fn test_simple_table_with_thead() {
        let tables = parse(
            r#"<table>
                <thead><tr><th>선수</th><th>팀</th><th>타율</th></tr></thead>
                <tbody>
                    <tr><td>김도영</td><td>KIA</td><td>0.347</td></tr>
                    <tr><td>구자욱</td><td>삼성</td><td>0.343</td></tr>
                </tbody>
            </table>"#,
        );
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].headers, vec![s(&["선수", "팀", "타율"])]);
        assert_eq!(tables[0].rows[1], s(&["구자욱", "삼성", "0.343"]));
    }

    #[test]
    fn test_grouped_header_expands_spans() {
        let tables = parse(
            r#"<table>
                <thead>
                    <tr><th rowspan="2">선수</th><th colspan="2">기본</th><th>비율</th></tr>
                    <tr><th>경기</th><th>타수</th><th>타율</th></tr>
                </thead>
                <tbody><tr><td>최정</td><td>129</td><td>468</td><td>0.291</td></tr></tbody>
            </table>"#,
        );
        let table = &tables[0];
        assert_eq!(
            table.headers,
            vec![s(&["선수", "기본", "기본", "비율"]), s(&["선수", "경기", "타수", "타율"])]
        );
        assert_eq!(table.flat_headers(), s(&["선수", "경기", "타수", "타율"]));
    }

    #[test]
    fn test_leading_th_rows_become_header_without_thead() {
        let tables = parse(
            r#"<table>
                <tr><th>순위</th><th>선수</th></tr>
                <tr><td>1</td><td>오스틴</td></tr>
            </table>"#,
        );
        assert_eq!(tables[0].headers, vec![s(&["순위", "선수"])]);
        assert_eq!(tables[0].rows, vec![s(&["1", "오스틴"])]);
    }

    #[test]
    fn test_nested_table_rows_stay_out_of_parent() {
        let tables = parse(
            r#"<table id="outer">
                <tr><th>a</th></tr>
                <tr><td><table><tr><td>inner</td></tr></table></td></tr>
            </table>"#,
        );
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows.len(), 1);
        assert_eq!(tables[1].rows, vec![s(&["inner"])]);
    }

    #[test]
    fn test_whitespace_and_nbsp_are_normalized() {
        let tables = parse("<table><tr><td>  0.312&nbsp;</td><td>\n 12 </td></tr></table>");
        assert_eq!(tables[0].rows, vec![s(&["0.312", "12"])]);
    }

    #[test]
    fn test_no_tables() {
        assert!(parse("<html><body><p>no data</p></body></html>").is_empty());
    }

    #[test]
    fn test_bogus_spans_default_to_one() {
        let tables = parse(r#"<table><tr><td colspan="0">x</td><td rowspan="abc">y</td></tr></table>"#);
        assert_eq!(tables[0].rows, vec![s(&["x", "y"])]);
    }

    #[test]
    fn test_oversized_rowspan_is_clamped_to_table() {
        let tables = parse(
            r#"<table>
                <tr><th>선수</th><th>타율</th></tr>
                <tr><td>김도영</td><td>0.347</td></tr>
                <tr><td rowspan="18446744073709551615">구자욱</td><td>0.343</td></tr>
                <tr><td>0.360</td></tr>
            </table>"#,
        );
        assert_eq!(
            tables[0].rows,
            vec![s(&["김도영", "0.347"]), s(&["구자욱", "0.343"]), s(&["구자욱", "0.360"])]
        );
    }
}
