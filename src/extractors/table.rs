// src/extractors/table.rs

use crate::utils::error::TableError;
use once_cell::sync::Lazy;
use regex::Regex;

// Box-drawing glyphs bounding a table region.
const TOP_LEFT: char = '┌';
const TOP_RIGHT: char = '┐';
const BOTTOM_LEFT: char = '└';
const BOTTOM_RIGHT: char = '┘';
const VERTICAL: char = '│';

// A full-width row divider: a line made only of frame glyphs, opened by a
// left-edge junction right after a newline and closed by a right-edge
// junction. Lines like "│ ├──┤ │" only split a sub-column and must stay
// inside their row block.
static ROW_DIVIDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n├[┼┴┬─]+┤\s*?\n").expect("Failed to compile ROW_DIVIDER_RE")
});

// Structural separators a cell fragment can sit between.
static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[│├┤┼]").expect("Failed to compile SEPARATOR_RE"));

/// Outcome of extracting one table: its flattened cell strings in row-major
/// order, or a marker recording that the table's format was not usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableResult {
    Cells(Vec<String>),
    FormatFailure,
}

impl TableResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, TableResult::FormatFailure)
    }

    pub fn cells(&self) -> &[String] {
        match self {
            TableResult::Cells(cells) => cells,
            TableResult::FormatFailure => &[],
        }
    }
}

/// Yields every table region in `text`: each `┌` paired with the nearest
/// following `┘`. A `┌` with no closing glyph yields nothing. Regions are
/// not validated here; malformed spans are rejected later.
pub fn extract_tables(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.match_indices(TOP_LEFT).filter_map(move |(start, _)| {
        text[start..]
            .find(BOTTOM_RIGHT)
            .map(|offset| &text[start..start + offset + BOTTOM_RIGHT.len_utf8()])
    })
}

/// Splits one table region into raw multi-line row blocks at full-width
/// divider lines. Each block is trimmed to the span between its first and
/// last `│`; blocks without any `│` carry no cells and are dropped.
pub fn split_rows(table: &str) -> Result<Vec<&str>, TableError> {
    let top_right = table
        .find(TOP_RIGHT)
        .ok_or(TableError::MissingBoundary("top-right"))?;
    let bottom_left = table
        .find(BOTTOM_LEFT)
        .ok_or(TableError::MissingBoundary("bottom-left"))?;

    let start = top_right + TOP_RIGHT.len_utf8();
    if bottom_left <= start {
        return Ok(Vec::new());
    }

    // Cut points: first inner boundary, every divider start (past the \n),
    // last inner boundary.
    let mut cuts = vec![start];
    cuts.extend(
        ROW_DIVIDER_RE
            .find_iter(table)
            .map(|m| m.start() + 1)
            .filter(|&pos| pos > start && pos < bottom_left),
    );
    cuts.push(bottom_left);

    let mut rows = Vec::new();
    for pair in cuts.windows(2) {
        let block = &table[pair[0]..pair[1]];
        if let Some(first) = block.find(VERTICAL) {
            let last = block.rfind(VERTICAL).unwrap_or(first);
            rows.push(&block[first..last + VERTICAL.len_utf8()]);
        }
    }
    Ok(rows)
}

/// Merges the physical lines of one raw row block into a single logical row
/// of cell strings.
///
/// Every line must carry the same number of separator glyphs, otherwise the
/// block is malformed and the whole enclosing table is rejected. Fragments
/// are the non-empty pieces between separators; cells are their per-column
/// concatenation in top-to-bottom order.
pub fn reconstruct_row(block: &str) -> Result<Vec<String>, TableError> {
    let lines: Vec<&str> = block.trim().split('\n').collect();

    let mut counts = lines.iter().map(|line| SEPARATOR_RE.find_iter(line).count());
    let column_len = counts.next().unwrap_or(0);
    if counts.any(|count| count != column_len) {
        return Err(TableError::ColumnMismatch(block.chars().take(15).collect()));
    }

    let mut cells = vec![String::new(); column_len];
    for line in lines {
        let fragments: Vec<&str> = SEPARATOR_RE
            .split(line.trim())
            .filter(|fragment| !fragment.is_empty())
            .collect();
        cells.truncate(fragments.len());
        for (cell, fragment) in cells.iter_mut().zip(fragments) {
            cell.push_str(fragment);
        }
    }
    Ok(cells)
}

/// Runs the full pipeline over `text`: one `TableResult` per region found,
/// in document order. A malformed row invalidates its whole table; the
/// failure is absorbed here and processing continues with the next table.
pub fn extract_table_cells(text: &str) -> Vec<TableResult> {
    extract_tables(text)
        .map(|table| match table_cells(table) {
            Ok(cells) if !cells.is_empty() => TableResult::Cells(cells),
            Ok(_) => {
                tracing::debug!("Table reconstructed to zero cells, recording format failure");
                TableResult::FormatFailure
            }
            Err(e) => {
                tracing::debug!("Table format failure: {}", e);
                TableResult::FormatFailure
            }
        })
        .collect()
}

fn table_cells(table: &str) -> Result<Vec<String>, TableError> {
    let mut cells = Vec::new();
    for block in split_rows(table)? {
        cells.extend(reconstruct_row(block)?);
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_all_tables() {
        let text = "附表二： blablabla附表三bla,blablab\n\
                    ┌─┬────\n\
                    └─┴───┘\n\
                    \n\
                    附表三： blablablabl\n\
                    a,blablabal.\n\
                    ┌─┬──────┐\n\
                    │X│測試通過│\n\
                    ├─┼──┼───┤\n\
                    └─┴──────┘\n";

        let tables: Vec<&str> = extract_tables(text).collect();
        assert_eq!(
            tables,
            vec![
                "┌─┬────\n└─┴───┘",
                "┌─┬──────┐\n│X│測試通過│\n├─┼──┼───┤\n└─┴──────┘",
            ]
        );
    }

    #[test]
    fn top_corner_without_bottom_corner_yields_nothing() {
        assert_eq!(extract_tables("┌─┬──\n│a│b│\n").count(), 0);
    }

    #[test]
    fn splits_rows_at_full_width_dividers_only() {
        let table = "┌─┬──┬──────┐\n\
                     │1 │xx│xxxx│\n\
                     │ 2│xx │xx  │\n\
                     ├─┼───┼────────┤\n\
                     │ 3│xxx│xxx│\n\
                     │  ├─────────┼──────┤\n\
                     │  │xxx │xxxx   │\n\
                     ├─┼────┴─────┼──────┤\n\
                     │  │444│         │\n\
                     └─┴────────┴────┘\n";

        // The partial divider "│  ├──┤" stays inside the second block.
        assert_eq!(
            split_rows(table).unwrap(),
            vec![
                "│1 │xx│xxxx│\n│ 2│xx │xx  │",
                "│ 3│xxx│xxx│\n│  ├─────────┼──────┤\n│  │xxx │xxxx   │",
                "│  │444│         │",
            ]
        );
    }

    #[test]
    fn split_rows_requires_inner_boundaries() {
        let result = split_rows("┌─┬────\n└─┴───┘");
        assert!(matches!(result, Err(TableError::MissingBoundary("top-right"))));
    }

    #[test]
    fn reconstructs_single_line_row() {
        assert_eq!(reconstruct_row("│1│ │    │").unwrap(), vec!["1", " ", "    "]);
    }

    #[test]
    fn reconstructs_multiline_row_with_partial_divider() {
        let block = "│ 2│測試│ │\n\
                     │ 2├─────────┼──────┤\n\
                     │  │通過 │測試通過   │";
        assert_eq!(
            reconstruct_row(block).unwrap(),
            vec![" 2 2  ", "測試─────────通過 ", " ──────測試通過   "]
        );
    }

    #[test]
    fn rejects_row_with_inconsistent_columns() {
        let block = "│a│b│c│\n│a│b│c│\n│a│b│";
        assert!(matches!(
            reconstruct_row(block),
            Err(TableError::ColumnMismatch(_))
        ));
    }

    #[test]
    fn extracts_cells_and_isolates_malformed_tables() {
        let text = "blabla\n\
                    附表三：\n\
                    ┌──────────────────────────────────────┐\n\
                    │98年度離島造林標案核定底價、決標情形一覽表     │\n\
                    ├─┬────┬──────────────────────────┤\n\
                    │編號  │犯罪事實│主文            │\n\
                    │   │        ├─────┤\n\
                    │   │        │    宣告刑       │\n\
                    ├─┼────┼───────────────────────────┤\n\
                    │一│郭美瑩共同犯行使偽造公文書罪，處有期徒刑壹年壹月；減為有期│\n\
                    │  │徒刑陸月又拾伍日。│\n\
                    └─┴────┴───────────────────────┘\n\
                    blabla\n\
                    \n\
                    ┌───────────────────────┐\n\
                    │號碼 │交易內容    │總價   │\n\
                    │    ├────┬──┬────┤     │\n\
                    │    │品名│單價│數量│ │\n\
                    └───────────────────┘\n";

        // The second table branches into sub-columns with a different split
        // per line, which is not supported: it fails as a whole while the
        // first table still extracts.
        assert_eq!(
            extract_table_cells(text),
            vec![
                TableResult::Cells(vec![
                    "98年度離島造林標案核定底價、決標情形一覽表     ".to_string(),
                    "編號        ".to_string(),
                    "犯罪事實                ".to_string(),
                    "主文            ─────    宣告刑       ".to_string(),
                    "一  ".to_string(),
                    "郭美瑩共同犯行使偽造公文書罪，處有期徒刑壹年壹月；減為有期徒刑陸月又拾伍日。"
                        .to_string(),
                ]),
                TableResult::FormatFailure,
            ]
        );
    }

    #[test]
    fn table_without_rows_is_a_failure() {
        assert_eq!(extract_table_cells("┌──┐\n└──┘"), vec![TableResult::FormatFailure]);
    }

    #[test]
    fn malformed_row_invalidates_whole_table() {
        let text = "┌────┐\n│a│b│c│\n│a│b│c│\n│a│b│\n└────┘";
        assert_eq!(extract_table_cells(text), vec![TableResult::FormatFailure]);
    }

    #[test]
    fn single_row_round_trips_column_fragments() {
        let text = "┌─┬─┬─┐\n│aa│bb│cc│\n└─┴─┴─┘";
        assert_eq!(
            extract_table_cells(text),
            vec![TableResult::Cells(vec![
                "aa".to_string(),
                "bb".to_string(),
                "cc".to_string(),
            ])]
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "x┌─┬─┐\n│a│b│\n└─┴─┘y";
        assert_eq!(extract_table_cells(text), extract_table_cells(text));
    }
}
