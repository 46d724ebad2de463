// src/extractors/verdict.rs

use std::collections::{BTreeMap, BTreeSet};

use crate::extractors::patterns::{self, ChargeMatcher, ChargeSentencePair};
use crate::extractors::table;
use crate::utils::error::ExtractError;

/// Everything extracted from one verdict document: the per-accused
/// (charge, sentence) pairs plus the table counts the batch layer
/// aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFacts {
    pub charges: BTreeMap<String, Vec<ChargeSentencePair>>,
    /// Appendix tables mentioned in the holding section, when the scoping
    /// headings are present. Informational only; the pipeline matches
    /// against every table regardless.
    pub table_names: Vec<String>,
    pub tables_processed: usize,
    pub table_format_failures: usize,
}

impl DocumentFacts {
    /// A document is only worth emitting when at least one accused has a
    /// non-empty pair list.
    pub fn has_output(&self) -> bool {
        self.charges.values().any(|pairs| !pairs.is_empty())
    }
}

/// Runs the whole per-document pipeline: accused names, table cells, then
/// the charge/sentence matcher over every (accused, cell) combination.
///
/// Table format failures are absorbed per table (the failed table simply
/// contributes no cells); a missing holding heading or an empty accused
/// set is terminal for the document.
pub fn extract_document_facts(text: &str) -> Result<DocumentFacts, ExtractError> {
    let accused: BTreeSet<String> = patterns::extract_accused_names(text)?.into_iter().collect();
    if accused.is_empty() {
        return Err(ExtractError::NoAccusedFound);
    }

    // A missing fact/reason heading only loses the table names, not the
    // extraction.
    let table_names = patterns::extract_table_names(text).unwrap_or_default();

    let tables = table::extract_table_cells(text);
    let tables_processed = tables.len();
    let table_format_failures = tables.iter().filter(|t| t.is_failure()).count();

    // Charges and sentences are assumed to share a cell, so each cell is
    // matched on its own.
    let mut charges = BTreeMap::new();
    for name in accused {
        let matcher = ChargeMatcher::new(&name)?;
        let pairs = tables
            .iter()
            .flat_map(|table| table.cells())
            .flat_map(|cell| matcher.find_pairs(cell))
            .collect();
        charges.insert(name, pairs);
    }

    Ok(DocumentFacts {
        charges,
        table_names,
        tables_processed,
        table_format_failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
被　　　告　甲○○\n\
被　　　告　乙○○\n\
    主 文\n\
如附表一所示。\n\
    事 實\n\
附表一：\n\
┌─┬──────────────────────┐\n\
│一│甲○○犯xx罪，處有期徒刑x年x月。│\n\
├─┼──────────────────────┤\n\
│二│乙○○無罪。│\n\
└─┴──────────────────────┘\n\
┌─┬────\n\
沒有右下角的表\n";

    #[test]
    fn extracts_facts_end_to_end() {
        let facts = extract_document_facts(DOC).unwrap();

        assert_eq!(facts.tables_processed, 1);
        assert_eq!(facts.table_format_failures, 0);
        assert_eq!(facts.table_names, vec!["附表一"]);
        assert!(facts.has_output());

        assert_eq!(
            facts.charges["甲○○"],
            vec![ChargeSentencePair {
                charge: "甲○○犯xx罪".to_string(),
                sentence: Some("處有期徒刑x年x月。".to_string()),
            }]
        );
        assert_eq!(
            facts.charges["乙○○"],
            vec![ChargeSentencePair {
                charge: "乙○○無罪".to_string(),
                sentence: None,
            }]
        );
    }

    #[test]
    fn duplicate_accused_names_are_merged() {
        let text = "被　告　甲○○\n被　告　甲○○\n主 文\n";
        let result = extract_document_facts(text);
        let facts = result.unwrap();
        assert_eq!(facts.charges.len(), 1);
        assert!(!facts.has_output());
    }

    #[test]
    fn document_without_holding_heading_fails() {
        let result = extract_document_facts("被　告　甲○○\n沒有標題\n");
        assert!(matches!(result, Err(ExtractError::HeadingNotFound(_))));
    }

    #[test]
    fn document_without_accused_fails() {
        let result = extract_document_facts("某某某\n    主 文\n");
        assert!(matches!(result, Err(ExtractError::NoAccusedFound)));
    }

    #[test]
    fn malformed_table_is_absorbed_per_table() {
        let text = "被　告　甲○○\n主 文\n\
┌────┐\n│a│b│\n│c│b│d│\n└────┘\n\
┌──────────────┐\n│甲○○犯xx罪，免刑。│\n└──────────────┘\n";
        let facts = extract_document_facts(text).unwrap();
        assert_eq!(facts.tables_processed, 2);
        assert_eq!(facts.table_format_failures, 1);
        assert_eq!(
            facts.charges["甲○○"],
            vec![ChargeSentencePair {
                charge: "甲○○犯xx罪".to_string(),
                sentence: Some("免刑。".to_string()),
            }]
        );
    }
}
