// src/extractors/patterns.rs

use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Heading patterns: a line carrying only the heading glyphs ---
static HOLDING_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\W*主\s*文\W*\n").expect("Failed to compile HOLDING_HEADING_RE"));

// The section following the holding varies between documents (事實, 理由,
// or the combined 犯罪事實及理由 heading).
static FACT_REASON_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\W*事\s*實\W*\n|\n\W*理\s*由\W*\n|\n\W*犯罪事實及理由\W*\n")
        .expect("Failed to compile FACT_REASON_HEADING_RE")
});

// 被告 followed by a run of name characters (word characters, the masking
// glyph ○, tabs and spaces), not immediately followed by another word
// character. Trailing spaces inside the run are kept as they appear.
static ACCUSED_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"被\s*告\W+([\w○\t ]{2,})\W").expect("Failed to compile ACCUSED_NAME_RE"));

static TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"附表[零一二三四五六七八九十壹貳參肆伍陸柒捌玖拾]*")
        .expect("Failed to compile TABLE_NAME_RE")
});

// --- Clause grammars for the charge/sentence matcher ---
// Prison term (處...刑x年x月) optionally followed, in any order, by
// commutation (減為), probation (緩刑) and deprivation-of-rights (禠奪公權)
// clauses. The corpus writes 禠 where 褫 would be expected; match what the
// documents contain.
const PRISON_TERM_CLAUSE: &str =
    r"\w*，?\w*處\w*刑\w*[年月]\w*\W(?:\w*減為\w*[年月]\w*\W|緩刑\w*\W|\w*禠奪公權\w*\W)*";
const EXEMPTION_CLAUSE: &str = r"免刑\w*\W";

/// One extracted fact: the clause naming the offense, and the declared
/// sentence if one directly follows it. `sentence` is `None` both for
/// not-guilty clauses and for charge clauses whose sentence did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeSentencePair {
    pub charge: String,
    pub sentence: Option<String>,
}

/// Matcher for one accused name, holding the two mutually exclusive clause
/// families compiled against that name.
pub struct ChargeMatcher {
    not_guilty_re: Regex,
    charge_re: Regex,
}

impl ChargeMatcher {
    pub fn new(accused: &str) -> Result<Self, ExtractError> {
        // Accused names can carry spaces from the source layout; body text
        // is matched with all spacing removed, so the name must be too.
        let name = regex::escape(&normalize(accused));

        let not_guilty_re = Regex::new(&format!(r"({name}[\w、]*無罪\w*)\W"))?;

        // The charge allows a short connective segment (one optional comma)
        // before 犯, and excludes 無 immediately before 罪 so a not-guilty
        // clause can never double as a charge. The sentence group directly
        // follows the charge's trailing punctuation and is optional.
        let charge_re = Regex::new(&format!(
            r"(?P<charge>{name}\w*，?\w*犯[\w、（）()]*[^無]罪)\W(?P<sentence>{PRISON_TERM_CLAUSE}|{EXEMPTION_CLAUSE})?"
        ))?;

        Ok(Self {
            not_guilty_re,
            charge_re,
        })
    }

    /// Finds all (charge, sentence) pairs for this accused in `text`.
    /// Not-guilty pairs come first, then charge pairs, each family in
    /// left-to-right match order over the normalized text.
    pub fn find_pairs(&self, text: &str) -> Vec<ChargeSentencePair> {
        let text = normalize(text);

        let mut pairs: Vec<ChargeSentencePair> = self
            .not_guilty_re
            .captures_iter(&text)
            .map(|caps| ChargeSentencePair {
                charge: caps[1].to_string(),
                sentence: None,
            })
            .collect();

        pairs.extend(self.charge_re.captures_iter(&text).map(|caps| {
            ChargeSentencePair {
                charge: caps["charge"].to_string(),
                sentence: caps.name("sentence").map(|m| m.as_str().to_string()),
            }
        }));

        pairs
    }
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\n' | '\t' | ' '))
        .collect()
}

/// Scans the text up to and including the holding heading (主文) for
/// candidate accused names. The heading being absent is an extraction
/// failure for the whole document.
pub fn extract_accused_names(text: &str) -> Result<Vec<String>, ExtractError> {
    let heading = HOLDING_HEADING_RE
        .find(text)
        .ok_or_else(|| ExtractError::HeadingNotFound("主文".to_string()))?;
    let scope = &text[..heading.end()];

    Ok(ACCUSED_NAME_RE
        .captures_iter(scope)
        .map(|caps| caps[1].to_string())
        .collect())
}

/// Collects every appendix-table name (附表...) mentioned between the
/// holding heading and the following fact/reason heading. Very imprecise:
/// many mentioned tables are unrelated to sentencing.
pub fn extract_table_names(text: &str) -> Result<Vec<String>, ExtractError> {
    let start = HOLDING_HEADING_RE
        .find(text)
        .ok_or_else(|| ExtractError::HeadingNotFound("主文".to_string()))?
        .start();
    let end = FACT_REASON_HEADING_RE
        .find(text)
        .ok_or_else(|| ExtractError::HeadingNotFound("事實/理由".to_string()))?
        .end();
    if end <= start {
        return Ok(Vec::new());
    }

    let scope = text[start..end].replace('\n', "");
    Ok(TABLE_NAME_RE
        .find_iter(&scope)
        .map(|m| m.as_str().to_string())
        .collect())
}
