//! Keyword-based section segmentation.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::SectionKind;

// Matches any of the six section headers as a whole word, any casing.
// A keyword hit inside prose counts as a boundary too; the scan has no
// notion of layout.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(abstract|introduction|methods|results|discussion|conclusion)\b")
        .expect("section header regex is valid")
});

/// Split extracted text into the six recognized sections.
///
/// Regions run from the end of one header keyword to the start of the
/// next; the final region runs to the end of the text. Text before the
/// first header is discarded. When the same header appears more than
/// once, the last region wins. Every section is present in the result:
/// sections the scan did not find, or found with empty bodies, carry a
/// fixed placeholder sentence.
#[must_use]
pub fn segment_text(text: &str) -> BTreeMap<SectionKind, String> {
    let mut sections = BTreeMap::new();

    let mut open: Option<(SectionKind, usize)> = None;
    for m in HEADER_RE.find_iter(text) {
        let Some(kind) = SectionKind::from_keyword(m.as_str()) else {
            continue;
        };
        if let Some((prev, start)) = open {
            sections.insert(prev, text[start..m.start()].trim().to_owned());
        }
        open = Some((kind, m.end()));
    }
    if let Some((prev, start)) = open {
        sections.insert(prev, text[start..].trim().to_owned());
    }

    for kind in SectionKind::ALL {
        let body = sections.entry(kind).or_default();
        if body.is_empty() {
            *body = placeholder(kind).to_owned();
        }
    }

    sections
}

/// Fixed sentence stored for a section the scan could not fill.
#[must_use]
pub fn placeholder(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Abstract => "No abstract section was identified in this paper.",
        SectionKind::Introduction => "No introduction section was identified in this paper.",
        SectionKind::Methods => "No methods section was identified in this paper.",
        SectionKind::Results => "No results section was identified in this paper.",
        SectionKind::Discussion => "No discussion section was identified in this paper.",
        SectionKind::Conclusion => "No conclusion section was identified in this paper.",
    }
}
