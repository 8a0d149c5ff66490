use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace, warn};

use super::language::{Detection, LanguageDetector, Tokenizer};
use super::nodes::Node;
use super::roles::{Fields, Role};
use super::sections::Graffito;
use crate::error::ExtractError;

static APPARATUS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d.+").unwrap());

/// Substrings that only occur in transcriptions of damaged or illegible text.
const DAMAGED_FRAGMENTS: &[&str] = &[
    "- ",
    "T\u{3cd}\u{3c7}\u{3b7}",
    " \u{323} ",
    "\u{323} \u{323} \u{323}",
];
/// Whole paragraphs that are known transcriptions.
const DAMAGED_LINES: &[&str] = &[
    "]M\u{323}",
    "\u{3a0} (or \u{393}) \u{3a0}\u{395}\u{323}",
    "[[ ]]",
    "se",
];
const DESCRIPTION_WORDS: &[&str] = &[
    "dimensions", "wide", "high", "dipinto", "graffito",
    "incised", "inscription", "majuscule", "preserved",
];
const TEXT_WORDS: &[&str] = &["traces", "stars", "space", "unread"];

/// What a rule gets to look at: the paragraph text and what the entry
/// has accumulated so far.
pub struct Paragraph<'a> {
    pub text: &'a str,
    pub fields: &'a Fields,
}

pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&Classifier, &Paragraph<'_>) -> Option<Role>,
}

/// Evaluated top to bottom; the first rule returning a role wins.
pub const RULES: &[Rule] = &[
    Rule { name: "numbered apparatus", apply: numbered_apparatus },
    Rule { name: "quoted translation", apply: quoted_translation },
    Rule { name: "bibliography", apply: bibliography },
    Rule { name: "detail caption", apply: detail_caption },
    Rule { name: "language", apply: by_language },
    Rule { name: "damaged text", apply: damaged_text },
    Rule { name: "description keyword", apply: description_keyword },
    Rule { name: "text keyword", apply: text_keyword },
    Rule { name: "follows description", apply: follows_description },
    Rule { name: "field name", apply: field_name },
];

/// Per-entry counts of nodes that did not produce a classified paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyStats {
    pub headings: usize,
    pub breaks: usize,
    pub images: usize,
    pub blanks: usize,
    pub ignored: usize,
}

pub struct Classifier {
    detector: Box<dyn LanguageDetector>,
    tokenizer: Tokenizer,
    promote_late_description: bool,
}

impl Classifier {
    pub fn new(detector: Box<dyn LanguageDetector>) -> Self {
        Classifier {
            detector,
            tokenizer: Tokenizer::default(),
            promote_late_description: false,
        }
    }

    /// Store keyword-matched descriptions that arrive after the text as commentary.
    pub fn promote_late_description(mut self, on: bool) -> Self {
        self.promote_late_description = on;
        self
    }

    /// Run the rule cascade over one paragraph.
    pub fn role_of(&self, text: &str, fields: &Fields) -> Result<Role, ExtractError> {
        let para = Paragraph { text, fields };
        for rule in RULES {
            if let Some(role) = (rule.apply)(self, &para) {
                debug!(rule = rule.name, role = %role, text, "classified paragraph");
                return Ok(role);
            }
        }
        Err(ExtractError::Unclassified(text.to_string()))
    }

    /// Classify every member node of `g` in order, accumulating into its fields.
    pub fn classify(&self, g: &mut Graffito<'_>) -> Result<ClassifyStats, ExtractError> {
        let mut stats = ClassifyStats::default();

        for &node in &g.nodes {
            if node.is("h2") {
                stats.headings += 1;
                continue;
            }
            if is_line_break(node) {
                stats.breaks += 1;
                continue;
            }

            let images = node.find_all("img");
            if !images.is_empty() {
                for img in images {
                    match img.attr("src") {
                        Some(src) => {
                            g.fields.accumulate(Role::Images, src);
                            stats.images += 1;
                        }
                        None => warn!(id = %g.id, "image without src skipped"),
                    }
                }
                continue;
            }

            if node.is("ol") {
                if !g.fields.has(Role::Text) {
                    return Err(ExtractError::ApparatusBeforeText(node.text.clone()));
                }
                g.fields.set_apparatus(
                    node.children
                        .iter()
                        .filter(|c| c.is("li"))
                        .map(|li| li.text.clone()),
                );
                debug!(id = %g.id, items = g.fields.apparatus.len(), "ordered apparatus");
                continue;
            }

            if !node.is("p") {
                debug!(id = %g.id, kind = %node.kind, "node ignored");
                stats.ignored += 1;
                continue;
            }
            if node.text.trim().is_empty() {
                stats.blanks += 1;
                continue;
            }

            let role = self.role_of(&node.text, &g.fields)?;
            g.fields.accumulate(role, &node.text);
        }

        debug!(id = %g.id, ?stats, "graffito classified");
        log_summary(g);
        Ok(stats)
    }
}

/// A paragraph holding a single child that is, or wraps, a `br`.
fn is_line_break(node: &Node) -> bool {
    node.is("p") && node.children.len() == 1 && node.contains("br")
}

fn numbered_apparatus(_: &Classifier, p: &Paragraph<'_>) -> Option<Role> {
    APPARATUS_RE.is_match(p.text).then_some(Role::Apparatus)
}

fn quoted_translation(_: &Classifier, p: &Paragraph<'_>) -> Option<Role> {
    (p.text.starts_with('“') && p.text.ends_with('”')).then_some(Role::Translation)
}

fn bibliography(_: &Classifier, p: &Paragraph<'_>) -> Option<Role> {
    p.text.starts_with("Bibliography: ").then_some(Role::Bibliography)
}

fn detail_caption(_: &Classifier, p: &Paragraph<'_>) -> Option<Role> {
    p.text.starts_with("detail of").then_some(Role::Caption)
}

fn by_language(c: &Classifier, p: &Paragraph<'_>) -> Option<Role> {
    match c.detector.detect(p.text) {
        None => {
            trace!(text = p.text, "language unknown");
            None
        }
        Some(Detection::Unreliable) => {
            trace!(text = p.text, "language detection unreliable");
            None
        }
        Some(Detection::Reliable("en")) => {
            trace!(text = p.text, "detected english");
            if p.fields.has(Role::Text) {
                Some(Role::Commentary)
            } else {
                Some(Role::Description)
            }
        }
        Some(Detection::Reliable(code)) => {
            trace!(text = p.text, code, "detected non-english");
            Some(Role::Text)
        }
    }
}

fn damaged_text(_: &Classifier, p: &Paragraph<'_>) -> Option<Role> {
    let damaged = DAMAGED_FRAGMENTS.iter().any(|f| p.text.contains(f))
        || DAMAGED_LINES.contains(&p.text);
    damaged.then_some(Role::Text)
}

fn description_keyword(c: &Classifier, p: &Paragraph<'_>) -> Option<Role> {
    let words = c.tokenizer.tokenize(p.text);
    if !words.iter().any(|w| DESCRIPTION_WORDS.contains(&w.as_str())) {
        return None;
    }
    if c.promote_late_description && p.fields.has(Role::Text) {
        Some(Role::Commentary)
    } else {
        Some(Role::Description)
    }
}

fn text_keyword(c: &Classifier, p: &Paragraph<'_>) -> Option<Role> {
    let words = c.tokenizer.tokenize(p.text);
    words
        .iter()
        .any(|w| TEXT_WORDS.contains(&w.as_str()))
        .then_some(Role::Text)
}

/// Once a description has started, unrecognised paragraphs are transcription.
fn follows_description(_: &Classifier, p: &Paragraph<'_>) -> Option<Role> {
    p.fields.has(Role::Description).then_some(Role::Text)
}

fn field_name(_: &Classifier, p: &Paragraph<'_>) -> Option<Role> {
    p.fields
        .populated()
        .any(|r| r.name() == p.text)
        .then_some(Role::Text)
}

fn log_summary(g: &Graffito<'_>) {
    debug!("{}: {}", g.id, g.title);
    for role in [
        Role::Description,
        Role::Images,
        Role::Text,
        Role::Translation,
        Role::Apparatus,
        Role::Commentary,
    ] {
        let Some(lines) = g.fields.lines(role).filter(|l| !l.is_empty()) else {
            continue;
        };
        debug!("{}", role);
        for (i, line) in lines.iter().enumerate() {
            if role == Role::Apparatus {
                debug!("\t{}: {}", i + 1, line);
            } else {
                debug!("\t{}", line);
            }
        }
    }
}

// ── Tests ──
