use indexmap::IndexMap;
use tracing::{info, warn};

use super::nodes::{Document, Node};
use super::roles::Fields;
use crate::error::ExtractError;

const CHAPTER_CLASS: &str = "s3";
const CONTEXT_CLASS: &str = "s7";
const ENTRY_HEADING: &str = "h2";
const START_MARKER: &str = "The Graffiti";

/// A titled group of graffiti (one find-spot in the catalogue).
#[derive(Debug, Clone)]
pub struct Context<'a> {
    pub slug: String,
    pub title: String,
    pub nodes: Vec<&'a Node>,
    pub graffiti: IndexMap<String, Graffito<'a>>,
    /// Entries displaced by a later heading with the same id. Never emitted,
    /// still classified.
    pub replaced: Vec<Graffito<'a>>,
}

/// One numbered entry. `nodes` starts with its heading.
#[derive(Debug, Clone)]
pub struct Graffito<'a> {
    pub id: String,
    pub title: String,
    pub nodes: Vec<&'a Node>,
    pub fields: Fields,
}

impl<'a> Graffito<'a> {
    pub fn new(id: &str, title: &str) -> Self {
        Graffito {
            id: id.to_string(),
            title: title.to_string(),
            nodes: Vec::new(),
            fields: Fields::default(),
        }
    }
}

/// Split the "The Graffiti" chapter into contexts, then each context into
/// graffiti. Keys repeat-insert in place: first position, last value.
pub fn segment(doc: &Document) -> Result<IndexMap<String, Context<'_>>, ExtractError> {
    let Some(run) = graffiti_run(doc) else {
        warn!("no \"{}\" chapter heading found; nothing to extract", START_MARKER);
        return Ok(IndexMap::new());
    };

    let mut contexts = IndexMap::new();
    for mut context in split_contexts(&run) {
        split_graffiti(&mut context)?;
        info!(slug = %context.slug, title = %context.title, graffiti = context.graffiti.len(), "context");
        for g in context.graffiti.values() {
            info!(id = %g.id, title = %g.title, "graffito");
        }
        insert_context(&mut contexts, context);
    }
    Ok(contexts)
}

fn is_chapter_heading(node: &Node) -> bool {
    node.is("p") && node.has_class(CHAPTER_CLASS)
}

fn is_start_marker(node: &Node) -> bool {
    is_chapter_heading(node) && node.text.trim() == START_MARKER
}

fn is_context_title(node: &Node) -> bool {
    node.is("p") && node.has_class(CONTEXT_CLASS)
}

/// Siblings after the start marker, up to (not including) the next chapter heading.
pub fn graffiti_run(doc: &Document) -> Option<Vec<&Node>> {
    let siblings = doc.following_siblings(is_start_marker)?;
    Some(
        siblings
            .iter()
            .filter(|n| !n.is_blank_text())
            .take_while(|n| !is_chapter_heading(n))
            .collect(),
    )
}

pub fn split_contexts<'a>(nodes: &[&'a Node]) -> Vec<Context<'a>> {
    let mut contexts = Vec::new();
    let mut current: Option<Context<'a>> = None;
    let mut discarded = 0usize;

    for &node in nodes {
        if is_context_title(node) {
            if let Some(done) = current.take() {
                contexts.push(done);
            }
            current = Some(Context {
                slug: slugify(&node.text),
                title: node.text.clone(),
                nodes: Vec::new(),
                graffiti: IndexMap::new(),
                replaced: Vec::new(),
            });
        }
        match current.as_mut() {
            Some(context) => context.nodes.push(node),
            None => discarded += 1,
        }
    }
    if let Some(done) = current {
        contexts.push(done);
    }

    if discarded > 0 {
        warn!(discarded, "nodes before the first context title were dropped");
    }
    contexts
}

/// The displaced context's entries move to the survivor's `replaced` list.
fn insert_context<'a>(contexts: &mut IndexMap<String, Context<'a>>, context: Context<'a>) {
    if let Some(old) = contexts.insert(context.slug.clone(), context) {
        warn!(slug = %old.slug, "duplicate context slug; earlier context replaced");
        let survivor = &mut contexts[&old.slug];
        survivor.replaced.extend(old.replaced);
        survivor.replaced.extend(old.graffiti.into_values());
    }
}

/// Split a context's nodes (title node excluded) into graffiti at each `h2`.
pub fn split_graffiti(context: &mut Context<'_>) -> Result<(), ExtractError> {
    let mut graffiti = IndexMap::new();
    let mut replaced = Vec::new();
    let mut current: Option<Graffito<'_>> = None;
    let mut discarded = 0usize;

    for &node in context.nodes.iter().skip(1) {
        if node.is(ENTRY_HEADING) {
            let (id, title) = parse_heading(&node.text)
                .ok_or_else(|| ExtractError::EmptyEntryHeading(context.title.clone()))?;
            if let Some(done) = current.take() {
                insert_graffito(&mut graffiti, &mut replaced, done);
            }
            current = Some(Graffito::new(&id, &title));
        }
        match current.as_mut() {
            Some(g) => g.nodes.push(node),
            None => discarded += 1,
        }
    }
    if let Some(done) = current {
        insert_graffito(&mut graffiti, &mut replaced, done);
    }

    if discarded > 0 {
        warn!(slug = %context.slug, discarded, "nodes before the first graffito heading were dropped");
    }
    context.graffiti = graffiti;
    context.replaced.extend(replaced);
    Ok(())
}

fn insert_graffito<'a>(
    graffiti: &mut IndexMap<String, Graffito<'a>>,
    replaced: &mut Vec<Graffito<'a>>,
    g: Graffito<'a>,
) {
    if let Some(old) = graffiti.insert(g.id.clone(), g) {
        warn!(id = %old.id, "duplicate graffito id; earlier entry replaced");
        replaced.push(old);
    }
}

/// `"1.1 Ship—graffito"` → `("1.1", "ship: graffito")`.
pub fn parse_heading(text: &str) -> Option<(String, String)> {
    let mut tokens = text.split_whitespace();
    let id = tokens.next()?.to_string();
    let title = tokens
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace('—', ": ");
    Some((id, title))
}

/// Lowercase, cut at the first `[` and then the first `(`, hyphenate words.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let cut = lower.split('[').next().unwrap_or("");
    let cut = cut.split('(').next().unwrap_or("");
    cut.split_whitespace().collect::<Vec<_>>().join("-")
}

// ── Tests ──
