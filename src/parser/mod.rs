pub mod classify;
pub mod language;
pub mod nodes;
pub mod record;
pub mod roles;
pub mod sections;

use tracing::{info, warn};

use crate::error::ExtractError;
use classify::{ClassifyStats, Classifier};
use nodes::Document;
use record::Record;

/// A rendered record plus the raw text of the nodes it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub record: Record,
    /// One line per member node, heading included.
    pub raw: String,
}

/// Four-stage pipeline: document → contexts → classified graffiti → records.
pub fn process_document(
    doc: &Document,
    classifier: &Classifier,
) -> Result<Vec<Extracted>, ExtractError> {
    let mut contexts = sections::segment(doc)?;
    let mut out = Vec::new();
    let mut totals = ClassifyStats::default();

    for context in contexts.values_mut() {
        for g in &mut context.replaced {
            classifier.classify(g)?;
            warn!(id = %g.id, title = %g.title, "replaced graffito classified, not written");
        }
        for g in context.graffiti.values_mut() {
            let stats = classifier.classify(g)?;
            totals.headings += stats.headings;
            totals.breaks += stats.breaks;
            totals.images += stats.images;
            totals.blanks += stats.blanks;
            totals.ignored += stats.ignored;

            let raw = g.nodes.iter().map(|n| format!("{}\n", n.text)).collect();
            out.push(Extracted {
                record: record::assemble(g),
                raw,
            });
        }
    }

    info!(
        contexts = contexts.len(),
        graffiti = out.len(),
        images = totals.images,
        breaks = totals.breaks,
        ignored = totals.ignored,
        "extraction finished"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::language::{Detection, LanguageDetector, WhatlangDetector};
    use crate::emit::{Emitter, Template};

    /// Greek script → "el"; four or more words otherwise → English.
    struct ScriptStub;

    impl LanguageDetector for ScriptStub {
        fn detect(&self, text: &str) -> Option<Detection> {
            if text.chars().any(|c| ('\u{370}'..='\u{3ff}').contains(&c)) {
                Some(Detection::Reliable("el"))
            } else if text.split_whitespace().count() >= 4 {
                Some(Detection::Reliable("en"))
            } else {
                None
            }
        }
    }

    fn fixture() -> Vec<Extracted> {
        let html = std::fs::read_to_string("tests/fixtures/catalogue.html").unwrap();
        let doc = Document::parse(&html);
        process_document(&doc, &Classifier::new(Box::new(ScriptStub))).unwrap()
    }

    #[test]
    fn fixture_records() {
        let out = fixture();
        let ids: Vec<&str> = out.iter().map(|e| e.record.id.as_str()).collect();
        assert_eq!(ids, vec!["1.1", "1.2", "2.1"]);

        let ship = &out[0].record;
        assert_eq!(ship.title, "ship: graffito");
        assert_eq!(ship.description, "Incised graffito of a ship, 0.20 m wide and 0.12 m high.");
        assert_eq!(ship.text, "\n<lb/>ΑΓΑΘΗ\n<lb break=\"no\"/>ΤΥΧΗ");
        assert_eq!(ship.translation, "Good fortune");
        assert_eq!(ship.commentary, "The ship is shown under sail, with the steering oar raised.");
        assert_eq!(ship.bibliography.as_deref(), Some(" IK 24.2 1234"));
        assert_eq!(ship.caption, vec!["detail of the prow"]);
        assert_eq!(ship.images, vec!["images/1-1.jpg"]);
        assert_eq!(
            ship.apparatus,
            vec!["0: ΑΓΑΘΗ: first letter damaged", "1: ΤΥΧΗ: reading uncertain"]
        );

        let acclamation = &out[1].record;
        assert_eq!(acclamation.description, "Dipinto, red paint.");
        assert_eq!(acclamation.text, "\n<lb/>ΝΙΚΑ Η ΤΥΧΗ\n<lb/>traces");
        assert_eq!(acclamation.apparatus, vec!["1 ΝΙΚΑ: nu inverted"]);
        assert_eq!(acclamation.translation, "The fortune of the city wins");
        assert!(acclamation.commentary.is_empty());

        let name = &out[2].record;
        assert_eq!(name.description, "Graffito scratched into the plaster.");
        assert_eq!(name.text, "\n<lb/>[[ ]]");
        assert_eq!(name.commentary, "Erased, perhaps deliberately, in antiquity.");
    }

    #[test]
    fn raw_dump_keeps_every_member_node() {
        let out = fixture();
        let raw = &out[2].raw;
        assert_eq!(
            raw,
            "2.1 Name\nGraffito scratched into the plaster.\n[[ ]]\nErased, perhaps deliberately, in antiquity.\n"
        );
        // the line-break paragraph still appears, as an empty line
        assert!(out[0].raw.ends_with("Bibliography: IK 24.2 1234\n\n"));
    }

    fn emit_all(dir: &std::path::Path) -> Vec<(String, Vec<u8>)> {
        let template = Template::load(std::path::Path::new("fodder/epidoc-template.xml")).unwrap();
        let emitter = Emitter::new(template, dir);
        emitter.prepare().unwrap();
        for entry in &fixture() {
            emitter.emit(entry).unwrap();
        }
        let mut files: Vec<(String, Vec<u8>)> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| {
                let path = e.unwrap().path();
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                (name, std::fs::read(&path).unwrap())
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn rerun_writes_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = emit_all(&dir.path().join("a"));
        let second = emit_all(&dir.path().join("b"));
        let names: Vec<&str> = first.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["1.1.txt", "1.1.xml", "1.2.txt", "1.2.xml", "2.1.txt", "2.1.xml"]
        );
        assert_eq!(first, second);

        // rewriting over existing output changes nothing either
        let again = emit_all(&dir.path().join("a"));
        assert_eq!(first, again);
    }

    #[test]
    fn fixture_runs_with_whatlang() {
        let html = std::fs::read_to_string("tests/fixtures/catalogue.html").unwrap();
        let doc = Document::parse(&html);
        let out = process_document(&doc, &Classifier::new(Box::new(WhatlangDetector)));
        assert!(out.is_ok(), "{:?}", out.as_ref().err());
        assert_eq!(out.unwrap().len(), 3);
    }

    #[test]
    fn replaced_graffito_is_still_classified() {
        let doc = Document::parse(
            "<p class=\"s3\">The Graffiti</p><p class=\"s7\">Room</p>\
             <h2>1 first</h2><ol><li>a</li></ol>\
             <h2>1 second</h2><p>ΑΓΑΘΗ ΤΥΧΗ</p>",
        );
        let err = process_document(&doc, &Classifier::new(Box::new(ScriptStub))).unwrap_err();
        assert!(matches!(err, ExtractError::ApparatusBeforeText(_)));
    }

    #[test]
    fn replaced_graffito_is_not_emitted() {
        let doc = Document::parse(
            "<p class=\"s3\">The Graffiti</p><p class=\"s7\">Room</p>\
             <h2>1 first</h2><p>ΜΑΡΚΟΣ</p>\
             <h2>1 second</h2><p>ΑΓΑΘΗ ΤΥΧΗ</p>",
        );
        let out = process_document(&doc, &Classifier::new(Box::new(ScriptStub))).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].record.title, "second");
        assert_eq!(out[0].record.text, "\n<lb/>ΑΓΑΘΗ ΤΥΧΗ");
    }

    #[test]
    fn no_marker_no_records() {
        let doc = Document::parse("<p class=\"s7\">Room</p><h2>1 A</h2><p>ΑΓΑΘΗ</p>");
        let out = process_document(&doc, &Classifier::new(Box::new(ScriptStub))).unwrap();
        assert!(out.is_empty());
    }
}
