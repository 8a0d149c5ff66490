use quick_xml::escape::partial_escape;

use super::sections::Graffito;

const LINE_BREAK: &str = "\n<lb/>";
const WORD_BREAK: &str = "\n<lb break=\"no\"/>";

/// Final rendered fields for one graffito.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub title: String,
    pub description: String,
    pub text: String,
    pub translation: String,
    pub commentary: String,
    // kept for logging, not rendered
    pub apparatus: Vec<String>,
    pub bibliography: Option<String>,
    pub caption: Vec<String>,
    pub images: Vec<String>,
}

pub fn assemble(g: &Graffito<'_>) -> Record {
    let f = &g.fields;
    Record {
        id: g.id.clone(),
        title: g.title.clone(),
        description: render_description(&escape_lines(&f.description)),
        text: render_text(&escape_lines(&f.text)),
        translation: render_prose(&unquoted(&escape_lines(&f.translation))),
        commentary: render_prose(&escape_lines(&f.commentary)),
        apparatus: f.apparatus.clone(),
        bibliography: f.bibliography.clone(),
        caption: f.caption.clone(),
        images: f.images.clone(),
    }
}

fn escape_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|l| partial_escape(l.as_str()).into_owned())
        .collect()
}

fn broken_lines(lines: &[String]) -> String {
    lines.iter().map(|l| format!("{LINE_BREAK}{l}")).collect()
}

/// A single line stays bare; several get a line break each.
fn render_description(lines: &[String]) -> String {
    match lines {
        [] => String::new(),
        [one] => one.clone(),
        many => broken_lines(many),
    }
}

/// Every line gets a break; `"- "` marks a word split across lines.
fn render_text(lines: &[String]) -> String {
    broken_lines(lines).replace("- ", WORD_BREAK)
}

/// Space-joined prose with line-wrap hyphens removed.
fn render_prose(lines: &[String]) -> String {
    let joined = match lines {
        [] => String::new(),
        [one] => one.clone(),
        many => many.join(" "),
    };
    joined.replace("- ", "")
}

/// Each translation paragraph carries its own pair of curly quotes.
fn unquoted(lines: &[String]) -> Vec<String> {
    lines.iter().map(|l| strip_quotes(l)).collect()
}

fn strip_quotes(s: &str) -> String {
    let s = s.strip_prefix('“').unwrap_or(s);
    let s = s.strip_suffix('”').unwrap_or(s);
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::roles::Role;

    fn graffito(lines: &[(Role, &str)]) -> Graffito<'static> {
        let mut g = Graffito::new("1.1", "ship: graffito");
        for (role, line) in lines {
            g.fields.accumulate(*role, line);
        }
        g
    }

    #[test]
    fn text_marks_every_line_and_word_breaks() {
        let r = assemble(&graffito(&[(Role::Text, "ΑΓΑΘΗ- ΤΥΧΗ")]));
        assert_eq!(r.text, "\n<lb/>ΑΓΑΘΗ\n<lb break=\"no\"/>ΤΥΧΗ");
    }

    #[test]
    fn translation_is_space_joined_prose() {
        let r = assemble(&graffito(&[
            (Role::Translation, "“hail,"),
            (Role::Translation, "fortune”"),
        ]));
        assert_eq!(r.translation, "hail, fortune");
    }

    #[test]
    fn quoted_translation_paragraphs_lose_their_own_quotes() {
        let r = assemble(&graffito(&[
            (Role::Translation, "“Good fortune”"),
            (Role::Translation, "“to the city”"),
        ]));
        assert_eq!(r.translation, "Good fortune to the city");
    }

    #[test]
    fn description_single_line_is_verbatim() {
        let r = assemble(&graffito(&[(Role::Description, "Incised graffito.")]));
        assert_eq!(r.description, "Incised graffito.");
    }

    #[test]
    fn description_several_lines_get_breaks() {
        let r = assemble(&graffito(&[
            (Role::Description, "Incised graffito."),
            (Role::Description, "Letters 2 cm high."),
        ]));
        assert_eq!(r.description, "\n<lb/>Incised graffito.\n<lb/>Letters 2 cm high.");
    }

    #[test]
    fn commentary_strips_wrap_hyphens() {
        let r = assemble(&graffito(&[
            (Role::Commentary, "The acclama- tion is common"),
            (Role::Commentary, "in Smyrna."),
        ]));
        assert_eq!(r.commentary, "The acclamation is common in Smyrna.");
    }

    #[test]
    fn absent_fields_render_empty() {
        let r = assemble(&graffito(&[(Role::Caption, "detail of the prow")]));
        assert_eq!(r.id, "1.1");
        assert_eq!(r.title, "ship: graffito");
        assert!(r.description.is_empty());
        assert!(r.text.is_empty());
        assert!(r.translation.is_empty());
        assert!(r.commentary.is_empty());
        assert_eq!(r.caption, vec!["detail of the prow"]);
    }

    #[test]
    fn markup_characters_are_escaped() {
        let r = assemble(&graffito(&[(Role::Text, "ΑΓΑΘΗ <Τ>ΥΧΗ & ΝΙΚΑ")]));
        assert_eq!(r.text, "\n<lb/>ΑΓΑΘΗ &lt;Τ&gt;ΥΧΗ &amp; ΝΙΚΑ");
    }
}
