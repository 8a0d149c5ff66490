use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quick_xml::escape::partial_escape;
use tracing::debug;

use crate::error::ExtractError;
use crate::parser::Extracted;

/// Text with `{name}` slots; `{{` and `}}` are literal braces.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Template {
            source: source.into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {:?}", path))?;
        Ok(Template::new(source))
    }

    pub fn render(&self, slots: &[(&str, &str)]) -> Result<String, ExtractError> {
        let mut out = String::with_capacity(self.source.len());
        let mut chars = self.source.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            match c {
                '{' => {
                    if chars.next_if(|&(_, n)| n == '{').is_some() {
                        out.push('{');
                        continue;
                    }
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, ch)) => name.push(ch),
                            None => {
                                return Err(ExtractError::Template(format!(
                                    "unclosed slot at byte {}",
                                    i
                                )))
                            }
                        }
                    }
                    let value = slots
                        .iter()
                        .find(|(k, _)| *k == name)
                        .map(|(_, v)| *v)
                        .ok_or_else(|| ExtractError::Template(format!("unknown slot `{}`", name)))?;
                    out.push_str(value);
                }
                '}' => {
                    if chars.next_if(|&(_, n)| n == '}').is_none() {
                        return Err(ExtractError::Template(format!(
                            "single '}}' at byte {}",
                            i
                        )));
                    }
                    out.push('}');
                }
                _ => out.push(c),
            }
        }
        Ok(out)
    }
}

/// `"A1."` + `"xml"` → `"a1.xml"`.
pub fn file_name(id: &str, ext: &str) -> String {
    format!("{}.{}", id.to_lowercase().replace(' ', "-"), ext).replace("..", ".")
}

/// Writes one `.xml` and one `.txt` per graffito into `output_dir`.
pub struct Emitter {
    template: Template,
    output_dir: PathBuf,
}

impl Emitter {
    pub fn new(template: Template, output_dir: impl Into<PathBuf>) -> Self {
        Emitter {
            template,
            output_dir: output_dir.into(),
        }
    }

    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create {:?}", self.output_dir))
    }

    pub fn emit(&self, entry: &Extracted) -> Result<()> {
        let r = &entry.record;
        let id = partial_escape(r.id.as_str());
        let title = format!("{}: {}", id, partial_escape(r.title.as_str()));
        let xml = self.template.render(&[
            ("text_title", title.as_str()),
            ("text_id", &*id),
            ("description", r.description.as_str()),
            ("text", r.text.as_str()),
            ("translation", r.translation.as_str()),
            ("commentary", r.commentary.as_str()),
        ])?;

        let xml_path = self.output_dir.join(file_name(&r.id, "xml"));
        fs::write(&xml_path, xml).with_context(|| format!("Failed to write {:?}", xml_path))?;
        let txt_path = self.output_dir.join(file_name(&r.id, "txt"));
        fs::write(&txt_path, &entry.raw)
            .with_context(|| format!("Failed to write {:?}", txt_path))?;

        debug!(
            id = %r.id,
            path = ?xml_path,
            apparatus = r.apparatus.len(),
            bibliography = ?r.bibliography,
            captions = r.caption.len(),
            images = r.images.len(),
            "written"
        );
        Ok(())
    }
}
