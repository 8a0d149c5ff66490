use thiserror::Error;

/// Data-shape failures that stop a run.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("found sequential apparatus (ol), but no text yet identified: \"{0}\"")]
    ApparatusBeforeText(String),

    #[error("unclassified paragraph: \"{0}\"")]
    Unclassified(String),

    #[error("entry heading has no id (context \"{0}\")")]
    EmptyEntryHeading(String),

    #[error("template error: {0}")]
    Template(String),
}
