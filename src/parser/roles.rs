use std::fmt;

/// Semantic category of a paragraph inside a graffito entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Description,
    Text,
    Translation,
    Apparatus,
    Commentary,
    Bibliography,
    Caption,
    Images,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Description,
        Role::Text,
        Role::Translation,
        Role::Apparatus,
        Role::Commentary,
        Role::Bibliography,
        Role::Caption,
        Role::Images,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::Description => "description",
            Role::Text => "text",
            Role::Translation => "translation",
            Role::Apparatus => "apparatus",
            Role::Commentary => "commentary",
            Role::Bibliography => "bibliography",
            Role::Caption => "caption",
            Role::Images => "images",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Role-tagged lines accumulated for one entry, in node order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    pub description: Vec<String>,
    pub text: Vec<String>,
    pub translation: Vec<String>,
    pub apparatus: Vec<String>,
    pub commentary: Vec<String>,
    pub bibliography: Option<String>,
    pub caption: Vec<String>,
    pub images: Vec<String>,
}

impl Fields {
    /// Store a classified paragraph. Bibliography keeps only the text after
    /// the first colon and replaces any earlier value; every other role appends.
    pub fn accumulate(&mut self, role: Role, text: &str) {
        match role {
            Role::Bibliography => {
                let value = text.split_once(':').map(|(_, rest)| rest).unwrap_or("");
                self.bibliography = Some(value.to_string());
            }
            _ => {
                if let Some(lines) = self.lines_mut(role) {
                    lines.push(text.to_string());
                }
            }
        }
    }

    /// Replace the apparatus with a numbered list (from an `ol`).
    pub fn set_apparatus<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.apparatus = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| format!("{}: {}", i, item))
            .collect();
    }

    pub fn has(&self, role: Role) -> bool {
        match role {
            Role::Bibliography => self.bibliography.is_some(),
            _ => self.lines(role).is_some_and(|l| !l.is_empty()),
        }
    }

    pub fn lines(&self, role: Role) -> Option<&[String]> {
        match role {
            Role::Description => Some(&self.description),
            Role::Text => Some(&self.text),
            Role::Translation => Some(&self.translation),
            Role::Apparatus => Some(&self.apparatus),
            Role::Commentary => Some(&self.commentary),
            Role::Caption => Some(&self.caption),
            Role::Images => Some(&self.images),
            Role::Bibliography => None,
        }
    }

    fn lines_mut(&mut self, role: Role) -> Option<&mut Vec<String>> {
        match role {
            Role::Description => Some(&mut self.description),
            Role::Text => Some(&mut self.text),
            Role::Translation => Some(&mut self.translation),
            Role::Apparatus => Some(&mut self.apparatus),
            Role::Commentary => Some(&mut self.commentary),
            Role::Caption => Some(&mut self.caption),
            Role::Images => Some(&mut self.images),
            Role::Bibliography => None,
        }
    }

    /// Names of the roles that already hold something.
    pub fn populated(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|r| self.has(*r))
    }
}
