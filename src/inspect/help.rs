use std::io::Write;

use crate::error::InspectError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpEntry {
    pub name: &'static str,
    pub signature: &'static str,
    pub summary: &'static str,
}

/// Registry of the snapshot helpers, kept in name order.
#[derive(Debug, Clone)]
pub struct HelpRegistry {
    entries: Vec<HelpEntry>,
}

impl Default for HelpRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl HelpRegistry {
    #[must_use]
    pub fn builtin() -> Self {
        let mut entries = vec![
            HelpEntry {
                name: "prop",
                signature: "prop(key)(obj)",
                summary: "Value of obj[key], or nothing when the key is missing.",
            },
            HelpEntry {
                name: "is",
                signature: "is(key)(val)(obj)",
                summary: "True when obj[key] equals val. Used by --where key=val.",
            },
            HelpEntry {
                name: "submissions",
                signature: "submissions()",
                summary: "The content.Submissions list of the snapshot, unmodified.",
            },
            HelpEntry {
                name: "lookup",
                signature: "lookup(path)",
                summary: "Value at a dotted path; numeric segments index lists. Used by --path.",
            },
            HelpEntry {
                name: "help",
                signature: "help([name])",
                summary: "Lists the helpers, or describes one of them.",
            },
        ];
        entries.sort_by_key(|entry| entry.name);
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HelpEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &HelpEntry> {
        self.entries.iter()
    }

    /// Prints one helper, or all of them when `topic` is `None` or empty.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown helper name or a failed write.
    pub fn print<W: Write>(&self, topic: Option<&str>, out: &mut W) -> Result<(), InspectError> {
        match topic.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => {
                let entry = self.get(name).ok_or_else(|| InspectError::UnknownHelper {
                    name: name.to_owned(),
                })?;
                writeln!(out, "{}", entry.signature)?;
                writeln!(out, "  {}", entry.summary)?;
            }
            None => {
                let width = self
                    .entries
                    .iter()
                    .map(|entry| entry.signature.len())
                    .max()
                    .unwrap_or(0);
                for entry in &self.entries {
                    writeln!(out, "{:<width$}  {}", entry.signature, entry.summary)?;
                }
            }
        }
        Ok(())
    }
}
