use crate::{errors::Error, Result};

/// Fixed registry of comment targets: short key -> human-readable name.
///
/// Keys are the values exchanged in callback data; insertion order drives
/// keyboard layout.
#[derive(Clone, Debug)]
pub struct TargetRegistry {
    entries: Vec<(String, String)>,
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self {
            entries: vec![
                ("A".to_string(), "Person A".to_string()),
                ("B".to_string(), "Person B".to_string()),
                ("C".to_string(), "Person C".to_string()),
            ],
        }
    }
}

impl TargetRegistry {
    /// Parse a `key=Name` comma-separated list, e.g. `A=Person A,B=Person B`.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for part in raw.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let Some((key, name)) = part.split_once('=') else {
                return Err(Error::Config(format!(
                    "TARGETS entry '{part}' is not of the form key=Name"
                )));
            };
            let (key, name) = (key.trim(), name.trim());
            if key.is_empty() || name.is_empty() {
                return Err(Error::Config(format!(
                    "TARGETS entry '{part}' has an empty key or name"
                )));
            }
            entries.push((key.to_string(), name.to_string()));
        }
        if entries.is_empty() {
            return Err(Error::Config("TARGETS must name at least one target".to_string()));
        }
        Ok(Self { entries })
    }

    pub fn display_name(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, name)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), n.as_str()))
    }
}
