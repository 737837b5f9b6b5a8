//! Inline `style` attribute handling.
//!
//! Declarations are kept in their original order. Keys are compared
//! lowercased, so `Font-Family` and `font-family` are the same declaration.

/// Parsed `key: value; key: value` declarations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: Vec<(String, String)>,
}

impl StyleMap {
    pub fn parse(style: &str) -> Self {
        let mut map = Self::default();
        for part in style.split(';').map(str::trim).filter(|part| !part.is_empty()) {
            let Some((key, value)) = part.split_once(':') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                continue;
            }
            map.set(key, value);
        }
        map
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        let key = key.to_lowercase();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key, value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) {
        let key = key.to_lowercase();
        self.entries.retain(|(existing, _)| *existing != key);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_style_string(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Applies `updates` to a style string. `None` deletes the declaration; keys
/// not named in `updates` keep their value and position.
pub fn merge_styles(style: Option<&str>, updates: &[(&str, Option<&str>)]) -> String {
    let mut map = StyleMap::parse(style.unwrap_or(""));
    for (key, value) in updates {
        match value {
            Some(value) => map.set(key, value),
            None => map.remove(key),
        }
    }
    map.to_style_string()
}

/// Reads one declaration, stripping any quotes around the value.
pub fn style_value(style: Option<&str>, key: &str) -> Option<String> {
    let map = StyleMap::parse(style?);
    map.get(key)
        .map(|value| value.replace(['"', '\''], ""))
        .filter(|value| !value.is_empty())
}
