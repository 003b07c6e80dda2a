use crate::error::ConfigError;
use crate::normalization::clean_token;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Built-in aliases: canonical name followed by spellings, plurals and
/// Hindi/Urdu transliterations that should resolve to it.
const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("tomato", &["tomatoes", "tomatoe", "tamatar"]),
    ("onion", &["onions", "pyaz"]),
    ("garlic", &["garlics", "lahsun"]),
    ("ginger", &["gingers", "adrak"]),
    ("chicken", &["chickens", "murgi", "murgh"]),
    ("rice", &["rices", "basmati", "jasmine"]),
    ("oil", &["oils", "ghee", "butter"]),
    ("salt", &["salts", "namak"]),
    ("pepper", &["peppers", "black pepper", "kali mirch"]),
    ("cumin", &["cumins", "jeera"]),
    ("coriander", &["cilantro", "dhania"]),
    ("turmeric", &["haldi"]),
    ("chili", &["chilies", "red chili", "lal mirch"]),
    ("milk", &["milks", "doodh"]),
    ("yogurt", &["yoghurt", "curd", "dahi"]),
    ("flour", &["flours", "maida"]),
    ("sugar", &["sugars", "cheeni"]),
    ("water", &["waters"]),
    ("lemon", &["lemons", "lime", "nimbu"]),
    ("potato", &["potatoes", "aloo"]),
    ("carrot", &["carrots", "gajar"]),
    ("spinach", &["spinaches", "palak"]),
    ("green beans", &["beans", "string beans", "lobiya"]),
    ("bell pepper", &["capsicum", "simla mirch"]),
    ("mushroom", &["mushrooms", "khumbh"]),
    ("peas", &["green peas", "matar"]),
    ("paneer", &["cottage cheese", "indian cheese"]),
    ("lentils", &["dal", "daal", "lens"]),
    ("chickpeas", &["chana", "garbanzo"]),
];

#[derive(Debug, Deserialize)]
struct AliasFile {
    #[serde(default)]
    aliases: IndexMap<String, Vec<String>>,
}

/// Read-only mapping from raw ingredient tokens to canonical names.
///
/// Canonical names always resolve to themselves, so an alias that collides
/// with another entry's canonical name is ignored.
#[derive(Clone, Debug, Default)]
pub struct AliasTable {
    map: HashMap<String, String>,
}

impl AliasTable {
    /// Build from `(canonical, aliases)` pairs. Keys are cleaned the same way
    /// user tokens are, so lookups line up with normalizer output.
    pub fn from_entries<C, A, I>(entries: impl IntoIterator<Item = (C, I)>) -> Self
    where
        C: AsRef<str>,
        A: AsRef<str>,
        I: IntoIterator<Item = A>,
    {
        let entries: Vec<(String, Vec<String>)> = entries
            .into_iter()
            .map(|(canonical, aliases)| {
                (
                    clean_token(canonical.as_ref()),
                    aliases.into_iter().map(|a| clean_token(a.as_ref())).collect(),
                )
            })
            .filter(|(canonical, _)| !canonical.is_empty())
            .collect();

        let mut map = HashMap::with_capacity(entries.len() * 4);

        // Canonical names first so they can never be shadowed.
        for (canonical, _) in &entries {
            map.insert(canonical.clone(), canonical.clone());
        }

        for (canonical, aliases) in entries {
            for alias in aliases {
                if alias.is_empty() {
                    continue;
                }
                match map.get(&alias) {
                    Some(existing) if existing != &canonical => {
                        warn!(
                            "Alias '{}' for '{}' ignored: already resolves to '{}'",
                            alias, canonical, existing
                        );
                    }
                    Some(_) => {}
                    None => {
                        map.insert(alias, canonical.clone());
                    }
                }
            }
        }

        Self { map }
    }

    /// The built-in multi-language table.
    pub fn builtin() -> Self {
        Self::from_entries(
            DEFAULT_ALIASES
                .iter()
                .map(|(canonical, aliases)| (*canonical, aliases.iter().copied())),
        )
    }

    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: AliasFile = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_entries(file.aliases))
    }

    /// Load a replacement table from a TOML file with an `[aliases]` section.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_toml_str(&content, path)?;
        debug!("Loaded {} alias entries from {}", table.len(), path.display());
        Ok(table)
    }

    /// Canonical form of an already-cleaned token, if the table knows it.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.map.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
