//! The shipped preference table
//!
//! `firefox/user.js` is embedded at compile time and parsed on first use.

use crate::error::{Error, Result};
use crate::parser::parse_user_js;
use crate::types::{PrefValue, Setting};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Raw text of the shipped `firefox/user.js`
pub const SHIPPED_USER_JS: &str = include_str!("../firefox/user.js");

static SHIPPED_TABLE: OnceLock<SettingsTable> = OnceLock::new();

/// A table of settings with unique keys, iterated in declaration order
#[derive(Debug, Clone, Default)]
pub struct SettingsTable {
    settings: Vec<Setting>,
    index: HashMap<String, usize>,
}

impl SettingsTable {
    /// Build a table, rejecting repeated keys
    pub fn from_settings(settings: Vec<Setting>) -> Result<Self> {
        let mut index = HashMap::with_capacity(settings.len());
        for (i, setting) in settings.iter().enumerate() {
            if let Some(&first) = index.get(&setting.key) {
                let first: &Setting = &settings[first];
                return Err(Error::DuplicateKey {
                    key: setting.key.clone(),
                    first_line: first.line,
                    second_line: setting.line,
                });
            }
            index.insert(setting.key.clone(), i);
        }
        Ok(SettingsTable { settings, index })
    }

    /// Parse user.js content straight into a table
    pub fn parse(content: &str) -> Result<Self> {
        Self::from_settings(parse_user_js(content)?)
    }

    /// The table shipped in `firefox/user.js`, parsed once per process
    pub fn shipped() -> Result<&'static SettingsTable> {
        if let Some(table) = SHIPPED_TABLE.get() {
            return Ok(table);
        }
        let table = SettingsTable::parse(SHIPPED_USER_JS)?;
        Ok(SHIPPED_TABLE.get_or_init(|| table))
    }

    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.setting(key).map(|s| &s.value)
    }

    pub fn setting(&self, key: &str) -> Option<&Setting> {
        self.index.get(key).map(|&i| &self.settings[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Setting> {
        self.settings.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.settings.iter().map(|s| s.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn as_slice(&self) -> &[Setting] {
        &self.settings
    }
}

impl<'a> IntoIterator for &'a SettingsTable {
    type Item = &'a Setting;
    type IntoIter = std::slice::Iter<'a, Setting>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
