use crate::error::{Error, Result};
use crate::fmt::{parse_bool, split_list};
use error_stack::Report;
use std::collections::BTreeMap;
use std::str::FromStr;

/// A value read from a config file, kept as text until loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgValue {
    raw: String,
}

impl CfgValue {
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self { raw: raw.into() }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parse the value into `T`
    pub fn load<T>(&self) -> Result<T>
    where
        T: FromStr,
    {
        self.raw.trim().parse::<T>().map_err(|_| {
            Report::new(Error::cast("cannot convert config value")).attach_printable(format!(
                "`{}` as {}",
                self.raw,
                std::any::type_name::<T>()
            ))
        })
    }

    /// Parse `true/false`, `yes/no`, `on/off` or `1/0`
    pub fn as_bool(&self) -> Result<bool> {
        parse_bool(&self.raw).ok_or_else(|| {
            Report::new(Error::cast("cannot convert config value"))
                .attach_printable(format!("`{}` as bool", self.raw))
        })
    }

    /// Tokens separated by whitespace, `,`, `|` or `;`
    pub fn split(&self) -> Vec<String> {
        split_list(&self.raw)
    }
}

/// One section of a parsed config: its values and nested sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CfgLevel {
    name: String,
    depth: usize,
    sections: BTreeMap<String, CfgLevel>,
    values: BTreeMap<String, CfgValue>,
}

impl CfgLevel {
    pub(crate) fn new(name: &str, depth: usize) -> Self {
        Self {
            name: name.to_string(),
            depth,
            ..Default::default()
        }
    }

    /// Name of the section, empty for the root
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nesting depth, 0 for the root
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.values.is_empty()
    }

    /// Direct child section
    pub fn section(&self, name: &str) -> Option<&CfgLevel> {
        self.sections.get(name)
    }

    /// Child sections in name order
    pub fn sections(&self) -> impl Iterator<Item = (&str, &CfgLevel)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Value of `key` in this section
    pub fn value(&self, key: &str) -> Option<&CfgValue> {
        self.values.get(key)
    }

    /// Values of this section in key order
    pub fn values(&self) -> impl Iterator<Item = (&str, &CfgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a nested section by dotted path, like `sinks.file`
    pub fn get_section(&self, path: &str) -> Option<&CfgLevel> {
        path.split('.')
            .try_fold(self, |level, segment| level.section(segment.trim()))
    }

    /// Look up a value by dotted path, like `sinks.file.type`
    pub fn get(&self, path: &str) -> Option<&CfgValue> {
        match path.rsplit_once('.') {
            Some((sections, key)) => self.get_section(sections)?.value(key),
            None => self.value(path),
        }
    }

    pub(crate) fn section_mut_or_insert(&mut self, path: &[String]) -> &mut CfgLevel {
        let mut level = self;
        for segment in path {
            let depth = level.depth + 1;
            level = level
                .sections
                .entry(segment.clone())
                .or_insert_with(|| CfgLevel::new(segment, depth));
        }
        level
    }

    /// Insert a value, returning `false` if the key already exists
    pub(crate) fn insert_value(&mut self, key: &str, value: CfgValue) -> bool {
        if self.values.contains_key(key) {
            return false;
        }
        self.values.insert(key.to_string(), value);
        true
    }
}
