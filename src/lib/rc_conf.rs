// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use crate::{
    file::{read_file, write_file, DEFAULT_FILE_MODE},
    NetRenderError,
};

/// Editor of BSD `rc.conf` style `key=value` file.
///
/// Lines not holding `key=value` are preserved. Changing an existing key
/// keeps its position, new keys are appended.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RcConf {
    lines: Vec<String>,
    original: String,
}

impl RcConf {
    pub fn new(content: &str) -> Self {
        Self {
            lines: content.lines().map(|l| l.to_string()).collect(),
            original: content.to_string(),
        }
    }

    /// Load from file, empty if file does not exist.
    pub fn load(path: &Path) -> Result<Self, NetRenderError> {
        Ok(Self::new(read_file(path)?.unwrap_or_default().as_str()))
    }

    /// Unquoted value of the last assignment of specified key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lines
            .iter()
            .rev()
            .filter_map(|l| l.split_once('='))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| unquote(v).to_string())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        let value = shell_quote(value);
        let mut done = false;
        for line in self.lines.iter_mut() {
            if let Some((k, _)) = line.split_once('=') {
                if k == key {
                    *line = format!("{key}={value}");
                    done = true;
                }
            }
        }
        if !done {
            self.lines.push(format!("{key}={value}"));
        }
    }

    pub fn is_changed(&self) -> bool {
        self.to_string() != self.original
    }

    /// Write to file only when content changed.
    pub fn save(&self, path: &Path) -> Result<(), NetRenderError> {
        if self.is_changed() {
            write_file(path, self.to_string().as_str(), DEFAULT_FILE_MODE)
        } else {
            log::debug!("{} unchanged", path.display());
            Ok(())
        }
    }
}

impl std::fmt::Display for RcConf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.lines.iter() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c)
}

pub(crate) fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        "''".to_string()
    } else if value.chars().all(is_shell_safe) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\"'\"'"))
    }
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2
            && value.starts_with(quote)
            && value.ends_with(quote)
        {
            return &value[1..value.len() - 1];
        }
    }
    value
}
