/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Credentials file loading
//!
//! The credentials file is a small INI dialect:
//! ```ini
//! # comment
//! [default]
//! type = access_key
//! access_key_id = foo
//! access_key_secret = bar
//! ```

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use crate::os_shim_internal::Fs;
use crate::profile::ProfileFileError;

/// A named section of the credentials file
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    properties: HashMap<String, String>,
}

impl Section {
    /// Create a section from its name and properties
    pub fn new(name: impl Into<String>, properties: HashMap<String, String>) -> Self {
        Section {
            name: name.into(),
            properties,
        }
    }

    /// Name of the section
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of `key`, if set
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// All sections of one credentials file
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileSet {
    sections: HashMap<String, Section>,
}

impl ProfileSet {
    /// Section called `name`
    pub fn get_section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// True when the file declared no sections
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileParseError {
    path: PathBuf,
    line_number: usize,
    message: String,
}

impl Display for ProfileParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error parsing {} on line {}: {}",
            self.path.display(),
            self.line_number,
            self.message
        )
    }
}

impl Error for ProfileParseError {}

/// Read and parse the credentials file at `path`
pub fn load_config(fs: &Fs, path: &Path) -> Result<ProfileSet, ProfileFileError> {
    let contents = fs
        .read_to_end(path)
        .map_err(|cause| ProfileFileError::CouldNotReadFile {
            path: path.to_path_buf(),
            cause,
        })?;
    let contents = String::from_utf8_lossy(&contents);
    parse(&contents, path).map_err(ProfileFileError::CouldNotParseProfile)
}

/// Parse credentials file contents; `path` is only used in error messages
pub fn parse(contents: &str, path: &Path) -> Result<ProfileSet, ProfileParseError> {
    let mut sections: HashMap<String, Section> = HashMap::new();
    let mut current: Option<String> = None;
    let error = |line_number: usize, message: &str| ProfileParseError {
        path: path.to_path_buf(),
        line_number,
        message: message.to_string(),
    };

    for (index, line) in contents.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or_else(|| error(line_number, "section header is missing a closing `]`"))?
                .trim();
            if name.is_empty() {
                return Err(error(line_number, "section name cannot be empty"));
            }
            sections
                .entry(name.to_string())
                .or_insert_with(|| Section::new(name, HashMap::new()));
            current = Some(name.to_string());
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| error(line_number, "expected `key = value`"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(error(line_number, "property name cannot be empty"));
        }
        let section = current
            .as_ref()
            .and_then(|name| sections.get_mut(name))
            .ok_or_else(|| error(line_number, "property defined outside of a section"))?;
        section
            .properties
            .insert(key.to_string(), value.trim().to_string());
    }
    Ok(ProfileSet { sections })
}
