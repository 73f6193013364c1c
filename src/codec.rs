//! Flat `[section]` / `key=value` configuration files.
//!
//! This is the subset of TOML (and INI) that the AWS CLI writes to
//! `~/.aws/credentials` and `~/.aws/config`. Nested tables, typed values,
//! quoting and comments are not understood: unrecognised lines are dropped
//! on decode, so encoding a decoded file normalises it.

use std::{fs, io::Write, path::Path, sync::LazyLock};

use regex::Regex;
use tempfile::Builder;
use tracing::{debug, trace};

use crate::error::{Error, Result};

#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

static NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\n\r|\n|\r").expect("newline pattern is valid"));
// Whitespace is ASCII `[\t\n\f\r ]` only; `\s` would also match
// non-breaking and other Unicode spaces inside values.
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\t\n\f\r ]*\[([^\]]+)\][\t\n\f\r ]*$").expect("header pattern is valid")
});
static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\t\n\f\r ]*([^=\t\n\f\r ]+)[\t\n\f\r ]*=[\t\n\f\r ]*([^\t\n\f\r ]+)[\t\n\f\r ]*$")
        .expect("entry pattern is valid")
});

/// Ordered list of sections, exactly as they appear in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Raw text between the brackets, e.g. `default` or `profile alice`.
    pub name: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    /// Verbatim text after `=`, never unquoted or typed.
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Value of the first entry named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Entry::new(key, value));
    }

    /// Builder form of [`Section::push`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }
}

/// One physical line, classified by the first rule that matches it.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Header(&'a str),
    Entry(&'a str, &'a str),
    Skip,
}

impl<'a> Line<'a> {
    fn classify(line: &'a str) -> Self {
        if let Some(name) = HEADER.captures(line).and_then(|caps| caps.get(1)) {
            return Line::Header(name.as_str());
        }

        match ENTRY.captures(line) {
            Some(caps) => match (caps.get(1), caps.get(2)) {
                (Some(key), Some(value)) => Line::Entry(key.as_str(), value.as_str()),
                _ => Line::Skip,
            },
            None => Line::Skip,
        }
    }
}

/// Parse flat configuration text.
///
/// Never fails on unknown content: comments, entries outside any section and
/// lines matching neither rule are skipped. Duplicate section names are kept
/// as separate sections. The `Result` is reserved for stricter grammars.
pub fn decode(text: &str) -> Result<Document> {
    let mut document = Document::default();

    for (number, line) in NEWLINE.split(text).enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match Line::classify(line) {
            Line::Header(name) => document.sections.push(Section::new(name)),
            Line::Entry(key, value) => match document.sections.last_mut() {
                Some(section) => section.push(key, value),
                None => trace!(line = number + 1, key, "dropping entry before first section"),
            },
            Line::Skip => trace!(line = number + 1, "skipping unrecognised line"),
        }
    }

    Ok(document)
}

pub fn decode_file(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path).map_err(|e| Error::io("failed to read", path, e))?;
    let document = decode(&text)?;
    debug!(
        path = %path.display(),
        sections = document.sections.len(),
        "decoded configuration file"
    );
    Ok(document)
}

/// Serialize `document`; every line, the last included, ends with the
/// platform line separator.
///
/// Fails with [`Error::Encode`] when a line would not decode back to the
/// section or entry it was written from, e.g. the entry `[k` = `v]` which
/// reads back as the header `[k=v]`.
pub fn encode(document: &Document) -> Result<String> {
    let mut text = String::new();

    for section in &document.sections {
        let header = format!("[{}]", section.name);
        check_line(section, &header, Line::Header(&section.name))?;
        text.push_str(&header);
        text.push_str(LINE_SEPARATOR);

        for entry in &section.entries {
            let line = format!("{}={}", entry.key, entry.value);
            check_line(section, &line, Line::Entry(&entry.key, &entry.value))?;
            text.push_str(&line);
            text.push_str(LINE_SEPARATOR);
        }
    }

    Ok(text)
}

fn check_line(section: &Section, line: &str, expected: Line<'_>) -> Result<()> {
    let decoded = match line.contains(['\r', '\n']) {
        true => Line::Skip,
        false => Line::classify(line),
    };
    if decoded == expected {
        return Ok(());
    }

    let reason = match decoded {
        Line::Header(name) => format!("{line:?} would read back as section [{name}]"),
        Line::Entry(key, value) => format!("{line:?} would read back as {key}={value}"),
        Line::Skip => format!("{line:?} would be skipped on read"),
    };
    Err(Error::Encode {
        section: section.name.clone(),
        reason,
    })
}

/// Replace the existing file at `path` with the encoded `document`.
///
/// The text goes to a temporary file next to `path`, which is then renamed
/// over the target, so readers see either the old or the new content. The
/// target must already exist: configuration files are never created here.
/// A symlinked target is resolved first, so the link itself is kept and the
/// file it points to is replaced.
pub fn write_file(path: &Path, document: &Document) -> Result<()> {
    let target = fs::canonicalize(path).map_err(|e| Error::io("cannot replace", path, e))?;
    let metadata = fs::metadata(&target).map_err(|e| Error::io("cannot replace", path, e))?;
    let text = encode(document)?;

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = target
        .file_name()
        .map(|name| format!("{}.temp", name.to_string_lossy()))
        .unwrap_or_else(|| ".temp".to_string());

    let mut temp = Builder::new()
        .prefix(&prefix)
        .tempfile_in(dir)
        .map_err(|e| Error::io("failed to create temporary file in", dir, e))?;
    let temp_path = temp.path().to_path_buf();

    temp.write_all(text.as_bytes())
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| Error::io("failed to write", &temp_path, e))?;
    fs::set_permissions(&temp_path, metadata.permissions())
        .map_err(|e| Error::io("failed to set permissions on", &temp_path, e))?;

    temp.persist(&target)
        .map_err(|e| Error::io("failed to replace", path, e.error))?;

    debug!(
        path = %path.display(),
        sections = document.sections.len(),
        "wrote configuration file"
    );
    Ok(())
}
