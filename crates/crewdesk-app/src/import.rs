// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Delimited text (CSV or TSV, header row first) into record drafts.
//!
//! There is no quoting: a value containing the delimiter splits into two
//! fields. Rows shorter than the header leave their trailing fields absent;
//! extra trailing fields are dropped. Neither case is an error.

use csv::{ReaderBuilder, Trim};
use std::collections::BTreeMap;

use crate::LeadDraft;

pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
}

impl Delimiter {
    /// Whichever of tab or comma appears first in the header line wins;
    /// comma when neither does.
    pub fn detect(text: &str) -> Self {
        let header = header_onward(text).lines().next().unwrap_or_default();
        match (header.find('\t'), header.find(',')) {
            (Some(tab), Some(comma)) if tab < comma => Self::Tab,
            (Some(_), None) => Self::Tab,
            _ => Self::Comma,
        }
    }

    pub const fn byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Tab => b'\t',
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Comma => "csv",
            Self::Tab => "tsv",
        }
    }
}

/// One parsed row keyed by header name. Absent keys mean the row ran short.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftRecord {
    values: BTreeMap<String, String>,
}

impl DraftRecord {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.values.get(header).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedImport {
    pub delimiter: Delimiter,
    pub headers: Vec<String>,
    pub drafts: Vec<DraftRecord>,
    pub short_rows: usize,
    pub long_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportPreview<'a> {
    pub rows: &'a [DraftRecord],
    pub remaining: usize,
}

impl ParsedImport {
    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn preview(&self) -> ImportPreview<'_> {
        let shown = self.drafts.len().min(PREVIEW_ROWS);
        ImportPreview {
            rows: &self.drafts[..shown],
            remaining: self.drafts.len() - shown,
        }
    }

    /// Every parsed row, not just the preview slice.
    pub fn lead_drafts(&self) -> Vec<LeadDraft> {
        self.drafts.iter().map(LeadDraft::from).collect()
    }

    pub fn summary(&self) -> String {
        let mut message = format!(
            "{} {} parsed ({})",
            self.drafts.len(),
            if self.drafts.len() == 1 { "row" } else { "rows" },
            self.delimiter.label()
        );
        if self.short_rows > 0 {
            message.push_str(&format!(", {} padded", self.short_rows));
        }
        if self.long_rows > 0 {
            message.push_str(&format!(", {} truncated", self.long_rows));
        }
        message
    }
}

/// The text from the first non-blank line on. Blank lines above the header
/// would otherwise be read as the header row.
fn header_onward(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            return &text[offset..];
        }
        offset += line.len();
    }
    ""
}

pub fn parse_delimited(text: &str) -> ParsedImport {
    let text = header_onward(text);
    let delimiter = Delimiter::detect(text);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter.byte())
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut parsed = ParsedImport {
        delimiter,
        ..ParsedImport::default()
    };
    let Ok(headers) = reader.headers() else {
        return parsed;
    };
    parsed.headers = headers.iter().map(str::to_owned).collect();
    if parsed.headers.iter().all(String::is_empty) {
        parsed.headers.clear();
        return parsed;
    }

    for result in reader.records() {
        let Ok(record) = result else {
            continue;
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() < parsed.headers.len() {
            parsed.short_rows += 1;
        } else if record.len() > parsed.headers.len() {
            parsed.long_rows += 1;
        }

        let mut values = BTreeMap::new();
        for (header, value) in parsed.headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            values
                .entry(header.clone())
                .or_insert_with(|| value.to_owned());
        }
        parsed.drafts.push(DraftRecord { values });
    }
    parsed
}

/// `Service Type`, `service_type` and `serviceType` all normalize to
/// `servicetype`.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl From<&DraftRecord> for LeadDraft {
    fn from(record: &DraftRecord) -> Self {
        let mut draft = LeadDraft::default();
        for (header, value) in record.iter() {
            let value = value.to_owned();
            match normalize_header(header).as_str() {
                "name" | "fullname" => draft.name = value,
                "email" | "emailaddress" => draft.email = value,
                "phone" | "phonenumber" => draft.phone = value,
                "servicetype" | "service" => draft.service_type = value,
                "address" => draft.address = value,
                "propertysize" | "size" => draft.property_size = value,
                "notes" => draft.notes = value,
                "status" => draft.status = Some(value),
                "date" => draft.date = Some(value),
                _ => {}
            }
        }
        draft
    }
}
