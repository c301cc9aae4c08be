// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Source document format. Immutable on `Book` once set; must match the
//! sniffed extension of the uploaded file (spec §3.1, §4.6).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookFormat {
    Pdf,
    Epub,
    Txt,
}

impl BookFormat {
    /// The file extension this format is accepted under (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            BookFormat::Pdf => "pdf",
            BookFormat::Epub => "epub",
            BookFormat::Txt => "txt",
        }
    }

    /// Parses the format from a lowercase extension string as submitted in
    /// the upload's `format` field.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Some(BookFormat::Pdf),
            "epub" => Some(BookFormat::Epub),
            "txt" => Some(BookFormat::Txt),
            _ => None,
        }
    }

    /// Sniffs the format from an uploaded file name's extension, for the
    /// "declared format must match sniffed extension" validation rule.
    pub fn sniff_from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit('.').next()?;
        Self::parse(ext)
    }
}

impl fmt::Display for BookFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_extensions_case_insensitively() {
        assert_eq!(BookFormat::parse("PDF"), Some(BookFormat::Pdf));
        assert_eq!(BookFormat::parse("epub"), Some(BookFormat::Epub));
        assert_eq!(BookFormat::parse("txt"), Some(BookFormat::Txt));
        assert_eq!(BookFormat::parse("mobi"), None);
    }

    #[test]
    fn sniffs_from_filename() {
        assert_eq!(BookFormat::sniff_from_filename("report.PDF"), Some(BookFormat::Pdf));
        assert_eq!(BookFormat::sniff_from_filename("noext"), None);
    }

    #[test]
    fn round_trips_through_json_as_lowercase() {
        let json = serde_json::to_string(&BookFormat::Epub).unwrap();
        assert_eq!(json, "\"epub\"");
    }
}
