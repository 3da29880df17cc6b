//! Provides logic for filtering flat file lists and locating search terms.

use super::FileEntry;
use std::ops::Range;

/// A utility struct for the flat (file list) filter mode.
///
/// This struct is stateless and provides methods as associated functions.
/// Hierarchical folder filtering lives in [`super::FolderTree`].
pub struct FilterEngine;

impl FilterEngine {
    /// Case-insensitive substring test. An empty term matches everything.
    pub fn is_visible(entry_name: &str, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        entry_name.to_lowercase().contains(&term.to_lowercase())
    }

    /// Keeps the entries whose own name matches `term`, in input order.
    ///
    /// Files have no hierarchy here: a match never reveals anything else.
    pub fn filter_entries<'a>(entries: &'a [FileEntry], term: &str) -> Vec<&'a FileEntry> {
        let term = term.to_lowercase();
        entries
            .iter()
            .filter(|entry| term.is_empty() || entry.name.to_lowercase().contains(&term))
            .collect()
    }

    /// Returns the byte ranges of every case-insensitive, non-overlapping
    /// occurrence of `term` in `text`. An empty term yields no ranges.
    pub fn find_matches(text: &str, term: &str) -> Vec<Range<usize>> {
        if term.is_empty() {
            return Vec::new();
        }

        let needle: Vec<char> = term.chars().flat_map(char::to_lowercase).collect();
        let mut ranges = Vec::new();
        let mut skip_until = 0;

        for (start, _) in text.char_indices() {
            if start < skip_until {
                continue;
            }
            if let Some(len) = Self::match_len_at(&text[start..], &needle) {
                ranges.push(start..start + len);
                skip_until = start + len;
            }
        }
        ranges
    }

    /// Byte length of the prefix of `haystack` that lowercases to `needle`.
    fn match_len_at(haystack: &str, needle: &[char]) -> Option<usize> {
        let mut matched = 0;
        for (offset, ch) in haystack.char_indices() {
            for lower in ch.to_lowercase() {
                if needle.get(matched) != Some(&lower) {
                    return None;
                }
                matched += 1;
            }
            if matched == needle.len() {
                return Some(offset + ch.len_utf8());
            }
        }
        None
    }
}
