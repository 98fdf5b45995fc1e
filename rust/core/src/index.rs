// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line Indexer
//!
//! Splits raw text into lines and maps each entity id to its defining line.
//! Borrows from the input; nothing is copied.

use memchr::memmem;
use rustc_hash::FxHashMap;

use crate::parser::entity_header;

/// One indexed entity instance line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLine<'a> {
    pub id: u32,
    /// Entity type keyword as written (may be empty)
    pub keyword: &'a str,
    /// Trimmed line text
    pub raw: &'a str,
}

/// Entity index over one input text
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    content: &'a str,
    lines: Vec<&'a str>,
    entities: FxHashMap<u32, EntityLine<'a>>,
}

impl<'a> LineIndex<'a> {
    /// Build the index
    ///
    /// Only lines starting with `#<digits>` followed by optional whitespace
    /// and `=` are indexed. A later line with the same id replaces an
    /// earlier one.
    pub fn build(content: &'a str) -> Self {
        let lines = split_lines(content);

        // Roughly one entity per line in exchange files
        let mut entities =
            FxHashMap::with_capacity_and_hasher(lines.len(), Default::default());

        for &line in &lines {
            let raw = line.trim();
            if let Ok((_, (id, keyword))) = entity_header(raw) {
                entities.insert(id, EntityLine { id, keyword, raw });
            }
        }

        tracing::debug!(
            lines = lines.len(),
            entities = entities.len(),
            "built line index"
        );

        Self {
            content,
            lines,
            entities,
        }
    }

    /// Full input text
    #[inline]
    pub fn content(&self) -> &'a str {
        self.content
    }

    /// All raw lines, in order
    #[inline]
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&EntityLine<'a>> {
        self.entities.get(&id)
    }

    /// Defining line text of an entity
    #[inline]
    pub fn definition(&self, id: u32) -> Option<&'a str> {
        self.entities.get(&id).map(|entity| entity.raw)
    }

    /// Number of indexed entities
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// First raw line containing `token` as a substring
    pub fn first_line_containing(&self, token: &str) -> Option<&'a str> {
        let finder = memmem::Finder::new(token.as_bytes());
        self.lines
            .iter()
            .copied()
            .find(|line| finder.find(line.as_bytes()).is_some())
    }
}

/// Split on `\n`, `\r\n` and bare `\r`
///
/// A trailing line terminator does not produce an empty last line.
fn split_lines(content: &str) -> Vec<&str> {
    let bytes = content.as_bytes();
    let mut lines = Vec::with_capacity(bytes.len() / 40 + 1);
    let mut start = 0;

    for pos in memchr::memchr2_iter(b'\n', b'\r', bytes) {
        // Second half of a \r\n pair
        if bytes[pos] == b'\n' && pos > 0 && bytes[pos - 1] == b'\r' {
            start = pos + 1;
            continue;
        }
        lines.push(&content[start..pos]);
        start = pos + 1;
    }

    if start < content.len() {
        lines.push(&content[start..]);
    }

    lines
}
