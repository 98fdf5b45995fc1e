// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fast Direct Parsing Module
//!
//! Byte-level helpers that bypass the nom recognizers: entity reference
//! scanning, nested measure lookup and float parsing.

use memchr::memmem;
use smallvec::SmallVec;

use crate::parser::measure_number;

/// Entity references found on one line (most lines carry few)
pub type EntityRefs = SmallVec<[u32; 8]>;

/// Value entity calls whose first numeric argument is a nominal value
pub const MEASURE_TAGS: [&str; 2] = ["LENGTH_MEASURE", "VALUE_REPRESENTATION_ITEM"];

/// Collect every `#<digits>` reference in `text`, in order
///
/// References whose digits overflow `u32` are skipped.
#[inline]
pub fn entity_refs(text: &str) -> EntityRefs {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut refs = EntityRefs::new();

    for hash in memchr::memchr_iter(b'#', bytes) {
        let start = hash + 1;
        let mut end = start;
        while end < len && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > start {
            if let Some(id) = parse_u32_checked(&bytes[start..end]) {
                refs.push(id);
            }
        }
    }

    refs
}

/// u32 parsing from ASCII digits without allocation
#[inline]
fn parse_u32_checked(digits: &[u8]) -> Option<u32> {
    digits.iter().try_fold(0u32, |acc, &b| {
        acc.checked_mul(10)?.checked_add((b - b'0') as u32)
    })
}

/// Find the leftmost nested measure call and return its number text
///
/// Looks for any of `tags` followed by optional whitespace, `(`, optional
/// whitespace and a run of digits and dots. Among all tags the match that
/// starts earliest in `definition` wins.
pub fn find_measure_text<'a>(definition: &'a str, tags: &[&'static str]) -> Option<&'a str> {
    let mut best: Option<(usize, &'a str)> = None;

    for &tag_name in tags {
        let mut parse = measure_number(tag_name);
        for pos in memmem::find_iter(definition.as_bytes(), tag_name.as_bytes()) {
            if best.map_or(false, |(best_pos, _)| best_pos <= pos) {
                break;
            }
            if let Ok((_, number)) = parse(&definition[pos..]) {
                best = Some((pos, number));
                break;
            }
        }
    }

    best.map(|(_, number)| number)
}

/// Parse a float from text, tolerating surrounding whitespace
///
/// Trailing characters make the whole value invalid.
#[inline]
pub fn parse_float(text: &str) -> Option<f64> {
    fast_float::parse::<f64, _>(text.trim()).ok()
}

/// Parse a comma-separated component list with exactly three floats
pub fn parse_vector3(components: &str) -> Option<[f64; 3]> {
    let mut parts = components.split(',');
    let x = parse_float(parts.next()?)?;
    let y = parse_float(parts.next()?)?;
    let z = parse_float(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some([x, y, z])
}
