// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP entity-line recognizers using nom
//!
//! Each recognizer accepts exactly one single-line entity form. Line-anchored
//! forms (DIRECTION, AXIS2_PLACEMENT_3D, PLANE, DATUM, strict SHAPE_ASPECT)
//! allow no whitespace around tokens. The tolerance head and the tagged
//! SHAPE_ASPECT form are matched anywhere in the text via [`find_all`].

use nom::{
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, satisfy},
    combinator::{map, map_res, recognize},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::schema::ToleranceKind;

/// Skip whitespace (including line breaks)
fn ws(input: &str) -> IResult<&str, ()> {
    map(take_while(|c: char| c.is_whitespace()), |_| ())(input)
}

/// Parse entity id: #123
fn entity_id(input: &str) -> IResult<&str, u32> {
    preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>()))(input)
}

/// Parse entity id and keep the matched token text: "#123"
fn entity_id_token(input: &str) -> IResult<&str, (&str, u32)> {
    let (rest, token) = recognize(pair(char('#'), digit1))(input)?;
    let id = token[1..]
        .parse::<u32>()
        .map_err(|_| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit)))?;
    Ok((rest, (token, id)))
}

/// Parse single-quoted label without escape handling: 'text'
fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_while(|c: char| c != '\''), char('\''))(input)
}

/// Entity type keyword: letters, digits and underscores (may be empty)
fn keyword(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

/// Parse entity header at line start: `#12 = KEYWORD`
///
/// Returns the entity id and the (possibly empty) keyword.
pub fn entity_header(input: &str) -> IResult<&str, (u32, &str)> {
    pair(
        terminated(entity_id, pair(ws, char('='))),
        preceded(ws, keyword),
    )(input)
}

/// `#7=DIRECTION('label',(0.,0.,1.));`
///
/// Returns the id and the raw component list text between the parentheses.
pub fn direction(input: &str) -> IResult<&str, (u32, &str)> {
    let (rest, id) = entity_id(input)?;
    let (rest, _) = tag("=DIRECTION(")(rest)?;
    let (rest, _) = terminated(quoted, char(','))(rest)?;
    let (rest, components) =
        delimited(char('('), take_while(|c: char| c != ')'), tag("));"))(rest)?;
    Ok((rest, (id, components)))
}

/// `#8=AXIS2_PLACEMENT_3D('label',#point,#axis,#ref);`
///
/// Returns (id, axis direction id, reference direction id). The location
/// point is parsed and discarded.
pub fn axis2_placement_3d(input: &str) -> IResult<&str, (u32, u32, u32)> {
    let (rest, id) = entity_id(input)?;
    let (rest, _) = tag("=AXIS2_PLACEMENT_3D(")(rest)?;
    let (rest, _) = terminated(quoted, char(','))(rest)?;
    let (rest, (_point, _, axis, _, ref_dir)) =
        tuple((entity_id, char(','), entity_id, char(','), entity_id))(rest)?;
    let (rest, _) = tag(");")(rest)?;
    Ok((rest, (id, axis, ref_dir)))
}

/// `#9=PLANE('label',#axis);`
pub fn plane(input: &str) -> IResult<&str, (u32, u32)> {
    let (rest, id) = entity_id(input)?;
    let (rest, _) = tag("=PLANE(")(rest)?;
    let (rest, _) = terminated(quoted, char(','))(rest)?;
    let (rest, axis) = terminated(entity_id, tag(");"))(rest)?;
    Ok((rest, (id, axis)))
}

/// `#1=DATUM('feature',$,#2,.F.,'A');`
///
/// Returns the feature name and the datum letter.
pub fn datum(input: &str) -> IResult<&str, (&str, char)> {
    let (rest, _) = entity_id(input)?;
    let (rest, _) = tag("=DATUM(")(rest)?;
    let (rest, feature) = terminated(quoted, tag(",$,"))(rest)?;
    let (rest, _) = terminated(entity_id, tag(",.F.,"))(rest)?;
    let (rest, letter) = delimited(
        char('\''),
        satisfy(|c: char| c.is_ascii_uppercase()),
        tag("');"),
    )(rest)?;
    Ok((rest, (feature, letter)))
}

/// `#2=SHAPE_ASPECT('name','',#3,.T.);`
///
/// Returns the shape aspect's own id and its name.
pub fn shape_aspect(input: &str) -> IResult<&str, (u32, &str)> {
    let (rest, id) = entity_id(input)?;
    let (rest, _) = tag("=SHAPE_ASPECT(")(rest)?;
    let (rest, name) = terminated(quoted, tag(",'',"))(rest)?;
    let (rest, _) = terminated(entity_id, tag(",.T.);"))(rest)?;
    Ok((rest, (id, name)))
}

/// Shape aspect whose label ends in an open datum suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedShapeAspect<'a> {
    /// Label text before the suffix's opening parenthesis
    pub name: &'a str,
    /// Optional single word character after the parenthesis
    pub letter: Option<char>,
    /// First `#n)` reference after the label, on the same line
    pub face_id: u32,
}

/// Leftmost `(` in the label followed by an optional word character, an
/// optional closing quote and a comma
///
/// `input` starts right after the label's opening quote. Returns the name,
/// the letter and the text after the comma.
fn datum_suffix(input: &str) -> Option<(&str, Option<char>, &str)> {
    let label_end = memchr::memchr(b'\'', input.as_bytes()).unwrap_or(input.len());
    input[..label_end].match_indices('(').find_map(|(open, _)| {
        let after = &input[open + 1..];
        let (letter, after) = match after.chars().next() {
            Some(c) if c.is_alphanumeric() || c == '_' => (Some(c), &after[c.len_utf8()..]),
            _ => (None, after),
        };
        let after = after.strip_prefix('\'').unwrap_or(after);
        let rest = after.strip_prefix(',')?;
        Some((&input[..open], letter, rest))
    })
}

/// First `#<digits>)` before the next line break
fn closing_ref(input: &str) -> IResult<&str, u32> {
    let line_end = memchr::memchr(b'\n', input.as_bytes()).unwrap_or(input.len());
    memchr::memchr_iter(b'#', &input.as_bytes()[..line_end])
        .find_map(|pos| terminated(entity_id, char(')'))(&input[pos..]).ok())
        .ok_or_else(|| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char)))
}

/// `#5 = SHAPE_ASPECT('Side(B','',#6);`
///
/// The label must end right after the suffix, so `'Side(B)'` is not this
/// form. The match ends at the face reference's closing parenthesis.
pub fn tagged_shape_aspect(input: &str) -> IResult<&str, TaggedShapeAspect<'_>> {
    let (rest, _) = entity_id(input)?;
    let (rest, _) = tuple((ws, char('='), ws, tag("SHAPE_ASPECT('")))(rest)?;
    let (name, letter, rest) = datum_suffix(rest)
        .ok_or_else(|| nom::Err::Error(nom::error::Error::new(rest, nom::error::ErrorKind::Verify)))?;
    let (rest, face_id) = closing_ref(rest)?;
    Ok((
        rest,
        TaggedShapeAspect {
            name,
            letter,
            face_id,
        },
    ))
}

/// Head of a tolerance entity: id, kind, name and value reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToleranceHead<'a> {
    /// Entity id token as written in the source, e.g. `#10`
    pub id_token: &'a str,
    /// Entity id
    pub id: u32,
    /// Tolerance characteristic
    pub kind: ToleranceKind,
    /// Quoted tolerance label
    pub name: &'a str,
    /// Reference to the value entity
    pub value_ref: u32,
}

/// `KIND_TOLERANCE(` with a recognized kind, case-insensitive
fn tolerance_keyword(input: &str) -> IResult<&str, ToleranceKind> {
    const SUFFIX: &str = "_TOLERANCE";
    let (rest, word) = take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)?;
    let kind = match word.len().checked_sub(SUFFIX.len()) {
        Some(split) if word[split..].eq_ignore_ascii_case(SUFFIX) => {
            ToleranceKind::from_keyword(&word[..split])
        }
        _ => None,
    };
    let kind = kind
        .ok_or_else(|| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)))?;
    let (rest, _) = char('(')(rest)?;
    Ok((rest, kind))
}

/// `#10 = FLATNESS_TOLERANCE('name', '', #20, ...`
///
/// Whitespace is allowed between tokens and may span lines.
pub fn tolerance_head(input: &str) -> IResult<&str, ToleranceHead<'_>> {
    let (rest, (id_token, id)) = entity_id_token(input)?;
    let (rest, kind) = preceded(tuple((ws, char('='), ws)), tolerance_keyword)(rest)?;
    let (rest, name) = preceded(ws, quoted)(rest)?;
    let (rest, _) = tuple((ws, char(','), ws, tag("''"), ws, char(','), ws))(rest)?;
    let (rest, value_ref) = entity_id(rest)?;
    Ok((
        rest,
        ToleranceHead {
            id_token,
            id,
            kind,
            name,
            value_ref,
        },
    ))
}

/// Nested measure call: `LENGTH_MEASURE( 0.05` → "0.05"
///
/// The tag is matched exactly; the number is a run of digits and dots.
pub fn measure_number<'a>(
    tag_name: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        preceded(
            tuple((tag(tag_name), ws, char('('), ws)),
            take_while1(|c: char| c.is_ascii_digit() || c == '.'),
        )(input)
    }
}

/// Find all non-overlapping matches of `parser` that start at a `#`
///
/// Scanning resumes after the end of each match, like a regex `finditer`.
pub fn find_all<'a, O>(
    text: &'a str,
    mut parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> Vec<O> {
    let bytes = text.as_bytes();
    let mut results = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let offset = match memchr::memchr(b'#', &bytes[pos..]) {
            Some(offset) => offset,
            None => break,
        };
        let start = pos + offset;
        match parser(&text[start..]) {
            Ok((rest, value)) => {
                results.push(value);
                let end = text.len() - rest.len();
                pos = if end > start { end } else { start + 1 };
            }
            Err(_) => pos = start + 1,
        }
    }

    results
}
