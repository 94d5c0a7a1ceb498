use nom::{
    Parser,
    branch::alt,
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, opt},
    multi::separated_list0,
    sequence::delimited,
};

use crate::pitch::parse_signed;
use crate::{ParseError, Pitch, Scale};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedDegree {
    pub degree: i32,
    pub chromatic_shift: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Item {
    Degree(ParsedDegree),
    Rest,
}

/// A line of scale degrees such as `0 2 4+ _ -1`.
///
/// Items are whitespace separated. A degree may carry one `+` or `-` suffix to
/// shift it a semitone, `_` is a rest, and text between two `#` is ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phrase {
    items: Vec<Item>,
}

fn parse_degree(input: &str) -> nom::IResult<&str, Item> {
    let (rest, degree) = parse_signed(input)?;
    let degree = i32::try_from(degree).map_err(|_| {
        nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::TooLarge))
    })?;
    let (rest, chromatic_shift) =
        opt(alt((char('+').map(|_| 1i32), char('-').map(|_| -1i32)))).parse(rest)?;
    Ok((
        rest,
        Item::Degree(ParsedDegree {
            degree,
            chromatic_shift: chromatic_shift.unwrap_or(0),
        }),
    ))
}

fn parse_rest(input: &str) -> nom::IResult<&str, Item> {
    let (input, _) = char('_').parse(input)?;
    Ok((input, Item::Rest))
}

fn parse_item(input: &str) -> nom::IResult<&str, Item> {
    alt((parse_degree, parse_rest)).parse(input)
}

fn parse_items(input: &str) -> nom::IResult<&str, Vec<Item>> {
    delimited(
        multispace0,
        separated_list0(multispace1, parse_item),
        multispace0,
    )
    .parse(input)
}

// Comments are blanked rather than removed so error positions still line up.
fn blank_comments(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_comment = false;
    for c in s.chars() {
        if c == '#' {
            in_comment = !in_comment;
            result.push(' ');
        } else if in_comment {
            result.push(' ');
        } else {
            result.push(c);
        }
    }
    result
}

impl Phrase {
    pub fn parse(notation: &str) -> Result<Self, ParseError> {
        let input = blank_comments(notation);
        match all_consuming(parse_items).parse(&input) {
            Ok((_, items)) => Ok(Phrase { items }),
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(ParseError::Phrase {
                position: input.len() - e.input.len(),
                message: format!("unexpected input near {:?}", e.input.trim()),
            }),
            Err(nom::Err::Incomplete(_)) => Err(ParseError::Phrase {
                position: input.len(),
                message: "incomplete phrase".to_string(),
            }),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One entry per item, `None` for rests.
    pub fn render(&self, scale: &Scale, octave: i32) -> Vec<Option<Pitch>> {
        self.items
            .iter()
            .map(|item| match item {
                Item::Degree(d) => {
                    Some(scale.note(d.degree, octave).transpose(d.chromatic_shift as i64))
                }
                Item::Rest => None,
            })
            .collect()
    }
}
