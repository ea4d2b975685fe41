//! Operands of content stream operators.

use core::ops::Range;

use crate::reader::Reader;
use crate::trivia::is_regular_character;

mod name;
mod number;
mod string;

pub use name::Name;
pub use number::Number;
pub use string::{String, StringSyntax};

pub(crate) use string::write_literal;

/// A primitive object that can appear as an operand in a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Object<'a> {
    /// The `null` object.
    Null,
    /// A boolean object.
    Boolean(bool),
    /// A number object.
    Number(Number<'a>),
    /// A name object.
    Name(Name<'a>),
    /// A string object.
    String(String<'a>),
    /// An array object.
    Array(Array<'a>),
    /// A dictionary object.
    Dict(Dict<'a>),
}

/// An object together with the bytes it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand<'a> {
    pub(crate) object: Object<'a>,
    pub(crate) span: Range<usize>,
}

impl<'a> Operand<'a> {
    /// The object.
    pub fn object(&self) -> &Object<'a> {
        &self.object
    }

    /// The byte range of the object in the content stream.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

/// An array object.
#[derive(Debug, Clone, PartialEq)]
pub struct Array<'a> {
    items: Vec<Operand<'a>>,
}

impl<'a> Array<'a> {
    /// The elements of the array.
    pub fn items(&self) -> &[Operand<'a>] {
        &self.items
    }
}

/// An entry of a dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct DictEntry<'a> {
    pub(crate) key: Name<'a>,
    pub(crate) key_span: Range<usize>,
    pub(crate) value: Operand<'a>,
}

impl<'a> DictEntry<'a> {
    /// The key of the entry.
    pub fn key(&self) -> Name<'a> {
        self.key
    }

    /// The byte range of the key in the content stream.
    pub fn key_span(&self) -> Range<usize> {
        self.key_span.clone()
    }

    /// The value of the entry.
    pub fn value(&self) -> &Operand<'a> {
        &self.value
    }
}

/// A dictionary object.
///
/// Entries are kept in the order in which they were written, including
/// duplicate keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Dict<'a> {
    entries: Vec<DictEntry<'a>>,
}

impl<'a> Dict<'a> {
    pub(crate) fn new(entries: Vec<DictEntry<'a>>) -> Self {
        Self { entries }
    }

    /// The entries of the dictionary.
    pub fn entries(&self) -> &[DictEntry<'a>] {
        &self.entries
    }

    /// Get the value of the first entry with the given key.
    pub fn get(&self, key: &[u8]) -> Option<&Object<'a>> {
        self.entries
            .iter()
            .find(|e| e.key.matches(key))
            .map(|e| &e.value.object)
    }

    /// Get the value of the first entry matching any of the given keys.
    pub fn get_any(&self, keys: &[&[u8]]) -> Option<&Object<'a>> {
        keys.iter().find_map(|k| self.get(k))
    }
}

/// Why reading an object failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadFailure {
    Syntax,
    TooDeep,
}

/// The next token in a content stream: either an operand, or a bare keyword
/// (which is an operator, unless it is `true`, `false` or `null`).
#[derive(Debug)]
pub(crate) enum Token<'a> {
    Operand(Operand<'a>),
    Keyword(&'a [u8], Range<usize>),
}

/// Read the next token. The reader must not point to white space.
pub(crate) fn read_token<'a>(
    r: &mut Reader<'a>,
    depth: usize,
) -> Result<Token<'a>, ReadFailure> {
    let start = r.offset();

    let object = match r.peek_byte().ok_or(ReadFailure::Syntax)? {
        b'(' => string::parse_literal(r)
            .map(|raw| Object::String(String::new(raw, StringSyntax::Literal)))
            .ok_or(ReadFailure::Syntax)?,
        b'<' => {
            if r.peek_tag(b"<<").is_some() {
                Object::Dict(read_dict(r, depth)?)
            } else {
                string::parse_hex(r)
                    .map(|raw| Object::String(String::new(raw, StringSyntax::Hex)))
                    .ok_or(ReadFailure::Syntax)?
            }
        }
        b'[' => Object::Array(read_array(r, depth)?),
        b'/' => Object::Name(name::read(r).ok_or(ReadFailure::Syntax)?),
        b'.' | b'+' | b'-' | b'0'..=b'9' => {
            Object::Number(number::read(r).ok_or(ReadFailure::Syntax)?)
        }
        b if is_regular_character(b) => {
            r.forward_while(is_regular_character);
            let keyword = r.range(start..r.offset()).ok_or(ReadFailure::Syntax)?;

            match keyword {
                b"true" => Object::Boolean(true),
                b"false" => Object::Boolean(false),
                b"null" => Object::Null,
                _ => return Ok(Token::Keyword(keyword, start..r.offset())),
            }
        }
        _ => return Err(ReadFailure::Syntax),
    };

    Ok(Token::Operand(Operand {
        object,
        span: start..r.offset(),
    }))
}

/// Read an object that must be an operand, for example an array element.
pub(crate) fn read_operand<'a>(
    r: &mut Reader<'a>,
    depth: usize,
) -> Result<Operand<'a>, ReadFailure> {
    match read_token(r, depth)? {
        Token::Operand(o) => Ok(o),
        Token::Keyword(..) => Err(ReadFailure::Syntax),
    }
}

/// Read a name followed by an operand, the form of every dictionary entry.
pub(crate) fn read_entry<'a>(
    r: &mut Reader<'a>,
    depth: usize,
) -> Result<DictEntry<'a>, ReadFailure> {
    let key_start = r.offset();
    let key = name::read(r).ok_or(ReadFailure::Syntax)?;
    let key_span = key_start..r.offset();

    r.skip_white_spaces_and_comments();
    let value = read_operand(r, depth)?;

    Ok(DictEntry {
        key,
        key_span,
        value,
    })
}

fn read_array<'a>(r: &mut Reader<'a>, depth: usize) -> Result<Array<'a>, ReadFailure> {
    if depth == 0 {
        return Err(ReadFailure::TooDeep);
    }

    r.forward_tag(b"[").ok_or(ReadFailure::Syntax)?;
    let mut items = vec![];

    loop {
        r.skip_white_spaces_and_comments();

        match r.peek_byte().ok_or(ReadFailure::Syntax)? {
            b']' => {
                r.forward();
                return Ok(Array { items });
            }
            _ => items.push(read_operand(r, depth - 1)?),
        }
    }
}

fn read_dict<'a>(r: &mut Reader<'a>, depth: usize) -> Result<Dict<'a>, ReadFailure> {
    if depth == 0 {
        return Err(ReadFailure::TooDeep);
    }

    r.forward_tag(b"<<").ok_or(ReadFailure::Syntax)?;
    let mut entries = vec![];

    loop {
        r.skip_white_spaces_and_comments();

        if r.forward_tag(b">>").is_some() {
            return Ok(Dict::new(entries));
        }

        entries.push(read_entry(r, depth - 1)?);
    }
}
