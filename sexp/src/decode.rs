use alloc::{vec, vec::Vec};
use core::ops::Range;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Not enough data for encoded value")]
    NotEnoughData,

    #[error("Invalid length prefix")]
    InvalidLength,

    #[error("Unterminated display hint")]
    UnterminatedDisplay,

    #[error("Unterminated list")]
    UnterminatedList,

    #[error("Unbalanced ')'")]
    UnbalancedParens,

    #[error("Incorrect type")]
    IncorrectType,

    #[error("No candidate name matches")]
    NoMatch,

    #[error("Integer atom longer than 4 bytes")]
    IntegerTooLong,

    #[error("Integer atom is not a minimal big-endian encoding")]
    NonCanonicalInteger,

    #[error("Not inside a list")]
    NotInList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Atom,
    List,
    End,
}

/// A cursor over a canonically encoded buffer.
///
/// The cursor borrows the buffer and never copies atom data out of it; every
/// accessor hands back a sub-slice. After any operation returns an error the
/// cursor state is unspecified and the cursor must be discarded.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    data: &'a [u8],

    /* Offset of the start of the current sub-expression */
    start: usize,
    /* For an atom, the offset of its end. For a list, the offset of its
     * first element */
    pos: usize,
    level: usize,

    kind: Kind,
    display: Option<Range<usize>>,
    atom: Range<usize>,
}

impl<'a> Cursor<'a> {
    /// Positions a new cursor at the first top-level expression of `data`.
    pub fn first(data: &'a [u8]) -> Result<Self, Error> {
        if data.is_empty() {
            return Err(Error::NotEnoughData);
        }
        let mut cursor = Self {
            data,
            start: 0,
            pos: 0,
            level: 0,
            kind: Kind::End,
            display: None,
            atom: 0..0,
        };
        cursor.parse()?;
        Ok(cursor)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// The current atom's data.
    pub fn atom(&self) -> Result<&'a [u8], Error> {
        if self.kind != Kind::Atom {
            return Err(Error::IncorrectType);
        }
        Ok(&self.data[self.atom.clone()])
    }

    /// The current atom's display hint, if it carries one.
    pub fn display(&self) -> Option<&'a [u8]> {
        if self.kind != Kind::Atom {
            return None;
        }
        self.display.clone().map(|r| &self.data[r])
    }

    fn parse_length(&mut self) -> Result<usize, Error> {
        let mut len = match self.data.get(self.pos) {
            Some(&c) if c.is_ascii_digit() => (c - b'0') as usize,
            Some(_) => return Err(Error::InvalidLength),
            None => return Err(Error::NotEnoughData),
        };
        self.pos += 1;
        if len == 0 {
            // A lone 0 digit; "01" and friends fail the ':' check that follows
            return Ok(0);
        }
        while let Some(&c) = self.data.get(self.pos) {
            if !c.is_ascii_digit() {
                break;
            }
            len = len
                .checked_mul(10)
                .and_then(|len| len.checked_add((c - b'0') as usize))
                .ok_or(Error::InvalidLength)?;
            self.pos += 1;
        }
        Ok(len)
    }

    fn parse_string(&mut self) -> Result<Range<usize>, Error> {
        let len = self.parse_length()?;
        match self.data.get(self.pos) {
            Some(b':') => self.pos += 1,
            Some(_) => return Err(Error::InvalidLength),
            None => return Err(Error::NotEnoughData),
        }
        let start = self.pos;
        let end = start.checked_add(len).ok_or(Error::InvalidLength)?;
        if end > self.data.len() {
            return Err(Error::NotEnoughData);
        }
        self.pos = end;
        Ok(start..end)
    }

    /// Decodes the header of the expression at `pos`.
    fn parse(&mut self) -> Result<(), Error> {
        self.start = self.pos;
        self.display = None;
        self.atom = 0..0;
        let Some(&c) = self.data.get(self.pos) else {
            if self.level > 0 {
                return Err(Error::UnterminatedList);
            }
            self.kind = Kind::End;
            return Ok(());
        };
        match c {
            b'(' => {
                self.pos += 1;
                self.kind = Kind::List;
            }
            b')' => {
                if self.level == 0 {
                    return Err(Error::UnbalancedParens);
                }
                self.pos += 1;
                self.kind = Kind::End;
            }
            b'[' => {
                self.pos += 1;
                let display = self.parse_string()?;
                match self.data.get(self.pos) {
                    Some(b']') => self.pos += 1,
                    Some(_) => return Err(Error::UnterminatedDisplay),
                    None => return Err(Error::NotEnoughData),
                }
                self.atom = self.parse_string()?;
                self.display = Some(display);
                self.kind = Kind::Atom;
            }
            _ => {
                self.atom = self.parse_string()?;
                self.kind = Kind::Atom;
            }
        }
        Ok(())
    }

    /* Walks forward until the nesting level drops back to `target`, then
     * decodes the following expression. Iterative: input nesting depth
     * never becomes stack depth. */
    fn skip_to(&mut self, target: usize) -> Result<(), Error> {
        while self.level > target {
            match self.kind {
                Kind::End => self.level -= 1,
                Kind::List => self.level += 1,
                Kind::Atom => {}
            }
            self.parse()?;
        }
        Ok(())
    }

    /// Advances to the next sibling expression at the current level.
    ///
    /// Once the current level is exhausted the kind becomes [`Kind::End`];
    /// advancing past the end is a no-op.
    pub fn next(&mut self) -> Result<(), Error> {
        match self.kind {
            Kind::End => Ok(()),
            Kind::Atom => self.parse(),
            Kind::List => {
                let target = self.level;
                self.level += 1;
                self.parse()?;
                self.skip_to(target)
            }
        }
    }

    /// Moves to the first element of the current list, or to [`Kind::End`]
    /// if the list is empty.
    pub fn enter_list(&mut self) -> Result<(), Error> {
        if self.kind != Kind::List {
            return Err(Error::IncorrectType);
        }
        self.level += 1;
        self.parse()
    }

    /// Skips any remaining elements of the current list and moves to the
    /// expression following it.
    pub fn exit_list(&mut self) -> Result<(), Error> {
        let Some(target) = self.level.checked_sub(1) else {
            return Err(Error::NotInList);
        };
        self.skip_to(target)
    }

    /// The raw encoded bytes of the entire current sub-expression, headers
    /// and parentheses included. Implies [`Cursor::next`].
    pub fn subexpr(&mut self) -> Result<&'a [u8], Error> {
        if self.kind == Kind::End {
            return Err(Error::IncorrectType);
        }
        let start = self.start;
        self.next()?;
        Ok(&self.data[start..self.start])
    }

    /// Reads the current atom as an unsigned big-endian integer.
    ///
    /// The atom must be a minimal unsigned encoding: at most 4 bytes, no
    /// leading zero byte unless it is the single byte `0`, no display hint.
    /// The empty atom is 0. Implies [`Cursor::next`].
    pub fn get_u32(&mut self) -> Result<u32, Error> {
        if self.kind != Kind::Atom || self.display.is_some() {
            return Err(Error::IncorrectType);
        }
        let bytes = &self.data[self.atom.clone()];
        if bytes.len() > 4 {
            return Err(Error::IntegerTooLong);
        }
        if bytes.len() > 1 && bytes[0] == 0 {
            return Err(Error::NonCanonicalInteger);
        }
        let mut x = 0u32;
        for &b in bytes {
            x = (x << 8) | b as u32;
        }
        self.next()?;
        Ok(x)
    }

    /// Checks that the current expression is `(type_name ...)`, consuming
    /// `(type_name ` and leaving the cursor at the first remaining field.
    pub fn check_type(&mut self, type_name: &[u8]) -> Result<(), Error> {
        self.check_types(&[type_name]).map(|_| ())
    }

    /// As [`Cursor::check_type`], against a set of candidate names. Returns
    /// the index of the candidate that matched.
    pub fn check_types(&mut self, type_names: &[&[u8]]) -> Result<usize, Error> {
        self.enter_list()?;
        if self.kind != Kind::Atom || self.display.is_some() {
            return Err(Error::IncorrectType);
        }
        let head = &self.data[self.atom.clone()];
        let idx = type_names
            .iter()
            .position(|t| *t == head)
            .ok_or(Error::NoMatch)?;
        self.next()?;
        Ok(idx)
    }

    /// Looks up `(key rest...)` children of the current list.
    ///
    /// Returns one slot per key, holding a cursor positioned at the start of
    /// the matching child's rest, or `None` for a key that never occurs. A
    /// duplicated key keeps its first occurrence. On return this cursor has
    /// exited the list.
    pub fn assoc(&mut self, keys: &[&[u8]]) -> Result<Vec<Option<Cursor<'a>>>, Error> {
        self.enter_list()?;
        let mut values = vec![None; keys.len()];
        while self.kind != Kind::End {
            self.enter_list()?;
            if self.kind != Kind::Atom || self.display.is_some() {
                return Err(Error::IncorrectType);
            }
            let key = &self.data[self.atom.clone()];
            let idx = keys.iter().position(|k| *k == key);
            self.next()?;
            if let Some(idx) = idx
                && values[idx].is_none()
            {
                values[idx] = Some(self.clone());
            }
            self.exit_list()?;
        }
        self.exit_list()?;
        Ok(values)
    }
}
