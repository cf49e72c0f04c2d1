/// A cursor for hand-written matchers over a source slice.
///
/// Byte-level helpers are for ASCII delimiters; the `_char` variants keep the
/// index on UTF-8 boundaries when stepping over arbitrary text.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Creates a cursor positioned at byte `i`.
    pub fn at(s: &'a str, i: usize) -> Self {
        Self { s, i }
    }

    pub fn pos(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Peeks at the byte `n` positions ahead.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The unconsumed remainder.
    pub fn rest(&self) -> &'a str {
        self.s.get(self.i..).unwrap_or_default()
    }

    /// Checks if the remaining input starts with the given byte pattern.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s
            .as_bytes()
            .get(self.i..)
            .is_some_and(|rest| rest.starts_with(pat))
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Advances by `n` bytes.
    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Advances over one whole character.
    pub fn bump_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Advances while `pred` holds, returning how many bytes were consumed.
    pub fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.i += c.len_utf8();
        }
        self.i - start
    }

    /// Counts consecutive `b` bytes at the cursor without advancing.
    pub fn run_of(&self, b: u8) -> usize {
        self.s
            .as_bytes()
            .get(self.i..)
            .map_or(0, |rest| rest.iter().take_while(|&&x| x == b).count())
    }
}
