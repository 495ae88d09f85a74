//! Tokens, token-type sets and grammar vocabularies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric token type as assigned by a grammar.
///
/// Types start at 1. [`EOF`] is `-1`.
pub type TokenType = i32;

/// Token type of the synthetic end-of-file token.
pub const EOF: TokenType = -1;

/// A lexed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    pub text: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// 0-based column (in chars) of the first character.
    pub column: usize,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub stop: usize,
    /// Position of this token in its token stream.
    pub index: usize,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        self.token_type == EOF
    }

    /// The token text as it appears inside diagnostics: quoted, with control
    /// characters escaped, and `<EOF>` for end of input.
    pub fn error_display(&self) -> String {
        if self.is_eof() {
            return "'<EOF>'".to_string();
        }
        let mut display = String::with_capacity(self.text.len() + 2);
        display.push('\'');
        for ch in self.text.chars() {
            match ch {
                '\n' => display.push_str("\\n"),
                '\r' => display.push_str("\\r"),
                '\t' => display.push_str("\\t"),
                other => display.push(other),
            }
        }
        display.push('\'');
        display
    }
}

/// A set of token types, [`EOF`] included.
///
/// Backed by a bit vector that grows to fit the largest type inserted, so a
/// grammar may use any number of token types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TokenSet {
    // The last word, if any, is never zero.
    words: Vec<u64>,
}

const WORD_BITS: usize = u64::BITS as usize;

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet { words: Vec::new() };

    pub fn of(types: &[TokenType]) -> TokenSet {
        types.iter().copied().collect()
    }

    /// EOF occupies bit 0, type t occupies bit t + 1. Types below EOF have no bit.
    fn bit(token_type: TokenType) -> Option<usize> {
        usize::try_from(token_type.checked_add(1)?).ok()
    }

    /// Adds `token_type`; types below [`EOF`] are ignored.
    pub fn insert(&mut self, token_type: TokenType) {
        let Some(bit) = Self::bit(token_type) else {
            return;
        };
        let word = bit / WORD_BITS;
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (bit % WORD_BITS);
    }

    pub fn contains(&self, token_type: TokenType) -> bool {
        Self::bit(token_type)
            .and_then(|bit| self.words.get(bit / WORD_BITS).map(|word| (bit, *word)))
            .is_some_and(|(bit, word)| word & (1u64 << (bit % WORD_BITS)) != 0)
    }

    #[must_use]
    pub fn union(&self, other: &TokenSet) -> TokenSet {
        let (longer, shorter) = if self.words.len() >= other.words.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut words = longer.words.clone();
        for (word, extra) in words.iter_mut().zip(&shorter.words) {
            *word |= extra;
        }
        TokenSet { words }
    }

    #[must_use]
    pub fn with(mut self, token_type: TokenType) -> TokenSet {
        self.insert(token_type);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Token types in ascending order, [`EOF`] first.
    pub fn iter(&self) -> impl Iterator<Item = TokenType> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &word)| {
            (0..WORD_BITS)
                .filter(move |&bit| word & (1u64 << bit) != 0)
                .filter_map(move |bit| TokenType::try_from(index * WORD_BITS + bit).ok())
                .map(|bit| bit - 1)
        })
    }

    /// Renders the set the way diagnostics print an expectation: a single
    /// element bare, several elements braced.
    pub fn display(&self, vocabulary: &Vocabulary) -> String {
        let names: Vec<String> = self.iter().map(|t| vocabulary.display_name(t)).collect();
        match names.as_slice() {
            [] => "{}".to_string(),
            [single] => single.clone(),
            _ => format!("{{{}}}", names.join(", ")),
        }
    }
}

impl FromIterator<TokenType> for TokenSet {
    fn from_iter<I: IntoIterator<Item = TokenType>>(iter: I) -> Self {
        let mut set = TokenSet::EMPTY;
        for token_type in iter {
            set.insert(token_type);
        }
        set
    }
}

/// Maps token types to the names a grammar gives them.
///
/// Both tables are indexed by token type; index 0 is unused.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    literal_names: &'static [Option<&'static str>],
    symbolic_names: &'static [Option<&'static str>],
}

impl Vocabulary {
    pub const fn new(
        literal_names: &'static [Option<&'static str>],
        symbolic_names: &'static [Option<&'static str>],
    ) -> Self {
        Self {
            literal_names,
            symbolic_names,
        }
    }

    fn lookup(table: &'static [Option<&'static str>], token_type: TokenType) -> Option<&'static str> {
        let index = usize::try_from(token_type).ok()?;
        table.get(index).copied().flatten()
    }

    /// The symbolic name (`NUMBER`, `PLUS`) of a token type.
    pub fn symbolic_name(&self, token_type: TokenType) -> Option<&'static str> {
        if token_type == EOF {
            return Some("EOF");
        }
        Self::lookup(self.symbolic_names, token_type)
    }

    /// The literal spelling (`'+'`) of a token type, if it has a fixed one.
    pub fn literal_name(&self, token_type: TokenType) -> Option<&'static str> {
        Self::lookup(self.literal_names, token_type)
    }

    /// Name used when a token type appears in a diagnostic.
    pub fn display_name(&self, token_type: TokenType) -> String {
        if token_type == EOF {
            return "<EOF>".to_string();
        }
        self.literal_name(token_type)
            .or_else(|| self.symbolic_name(token_type))
            .map_or_else(|| token_type.to_string(), str::to_string)
    }

    pub fn max_token_type(&self) -> TokenType {
        let len = self.symbolic_names.len().max(self.literal_names.len());
        TokenType::try_from(len).unwrap_or(TokenType::MAX) - 1
    }
}

impl fmt::Display for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<String> = self.iter().map(|t| t.to_string()).collect();
        write!(f, "{{{}}}", types.join(", "))
    }
}
