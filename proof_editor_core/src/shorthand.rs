//! Shorthand expansion
//!
//! Replaces an ASCII token immediately before the cursor with the symbol it
//! stands for. When several tokens are suffixes of the text before the
//! cursor the longest one wins; among tokens of equal length the earlier
//! table entry wins.

use alloc::string::String;
use alloc::vec::Vec;

/// Built-in token table
pub const BUILTIN_SHORTHANDS: &[(&str, &str)] = &[
    ("\\lambda", "λ"),
    ("%", "λ"),
    ("\\forall", "∀"),
    ("!", "∀"),
    ("\\exists", "∃"),
    ("?", "∃"),
    ("\\and", "∧"),
    ("/\\", "∧"),
    ("\\or", "∨"),
    ("\\/", "∨"),
    ("\\not", "¬"),
    ("~", "¬"),
    ("~=", "≠"),
    ("-->", "⟶"),
    ("<-->", "⟷"),
    ("->", "→"),
    ("=>", "⇒"),
    ("<=", "≤"),
    (">=", "≥"),
    ("\\in", "∈"),
    ("\\notin", "∉"),
    ("\\subseteq", "⊆"),
    ("\\cup", "∪"),
    ("\\cap", "∩"),
    ("\\circ", "∘"),
    ("\\times", "×"),
    ("|-", "⊢"),
];

/// Ordered token table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShorthandTable {
    entries: Vec<(String, String)>,
}

/// A replacement to splice into a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// First replaced column
    pub start: usize,
    /// Column just past the replaced token (the cursor)
    pub end: usize,
    pub replacement: String,
    /// Cursor column after the splice
    pub cursor: usize,
}

impl Expansion {
    /// Apply the splice to the text it was computed from
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.replacement.len());
        out.extend(text.chars().take(self.start));
        out.push_str(&self.replacement);
        out.extend(text.chars().skip(self.end));
        out
    }
}

impl ShorthandTable {
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_SHORTHANDS.iter().copied())
    }

    /// Build a table keeping the given order. Empty tokens are dropped.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Find the token that ends `before`
    pub fn lookup_suffix(&self, before: &str) -> Option<(&str, &str)> {
        let mut best: Option<(&str, &str)> = None;
        for (token, symbol) in self.entries() {
            if !before.ends_with(token) {
                continue;
            }
            match best {
                Some((current, _)) if current.chars().count() >= token.chars().count() => {}
                _ => best = Some((token, symbol)),
            }
        }
        best
    }

    /// Compute the expansion for a cursor column in `text`
    pub fn expand(&self, text: &str, cursor: usize) -> Option<Expansion> {
        let before: String = text.chars().take(cursor).collect();
        if before.chars().count() < cursor {
            return None;
        }
        let (token, symbol) = self.lookup_suffix(&before)?;
        let start = cursor - token.chars().count();
        Some(Expansion {
            start,
            end: cursor,
            replacement: symbol.into(),
            cursor: start + symbol.chars().count(),
        })
    }

    /// Expansion for a free-text form field: a trigger at column 0 does
    /// nothing. Returns the new text and cursor.
    pub fn expand_field(&self, text: &str, cursor: usize) -> Option<(String, usize)> {
        if cursor == 0 {
            return None;
        }
        self.expand(text, cursor)
            .map(|expansion| (expansion.apply(text), expansion.cursor))
    }
}

impl Default for ShorthandTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrows() -> ShorthandTable {
        ShorthandTable::from_pairs([("->", "→"), ("=>", "⇒")])
    }

    #[test]
    fn test_expand_arrow_at_end() {
        let table = arrows();
        let expansion = table.expand("a->", 3).unwrap();
        assert_eq!(expansion.apply("a->"), "a→");
        assert_eq!(expansion.cursor, 2);
    }

    #[test]
    fn test_expand_mid_line_keeps_tail() {
        let table = arrows();
        let expansion = table.expand("p=> q", 3).unwrap();
        assert_eq!(expansion.apply("p=> q"), "p⇒ q");
        assert_eq!(expansion.cursor, 2);
    }

    #[test]
    fn test_no_match() {
        assert!(arrows().expand("abc", 3).is_none());
        assert!(arrows().expand("->", 1).is_none());
    }

    #[test]
    fn test_cursor_past_end() {
        assert!(arrows().expand("a->", 9).is_none());
    }

    #[test]
    fn test_longest_suffix_wins_regardless_of_order() {
        let table = ShorthandTable::from_pairs([("->", "→"), ("-->", "⟶")]);
        let expansion = table.expand("A-->", 4).unwrap();
        assert_eq!(expansion.apply("A-->"), "A⟶");

        let reversed = ShorthandTable::from_pairs([("-->", "⟶"), ("->", "→")]);
        assert_eq!(reversed.expand("A-->", 4).unwrap().apply("A-->"), "A⟶");
    }

    #[test]
    fn test_equal_length_prefers_table_order() {
        let table = ShorthandTable::from_pairs([("->", "first"), ("->", "second")]);
        assert_eq!(table.lookup_suffix("x->"), Some(("->", "first")));
    }

    #[test]
    fn test_expand_after_unicode() {
        let table = ShorthandTable::builtin();
        let text = "∀x. P x ->";
        let expansion = table.expand(text, text.chars().count()).unwrap();
        assert_eq!(expansion.apply(text), "∀x. P x →");
    }

    #[test]
    fn test_builtin_backslash_names() {
        let table = ShorthandTable::builtin();
        assert_eq!(table.lookup_suffix("x \\in"), Some(("\\in", "∈")));
        assert_eq!(table.lookup_suffix("x \\notin"), Some(("\\notin", "∉")));
    }

    #[test]
    fn test_field_ignores_cursor_zero() {
        let table = arrows();
        assert!(table.expand_field("->", 0).is_none());
        assert_eq!(table.expand_field("x->y", 3), Some(("x→y".into(), 2)));
    }

    #[test]
    fn test_empty_tokens_dropped() {
        let table = ShorthandTable::from_pairs([("", "x"), ("=>", "⇒")]);
        assert_eq!(table.len(), 1);
    }
}
