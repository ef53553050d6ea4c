// The `Tag` value type.
//
// A tag is an ordered sequence of words that classifies a line of generated
// LilyPond text (or an annotation that will become one). On the page it is
// written as the words joined by `:` after a `%! ` comment marker, for
// example `%! +SCORE:EXPLICIT_CLEF:MEASURE_12`.
//
// Tags are immutable: `append`, `prepend` and `extend` return new tags. Word
// validation runs on every construction path, so a `Tag` in hand is always
// well formed. Duplicate words are allowed and order is preserved exactly,
// because the text form must round-trip byte for byte.
//
// See also: `library.rs` for the reserved word families, `predicates.rs` for
// the selectors built on top of `contains`.

use crate::error::TagError;
use crate::library::MEASURE_PREFIX;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Joins words in the text form of a tag. Never valid inside a word.
pub const SEPARATOR: char = ':';

/// An ordered, validated sequence of tag words.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    words: Vec<String>,
}

/// Check one word against the tag invariants.
pub fn validate_word(word: &str) -> Result<(), TagError> {
    if word.is_empty() {
        return Err(TagError::EmptyWord);
    }
    if word.contains(SEPARATOR) {
        return Err(TagError::ContainsSeparator {
            word: word.to_string(),
            separator: SEPARATOR,
        });
    }
    if word.chars().any(char::is_whitespace) {
        return Err(TagError::ContainsWhitespace {
            word: word.to_string(),
        });
    }
    Ok(())
}

impl Tag {
    /// The tag with no words.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a tag from words, validating each one.
    pub fn new<I, S>(words: I) -> Result<Self, TagError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        for word in &words {
            validate_word(word)?;
        }
        Ok(Self { words })
    }

    /// Parse the text form (`A:B:C`). The empty string is the empty tag; any
    /// other input with an empty segment (`A::B`, `A:`) is rejected.
    pub fn parse(text: &str) -> Result<Self, TagError> {
        if text.is_empty() {
            return Ok(Self::empty());
        }
        Self::new(text.split(SEPARATOR))
    }

    /// A copy with `word` added at the end.
    pub fn append(&self, word: &str) -> Result<Self, TagError> {
        validate_word(word)?;
        let mut words = self.words.clone();
        words.push(word.to_string());
        Ok(Self { words })
    }

    /// A copy with `word` added at the front.
    pub fn prepend(&self, word: &str) -> Result<Self, TagError> {
        validate_word(word)?;
        let mut words = Vec::with_capacity(self.words.len() + 1);
        words.push(word.to_string());
        words.extend(self.words.iter().cloned());
        Ok(Self { words })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// The edition words (`+NAME` / `-NAME`), in order, as their own tag.
    pub fn editions(&self) -> Tag {
        let words = self
            .words
            .iter()
            .filter(|w| is_edition_word(w))
            .cloned()
            .collect();
        Tag { words }
    }

    /// The number carried by the first `MEASURE_<n>` word, if any.
    pub fn measure_number(&self) -> Option<u32> {
        self.words
            .iter()
            .find_map(|w| w.strip_prefix(MEASURE_PREFIX)?.parse().ok())
    }
}

/// `+NAME` or `-NAME` with a non-empty name.
pub fn is_edition_word(word: &str) -> bool {
    word.len() > 1 && (word.starts_with('+') || word.starts_with('-'))
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(word)?;
        }
        Ok(())
    }
}

// Serialize as the joined text form so tags read naturally in section
// metadata JSON.
impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Tag::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let tag = Tag::parse("+SCORE:EXPLICIT_CLEF:MEASURE_3").unwrap();
        assert_eq!(tag.words(), ["+SCORE", "EXPLICIT_CLEF", "MEASURE_3"]);
        assert_eq!(tag.to_string(), "+SCORE:EXPLICIT_CLEF:MEASURE_3");
    }

    #[test]
    fn test_parse_empty_string_is_empty_tag() {
        let tag = Tag::parse("").unwrap();
        assert!(tag.is_empty());
        assert_eq!(tag.to_string(), "");
    }

    #[test]
    fn test_rejects_empty_word() {
        assert_eq!(Tag::parse("A::B"), Err(TagError::EmptyWord));
        assert_eq!(Tag::parse("A:"), Err(TagError::EmptyWord));
        assert_eq!(Tag::empty().append(""), Err(TagError::EmptyWord));
    }

    #[test]
    fn test_rejects_separator_in_word() {
        let err = Tag::empty().append("A:B").unwrap_err();
        assert!(matches!(err, TagError::ContainsSeparator { .. }));
        let err = Tag::new(["OK", "NOT:OK"]).unwrap_err();
        assert!(matches!(err, TagError::ContainsSeparator { .. }));
    }

    #[test]
    fn test_rejects_whitespace() {
        let err = Tag::empty().prepend("TWO WORDS").unwrap_err();
        assert!(matches!(err, TagError::ContainsWhitespace { .. }));
    }

    #[test]
    fn test_append_and_prepend_return_new_tags() {
        let base = Tag::parse("B").unwrap();
        let appended = base.append("C").unwrap();
        let prepended = base.prepend("A").unwrap();
        assert_eq!(base.to_string(), "B");
        assert_eq!(appended.to_string(), "B:C");
        assert_eq!(prepended.to_string(), "A:B");
    }

    #[test]
    fn test_contains() {
        let tag = Tag::parse("+PARTS:SHIFTED_CLEF").unwrap();
        assert!(tag.contains("SHIFTED_CLEF"));
        assert!(!tag.contains("SHIFTED"));
    }

    #[test]
    fn test_editions() {
        let tag = Tag::parse("-SECTION:NOT_MOL:+PARTS_CELLO:MEASURE_4").unwrap();
        assert_eq!(tag.editions().to_string(), "-SECTION:+PARTS_CELLO");
        // A lone sign is not an edition word.
        let tag = Tag::parse("+:-").unwrap();
        assert!(tag.editions().is_empty());
    }

    #[test]
    fn test_measure_number() {
        let tag = Tag::parse("FERMATA_MEASURE_EMPTY_BAR_EXTENT:MEASURE_17").unwrap();
        assert_eq!(tag.measure_number(), Some(17));
        assert_eq!(Tag::parse("MEASURE_X").unwrap().measure_number(), None);
        assert_eq!(Tag::empty().measure_number(), None);
    }

    #[test]
    fn test_serde_as_string() {
        let tag = Tag::parse("+SCORE:REAPPLIED_DYNAMIC").unwrap();
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"+SCORE:REAPPLIED_DYNAMIC\"");
        let back: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
        assert!(serde_json::from_str::<Tag>("\"A::B\"").is_err());
    }
}
