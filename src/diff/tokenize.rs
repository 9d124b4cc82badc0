//! Splits text into diff tokens.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Word,
    Space,
    Punctuation,
}

impl TokenClass {
    fn of(character: char) -> Self {
        if character.is_alphanumeric() || character == '_' {
            Self::Word
        } else if character.is_whitespace() {
            Self::Space
        } else {
            Self::Punctuation
        }
    }

    const fn extends_runs(self) -> bool {
        !matches!(self, Self::Punctuation)
    }
}

/// Tokenises into word runs, whitespace runs, and single punctuation marks.
///
/// Concatenating the tokens yields `text` exactly.
pub(crate) fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<TokenClass> = None;

    for (offset, character) in text.char_indices() {
        let class = TokenClass::of(character);
        let continues_run = current == Some(class) && class.extends_runs();
        if current.is_some() && !continues_run {
            tokens.extend(text.get(start..offset));
            start = offset;
        }
        current = Some(class);
    }

    if current.is_some() {
        tokens.extend(text.get(start..));
    }
    tokens
}

/// Whether `token` is a word rather than whitespace or punctuation.
pub(crate) fn is_word(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|character| TokenClass::of(character) == TokenClass::Word)
}
