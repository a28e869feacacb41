use thiserror::Error;

/// Longest incantation accepted, counted in characters.
pub const MAX_INCANTATION_CHARS: usize = 128;

const VOWELS: [char; 5] = ['A', 'E', 'I', 'O', 'U'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncantationError {
    #[error("Incantation text is required.")]
    EmptyInput,

    #[error("Incantation cannot exceed {MAX_INCANTATION_CHARS} characters.")]
    TooLong,
}

/// Extract the unique consonants of an incantation in order of first appearance.
///
/// The text is uppercased, reduced to alphabetic characters, stripped of the
/// vowels `A E I O U` and deduplicated. Each consonant comes back as its own
/// single-character string, which is the shape the sigil editor consumes.
pub fn process(text: &str) -> Result<Vec<String>, IncantationError> {
    if text.is_empty() {
        return Err(IncantationError::EmptyInput);
    }
    if text.chars().count() > MAX_INCANTATION_CHARS {
        return Err(IncantationError::TooLong);
    }

    let mut consonants: Vec<char> = Vec::new();
    for c in text.to_uppercase().chars() {
        if c.is_alphabetic() && !VOWELS.contains(&c) && !consonants.contains(&c) {
            consonants.push(c);
        }
    }

    Ok(consonants.into_iter().map(String::from).collect())
}
