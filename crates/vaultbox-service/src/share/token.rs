//! Share link token generation.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Draws random alphanumeric link tokens.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    length: usize,
    fixed: Option<String>,
}

impl TokenGenerator {
    /// A generator producing tokens of `length` characters.
    pub fn new(length: usize) -> Self {
        Self {
            length,
            fixed: None,
        }
    }

    /// A generator that always yields `token`, for exercising collisions.
    pub fn fixed(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            length: token.len(),
            fixed: Some(token),
        }
    }

    /// Token length.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Draw a token.
    pub fn generate(&self) -> String {
        if let Some(token) = &self.fixed {
            return token.clone();
        }
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_alphanumeric_and_sized() {
        let generator = TokenGenerator::new(32);
        let a = generator.generate();
        let b = generator.generate();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_fixed_generator_repeats() {
        let generator = TokenGenerator::fixed("x".repeat(40));
        assert_eq!(generator.length(), 40);
        assert_eq!(generator.generate(), generator.generate());
    }
}
