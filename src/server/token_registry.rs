//! In-memory set of registered device push tokens.

use anyhow::{anyhow, Result};
use std::sync::{Mutex, MutexGuard};

/// Insertion-ordered set of push tokens. Lost on restart.
#[derive(Default)]
pub struct TokenRegistry {
    tokens: Mutex<Vec<String>>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> Result<MutexGuard<'_, Vec<String>>> {
        self.tokens
            .lock()
            .map_err(|_| anyhow!("Token registry lock poisoned"))
    }

    /// Adds `token`. Returns false if it was already registered.
    pub fn register(&self, token: &str) -> Result<bool> {
        let mut tokens = self.locked()?;
        if tokens.iter().any(|t| t == token) {
            return Ok(false);
        }
        tokens.push(token.to_string());
        Ok(true)
    }

    pub fn tokens(&self) -> Result<Vec<String>> {
        Ok(self.locked()?.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.locked()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_keeps_order_and_deduplicates() {
        let registry = TokenRegistry::new();
        assert!(registry.register("b").unwrap());
        assert!(registry.register("a").unwrap());
        assert!(!registry.register("b").unwrap());

        assert_eq!(registry.tokens().unwrap(), vec!["b", "a"]);
        assert_eq!(registry.len().unwrap(), 2);
    }

    #[test]
    fn test_empty() {
        let registry = TokenRegistry::new();
        assert!(registry.tokens().unwrap().is_empty());
        assert_eq!(registry.len().unwrap(), 0);
    }
}
