//! Environment abstraction for testability.
//!
//! This module provides an [`Environment`] trait that allows injecting
//! fixed variable sets in tests while reading the real process environment
//! in production.

use std::collections::HashMap;
use std::hash::BuildHasher;

/// Abstraction over environment variable lookup.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use cfgchain::env::Environment;
///
/// let env = HashMap::from([("PORT".to_string(), "8080".to_string())]);
/// assert_eq!(env.var("PORT").as_deref(), Some("8080"));
/// assert_eq!(env.var("HOST"), None);
/// ```
pub trait Environment {
    /// Returns the value of `name`, or `None` if it is not set or not UTF-8.
    fn var(&self, name: &str) -> Option<String>;
}

/// Production environment backed by [`std::env::var`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<S: BuildHasher> Environment for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
