//! Environment store port and its implementations.
//!
//! The overlay never touches process globals directly; it writes through
//! an [`EnvStore`], so tests and embedders can substitute an in-memory
//! implementation.

use std::collections::HashMap;

/// Port over a mutable environment: the real process environment in
/// production, an in-memory map in tests.
pub trait EnvStore {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, name: &str, value: &str);
    fn unset(&mut self, name: &str);
}

/// [`EnvStore`] over the real process environment.
#[derive(Debug, Default)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn set(&mut self, name: &str, value: &str) {
        // Process-global mutation: callers must load env files before
        // spawning threads that read the environment.
        unsafe { std::env::set_var(name, value) };
    }

    fn unset(&mut self, name: &str) {
        unsafe { std::env::remove_var(name) };
    }
}

/// In-memory [`EnvStore`] for tests and sandboxed embedders.
#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: HashMap<String, String>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }

    fn unset(&mut self, name: &str) {
        self.vars.remove(name);
    }
}
