//! Helpers for unit tests that change the process environment

use once_cell::sync::Lazy;
use std::env;

/// Held by every test that sets an environment variable
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// One environment variable set for the lifetime of the value
pub struct ScopedEnv {
    key: &'static str,
    previous: Option<String>,
}

impl ScopedEnv {
    pub fn set(key: &'static str, value: &str) -> Self {
        let previous = env::var(key).ok();
        // Callers hold ENV_MUTEX
        unsafe { env::set_var(key, value) };
        Self { key, previous }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        match &self.previous {
            Some(value) => unsafe { env::set_var(self.key, value) },
            None => unsafe { env::remove_var(self.key) },
        }
    }
}
