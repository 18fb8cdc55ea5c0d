//! Process-wide default text encoding registry.
//!
//! Rendering engines may override the process default encoding as a side effect of their
//! initialization and are not required to put it back.  This module owns the single ambient
//! value involved: [`internal_encoding`]/[`set_internal_encoding`] read and replace it, and
//! [`EncodingGuard`] captures it on entry so it is restored on every exit path, including
//! drops on error paths.

use std::sync::{Mutex, PoisonError};

/// Label reported when no encoding has ever been set.
pub const DEFAULT_ENCODING: &str = "UTF-8";

static INTERNAL_ENCODING: Mutex<Option<String>> = Mutex::new(None);

fn registry() -> std::sync::MutexGuard<'static, Option<String>> {
    INTERNAL_ENCODING
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Returns the current process-wide text encoding label.
pub fn internal_encoding() -> String {
    registry()
        .clone()
        .unwrap_or_else(|| DEFAULT_ENCODING.to_string())
}

/// Replaces the process-wide text encoding label, returning the previous value.
pub fn set_internal_encoding(label: impl Into<String>) -> Option<String> {
    registry().replace(label.into())
}

/// Captures the encoding value current at construction time and puts it back exactly once,
/// either through [`EncodingGuard::restore`] or when the guard is dropped.
#[derive(Debug)]
pub struct EncodingGuard {
    captured: Option<Option<String>>,
}

impl EncodingGuard {
    /// Captures the current registry value, including the "never set" state.
    pub fn capture() -> Self {
        Self {
            captured: Some(registry().clone()),
        }
    }

    /// Restores the captured value now instead of at drop time.
    pub fn restore(mut self) {
        self.restore_now();
    }

    fn restore_now(&mut self) {
        if let Some(captured) = self.captured.take() {
            *registry() = captured;
        }
    }
}

impl Drop for EncodingGuard {
    fn drop(&mut self) {
        self.restore_now();
    }
}

#[cfg(test)]
pub(crate) static REGISTRY_TEST_LOCK: Mutex<()> = Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_restores_on_explicit_restore_and_on_drop() {
        let _serial = REGISTRY_TEST_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        set_internal_encoding("ISO-8859-1");

        let guard = EncodingGuard::capture();
        set_internal_encoding("US-ASCII");
        assert_eq!(internal_encoding(), "US-ASCII");
        guard.restore();
        assert_eq!(internal_encoding(), "ISO-8859-1");

        {
            let _guard = EncodingGuard::capture();
            set_internal_encoding("US-ASCII");
        }
        assert_eq!(internal_encoding(), "ISO-8859-1");

        *super::registry() = None;
        assert_eq!(internal_encoding(), DEFAULT_ENCODING);
    }
}
