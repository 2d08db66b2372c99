//! Shared test utilities for domain testing
//!
//! - `TestDataBuilder`: deterministic, collision-free fixture values
//! - `TestTime`: a settable "now" for clock-driven code
//! - `assertions`: assertion helpers with readable failure messages
//!
//! # Usage
//!
//! ```
//! use test_utils::TestDataBuilder;
//!
//! let builder = TestDataBuilder::from_test_name("my_test");
//! let email = builder.email("owner");
//! assert!(email.ends_with("@example.com"));
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

/// Builder for test data with deterministic values
///
/// Values derive from a seed so that two tests never collide on unique
/// fields (emails) while reruns of the same test stay reproducible.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// A unique, syntactically valid email for `label`
    pub fn email(&self, label: &str) -> String {
        format!("{}.{}@example.com", label, self.seed)
    }

    /// A room number in 100..=599, stable for a given `index`
    pub fn room(&self, index: u64) -> String {
        let room = 100 + self.seed.wrapping_add(index.wrapping_mul(7919)) % 500;
        room.to_string()
    }
}

/// Controllable "now" shared between a test and the code under test
#[derive(Clone)]
pub struct TestTime {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl TestTime {
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// 2025-10-28 10:00 UTC, the date the demo data is set around
    pub fn default_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 28, 10, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Default for TestTime {
    fn default() -> Self {
        Self::at(Self::default_start())
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    /// Assert that two UUIDs are equal with a nice error message
    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that a result is an error and return it
    pub fn assert_err<T: std::fmt::Debug, E>(result: Result<T, E>, context: &str) -> E {
        match result {
            Ok(value) => panic!("{}: expected an error, got Ok({:?})", context, value),
            Err(err) => err,
        }
    }
}
