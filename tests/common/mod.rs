#![allow(dead_code)]

use std::time::Duration;

pub use treewatch_test_utils::builders;
pub use treewatch_test_utils::fake_source::FakeSource;
pub use treewatch_test_utils::recording::{CallbackRecorder, Delivery, LogEntry, RecordingLog};
pub use treewatch_test_utils::{init_tracing, with_timeout};

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Timer-driven times on a paused clock land on whole milliseconds; allow a
/// little slack anyway.
pub fn assert_near(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual <= expected + ms(5),
        "expected ~{expected:?}, got {actual:?}"
    );
}
