pub mod clock;
pub mod config;
pub mod document;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
