#![allow(dead_code)]

pub use tor_prebuilt_test_utils::builders;
pub use tor_prebuilt_test_utils::fake_process;
pub use tor_prebuilt_test_utils::scripts;
pub use tor_prebuilt_test_utils::{init_tracing, with_timeout};
