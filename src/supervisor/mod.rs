//! Process supervision: spawning, readiness gating, guaranteed teardown.

pub mod readiness;
#[allow(clippy::module_inception)]
pub mod supervisor;

pub use readiness::{HttpProbe, MockProbe, ReadinessProbe, wait_until_ready};
pub use supervisor::{ProcessHandle, ProcessSupervisor};
