//! Conversation memory: the ordered message log plus the policies that
//! bound and monitor it.

pub mod alert;
pub mod estimator;
pub mod store;
pub mod window;

pub use alert::{Advisory, AlertPolicy, Severity};
pub use store::{MemoryStore, Message, Role};
pub use window::SlidingWindowPolicy;
