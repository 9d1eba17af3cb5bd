//! Building blocks shared by the workflows
//!
//! - [`poller`] - Wait for a long-running operation to settle
//! - [`paginate`] - Drain a cursor-based listing
//! - [`filter`] - Drop stack-managed resources

pub mod filter;
pub mod paginate;
pub mod poller;

pub use filter::{filter_unmanaged, FilterOutcome};
pub use paginate::{collect_all, PaginatedResult};
pub use poller::{wait_until_terminal, DEFAULT_POLL_INTERVAL};
