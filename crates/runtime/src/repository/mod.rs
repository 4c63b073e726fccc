//! Challenge-state persistence.
//!
//! The [`ChallengeRepository`] trait isolates progression logic from storage;
//! [`InMemoryChallengeRepo`] backs tests and ephemeral runs, and
//! [`FileChallengeRepo`] persists JSON files for local play. Both enforce
//! versioned compare-and-swap saves.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileChallengeRepo;
pub use memory::InMemoryChallengeRepo;
pub use traits::ChallengeRepository;
