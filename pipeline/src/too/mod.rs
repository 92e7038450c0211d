//! Target-of-Opportunity request drafting. Submission is left to an external client.

pub mod prompt;
pub mod request;

pub use prompt::{draft_request, Prompter};
pub use request::TooRequest;
