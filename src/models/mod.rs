//! Data models for Nestle

mod post;

pub use post::{MutationKind, Post};
