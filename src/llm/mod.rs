pub mod client;
pub mod provider;

pub use client::{DraftClient, EditorialDraft};
