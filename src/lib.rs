#![doc = "helpdesk-sync: mirror a local HTML tree into a helpdesk knowledge base."]

//! Directories become sections (named `"<position>-<name>"`, prefix
//! stripped), `.html` files become articles with their inline images
//! uploaded as hosted attachments. A second entry point flips a section's
//! article translations out of draft.
//!
//! The remote gateway is abstracted behind [`contract::HelpdeskApi`] so the
//! reconciliation engine ([`sync::Synchroniser`]) can be exercised against
//! mocks.

pub mod cli;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod load_config;
pub mod model;
pub mod sync;
