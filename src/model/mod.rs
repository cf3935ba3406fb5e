//! Core data model for article processing.
//!
//! This module contains:
//! - The arena-allocated document tree all passes operate on
//! - The article representation (metadata + content tree)
//! - The shared tag vocabulary

mod arena;
mod article;
pub mod tags;

pub use arena::{escape_attr, escape_text, Ancestors, Node, NodeData, NodeId, Tree};
pub use article::Article;
