//! twentyq: twenty questions backed by a binary question tree that learns.
//!
//! Questions are internal nodes, guessable objects are leaves. A lost round grows
//! the tree by one question and one object; the tree persists as a line-pair
//! document read and written in pre-order.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
