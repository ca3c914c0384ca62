//! event-vec-migrate - one-shot migration of chip state sources from
//! `Option<StateEvent>` to `Option<Vec<StateEvent>>`.
//!
//! This library provides the migration engine, including:
//! - An ordered set of text rewrite rules for constructions and test assertions
//! - A multi-line span fixer for constructions closed on a later line
//! - Change-aware, atomic per-file rewriting
//! - A batch driver over a directory with a deny-list
//!
//! The rules match textual shapes, not syntax trees. Input they do not
//! recognize is left as is, and nothing checks that the output still parses.
//!
//! # Example
//!
//! ```
//! use event_vec_migrate::rules::RuleSet;
//!
//! let rules = RuleSet::standard().unwrap();
//! let outcome = rules.apply("return Some(vec![StateEvent::KeyOn { channel: 0 }));");
//!
//! assert!(outcome.changed);
//! assert_eq!(outcome.text, "return Some(vec![StateEvent::KeyOn { channel: 0 }]);");
//! ```

pub mod config;
pub mod error;
pub mod process;
pub mod rules;

pub use error::{MigrateError, Result};
