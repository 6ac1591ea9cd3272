//! # gitinfo-cli
//!
//! The `gitinfo` command-line interface.
//!
//! ```bash
//! gitinfo                              # checks ./.gitinfo
//! gitinfo a/.gitinfo b/.gitinfo --format json
//! GITINFO_SCHEMA=custom.json gitinfo
//! ```

pub mod report;
pub mod validate;
