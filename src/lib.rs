//! infobox: structured editing of infobox callouts backed by YAML frontmatter.
//!
//! An infobox is a blockquote callout whose first line is `> [!infobox]`. Level-6 headings
//! inside it start named groups, and table rows in a group display frontmatter values through
//! formula references such as `` `=this.stats.strength` ``:
//!
//! ```text
//! ---
//! stats:
//!   strength: '10'
//! ---
//! > [!infobox]
//! > %% unlocked %%
//! > # Ada
//! > ###### Stats
//! > | Type | Stat |
//! > | --- | --- |
//! > | Strength | `=this.stats.strength` |
//! ```
//!
//! Every edit is a minimal splice of the user's own lines plus a mutation of the frontmatter,
//! committed together in one atomic write after re-locating its target in the latest text.
#![allow(clippy::multiple_crate_versions)]

pub mod actions;
pub mod app_state;
pub mod change;
pub mod config;
pub mod error;
pub mod formats;
pub mod frontmatter;
pub mod infobox;
pub mod key;
pub mod locate;
pub mod render;
pub mod reorder;
pub mod section;
pub mod session;
pub mod store;
pub mod ui;
