//! Shared runtime utilities for the shared map viewer.
//!
//! This crate re-exports the data contracts from `map_schema` and adds the
//! pieces that operate on them without any async or UI dependency, most
//! notably the parser for the delimited-text location feed.

pub use map_schema::*;

mod feed_text;

pub use feed_text::{
    parse_feed, split_feed_line, Axis, FeedColumns, FeedFormatError, ParsedFeed, SkipReason,
    SkippedRow, REQUIRED_COLUMNS,
};
