//! Signal extraction from raw chat lines
//!
//! - `types`: strongly-typed trade candidates, validated at the
//!   completion-service boundary
//! - `extractor`: prompt construction, response parsing, relevance rules
//! - `backfill`: historical entry search for exits with no matching entry

pub mod backfill;
pub mod extractor;
pub mod types;

pub use types::{InstrumentType, Relevance, TradeCandidate, TradeStatus};
