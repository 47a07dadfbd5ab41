//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, state machine)
//! - `booklet` - Question content and option-label parsing
//! - `consent` - Consent acknowledgement and tiered save records
//! - `survey` - Session phases, question navigation, and completion summary

pub mod booklet;
pub mod consent;
pub mod foundation;
pub mod survey;
