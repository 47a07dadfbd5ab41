//! Booklet content module.
//!
//! Booklets are static content owned by an external content store; the
//! survey core only reads them. This module holds the question model and
//! the option-label parser.

mod booklet;
mod options;
mod question;

pub use booklet::{Booklet, BookletError};
pub use options::{
    parse_option_text, parse_options, OptionEncoding, OptionParseError, ParsedOptions, RawOptions,
};
pub use question::{Question, QuestionPosition};
