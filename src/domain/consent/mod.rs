//! Consent domain module.
//!
//! Informed consent gates participation. A record is produced for every
//! session that consents, whichever storage tier accepted it.

mod record;

pub use record::{ConsentAck, ConsentDraft, ConsentErrorReport, ConsentRecord, SaveMethod};
