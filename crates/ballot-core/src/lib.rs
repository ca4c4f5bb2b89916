pub mod events;
pub mod field_path;
pub mod issues;
pub mod proposal;
pub mod redact;

pub use events::{
    encode_event_jsonl_line, ensure_monotonic_sequence, parse_event_jsonl_line, RunEvent,
    RunEventRecord, RunEventSequenceError, RunEventStream, RunEventType, RUN_EVENT_SCHEMA_0_0_1,
};
pub use field_path::{FieldPath, FieldPathSegment};
pub use issues::{IssueSeverity, StructuredIssue};
pub use proposal::{ProposalName, ProposalNameError, PROPOSAL_NAME_LEN};
pub use redact::{redact_value, RedactMode, REDACTED};
