use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const RUN_EVENT_SCHEMA_0_0_1: &str = "ballot-run-event/0.0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEventType {
    ScenarioReady,
    StepStarted,
    BlockWaiting,
    TxSent,
    TxConfirmed,
    BalancePolled,
    QueryResult,
    StepCompleted,
    Error,
    ScenarioCompleted,
}

impl RunEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScenarioReady => "scenario_ready",
            Self::StepStarted => "step_started",
            Self::BlockWaiting => "block_waiting",
            Self::TxSent => "tx_sent",
            Self::TxConfirmed => "tx_confirmed",
            Self::BalancePolled => "balance_polled",
            Self::QueryResult => "query_result",
            Self::StepCompleted => "step_completed",
            Self::Error => "error",
            Self::ScenarioCompleted => "scenario_completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunEvent {
    #[serde(rename = "type")]
    pub event_type: RunEventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl RunEvent {
    pub fn new(event_type: RunEventType) -> Self {
        Self {
            event_type,
            step_id: None,
            data: Map::new(),
        }
    }

    pub fn for_step(event_type: RunEventType, step_id: impl Into<String>) -> Self {
        Self {
            event_type,
            step_id: Some(step_id.into()),
            data: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunEventRecord {
    pub schema: String,
    pub run_id: String,
    pub seq: u64,
    pub ts_ms: u64,
    pub event: RunEvent,
}

impl RunEventRecord {
    pub fn new(run_id: impl Into<String>, seq: u64, ts_ms: u64, event: RunEvent) -> Self {
        Self {
            schema: RUN_EVENT_SCHEMA_0_0_1.to_string(),
            run_id: run_id.into(),
            seq,
            ts_ms,
            event,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunEventStream {
    run_id: String,
    next_seq: u64,
}

impl RunEventStream {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            next_seq: 0,
        }
    }

    pub fn run_id(&self) -> &str {
        self.run_id.as_str()
    }

    pub fn next_record(&mut self, ts_ms: u64, event: RunEvent) -> RunEventRecord {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        RunEventRecord::new(self.run_id.clone(), seq, ts_ms, event)
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunEventSequenceError {
    #[error("sequence is empty")]
    Empty,
    #[error("sequence must start at 0, got {actual}")]
    InvalidStart { actual: u64 },
    #[error("sequence is not monotonic at index {index}: expected {expected}, got {actual}")]
    NonMonotonic {
        index: usize,
        expected: u64,
        actual: u64,
    },
}

pub fn ensure_monotonic_sequence(records: &[RunEventRecord]) -> Result<(), RunEventSequenceError> {
    let Some(first) = records.first() else {
        return Err(RunEventSequenceError::Empty);
    };
    if first.seq != 0 {
        return Err(RunEventSequenceError::InvalidStart { actual: first.seq });
    }
    for (index, pair) in records.windows(2).enumerate() {
        let expected = pair[0].seq + 1;
        if pair[1].seq != expected {
            return Err(RunEventSequenceError::NonMonotonic {
                index: index + 1,
                expected,
                actual: pair[1].seq,
            });
        }
    }
    Ok(())
}

pub fn encode_event_jsonl_line(record: &RunEventRecord) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    Ok(line)
}

pub fn parse_event_jsonl_line(line: &str) -> serde_json::Result<RunEventRecord> {
    serde_json::from_str::<RunEventRecord>(line.trim_end())
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
