//! Result encoding used while an attack stream is consumed

use barrage_core::AttackResult;

use crate::error::ExecutionError;

/// Appends one encoded result to a buffer
pub trait ResultEncoder: Send + Sync {
    fn encode(&self, result: &AttackResult, buf: &mut Vec<u8>) -> Result<(), ExecutionError>;
}

/// Newline-delimited JSON, one result per line
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesEncoder;

impl ResultEncoder for JsonLinesEncoder {
    fn encode(&self, result: &AttackResult, buf: &mut Vec<u8>) -> Result<(), ExecutionError> {
        serde_json::to_writer(&mut *buf, result)?;
        buf.push(b'\n');
        Ok(())
    }
}
