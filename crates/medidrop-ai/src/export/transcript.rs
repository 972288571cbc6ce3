//! Full transcript writing and parsing.

use std::io::{Read, Write};

use medidrop_common::{format_timestamp, parse_timestamp, SessionId};
use serde::{Deserialize, Serialize};

use crate::{Message, Role};

use super::{ExportError, HEADER, UTF8_BOM};

/// One CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRow {
    pub session_id: String,
    pub role: Role,
    pub text: String,
    pub time: String,
}

impl TranscriptRow {
    pub fn from_message(session_id: &SessionId, msg: &Message) -> Self {
        Self {
            session_id: session_id.to_string(),
            role: msg.role,
            text: msg.text.clone(),
            time: format_timestamp(&msg.timestamp),
        }
    }

    pub fn to_message(&self) -> Result<Message, ExportError> {
        let timestamp =
            parse_timestamp(&self.time).map_err(|_| ExportError::InvalidTimestamp(self.time.clone()))?;
        Ok(Message {
            role: self.role,
            text: self.text.clone(),
            timestamp,
        })
    }
}

/// Write BOM, header and one row per message.
pub fn write_transcript<W: Write>(
    writer: W,
    session_id: &SessionId,
    messages: &[Message],
) -> Result<(), ExportError> {
    write_rows(writer, session_id, messages, true)
}

/// Render a full transcript in memory, e.g. for a download.
pub fn transcript_to_string(
    session_id: &SessionId,
    messages: &[Message],
) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_transcript(&mut buf, session_id, messages)?;
    String::from_utf8(buf).map_err(|_| ExportError::InvalidUtf8)
}

/// Parse a transcript back into rows. A leading BOM is optional.
pub fn read_transcript<R: Read>(mut reader: R) -> Result<Vec<TranscriptRow>, ExportError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body);
    csv_reader
        .deserialize()
        .collect::<Result<Vec<TranscriptRow>, _>>()
        .map_err(ExportError::from)
}

/// Shared by full dumps and append logging. `with_header` also controls the BOM.
pub(crate) fn write_rows<W: Write>(
    mut writer: W,
    session_id: &SessionId,
    messages: &[Message],
    with_header: bool,
) -> Result<(), ExportError> {
    if with_header {
        writer.write_all(UTF8_BOM)?;
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    if with_header {
        csv_writer.write_record(HEADER)?;
    }
    for msg in messages {
        csv_writer.serialize(TranscriptRow::from_message(session_id, msg))?;
    }
    csv_writer.flush()?;
    Ok(())
}
