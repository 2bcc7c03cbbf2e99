//! Line-delimited record protocol shared by every stage.
//!
//! A stream is one header line followed by zero or more data record lines:
//!
//! ```text
//! {"name": "<entity>", "fields": ["f1","f2",...]}
//! {"f1": <value>, "f2": <value>, ...}
//! ```
//!
//! Every line is a self-contained JSON object terminated by `\n`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, Lines, Write};

use crate::error::{EtlError, Result};
use crate::types::Record;

/// Declares the entity flowing through a stream and the canonical field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderMessage {
    pub name: String,
    pub fields: Vec<String>,
}

/// Builds a header. Callers guarantee `fields` is non-empty and de-duplicated.
pub fn make_header<N, I, S>(name: N, fields: I) -> HeaderMessage
where
    N: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    HeaderMessage {
        name: name.into(),
        fields: fields.into_iter().map(Into::into).collect(),
    }
}

/// A single decoded line
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Header(HeaderMessage),
    Record(Record),
}

impl Message {
    /// Decodes one line. A header is an object with exactly `name` (string) and
    /// `fields` (array of strings); any other object is a data record.
    pub fn decode(line: &str) -> std::result::Result<Message, String> {
        let value: Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
        let Value::Object(map) = value else {
            return Err("expected a JSON object".to_string());
        };
        if is_header_shape(&map) {
            let header: HeaderMessage =
                serde_json::from_value(Value::Object(map)).map_err(|e| e.to_string())?;
            return Ok(Message::Header(header));
        }
        Ok(Message::Record(map))
    }

    /// Encodes as a single line without the trailing newline
    pub fn encode(&self) -> Result<String> {
        Ok(match self {
            Message::Header(header) => serde_json::to_string(header)?,
            Message::Record(record) => serde_json::to_string(record)?,
        })
    }
}

fn is_header_shape(map: &Record) -> bool {
    map.len() == 2
        && matches!(map.get("name"), Some(Value::String(_)))
        && match map.get("fields") {
            Some(Value::Array(items)) => items.iter().all(Value::is_string),
            _ => false,
        }
}

/// Writes a record stream, refusing records before the header and a second header.
pub struct StreamWriter<W: Write> {
    inner: W,
    header_written: bool,
    records_written: usize,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            header_written: false,
            records_written: 0,
        }
    }

    pub fn write_header(&mut self, header: &HeaderMessage) -> Result<()> {
        if self.header_written {
            return Err(EtlError::Protocol {
                line: self.line_number(),
                message: "header already written for this stream".into(),
            });
        }
        self.write_line(&serde_json::to_string(header)?)?;
        self.header_written = true;
        Ok(())
    }

    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if !self.header_written {
            return Err(EtlError::Protocol {
                line: self.line_number(),
                message: "record written before the stream header".into(),
            });
        }
        self.write_line(&serde_json::to_string(record)?)?;
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flushes and hands back the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        Ok(())
    }

    fn line_number(&self) -> usize {
        usize::from(self.header_written) + self.records_written + 1
    }
}

/// Reads a record stream line by line.
///
/// A leading header is optional on input (extractor output carries one, raw
/// upstream dumps may not). A header anywhere after the first line is an error.
/// Blank lines are skipped.
pub struct StreamReader<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
    started: bool,
    header: Option<HeaderMessage>,
    pending: Option<Record>,
}

impl<R: BufRead> StreamReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            started: false,
            header: None,
            pending: None,
        }
    }

    /// Returns the stream header, reading the first line if needed.
    /// `None` means the stream starts directly with data (or is empty).
    pub fn header(&mut self) -> Result<Option<&HeaderMessage>> {
        if !self.started {
            self.started = true;
            match self.next_message()? {
                Some(Message::Header(header)) => self.header = Some(header),
                Some(Message::Record(record)) => self.pending = Some(record),
                None => {}
            }
        }
        Ok(self.header.as_ref())
    }

    fn next_message(&mut self) -> Result<Option<Message>> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Message::decode(&line)
                .map(Some)
                .map_err(|message| EtlError::Protocol {
                    line: self.line_no,
                    message,
                });
        }
        Ok(None)
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        self.header()?;
        if let Some(record) = self.pending.take() {
            return Ok(Some(record));
        }
        match self.next_message()? {
            Some(Message::Record(record)) => Ok(Some(record)),
            Some(Message::Header(header)) => Err(EtlError::Protocol {
                line: self.line_no,
                message: format!("unexpected header for `{}` after stream start", header.name),
            }),
            None => Ok(None),
        }
    }
}

impl<R: BufRead> Iterator for StreamReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn header_round_trips() {
        let header = make_header("dim_team", ["full_name", "short_name"]);
        let line = Message::Header(header.clone()).encode().unwrap();
        assert_eq!(line, r#"{"name":"dim_team","fields":["full_name","short_name"]}"#);
        assert_eq!(Message::decode(&line).unwrap(), Message::Header(header));
    }

    #[test]
    fn record_round_trips_with_mixed_values() {
        let rec = record(json!({"name": "Metropolitan", "first_year_of_play": 1926, "note": null}));
        let line = Message::Record(rec.clone()).encode().unwrap();
        assert_eq!(Message::decode(&line).unwrap(), Message::Record(rec));
    }

    #[test]
    fn record_with_header_like_keys_but_extra_field_is_a_record() {
        let line = r#"{"name": "x", "fields": ["a"], "extra": 1}"#;
        assert!(matches!(Message::decode(line).unwrap(), Message::Record(_)));
    }

    #[test]
    fn non_object_line_is_rejected() {
        assert!(Message::decode("[1,2,3]").is_err());
        assert!(Message::decode("not json").is_err());
    }

    #[test]
    fn writer_emits_newline_terminated_lines() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write_header(&make_header("dim_division", ["name"])).unwrap();
        writer.write_record(&record(json!({"name": "Atlantic"}))).unwrap();
        assert_eq!(writer.records_written(), 1);

        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "{\"name\":\"dim_division\",\"fields\":[\"name\"]}\n{\"name\":\"Atlantic\"}\n"
        );
    }

    #[test]
    fn writer_refuses_record_before_header() {
        let mut writer = StreamWriter::new(Vec::new());
        let err = writer.write_record(&record(json!({"name": "Atlantic"}))).unwrap_err();
        assert!(matches!(err, EtlError::Protocol { line: 1, .. }));
    }

    #[test]
    fn writer_refuses_second_header() {
        let mut writer = StreamWriter::new(Vec::new());
        let header = make_header("dim_division", ["name"]);
        writer.write_header(&header).unwrap();
        assert!(writer.write_header(&header).is_err());
    }

    #[test]
    fn reader_separates_header_from_records() {
        let input = "{\"name\":\"gamelog\",\"fields\":[\"GF\"]}\n\n{\"GF\":\"3\"}\n{\"GF\":\"1\"}\n";
        let mut reader = StreamReader::new(Cursor::new(input));
        assert_eq!(reader.header().unwrap().unwrap().name, "gamelog");

        let records: Vec<Record> = reader.collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["GF"], json!("1"));
    }

    #[test]
    fn reader_accepts_headerless_streams() {
        let input = "{\"name\":\"Boston Bruins\"}\n{\"name\":\"Buffalo Sabres\"}\n";
        let mut reader = StreamReader::new(Cursor::new(input));
        assert!(reader.header().unwrap().is_none());
        assert_eq!(reader.count(), 2);
    }

    #[test]
    fn reader_rejects_header_mid_stream() {
        let input = "{\"a\":1}\n{\"name\":\"x\",\"fields\":[]}\n";
        let mut reader = StreamReader::new(Cursor::new(input));
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(err, EtlError::Protocol { line: 2, .. }));
    }

    #[test]
    fn reader_reports_line_of_malformed_json() {
        let input = "{\"a\":1}\n{oops\n";
        let reader = StreamReader::new(Cursor::new(input));
        let err = reader.collect::<Result<Vec<_>>>().unwrap_err();
        assert!(matches!(err, EtlError::Protocol { line: 2, .. }));
    }
}
