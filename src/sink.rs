use csv::WriterBuilder;
use serde_json::Value;
use std::io::{BufRead, Write};
use tracing::{info, instrument};

use crate::error::{EtlError, Result};
use crate::protocol::StreamReader;

/// Converts a record stream to CSV: the header's fields become the first row,
/// then one row per record in arrival order.
///
/// A stream without a header cannot be laid out and fails with `MissingHeader`;
/// a record key absent from the header fails with `UnexpectedField`.
#[instrument(skip_all)]
pub fn write_csv<R: BufRead, W: Write>(input: R, output: W) -> Result<usize> {
    let mut reader = StreamReader::new(input);
    let fields = match reader.header()? {
        Some(header) => header.fields.clone(),
        None => return Err(EtlError::MissingHeader),
    };

    let mut writer = WriterBuilder::new().from_writer(output);
    writer.write_record(&fields)?;

    let mut rows = 0usize;
    for record in reader {
        let record = record?;
        if let Some(extra) = record.keys().find(|k| !fields.contains(k)) {
            return Err(EtlError::UnexpectedField {
                field: extra.clone(),
            });
        }
        writer.write_record(fields.iter().map(|f| cell(record.get(f))))?;
        rows += 1;
    }

    writer.flush()?;
    info!(rows, "csv written");
    Ok(rows)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn convert(input: &str) -> Result<String> {
        let mut out = Vec::new();
        write_csv(Cursor::new(input), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn lays_out_rows_in_header_order() {
        let input = concat!(
            "{\"name\":\"fact_game\",\"fields\":[\"date\",\"gf\",\"pp opp\"]}\n",
            "{\"gf\":3,\"date\":\"2017-10-01T00:00:00\",\"pp opp\":null}\n",
            "{\"date\":\"2017-10-03T00:00:00\",\"gf\":1}\n",
        );
        assert_eq!(
            convert(input).unwrap(),
            "date,gf,pp opp\n2017-10-01T00:00:00,3,\n2017-10-03T00:00:00,1,\n"
        );
    }

    #[test]
    fn quotes_values_that_need_it() {
        let input = "{\"name\":\"dim_team\",\"fields\":[\"full_name\"]}\n{\"full_name\":\"Bruins, Boston\"}\n";
        assert_eq!(convert(input).unwrap(), "full_name\n\"Bruins, Boston\"\n");
    }

    #[test]
    fn requires_header() {
        let err = convert("{\"name\":\"Atlantic\"}\n").unwrap_err();
        assert!(matches!(err, EtlError::MissingHeader));
        assert!(matches!(convert("").unwrap_err(), EtlError::MissingHeader));
    }

    #[test]
    fn rejects_undeclared_fields() {
        let input = "{\"name\":\"dim_division\",\"fields\":[\"name\"]}\n{\"name\":\"Atlantic\",\"id\":17}\n";
        let err = convert(input).unwrap_err();
        assert!(matches!(err, EtlError::UnexpectedField { ref field } if field == "id"));
    }
}
