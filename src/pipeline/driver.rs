use std::io::{BufRead, Write};
use tracing::{debug, info, instrument};

use super::{Accepted, Stage};
use crate::error::Result;
use crate::protocol::{StreamReader, StreamWriter};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StageSummary {
    pub records_in: usize,
    pub records_out: usize,
    pub skipped: usize,
}

/// Runs `stage` over a whole input stream: header first, then each transformed record.
///
/// An input header, if any, is consumed and not forwarded. Any error aborts
/// the run; records already written stay written.
#[instrument(skip_all, fields(stage = %stage.entity()))]
pub fn run_stage<R, W>(stage: &mut dyn Stage, input: R, output: W) -> Result<StageSummary>
where
    R: BufRead,
    W: Write,
{
    let mut reader = StreamReader::new(input);
    let mut writer = StreamWriter::new(output);
    let mut summary = StageSummary::default();

    writer.write_header(&stage.header())?;
    if let Some(header) = reader.header()? {
        debug!(upstream = %header.name, fields = header.fields.len(), "consumed input header");
    }

    for record in reader {
        summary.records_in += 1;
        match stage.accept(record?)? {
            Accepted::Emit(out) => writer.write_record(&out)?,
            Accepted::Buffered => {}
            Accepted::Skipped => summary.skipped += 1,
        }
    }

    for out in stage.finish()? {
        writer.write_record(&out)?;
    }

    summary.records_out = writer.records_written();
    writer.flush()?;
    info!(
        records_in = summary.records_in,
        records_out = summary.records_out,
        skipped = summary.skipped,
        "stage finished"
    );
    Ok(summary)
}
