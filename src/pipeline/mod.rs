pub mod driver;
pub mod mapping;
pub mod registry;
pub mod stages;

pub use driver::{run_stage, StageSummary};
pub use registry::StageRegistry;

use crate::error::Result;
use crate::protocol::{make_header, HeaderMessage};
use crate::types::Record;

/// What a stage did with one input record
#[derive(Debug, Clone, PartialEq)]
pub enum Accepted {
    /// Write this record downstream now
    Emit(Record),
    /// Held until end of input
    Buffered,
    /// Dropped; the stage has already logged why
    Skipped,
}

/// One transformation step between an input and an output record stream.
pub trait Stage {
    /// Entity name written in the output header
    fn entity(&self) -> &str;

    /// Every key the stage's output records may carry, in column order
    fn fields(&self) -> Vec<String>;

    fn accept(&mut self, record: Record) -> Result<Accepted>;

    /// Called once input is exhausted; returns anything still buffered
    fn finish(&mut self) -> Result<Vec<Record>> {
        Ok(Vec::new())
    }

    fn header(&self) -> HeaderMessage {
        make_header(self.entity(), self.fields())
    }
}
