use crate::domain::fields::FieldSet;
use crate::error::Result;
use std::io::Write;

/// Writes a [`FieldSet`] as `name,value` CSV.
pub struct FieldWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> FieldWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_fields(&mut self, fields: &FieldSet) -> Result<()> {
        self.writer.write_record(["name", "value"])?;
        for (name, value) in fields.iter() {
            self.writer.write_record([name, value])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
