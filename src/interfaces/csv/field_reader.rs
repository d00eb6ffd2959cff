use crate::domain::fields::FieldSet;
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct FieldRecord {
    name: String,
    value: String,
}

/// Reads a `name,value` CSV into a [`FieldSet`], keeping row order.
///
/// Values are taken byte-for-byte since they may be covered by a signature; only the
/// header row is trimmed.
pub struct FieldReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> FieldReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(source);
        Self { reader }
    }

    pub fn read_fields(self) -> Result<FieldSet> {
        let mut fields = FieldSet::new();
        for record in self.reader.into_deserialize::<FieldRecord>() {
            let record = record?;
            fields.set(record.name, record.value);
        }
        Ok(fields)
    }
}
