use crate::table::{read_info, write_info, Record};
use fleetprov_model::{IndexOrder, ManagementPolicy, Row, RowError, TableSchema};

impl Record for ManagementPolicy {
    fn schema() -> TableSchema {
        TableSchema::with_object_info("policies", "pol")
            .text("entries")
            .in_use()
            .text("entity")
            .text("venue")
            .index("policy_name_index", &[("name", IndexOrder::Asc)])
    }

    fn to_row(&self) -> Result<Row, RowError> {
        let mut row = Row::new();
        write_info(&mut row, &self.info)?;
        row.put_json("entries", &self.entries)?
            .put_json("inUse", &self.in_use)?
            .put_optional_id("entity", &self.entity)
            .put_optional_id("venue", &self.venue);
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            info: read_info(row)?,
            entries: row.json("entries")?,
            in_use: row.json("inUse")?,
            entity: row.optional_id("entity")?,
            venue: row.optional_id("venue")?,
        })
    }
}
