use crate::table::{read_info, write_info, Record};
use fleetprov_model::{IndexOrder, Map, Row, RowError, TableSchema};

impl Record for Map {
    fn schema() -> TableSchema {
        TableSchema::with_object_info("maps", "map")
            .text("data")
            .text("entity")
            .text("creator")
            .text("visibility")
            .index("map_name_index", &[("name", IndexOrder::Asc)])
    }

    fn to_row(&self) -> Result<Row, RowError> {
        let mut row = Row::new();
        write_info(&mut row, &self.info)?;
        row.put("data", self.data.as_str())
            .put_optional_id("entity", &self.entity)
            .put("creator", self.creator.as_str())
            .put("visibility", self.visibility.as_str());
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            info: read_info(row)?,
            data: row.string("data")?,
            entity: row.optional_id("entity")?,
            creator: row.string("creator")?,
            visibility: row.string("visibility")?,
        })
    }
}
