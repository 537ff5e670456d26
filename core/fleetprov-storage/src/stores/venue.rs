use crate::table::{read_info, write_info, Record};
use fleetprov_model::{IndexOrder, Row, RowError, TableSchema, Venue};

impl Record for Venue {
    fn schema() -> TableSchema {
        TableSchema::with_object_info("venues", "ven")
            .text("entity")
            .text("parent")
            .text("children")
            .text("devices")
            .text("contact")
            .text("location")
            .text("deviceConfiguration")
            .text("managementPolicy")
            .text("rrm")
            .text("topology")
            .text("design")
            .index("venue_name_index", &[("name", IndexOrder::Asc)])
    }

    fn to_row(&self) -> Result<Row, RowError> {
        let mut row = Row::new();
        write_info(&mut row, &self.info)?;
        row.put_optional_id("entity", &self.entity)
            .put_optional_id("parent", &self.parent)
            .put_json("children", &self.children)?
            .put_json("devices", &self.devices)?
            .put_optional_id("contact", &self.contact)
            .put_optional_id("location", &self.location)
            .put_optional_id("deviceConfiguration", &self.device_configuration)
            .put_optional_id("managementPolicy", &self.management_policy)
            .put("rrm", self.rrm.as_str())
            .put("topology", self.topology.as_str())
            .put("design", self.design.as_str());
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            info: read_info(row)?,
            entity: row.optional_id("entity")?,
            parent: row.optional_id("parent")?,
            children: row.json("children")?,
            devices: row.json("devices")?,
            contact: row.optional_id("contact")?,
            location: row.optional_id("location")?,
            device_configuration: row.optional_id("deviceConfiguration")?,
            management_policy: row.optional_id("managementPolicy")?,
            rrm: row.string("rrm")?,
            topology: row.string("topology")?,
            design: row.string("design")?,
        })
    }
}
