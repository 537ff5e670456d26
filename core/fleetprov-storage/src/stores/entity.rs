use crate::table::{read_info, write_info, Record};
use fleetprov_model::{Entity, IndexOrder, Row, RowError, TableSchema};

impl Record for Entity {
    fn schema() -> TableSchema {
        TableSchema::with_object_info("entities", "ent")
            .text("parent")
            .text("children")
            .text("venues")
            .text("devices")
            .text("contacts")
            .text("locations")
            .text("deviceConfiguration")
            .text("managementPolicy")
            .text("rrm")
            .index("entity_name_index", &[("name", IndexOrder::Asc)])
    }

    fn to_row(&self) -> Result<Row, RowError> {
        let mut row = Row::new();
        write_info(&mut row, &self.info)?;
        row.put_optional_id("parent", &self.parent)
            .put_json("children", &self.children)?
            .put_json("venues", &self.venues)?
            .put_json("devices", &self.devices)?
            .put_json("contacts", &self.contacts)?
            .put_json("locations", &self.locations)?
            .put_optional_id("deviceConfiguration", &self.device_configuration)
            .put_optional_id("managementPolicy", &self.management_policy)
            .put("rrm", self.rrm.as_str());
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            info: read_info(row)?,
            parent: row.optional_id("parent")?,
            children: row.json("children")?,
            venues: row.json("venues")?,
            devices: row.json("devices")?,
            contacts: row.json("contacts")?,
            locations: row.json("locations")?,
            device_configuration: row.optional_id("deviceConfiguration")?,
            management_policy: row.optional_id("managementPolicy")?,
            rrm: row.string("rrm")?,
        })
    }
}
