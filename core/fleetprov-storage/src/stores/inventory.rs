use crate::table::{read_info, write_info, Record};
use fleetprov_model::{IndexOrder, InventoryTag, Row, RowError, TableSchema};

impl Record for InventoryTag {
    fn schema() -> TableSchema {
        TableSchema::with_object_info("inventory", "inv")
            .text("serialNumber")
            .text("venue")
            .text("entity")
            .text("subscriber")
            .text("deviceType")
            .text("qrCode")
            .text("geoCode")
            .text("location")
            .text("contact")
            .text("deviceConfiguration")
            .text("rrm")
            .in_use()
            .index("inventory_name_index", &[("name", IndexOrder::Asc)])
            .index("inventory_serial_index", &[("serialNumber", IndexOrder::Asc)])
    }

    fn to_row(&self) -> Result<Row, RowError> {
        let mut row = Row::new();
        write_info(&mut row, &self.info)?;
        row.put("serialNumber", self.serial_number.as_str())
            .put_optional_id("venue", &self.venue)
            .put_optional_id("entity", &self.entity)
            .put("subscriber", self.subscriber.as_str())
            .put("deviceType", self.device_type.as_str())
            .put("qrCode", self.qr_code.as_str())
            .put("geoCode", self.geo_code.as_str())
            .put_optional_id("location", &self.location)
            .put_optional_id("contact", &self.contact)
            .put_optional_id("deviceConfiguration", &self.device_configuration)
            .put("rrm", self.rrm.as_str())
            .put_json("inUse", &self.in_use)?;
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            info: read_info(row)?,
            serial_number: row.string("serialNumber")?,
            venue: row.optional_id("venue")?,
            entity: row.optional_id("entity")?,
            subscriber: row.string("subscriber")?,
            device_type: row.string("deviceType")?,
            qr_code: row.string("qrCode")?,
            geo_code: row.string("geoCode")?,
            location: row.optional_id("location")?,
            contact: row.optional_id("contact")?,
            device_configuration: row.optional_id("deviceConfiguration")?,
            rrm: row.string("rrm")?,
            in_use: row.json("inUse")?,
        })
    }
}
