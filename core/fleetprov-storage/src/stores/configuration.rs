use crate::table::{read_info, write_info, Record};
use fleetprov_model::{DeviceConfiguration, IndexOrder, Row, RowError, TableSchema};

impl Record for DeviceConfiguration {
    fn schema() -> TableSchema {
        TableSchema::with_object_info("configurations", "cfg")
            .text("managementPolicy")
            .text("deviceTypes")
            .text("configuration")
            .in_use()
            .text("firmwareUpgrade")
            .boolean("firmwareRCOnly")
            .index("configuration_name_index", &[("name", IndexOrder::Asc)])
    }

    fn to_row(&self) -> Result<Row, RowError> {
        let mut row = Row::new();
        write_info(&mut row, &self.info)?;
        row.put_optional_id("managementPolicy", &self.management_policy)
            .put_json("deviceTypes", &self.device_types)?
            .put_json("configuration", &self.configuration)?
            .put_json("inUse", &self.in_use)?
            .put("firmwareUpgrade", self.firmware_upgrade.as_str())
            .put("firmwareRCOnly", self.firmware_rc_only);
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            info: read_info(row)?,
            management_policy: row.optional_id("managementPolicy")?,
            device_types: row.json("deviceTypes")?,
            configuration: row.json("configuration")?,
            in_use: row.json("inUse")?,
            firmware_upgrade: row.string("firmwareUpgrade")?,
            firmware_rc_only: row.boolean("firmwareRCOnly")?,
        })
    }
}
