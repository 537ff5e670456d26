use crate::table::{read_info, write_info, Record};
use fleetprov_model::{IndexOrder, ManagementRole, Row, RowError, TableSchema};

impl Record for ManagementRole {
    fn schema() -> TableSchema {
        TableSchema::with_object_info("roles", "rol")
            .text("managementPolicy")
            .text("users")
            .in_use()
            .text("entity")
            .index("role_name_index", &[("name", IndexOrder::Asc)])
    }

    fn to_row(&self) -> Result<Row, RowError> {
        let mut row = Row::new();
        write_info(&mut row, &self.info)?;
        row.put_optional_id("managementPolicy", &self.management_policy)
            .put_json("users", &self.users)?
            .put_json("inUse", &self.in_use)?
            .put_optional_id("entity", &self.entity);
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            info: read_info(row)?,
            management_policy: row.optional_id("managementPolicy")?,
            users: row.json("users")?,
            in_use: row.json("inUse")?,
            entity: row.optional_id("entity")?,
        })
    }
}
