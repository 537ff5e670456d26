use crate::table::{read_info, write_info, Record};
use fleetprov_model::{Contact, IndexOrder, Row, RowError, TableSchema};

impl Record for Contact {
    fn schema() -> TableSchema {
        TableSchema::with_object_info("contacts", "con")
            .text("type")
            .text("title")
            .text("salutation")
            .text("firstname")
            .text("lastname")
            .text("initials")
            .text("visual")
            .text("primaryEmail")
            .text("secondaryEmail")
            .text("mobiles")
            .text("phones")
            .text("accessPIN")
            .in_use()
            .text("entity")
            .index("contact_name_index", &[("name", IndexOrder::Asc)])
    }

    fn to_row(&self) -> Result<Row, RowError> {
        let mut row = Row::new();
        write_info(&mut row, &self.info)?;
        row.put("type", self.contact_type.as_str())
            .put("title", self.title.as_str())
            .put("salutation", self.salutation.as_str())
            .put("firstname", self.first_name.as_str())
            .put("lastname", self.last_name.as_str())
            .put("initials", self.initials.as_str())
            .put("visual", self.visual.as_str())
            .put("primaryEmail", self.primary_email.as_str())
            .put("secondaryEmail", self.secondary_email.as_str())
            .put_json("mobiles", &self.mobiles)?
            .put_json("phones", &self.phones)?
            .put("accessPIN", self.access_pin.as_str())
            .put_json("inUse", &self.in_use)?
            .put_optional_id("entity", &self.entity);
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            info: read_info(row)?,
            contact_type: row.string("type")?,
            title: row.string("title")?,
            salutation: row.string("salutation")?,
            first_name: row.string("firstname")?,
            last_name: row.string("lastname")?,
            initials: row.string("initials")?,
            visual: row.string("visual")?,
            primary_email: row.string("primaryEmail")?,
            secondary_email: row.string("secondaryEmail")?,
            mobiles: row.json("mobiles")?,
            phones: row.json("phones")?,
            access_pin: row.string("accessPIN")?,
            in_use: row.json("inUse")?,
            entity: row.optional_id("entity")?,
        })
    }
}
