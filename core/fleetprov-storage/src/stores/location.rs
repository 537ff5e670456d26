use crate::table::{read_info, write_info, Record};
use fleetprov_model::{IndexOrder, Location, Row, RowError, TableSchema};

impl Record for Location {
    fn schema() -> TableSchema {
        TableSchema::with_object_info("locations", "loc")
            .text("type")
            .text("buildingName")
            .text("addressLines")
            .text("city")
            .text("state")
            .text("postal")
            .text("country")
            .text("phones")
            .text("mobiles")
            .text("geoCode")
            .in_use()
            .text("entity")
            .index("location_name_index", &[("name", IndexOrder::Asc)])
    }

    fn to_row(&self) -> Result<Row, RowError> {
        let mut row = Row::new();
        write_info(&mut row, &self.info)?;
        row.put("type", self.location_type.as_str())
            .put("buildingName", self.building_name.as_str())
            .put_json("addressLines", &self.address_lines)?
            .put("city", self.city.as_str())
            .put("state", self.state.as_str())
            .put("postal", self.postal.as_str())
            .put("country", self.country.as_str())
            .put_json("phones", &self.phones)?
            .put_json("mobiles", &self.mobiles)?
            .put("geoCode", self.geo_code.as_str())
            .put_json("inUse", &self.in_use)?
            .put_optional_id("entity", &self.entity);
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            info: read_info(row)?,
            location_type: row.string("type")?,
            building_name: row.string("buildingName")?,
            address_lines: row.json("addressLines")?,
            city: row.string("city")?,
            state: row.string("state")?,
            postal: row.string("postal")?,
            country: row.string("country")?,
            phones: row.json("phones")?,
            mobiles: row.json("mobiles")?,
            geo_code: row.string("geoCode")?,
            in_use: row.json("inUse")?,
            entity: row.optional_id("entity")?,
        })
    }
}
