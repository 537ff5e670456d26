use crate::table::{read_info, write_info, Record};
use fleetprov_model::{IndexOrder, RadiusEndpoint, Row, RowError, TableSchema};
use std::str::FromStr;

/// Parses an enum column, reporting failures against the column name.
fn parse_column<T: FromStr>(row: &Row, column: &str) -> Result<T, RowError>
where
    T::Err: std::fmt::Display,
{
    row.text(column)?.parse().map_err(|e: T::Err| RowError::Malformed {
        column: column.to_string(),
        reason: e.to_string(),
    })
}

impl Record for RadiusEndpoint {
    fn schema() -> TableSchema {
        TableSchema::with_object_info("radius_endpoints", "rep")
            .text("type")
            .text("poolStrategy")
            .text("radiusServers")
            .text("radsecServers")
            .text("index")
            .boolean("useGWProxy")
            .in_use()
            .index("radius_endpoint_name_index", &[("name", IndexOrder::Asc)])
    }

    fn to_row(&self) -> Result<Row, RowError> {
        let mut row = Row::new();
        write_info(&mut row, &self.info)?;
        row.put("type", self.endpoint_type.as_str())
            .put("poolStrategy", self.pool_strategy.as_str())
            .put_json("radiusServers", &self.radius_servers)?
            .put_json("radsecServers", &self.radsec_servers)?
            .put("index", self.index.as_str())
            .put("useGWProxy", self.use_gw_proxy)
            .put_json("inUse", &self.in_use)?;
        Ok(row)
    }

    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            info: read_info(row)?,
            endpoint_type: parse_column(row, "type")?,
            pool_strategy: parse_column(row, "poolStrategy")?,
            radius_servers: row.json("radiusServers")?,
            radsec_servers: row.json("radsecServers")?,
            index: row.string("index")?,
            use_gw_proxy: row.boolean("useGWProxy")?,
            in_use: row.json("inUse")?,
        })
    }
}
