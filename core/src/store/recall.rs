use super::{collect_rows, FactStore};
use crate::{
    error::AnalyticsResult,
    fact::TransmissionInstallFact,
    query::{InstallQuery, QueryContext},
    types::{PartSpecId, SupplierId},
};
use chrono::NaiveDate;
use rusqlite::params;

fn install_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<TransmissionInstallFact> {
    Ok(TransmissionInstallFact {
        vehicle_id:      row.get(0)?,
        vin:             row.get(1)?,
        model_name:      row.get(2)?,
        serial_number:   row.get(3)?,
        production_date: row.get(4)?,
        supplier_id:     row.get(5)?,
        supplier_name:   row.get(6)?,
        part_spec_id:    row.get(7)?,
        part_spec_name:  row.get(8)?,
        sale_id:         row.get(9)?,
        sale_date:       row.get(10)?,
        customer_name:   row.get(11)?,
    })
}

impl FactStore {
    // ── Transmission units ─────────────────────────────────────

    pub fn insert_transmission_unit(
        &self,
        part_spec_id: PartSpecId,
        supplier_id: SupplierId,
        serial_number: &str,
        production_date: NaiveDate,
    ) -> AnalyticsResult<i64> {
        self.conn.execute(
            "INSERT INTO transmission_unit (part_spec_id, supplier_id, serial_number, production_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![part_spec_id, supplier_id, serial_number, production_date],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(super) fn install_facts(
        &self,
        query: &InstallQuery,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<TransmissionInstallFact>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT vehicle_id, vin, model_name, serial_number, production_date,
                    supplier_id, supplier_name, part_spec_id, part_spec_name,
                    sale_id, sale_date, customer_name
             FROM v_transmission_installs
             WHERE (?1 IS NULL OR supplier_name = ?1)
               AND (?2 IS NULL OR production_date >= ?2)
               AND (?3 IS NULL OR production_date <= ?3)
             ORDER BY vin ASC",
        )?;
        let rows = stmt.query_map(
            params![
                query.supplier.as_deref(),
                query.produced_in.map(|r| r.start),
                query.produced_in.map(|r| r.end),
            ],
            install_row_mapper,
        )?;
        collect_rows(rows, ctx)
    }
}
