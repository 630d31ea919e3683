use super::{collect_rows, FactStore};
use crate::{
    error::AnalyticsResult,
    fact::InventoryDwellFact,
    query::{DwellQuery, QueryContext},
    types::{ColorId, DealerId, ModelId, VehicleId},
};
use chrono::NaiveDate;
use rusqlite::params;

fn dwell_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<InventoryDwellFact> {
    Ok(InventoryDwellFact {
        dealer_id:         row.get(0)?,
        dealer_name:       row.get(1)?,
        vehicle_id:        row.get(2)?,
        vin:               row.get(3)?,
        received_at:       row.get(4)?,
        sale_date:         row.get(5)?,
        days_in_inventory: row.get(6)?,
    })
}

impl FactStore {
    // ── Vehicle / inventory ────────────────────────────────────

    pub fn insert_vehicle(
        &self,
        vin: &str,
        model_id: ModelId,
        color_id: ColorId,
        transmission_unit_id: i64,
        manufacture_date: NaiveDate,
    ) -> AnalyticsResult<VehicleId> {
        self.conn.execute(
            "INSERT INTO vehicle (vin, model_id, color_id, transmission_unit_id, manufacture_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![vin, model_id, color_id, transmission_unit_id, manufacture_date],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_inventory_assignment(
        &self,
        vehicle_id: VehicleId,
        dealer_id: DealerId,
        received_at: NaiveDate,
    ) -> AnalyticsResult<()> {
        self.conn.execute(
            "INSERT INTO inventory_assignment (vehicle_id, dealer_id, received_at)
             VALUES (?1, ?2, ?3)",
            params![vehicle_id, dealer_id, received_at],
        )?;
        Ok(())
    }

    pub fn vehicle_count(&self) -> AnalyticsResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM vehicle", [], |row| row.get(0))?;
        Ok(count)
    }

    pub(super) fn dwell_facts(
        &self,
        query: &DwellQuery,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<InventoryDwellFact>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT dealer_id, dealer_name, vehicle_id, vin, received_at, sale_date,
                    days_in_inventory
             FROM v_dealer_inventory_dwell
             WHERE (?1 IS NULL OR (sale_date IS NOT NULL AND sale_date >= ?1))
               AND (?2 IS NULL OR (sale_date IS NOT NULL AND sale_date <= ?2))
               AND (?3 = 0 OR sale_date IS NULL)
               AND (?4 IS NULL OR dealer_id = ?4)
             ORDER BY vehicle_id ASC",
        )?;
        let rows = stmt.query_map(
            params![
                query.sold_in.map(|r| r.start),
                query.sold_in.map(|r| r.end),
                query.unsold_only,
                query.dealer_id,
            ],
            dwell_row_mapper,
        )?;
        collect_rows(rows, ctx)
    }
}
