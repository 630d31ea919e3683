use super::{collect_rows, money_at, opt_money_at, FactStore};
use crate::{
    error::AnalyticsResult,
    fact::{Gender, SaleFact},
    query::{QueryContext, SaleQuery},
    types::{CustomerId, DealerId, Money, SaleId, VehicleId},
};
use chrono::NaiveDate;
use rusqlite::params;

// Helper function for mapping v_sales_detail rows
fn sale_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<SaleFact> {
    Ok(SaleFact {
        sale_id:         row.get(0)?,
        sale_date:       row.get(1)?,
        sale_price:      money_at(row, 2)?,
        vehicle_id:      row.get(3)?,
        model_id:        row.get(4)?,
        model_name:      row.get(5)?,
        brand_id:        row.get(6)?,
        brand_name:      row.get(7)?,
        color_id:        row.get(8)?,
        customer_id:     row.get(9)?,
        customer_gender: Gender::from_code(&row.get::<_, String>(10)?),
        customer_income: opt_money_at(row, 11)?,
        dealer_id:       row.get(12)?,
        dealer_name:     row.get(13)?,
    })
}

impl FactStore {
    // ── Sale ───────────────────────────────────────────────────

    pub fn insert_sale(
        &self,
        vehicle_id: VehicleId,
        dealer_id: DealerId,
        customer_id: CustomerId,
        sale_date: NaiveDate,
        sale_price: Money,
    ) -> AnalyticsResult<SaleId> {
        self.conn.execute(
            "INSERT INTO sale (vehicle_id, dealer_id, customer_id, sale_date, sale_price)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![vehicle_id, dealer_id, customer_id, sale_date, sale_price.to_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn sale_count(&self) -> AnalyticsResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sale", [], |row| row.get(0))?;
        Ok(count)
    }

    pub(super) fn sale_facts(
        &self,
        query: &SaleQuery,
        ctx: &QueryContext,
    ) -> AnalyticsResult<Vec<SaleFact>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT sale_id, sale_date, sale_price, vehicle_id, model_id, model_name,
                    brand_id, brand_name, color_id, customer_id, customer_gender,
                    customer_income, dealer_id, dealer_name
             FROM v_sales_detail
             WHERE (?1 IS NULL OR sale_date >= ?1)
               AND (?2 IS NULL OR sale_date <= ?2)
               AND (?3 IS NULL OR brand_name = ?3)
               AND (?4 IS NULL OR model_name = ?4)
             ORDER BY sale_id ASC",
        )?;
        let rows = stmt.query_map(
            params![
                query.range.map(|r| r.start),
                query.range.map(|r| r.end),
                query.brand.as_deref(),
                query.model.as_deref(),
            ],
            sale_row_mapper,
        )?;
        collect_rows(rows, ctx)
    }
}
