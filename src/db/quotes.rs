//! The quotes table: schema, seed rows, and the work items that provision
//! them.
//!
//! Table creation is guarded by `IF NOT EXISTS`; seed rows are keyed by
//! `customer_email` and inserted with a `WHERE NOT EXISTS` guard, so a
//! re-run never duplicates rows even though the table carries no unique
//! constraint on that column.

use crate::db::Db;
use crate::error::{Error, Result};
use crate::model::{Action, WorkItem};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const TABLE: &str = "quotes";

pub const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS quotes (
    id SERIAL PRIMARY KEY,
    customer_name VARCHAR(255) NOT NULL,
    customer_email VARCHAR(255) NOT NULL,
    business_name VARCHAR(255),
    phone VARCHAR(50),
    package VARCHAR(100) NOT NULL,
    package_price INTEGER NOT NULL,
    payment_type VARCHAR(50) DEFAULT 'full',
    message TEXT,
    stripe_session_id VARCHAR(255),
    payment_status VARCHAR(50) DEFAULT 'pending',
    amount_paid INTEGER DEFAULT 0,
    source VARCHAR(100) DEFAULT 'website',
    utm_source VARCHAR(100),
    utm_medium VARCHAR(100),
    utm_campaign VARCHAR(100),
    ip_address VARCHAR(50),
    user_agent TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    paid_at TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

const INSERT_QUOTE_SQL: &str = "INSERT INTO quotes (customer_name, customer_email, business_name, phone, package, package_price, payment_type, message, payment_status, source, utm_source, utm_medium, utm_campaign)
     SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13
     WHERE NOT EXISTS (SELECT 1 FROM quotes WHERE customer_email = $2)";

/// A seed row for the quotes table. Payment tracking, request metadata and
/// timestamps are left to column defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuote {
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub package: String,
    /// Price in cents.
    pub package_price: i32,
    #[serde(default = "default_payment_type")]
    pub payment_type: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_payment_status")]
    pub payment_status: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub utm_campaign: Option<String>,
}

fn default_payment_type() -> String {
    "full".to_string()
}

fn default_payment_status() -> String {
    "pending".to_string()
}

fn default_source() -> String {
    "website".to_string()
}

impl Db {
    /// Does the quotes table exist in the current search path?
    pub async fn quotes_table_exists(&self) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as("SELECT to_regclass($1) IS NOT NULL")
            .bind(TABLE)
            .fetch_one(self.pool())
            .await?;
        Ok(exists)
    }

    pub async fn create_quotes_table(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(self.pool())
            .await
            .map_err(|e| Error::Provisioning(format!("create table {TABLE}: {e}")))?;
        Ok(())
    }

    /// Whether a quote with this customer email is already stored. False
    /// when the table does not exist yet.
    pub async fn quote_exists(&self, customer_email: &str) -> Result<bool> {
        if !self.quotes_table_exists().await? {
            return Ok(false);
        }
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM quotes WHERE customer_email = $1)")
                .bind(customer_email)
                .fetch_one(self.pool())
                .await?;
        Ok(exists)
    }

    /// Insert `quote` unless a row with its email exists. Returns whether a
    /// row was written.
    pub async fn insert_quote(&self, quote: &NewQuote) -> Result<bool> {
        let rows_affected = sqlx::query(INSERT_QUOTE_SQL)
            .bind(&quote.customer_name)
            .bind(&quote.customer_email)
            .bind(&quote.business_name)
            .bind(&quote.phone)
            .bind(&quote.package)
            .bind(quote.package_price)
            .bind(&quote.payment_type)
            .bind(&quote.message)
            .bind(&quote.payment_status)
            .bind(&quote.source)
            .bind(&quote.utm_source)
            .bind(&quote.utm_medium)
            .bind(&quote.utm_campaign)
            .execute(self.pool())
            .await
            .map_err(|e| {
                Error::Provisioning(format!("insert quote {}: {e}", quote.customer_email))
            })?
            .rows_affected();
        Ok(rows_affected > 0)
    }

    pub async fn count_quotes(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM quotes")
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}

/// Create the quotes table.
#[derive(Debug, Clone)]
pub struct CreateQuotesTable {
    db: Db,
}

impl CreateQuotesTable {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Action for CreateQuotesTable {
    fn kind(&self) -> &'static str {
        "sql"
    }

    async fn preflight(&self) -> Result<()> {
        self.db
            .health_check()
            .await
            .map_err(|e| Error::Precondition(format!("database is unreachable: {e}")))
    }

    async fn is_provisioned(&self) -> Result<bool> {
        self.db.quotes_table_exists().await
    }

    async fn provision(&self) -> Result<bool> {
        self.db.create_quotes_table().await?;
        Ok(true)
    }
}

/// Insert one seed quote, keyed by customer email.
#[derive(Debug, Clone)]
pub struct InsertQuote {
    db: Db,
    quote: NewQuote,
}

impl InsertQuote {
    pub fn new(db: Db, quote: NewQuote) -> Self {
        Self { db, quote }
    }
}

#[async_trait]
impl Action for InsertQuote {
    fn kind(&self) -> &'static str {
        "sql"
    }

    async fn is_provisioned(&self) -> Result<bool> {
        self.db.quote_exists(&self.quote.customer_email).await
    }

    async fn provision(&self) -> Result<bool> {
        self.db.insert_quote(&self.quote).await
    }
}

/// Table creation first, then one insert per seed, in seed order.
pub fn quote_items(db: &Db, seeds: &[NewQuote]) -> Vec<WorkItem> {
    let mut items = Vec::with_capacity(seeds.len() + 1);
    items.push(WorkItem::new(
        format!("table:{TABLE}"),
        TABLE,
        CreateQuotesTable::new(db.clone()),
    ));
    for seed in seeds {
        items.push(WorkItem::new(
            format!("quote:{}", seed.customer_email),
            format!("{TABLE}.customer_email={}", seed.customer_email),
            InsertQuote::new(db.clone(), seed.clone()),
        ));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_identity_plus_twenty_columns() {
        let columns = CREATE_TABLE_SQL
            .lines()
            .skip(1)
            .filter(|line| !line.trim().is_empty() && line.trim() != ")")
            .count();
        assert_eq!(columns, 21);
        assert!(CREATE_TABLE_SQL.starts_with("CREATE TABLE IF NOT EXISTS quotes"));
    }

    #[test]
    fn insert_is_guarded_by_email() {
        assert!(INSERT_QUOTE_SQL.contains("WHERE NOT EXISTS"));
        assert!(INSERT_QUOTE_SQL.contains("customer_email = $2"));
    }
}
