//! PostgreSQL order repository.
//!
//! Each `insert_batch` call opens its own connection, runs one multi-row
//! `INSERT` inside an explicit transaction and closes the connection again,
//! whatever the outcome.

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::postgres::PgDatabaseError;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};

use crate::domain::{Order, OrderRepository, RepositoryError};

/// DDL for the destination table.
pub const CREATE_ORDERS_TABLE: &str = r"CREATE TABLE IF NOT EXISTS orders (
    order_id VARCHAR(255) PRIMARY KEY,
    account_id VARCHAR(255) NOT NULL,
    created TIMESTAMP NOT NULL,
    delivery_planned_moment TIMESTAMP,
    external_code VARCHAR(255),
    name VARCHAR(255) NOT NULL,
    payed_sum NUMERIC(10, 2),
    shipment_address TEXT,
    raw_response JSON NOT NULL
)";

const INSERT_PREFIX: &str = "INSERT INTO orders (order_id, account_id, created, \
     delivery_planned_moment, external_code, name, payed_sum, shipment_address, raw_response) ";

/// Bind parameters per order row.
const COLUMNS_PER_ROW: usize = 9;

/// Postgres wire protocol limit on bind parameters per statement.
const MAX_BIND_PARAMS: usize = 65_535;

/// Largest batch a single `INSERT` can carry.
pub const MAX_BATCH_ROWS: usize = MAX_BIND_PARAMS / COLUMNS_PER_ROW;

/// `OrderRepository` backed by a PostgreSQL `orders` table.
#[derive(Debug, Clone)]
pub struct PostgresOrderRepository {
    database_url: String,
}

impl PostgresOrderRepository {
    /// Create a repository for the given `postgresql://` URL.
    ///
    /// No connection is made until the first call.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Create the `orders` table if it does not exist yet.
    pub async fn create_table(&self) -> Result<(), RepositoryError> {
        let mut conn = self.connect().await?;

        let result = sqlx::query(CREATE_ORDERS_TABLE)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_sqlx_error);

        close(conn).await;
        result
    }

    async fn connect(&self) -> Result<PgConnection, RepositoryError> {
        PgConnection::connect(&self.database_url)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))
    }

    async fn insert_in_transaction(
        conn: &mut PgConnection,
        orders: &[Order],
    ) -> Result<usize, RepositoryError> {
        let mut tx = conn.begin().await.map_err(map_sqlx_error)?;

        let mut builder = build_insert(orders);
        match builder.build().execute(&mut *tx).await {
            Ok(done) => {
                tx.commit().await.map_err(map_sqlx_error)?;
                Ok(usize::try_from(done.rows_affected()).unwrap_or(orders.len()))
            }
            Err(e) => {
                let err = map_sqlx_error(e);
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn insert_batch(&self, orders: &[Order]) -> Result<usize, RepositoryError> {
        if orders.is_empty() {
            return Ok(0);
        }
        if orders.len() > MAX_BATCH_ROWS {
            return Err(RepositoryError::BatchTooLarge {
                rows: orders.len(),
                max_rows: MAX_BATCH_ROWS,
            });
        }

        let mut conn = self.connect().await?;
        let result = Self::insert_in_transaction(&mut conn, orders).await;
        close(conn).await;

        match &result {
            Ok(rows) => tracing::info!(rows, "Orders inserted"),
            Err(e) => tracing::error!(
                error = %e,
                batch_size = orders.len(),
                "Order insert rolled back"
            ),
        }

        result
    }
}

/// Build one multi-row `INSERT` for the whole batch.
fn build_insert(orders: &[Order]) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(INSERT_PREFIX);
    builder.push_values(orders, |mut row, order| {
        row.push_bind(&order.order_id)
            .push_bind(&order.account_id)
            .push_bind(order.created)
            .push_bind(order.delivery_planned_moment)
            .push_bind(order.external_code.as_deref())
            .push_bind(&order.name)
            .push_bind(order.payed_sum)
            .push_bind(order.shipment_address.as_deref())
            .push_bind(order.raw_response.as_value().to_string())
            .push_unseparated("::json");
    });
    builder
}

async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "Failed to close database connection");
    }
}

fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db) => {
            let message = db.message().to_string();
            match db.kind() {
                ErrorKind::UniqueViolation => db
                    .try_downcast_ref::<PgDatabaseError>()
                    .and_then(PgDatabaseError::detail)
                    .and_then(duplicate_order_id)
                    .map_or(RepositoryError::Constraint(message), |order_id| {
                        RepositoryError::DuplicateOrderId { order_id }
                    }),
                ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => RepositoryError::Constraint(message),
                _ => RepositoryError::Query(message),
            }
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => RepositoryError::Connection(err.to_string()),
        other => RepositoryError::Query(other.to_string()),
    }
}

/// Pull the key out of `Key (order_id)=(abc-1) already exists.`
fn duplicate_order_id(detail: &str) -> Option<String> {
    detail
        .strip_prefix("Key (order_id)=(")?
        .strip_suffix(") already exists.")
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::domain::RawResponse;

    fn order(id: &str) -> Order {
        Order {
            order_id: id.to_string(),
            account_id: "acc-9".to_string(),
            created: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            delivery_planned_moment: None,
            external_code: Some("ext".to_string()),
            name: "Order #1".to_string(),
            payed_sum: Some(dec!(150.50)),
            shipment_address: None,
            raw_response: RawResponse::new(json!({ "id": id })),
        }
    }

    #[test]
    fn insert_covers_every_row_in_one_statement() {
        let orders = [order("a"), order("b")];
        let builder = build_insert(&orders);
        let sql = builder.sql();

        assert!(sql.starts_with("INSERT INTO orders (order_id, account_id, created,"));
        assert_eq!(sql.matches("INSERT").count(), 1);
        assert!(sql.contains("VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::json)"));
        assert!(sql.contains("($10, $11,"));
        assert!(sql.ends_with("$18::json)"));
    }

    #[test]
    fn duplicate_order_id_from_detail() {
        assert_eq!(
            duplicate_order_id("Key (order_id)=(abc-1) already exists."),
            Some("abc-1".to_string())
        );
        assert_eq!(duplicate_order_id("Key (name)=(x) already exists."), None);
    }

    #[test]
    fn max_batch_rows_fits_bind_limit() {
        assert_eq!(MAX_BATCH_ROWS, 7281);
        assert!(MAX_BATCH_ROWS * COLUMNS_PER_ROW <= MAX_BIND_PARAMS);
    }

    #[test]
    fn io_errors_map_to_connection() {
        let err = map_sqlx_error(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        )));
        assert!(matches!(err, RepositoryError::Connection(_)));
    }

    #[tokio::test]
    async fn empty_batch_never_connects() {
        let repo = PostgresOrderRepository::new("postgresql://nobody@127.0.0.1:1/none");
        assert_eq!(repo.insert_batch(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn oversized_batch_is_rejected_before_connecting() {
        let repo = PostgresOrderRepository::new("postgresql://nobody@127.0.0.1:1/none");
        let orders = vec![order("a"); MAX_BATCH_ROWS + 1];

        let err = repo.insert_batch(&orders).await.unwrap_err();

        assert_eq!(
            err,
            RepositoryError::BatchTooLarge {
                rows: MAX_BATCH_ROWS + 1,
                max_rows: MAX_BATCH_ROWS,
            }
        );
    }

    #[tokio::test]
    async fn unreachable_database_is_connection_error() {
        let repo = PostgresOrderRepository::new("postgresql://nobody@127.0.0.1:1/none");
        let err = repo.insert_batch(&[order("a")]).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Connection(_)));
    }
}
