//! Database connection traits.
//!
//! RecordKit never talks to a driver directly. Everything that reaches the
//! storage engine goes through [`Connection`] or a transaction obtained from
//! it, as bound SQL plus parameters. All calls are synchronous and blocking;
//! request timeouts and cancellation belong to the hosting framework.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::row::Row;
use crate::value::Value;

/// A database connection capable of executing queries.
///
/// # Example
///
/// ```rust,ignore
/// let rows = conn.query("SELECT * FROM \"countries\" WHERE \"id\" = $1", &[Value::BigInt(1)])?;
///
/// let tx = conn.begin()?;
/// tx.execute("DELETE FROM \"countries\" WHERE \"id\" = $1", &[Value::BigInt(1)])?;
/// tx.commit()?;
/// ```
pub trait Connection: Send + Sync {
    /// The transaction type returned by this connection.
    type Tx<'conn>: TransactionOps
    where
        Self: 'conn;

    /// SQL dialect spoken by this connection.
    fn dialect(&self) -> Dialect;

    /// Execute a query and return all rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Execute a query and return the first row, if any.
    fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }

    /// Execute a statement (UPDATE, DELETE) and return rows affected.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Execute an INSERT and return the generated id.
    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64>;

    /// Begin a transaction.
    fn begin(&self) -> Result<Self::Tx<'_>>;
}

/// Operations available inside a transaction.
///
/// Transactions must be explicitly committed; implementations should roll
/// back when dropped unfinalized.
pub trait TransactionOps {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64>;

    /// Commit the transaction, making all changes permanent.
    fn commit(self) -> Result<()>;

    /// Rollback the transaction, discarding all changes.
    fn rollback(self) -> Result<()>;
}
