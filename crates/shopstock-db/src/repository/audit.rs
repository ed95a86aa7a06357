//! # Audit Trail Repository
//!
//! Write path for the immutable audit log plus a filtered read query for
//! the (out-of-scope) log viewer.
//!
//! Every mutating ledger operation appends one entry per affected line,
//! attributed to the acting user, on the operation's own transaction so
//! a rollback also discards the audit entries. The ledger itself never
//! reads entries back.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use shopstock_core::{Actor, AuditAction, AuditLogEntry};

const SELECT_COLUMNS: &str = "audit_id, user_id, username, action, entity_type, \
     entity_id, shop_id, product_id, details, created_at";

/// Repository for audit trail operations.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    /// Creates a new AuditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Appends one audit entry on the caller's transaction.
    ///
    /// Purely additive: entries are never updated or deleted, and a
    /// rolled-back transaction leaves no trace of them.
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn append_in(
        conn: &mut SqliteConnection,
        actor: &Actor,
        action: AuditAction,
        entity_type: &str,
        entity_id: Option<i64>,
        shop_id: Option<i64>,
        product_id: Option<i64>,
        details: &str,
    ) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO audit_logs
                (user_id, username, action, entity_type, entity_id,
                 shop_id, product_id, details, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(actor.user_id)
        .bind(&actor.username)
        .bind(action.as_str())
        .bind(entity_type)
        .bind(entity_id)
        .bind(shop_id)
        .bind(product_id)
        .bind(details)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Returns the most recent entries, newest first, optionally filtered
    /// by exact username, exact action, or a substring match against
    /// details/entity type/action.
    pub async fn recent(
        &self,
        limit: i64,
        username: Option<&str>,
        action: Option<&str>,
        contains: Option<&str>,
    ) -> DbResult<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM audit_logs
            WHERE (?1 IS NULL OR username = ?1)
              AND (?2 IS NULL OR action = ?2)
              AND (?3 IS NULL
                   OR details LIKE '%' || ?3 || '%'
                   OR entity_type LIKE '%' || ?3 || '%'
                   OR action LIKE '%' || ?3 || '%')
            ORDER BY audit_id DESC
            LIMIT ?4
            "#
        ))
        .bind(username)
        .bind(action)
        .bind(contains)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
