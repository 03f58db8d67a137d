//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: patient profile and readings
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PATIENT PROFILE
        -- Single row; identity and clinical context for reports
        -- ============================================
        CREATE TABLE patient_profile (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            patient_id TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            diabetes_type TEXT NOT NULL,         -- type1, type2, gestational, or free text
            status TEXT NOT NULL DEFAULT 'stable'
                CHECK(status IN ('critical', 'warning', 'stable')),
            diagnosis_date TEXT,                 -- YYYY-MM-DD
            activity_level TEXT NOT NULL DEFAULT 'moderate'
                CHECK(activity_level IN ('low', 'moderate', 'high')),
            height_cm REAL,
            a1c REAL,                            -- percent
            compliance REAL,                     -- percent, 0-100
            meals_per_day INTEGER NOT NULL DEFAULT 3,
            insulin_injections INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- READINGS
        -- Time-stamped measurements
        -- ============================================
        CREATE TABLE readings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            metric TEXT NOT NULL CHECK(metric IN ('glucose', 'weight', 'insulin', 'blood_pressure')),
            recorded_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%S', 'now')),

            -- glucose: value = mmol/L
            -- weight: value = kg
            -- insulin: value = dose in units
            -- blood_pressure: value = systolic, value2 = diastolic
            value REAL,
            value2 REAL,
            unit TEXT NOT NULL,

            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_readings_metric ON readings(metric);
        CREATE INDEX idx_readings_recorded_at ON readings(recorded_at);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(needs_migration(&conn).unwrap_or(true));

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }
}
