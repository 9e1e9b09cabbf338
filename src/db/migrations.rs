use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS wishes (
            id                  TEXT PRIMARY KEY,
            nick                TEXT NOT NULL,
            title               TEXT NOT NULL,
            price               REAL NOT NULL CHECK(price > 0),
            category            TEXT NOT NULL,
            cooling_days        INTEGER NOT NULL DEFAULT 0,
            recommended_cooling INTEGER NOT NULL DEFAULT 0,
            still_want          INTEGER NOT NULL DEFAULT 1,
            status              TEXT NOT NULL DEFAULT 'active'
                                CHECK(status IN ('active','completed','canceled')),
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_wishes_nick_status ON wishes(nick, status);

        CREATE TABLE IF NOT EXISTS profiles (
            nick                TEXT PRIMARY KEY,
            salary              REAL NOT NULL DEFAULT 0,
            total_savings       REAL NOT NULL DEFAULT 0,
            monthly_saving      REAL NOT NULL DEFAULT 0,
            blocked_categories  TEXT NOT NULL DEFAULT '[]',
            comfort_percent     REAL NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS settings (
            nick  TEXT PRIMARY KEY,
            body  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS notifications (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            nick        TEXT NOT NULL,
            kind        TEXT NOT NULL,
            title       TEXT NOT NULL,
            message     TEXT NOT NULL,
            created_at  TEXT DEFAULT (datetime('now'))
        );
    ")?;
    Ok(())
}
