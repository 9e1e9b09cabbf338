use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

use crate::models::{Notification, Settings, UserProfile, Wish, WishStatus};

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("Bad timestamp '{}': {}", s, e))
}

// ─── Wishes ──────────────────────────────────────────────────────────────────

pub struct WishRepo;

impl WishRepo {
    pub fn insert(conn: &Connection, nick: &str, wish: &Wish) -> Result<()> {
        let created = wish.created_at.unwrap_or_else(Utc::now);
        let updated = wish.updated_at.unwrap_or(created);
        conn.execute(
            "INSERT INTO wishes
                (id, nick, title, price, category, cooling_days, recommended_cooling,
                 still_want, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                wish.id,
                nick,
                wish.title,
                wish.price,
                wish.category,
                wish.cooling_days,
                wish.recommended_cooling,
                wish.still_want,
                wish.status.as_str(),
                created.to_rfc3339(),
                updated.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list(conn: &Connection, nick: &str, status: WishStatus) -> Result<Vec<Wish>> {
        let mut stmt = conn.prepare(
            "SELECT id, title, price, category, cooling_days, recommended_cooling,
                    still_want, status, created_at, updated_at
             FROM wishes WHERE nick = ?1 AND status = ?2
             ORDER BY created_at DESC, rowid DESC",
        )?;

        let rows = stmt.query_map(params![nick, status.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, u32>(5)?,
                row.get::<_, bool>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, String>(9)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (
                id,
                title,
                price,
                category,
                cooling,
                recommended,
                still_want,
                status,
                created,
                updated,
            ) = r?;
            result.push(Wish {
                id,
                title,
                price,
                category,
                created_at: Some(parse_timestamp(&created)?),
                updated_at: Some(parse_timestamp(&updated)?),
                cooling_days: cooling,
                recommended_cooling: recommended,
                still_want,
                status: WishStatus::from_str(&status)?,
                comfort_months: None,
            });
        }
        Ok(result)
    }

    pub fn get_status(conn: &Connection, nick: &str, id: &str) -> Result<Option<WishStatus>> {
        let status = conn
            .query_row(
                "SELECT status FROM wishes WHERE nick = ?1 AND id = ?2",
                params![nick, id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        status.map(|s| WishStatus::from_str(&s)).transpose()
    }

    pub fn set_status(conn: &Connection, nick: &str, id: &str, status: WishStatus) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE wishes SET status = ?1, updated_at = ?2 WHERE nick = ?3 AND id = ?4",
            params![status.as_str(), Utc::now().to_rfc3339(), nick, id],
        )?;
        Ok(changed > 0)
    }

    pub fn delete(conn: &Connection, nick: &str, id: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM wishes WHERE nick = ?1 AND id = ?2",
            params![nick, id],
        )?;
        Ok(changed > 0)
    }
}

// ─── Profiles ────────────────────────────────────────────────────────────────

pub struct ProfileRepo;

impl ProfileRepo {
    pub fn get(conn: &Connection, nick: &str) -> Result<Option<UserProfile>> {
        let row = conn
            .query_row(
                "SELECT salary, total_savings, monthly_saving, blocked_categories, comfort_percent
                 FROM profiles WHERE nick = ?1",
                params![nick],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, f64>(4)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((salary, savings, monthly, blocked, comfort)) => Ok(Some(UserProfile {
                nick: nick.to_string(),
                salary,
                total_savings_profile: savings,
                monthly_saving_profile: monthly,
                blocked_categories: serde_json::from_str(&blocked)
                    .context("Decoding blocked categories")?,
                comfort_percent: comfort,
            })),
        }
    }

    pub fn upsert(conn: &Connection, nick: &str, profile: &UserProfile) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO profiles
                (nick, salary, total_savings, monthly_saving, blocked_categories, comfort_percent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                nick,
                profile.salary,
                profile.total_savings_profile,
                profile.monthly_saving_profile,
                serde_json::to_string(&profile.blocked_categories)?,
                profile.comfort_percent,
            ],
        )?;
        Ok(())
    }
}

// ─── Settings ────────────────────────────────────────────────────────────────

pub struct SettingsRepo;

impl SettingsRepo {
    pub fn get(conn: &Connection, nick: &str) -> Result<Option<Settings>> {
        let body = conn
            .query_row(
                "SELECT body FROM settings WHERE nick = ?1",
                params![nick],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        body.map(|b| serde_json::from_str(&b).context("Decoding stored settings"))
            .transpose()
    }

    pub fn upsert(conn: &Connection, nick: &str, settings: &Settings) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO settings (nick, body) VALUES (?1, ?2)",
            params![nick, serde_json::to_string(settings)?],
        )?;
        Ok(())
    }
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub struct NotificationRepo;

impl NotificationRepo {
    pub fn record(conn: &Connection, nick: &str, n: &Notification) -> Result<()> {
        conn.execute(
            "INSERT INTO notifications (nick, kind, title, message) VALUES (?1, ?2, ?3, ?4)",
            params![nick, n.kind, n.title, n.message],
        )?;
        Ok(())
    }
}
