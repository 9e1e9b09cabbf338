use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use std::path::Path;

use crate::db::migrations::run_migrations;
use crate::db::repository::{NotificationRepo, ProfileRepo, SettingsRepo, WishRepo};
use crate::models::{NewWish, Notification, Settings, UserProfile, Wish, WishAction, WishStatus};
use crate::store::WishStore;
use crate::utils::id::new_wish_id;

/// Offline store: the same operations as the REST backend, kept in SQLite.
pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Opening database at {:?}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        run_migrations(&conn)?;
        Ok(Self { conn })
    }
}

impl WishStore for LocalStore {
    fn load_profile(&self, nick: &str) -> Result<UserProfile> {
        Ok(ProfileRepo::get(&self.conn, nick)?.unwrap_or_else(|| UserProfile::empty(nick)))
    }

    fn save_profile(&self, nick: &str, profile: &UserProfile) -> Result<()> {
        ProfileRepo::upsert(&self.conn, nick, profile)?;
        log::info!("Saved profile for {}", nick);
        Ok(())
    }

    fn list_wishes(&self, nick: &str, status: Option<WishStatus>) -> Result<Vec<Wish>> {
        WishRepo::list(&self.conn, nick, status.unwrap_or_default())
    }

    fn add_wish(&self, nick: &str, wish: &NewWish) -> Result<Wish> {
        let wish = wish.clone().into_wish(new_wish_id(), Utc::now());
        WishRepo::insert(&self.conn, nick, &wish)?;
        log::info!("Added wish {} for {}", wish.id, nick);
        Ok(wish)
    }

    fn apply_action(&self, nick: &str, id: &str, action: WishAction) -> Result<()> {
        let current = WishRepo::get_status(&self.conn, nick, id)?
            .ok_or_else(|| anyhow!("Wish '{}' not found", id))?;
        let next = current.apply(action)?;
        WishRepo::set_status(&self.conn, nick, id, next)?;
        log::info!("Wish {} set to {}", id, next.as_str());
        Ok(())
    }

    fn delete_wish(&self, nick: &str, id: &str) -> Result<()> {
        if !WishRepo::delete(&self.conn, nick, id)? {
            return Err(anyhow!("Wish '{}' not found", id));
        }
        log::info!("Removed wish {} for {}", id, nick);
        Ok(())
    }

    fn load_settings(&self, nick: &str) -> Result<Settings> {
        Ok(SettingsRepo::get(&self.conn, nick)?.unwrap_or_default())
    }

    fn save_settings(&self, nick: &str, settings: &Settings) -> Result<()> {
        SettingsRepo::upsert(&self.conn, nick, settings)
    }

    fn notify(&self, nick: &str, notification: &Notification) -> Result<()> {
        NotificationRepo::record(&self.conn, nick, notification)?;
        log::info!(
            "[notify] {} | {} | {}: {}",
            nick,
            notification.kind,
            notification.title,
            notification.message
        );
        Ok(())
    }
}
