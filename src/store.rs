use anyhow::Result;

use crate::models::{NewWish, Notification, Settings, UserProfile, Wish, WishAction, WishStatus};

/// Backend operations the client needs, one per REST call.
pub trait WishStore {
    fn load_profile(&self, nick: &str) -> Result<UserProfile>;
    fn save_profile(&self, nick: &str, profile: &UserProfile) -> Result<()>;

    /// Wishes in `status`, or the active list when `None`.
    fn list_wishes(&self, nick: &str, status: Option<WishStatus>) -> Result<Vec<Wish>>;
    fn add_wish(&self, nick: &str, wish: &NewWish) -> Result<Wish>;
    fn apply_action(&self, nick: &str, id: &str, action: WishAction) -> Result<()>;
    fn delete_wish(&self, nick: &str, id: &str) -> Result<()>;

    fn load_settings(&self, nick: &str) -> Result<Settings>;
    fn save_settings(&self, nick: &str, settings: &Settings) -> Result<()>;

    fn notify(&self, nick: &str, notification: &Notification) -> Result<()>;

    /// Completed and canceled wishes, in that order.
    fn history(&self, nick: &str) -> Result<Vec<Wish>> {
        let mut out = self.list_wishes(nick, Some(WishStatus::Completed))?;
        out.extend(self.list_wishes(nick, Some(WishStatus::Canceled))?);
        Ok(out)
    }
}
