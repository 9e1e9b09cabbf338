pub mod profile;
pub mod settings;
pub mod wish;

pub use profile::{parse_category_list, FinancialProfile, UserProfile};
pub use settings::{CooldownRange, Notification, Settings};
pub use wish::{NewWish, Wish, WishAction, WishStatus};
