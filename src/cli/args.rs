use clap::{value_parser, Parser, Subcommand};

use crate::models::wish::MAX_COOLING_DAYS;

#[derive(Parser, Debug)]
#[command(
    name = "wishcooler",
    version,
    author,
    about = "Cool down before you buy: track wishes and savings progress"
)]
pub struct Cli {
    /// Use the local database instead of the configured backend
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in as NICK (stored in the config file)
    Login {
        nick: String,
    },
    /// Log a new wish and start its cooling period
    Add {
        /// What you want to buy
        title: String,
        /// Price
        price: f64,
        /// Category (blocked categories are refused)
        #[arg(long, short, default_value = "")]
        category: String,
        /// Cooling period in days (defaults to the recommended period)
        #[arg(long, short, value_parser = value_parser!(u32).range(..=i64::from(MAX_COOLING_DAYS)))]
        days: Option<u32>,
    },
    /// List wishes with cooling and affordability progress
    List {
        /// active, completed or canceled
        #[arg(long, short, default_value = "active")]
        status: String,
    },
    /// Show completed and canceled wishes
    History,
    /// Mark a wish as bought
    Complete {
        id: String,
    },
    /// Give up on a wish
    Cancel {
        id: String,
    },
    /// Delete a wish permanently
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Ask about wishes whose cooling period is over
    Review,
    /// Show the recommended cooldown for a price without saving anything
    Quote {
        price: f64,
        #[arg(long, short, default_value = "")]
        category: String,
    },
    /// Financial profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Cooldown ranges and notification preferences
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
    /// Send a test notification
    Notify {
        #[arg(long, default_value = "Wish cooler")]
        title: String,
        #[arg(long, default_value = "Test notification")]
        message: String,
        #[arg(long = "type", default_value = "test")]
        kind: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show the profile
    Show,
    /// Update profile fields; omitted fields keep their value
    Set {
        #[arg(long)]
        salary: Option<f64>,
        /// Current savings
        #[arg(long)]
        savings: Option<f64>,
        /// Amount put aside each month
        #[arg(long)]
        monthly: Option<f64>,
        /// Blocked categories, comma-separated
        #[arg(long)]
        blocked: Option<String>,
        /// Share of savings kept as a cushion, 0 to <1
        #[arg(long)]
        comfort: Option<f64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show settings
    Show,
    /// Update notification preferences; omitted fields keep their value
    Set {
        #[arg(long)]
        frequency: Option<String>,
        #[arg(long)]
        channel: Option<String>,
        /// Excluded products, comma-separated
        #[arg(long)]
        excluded: Option<String>,
        #[arg(long)]
        monthly_saving: Option<f64>,
        #[arg(long)]
        total_spent: Option<f64>,
    },
    /// Add a price range; both bounds inclusive
    AddRange {
        /// Lower bound
        min: f64,
        /// Upper bound (omit for no limit)
        #[arg(long)]
        max: Option<f64>,
        /// Cooling period in days
        #[arg(long)]
        days: u32,
    },
    /// Remove all price ranges
    ClearRanges,
}
