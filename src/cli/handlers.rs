use anyhow::{bail, Result};
use chrono::{DateTime, Local, Utc};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::calculator::{
    afford_date, comfort_months, months_to_afford, quote, validate_ranges, Affordability, Quote,
};
use crate::cli::args::{ProfileCommands, SettingsCommands};
use crate::config::AppConfig;
use crate::models::wish::MAX_COOLING_DAYS;
use crate::models::{
    parse_category_list, FinancialProfile, NewWish, Notification, Settings, UserProfile, Wish,
    WishAction, WishStatus,
};
use crate::store::WishStore;
use crate::utils::format::{format_date, format_money, format_remaining_secs, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const FROST: &str = "\x1b[38;2;120;180;220m";

// ─── Login ───────────────────────────────────────────────────────────────────

pub fn handle_login(config: &mut AppConfig, nick: &str) -> Result<()> {
    let nick = nick.trim();
    if nick.is_empty() {
        bail!("Nick must not be empty");
    }
    config.api.nick = Some(nick.to_string());
    config.save()?;
    println_colored!(GREEN, "  ✓ Signed in as {}", nick);
    Ok(())
}

// ─── Add wish ────────────────────────────────────────────────────────────────

/// A validated wish ready to submit, with the numbers behind its cooldown.
#[derive(Debug)]
pub struct WishPlan {
    pub wish: NewWish,
    pub quote: Quote,
}

/// Profile blocked list plus the settings' excluded products and the
/// always-blocked categories from config.
fn financial_view(
    profile: &UserProfile,
    settings: &Settings,
    config: &AppConfig,
) -> FinancialProfile {
    let mut financial = profile.financial();
    financial.blocked_categories.extend(settings.excluded_list());
    financial
        .blocked_categories
        .extend(config.cooldown.blocked_categories.iter().cloned());
    financial
}

pub fn plan_wish(
    store: &dyn WishStore,
    config: &AppConfig,
    nick: &str,
    title: &str,
    price: f64,
    category: &str,
    days: Option<u32>,
) -> Result<WishPlan> {
    if let Some(days) = days.filter(|d| *d > MAX_COOLING_DAYS) {
        bail!("Cooling period of {} days is too long (at most {})", days, MAX_COOLING_DAYS);
    }
    let draft = NewWish::new(title, price, category, 0, 0)?;
    let profile = store.load_profile(nick)?;
    let settings = store.load_settings(nick)?;
    let financial = financial_view(&profile, &settings, config);

    let quote = quote(
        draft.price,
        &draft.category,
        &financial,
        &settings.cooldowns,
        config.cooldown.fallback_days,
    );
    if quote.blocked {
        bail!("Category '{}' is blocked for deferred wishes", draft.category);
    }

    let recommended = quote
        .recommended
        .reachable_days()
        .unwrap_or_else(|| quote.bracket_days());
    let wish = NewWish {
        cooling_days: days.unwrap_or(recommended),
        recommended_cooling: recommended,
        ..draft
    };
    Ok(WishPlan { wish, quote })
}

pub fn handle_add(
    store: &dyn WishStore,
    config: &AppConfig,
    nick: &str,
    title: &str,
    price: f64,
    category: &str,
    days: Option<u32>,
) -> Result<()> {
    let plan = plan_wish(store, config, nick, title, price, category, days)?;
    let created = store.add_wish(nick, &plan.wish)?;

    println!();
    println_colored!(
        GREEN,
        "  ✓ Added \"{}\" ({}) [{}]",
        created.title,
        format_money(created.price),
        created.id
    );
    println!(
        "  Cooling for {} days (recommended: {})",
        created.cooling_days, plan.quote.recommended
    );
    if plan.quote.recommended.is_unreachable() {
        println_colored!(
            AMBER,
            "  Not affordable with your current savings plan: set a monthly allocation with `profile set --monthly`"
        );
    }
    println!();
    Ok(())
}

// ─── Lists ───────────────────────────────────────────────────────────────────

fn print_wish(wish: &Wish, profile: &UserProfile, now: DateTime<Utc>) {
    println_colored!(
        BOLD,
        "  {}  {}",
        wish.title,
        format_money(wish.price)
    );
    println_colored!(DIM, "    {}  ·  {}  ·  {}", wish.id, wish.category, wish.status.as_str());

    if wish.status == WishStatus::Active {
        match wish.cooling_until() {
            Some(until) if until > now => println!(
                "    Cooling:  {} left (until {})",
                format_remaining_secs((until - now).num_seconds()),
                format_date(until)
            ),
            None if !wish.is_cooled(now) => {
                println!("    Cooling:  {} days, longer than the calendar", wish.cooling_days)
            }
            _ => println_colored!(
                FROST,
                "    Cooling:  cooled ❄ (recommended {} days)",
                wish.recommended_cooling
            ),
        }

        let financial = profile.financial();
        let savings = financial.total_savings;
        let affordability = months_to_afford(wish.price, savings, financial.monthly_allocation);
        let created = wish.created_at.unwrap_or(now).with_timezone(&Local).date_naive();
        let ratio = if wish.price > 0.0 { savings / wish.price } else { 1.0 };
        let when = match (affordability, afford_date(created, affordability)) {
            (Affordability::Months(0), _) => "affordable now".to_string(),
            (_, Some(date)) => format!("in {} (by {})", affordability, date.format("%Y-%m-%d")),
            (_, None) => "unreachable: save more or set a monthly allocation".to_string(),
        };
        println!(
            "    Savings:  {} {:>3.0}%  {}",
            progress_bar(ratio, 16),
            ratio.clamp(0.0, 1.0) * 100.0,
            when
        );

        if profile.comfort_percent > 0.0 {
            let comfort = comfort_months(
                wish.price,
                savings,
                financial.monthly_allocation,
                profile.comfort_percent,
            );
            println_colored!(
                DIM,
                "    Keeping {:.0}% as a cushion: {}",
                profile.comfort_percent * 100.0,
                comfort
            );
        }
    }
}

pub fn handle_list(store: &dyn WishStore, nick: &str, status: &str) -> Result<()> {
    let status = WishStatus::from_str(status)?;
    let wishes = store.list_wishes(nick, Some(status))?;
    let profile = store.load_profile(nick)?;
    let now = Utc::now();

    println!();
    println_colored!(FROST, "  {} wishes — {}", status.display_name(), nick);
    println!();
    if wishes.is_empty() {
        println_colored!(AMBER, "  No {} wishes yet. Add your first one!", status.as_str());
        println!();
        return Ok(());
    }
    for wish in &wishes {
        print_wish(wish, &profile, now);
        println!();
    }
    let total: f64 = wishes.iter().map(|w| w.price).sum();
    println_colored!(
        BOLD,
        "  {} wishes, {} in total",
        wishes.len(),
        format_money(total)
    );
    println!();
    Ok(())
}

pub fn handle_history(store: &dyn WishStore, nick: &str) -> Result<()> {
    let history = store.history(nick)?;
    println!();
    println_colored!(FROST, "  History — {}", nick);
    println!();
    if history.is_empty() {
        println_colored!(DIM, "  No history yet");
    }
    for wish in &history {
        let (color, mark) = match wish.status {
            WishStatus::Completed => (GREEN, "✓"),
            _ => (DIM, "✗"),
        };
        let date = wish
            .updated_at
            .or(wish.created_at)
            .map(format_date)
            .unwrap_or_default();
        println_colored!(
            color,
            "  {} {:<30}  {:>12}  {}  {}",
            mark,
            wish.title,
            format_money(wish.price),
            wish.status.as_str(),
            date
        );
    }
    println!();
    Ok(())
}

// ─── Status changes ──────────────────────────────────────────────────────────

pub fn handle_action(
    store: &dyn WishStore,
    nick: &str,
    id: &str,
    action: WishAction,
) -> Result<()> {
    store.apply_action(nick, id, action)?;
    match action {
        WishAction::Complete => println_colored!(GREEN, "  ✓ Wish {} marked as bought", id),
        WishAction::Cancel => println_colored!(DIM, "  ✗ Wish {} canceled", id),
    }
    Ok(())
}

pub fn handle_delete(store: &dyn WishStore, nick: &str, id: &str, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("  Delete wish {}? [y/N] ", id))? {
        println_colored!(DIM, "  Nothing deleted");
        return Ok(());
    }
    store.delete_wish(nick, id)?;
    println_colored!(RED, "  ✗ Wish {} deleted", id);
    Ok(())
}

// ─── Review ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub kept: usize,
    pub canceled: usize,
}

/// Ask about every cooled wish; declined wishes are canceled.
pub fn review_cooled(
    store: &dyn WishStore,
    nick: &str,
    now: DateTime<Utc>,
    mut still_want: impl FnMut(&Wish) -> Result<bool>,
) -> Result<ReviewOutcome> {
    let mut outcome = ReviewOutcome::default();
    let active = store.list_wishes(nick, Some(WishStatus::Active))?;
    for wish in active.iter().filter(|w| w.needs_review(now)) {
        if still_want(wish)? {
            outcome.kept += 1;
        } else {
            store.apply_action(nick, &wish.id, WishAction::Cancel)?;
            outcome.canceled += 1;
        }
    }
    Ok(outcome)
}

pub fn handle_review(store: &dyn WishStore, nick: &str) -> Result<()> {
    let outcome = review_cooled(store, nick, Utc::now(), |wish| {
        confirm(&format!(
            "  The cooling period for \"{}\" is over. Do you still want it? [y/N] ",
            wish.title
        ))
    })?;
    if outcome == ReviewOutcome::default() {
        println_colored!(DIM, "  Nothing has cooled down yet");
    } else {
        println_colored!(
            GREEN,
            "  ✓ Kept {}, canceled {}",
            outcome.kept,
            outcome.canceled
        );
    }
    Ok(())
}

// ─── Quote ───────────────────────────────────────────────────────────────────

pub fn handle_quote(
    store: &dyn WishStore,
    config: &AppConfig,
    nick: &str,
    price: f64,
    category: &str,
) -> Result<()> {
    if !price.is_finite() || price <= 0.0 {
        bail!("Price must be a positive number, got {}", price);
    }
    let profile = store.load_profile(nick)?;
    let settings = store.load_settings(nick)?;
    let financial = financial_view(&profile, &settings, config);
    let q = quote(
        price,
        category,
        &financial,
        &settings.cooldowns,
        config.cooldown.fallback_days,
    );

    println!();
    println_colored!(FROST, "  Quote for {}", format_money(price));
    println!();
    match q.matched_bracket {
        Some(days) => println!("  Price range:   {} days", days),
        None => println!(
            "  Price range:   no range matched, using {} days",
            q.bracket_days()
        ),
    }
    println!("  Affordable:    {}", q.recommended.affordability);
    println_colored!(BOLD, "  Recommended:   {}", q.recommended);
    if q.blocked {
        println_colored!(RED, "  Category '{}' is blocked", category.trim());
    }
    println!();
    Ok(())
}

// ─── Profile ─────────────────────────────────────────────────────────────────

fn non_negative(name: &str, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => bail!("{} must be a non-negative number", name),
        other => Ok(other),
    }
}

/// Apply `profile set` options; omitted fields keep their value.
pub fn update_profile(
    mut profile: UserProfile,
    salary: Option<f64>,
    savings: Option<f64>,
    monthly: Option<f64>,
    blocked: Option<&str>,
    comfort: Option<f64>,
) -> Result<UserProfile> {
    if let Some(v) = non_negative("Salary", salary)? {
        profile.salary = v;
    }
    if let Some(v) = non_negative("Savings", savings)? {
        profile.total_savings_profile = v;
    }
    if let Some(v) = non_negative("Monthly allocation", monthly)? {
        profile.monthly_saving_profile = v;
    }
    if let Some(text) = blocked {
        profile.blocked_categories = parse_category_list(text);
    }
    if let Some(v) = comfort {
        if !(0.0..1.0).contains(&v) {
            bail!("Comfort share must be at least 0 and below 1, got {}", v);
        }
        profile.comfort_percent = v;
    }
    Ok(profile)
}

fn print_profile(profile: &UserProfile) {
    println!();
    println_colored!(FROST, "  Profile — {}", profile.nick);
    println!();
    println!("  Salary:              {}", format_money(profile.salary));
    println!("  Savings:             {}", format_money(profile.total_savings_profile));
    println!("  Monthly allocation:  {}", format_money(profile.monthly_saving_profile));
    if profile.comfort_percent > 0.0 {
        println!("  Cushion:             {:.0}%", profile.comfort_percent * 100.0);
    }
    if profile.blocked_categories.is_empty() {
        println_colored!(DIM, "  Blocked categories:  none");
    } else {
        println!("  Blocked categories:  {}", profile.blocked_categories.join(", "));
    }
    println!();
}

pub fn handle_profile(store: &dyn WishStore, nick: &str, action: &ProfileCommands) -> Result<()> {
    match action {
        ProfileCommands::Show => {
            print_profile(&store.load_profile(nick)?);
        }
        ProfileCommands::Set {
            salary,
            savings,
            monthly,
            blocked,
            comfort,
        } => {
            let mut profile = update_profile(
                store.load_profile(nick)?,
                *salary,
                *savings,
                *monthly,
                blocked.as_deref(),
                *comfort,
            )?;
            profile.nick = nick.to_string();
            store.save_profile(nick, &profile)?;
            println_colored!(GREEN, "  ✓ Profile saved");
            print_profile(&profile);
        }
    }
    Ok(())
}

// ─── Settings ────────────────────────────────────────────────────────────────

fn print_settings(settings: &Settings) {
    println!();
    println_colored!(FROST, "  Cooldown ranges");
    println!();
    if settings.cooldowns.is_empty() {
        println_colored!(DIM, "  none: every wish uses the fallback period");
    }
    for (i, range) in settings.cooldowns.iter().enumerate() {
        println!("  {}. {}", i + 1, range);
    }
    println!();
    println_colored!(FROST, "  Notifications");
    println!();
    println!("  Frequency:  {}", or_dash(&settings.notification_frequency));
    println!("  Channel:    {}", or_dash(&settings.notification_channel));
    println!("  Excluded:   {}", or_dash(&settings.excluded_products));
    println!("  Monthly saving: {}", format_money(settings.monthly_saving));
    println!("  Total spent:    {}", format_money(settings.total_spent));
    println!();
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() { "—" } else { s }
}

pub fn handle_settings(store: &dyn WishStore, nick: &str, action: &SettingsCommands) -> Result<()> {
    let mut settings = store.load_settings(nick)?;
    match action {
        SettingsCommands::Show => {
            print_settings(&settings);
            return Ok(());
        }
        SettingsCommands::Set {
            frequency,
            channel,
            excluded,
            monthly_saving,
            total_spent,
        } => {
            if let Some(v) = frequency {
                settings.notification_frequency = v.clone();
            }
            if let Some(v) = channel {
                settings.notification_channel = v.clone();
            }
            if let Some(v) = excluded {
                settings.excluded_products = parse_category_list(v).join(", ");
            }
            if let Some(v) = non_negative("Monthly saving", *monthly_saving)? {
                settings.monthly_saving = v;
            }
            if let Some(v) = non_negative("Total spent", *total_spent)? {
                settings.total_spent = v;
            }
        }
        SettingsCommands::AddRange { min, max, days } => {
            settings
                .cooldowns
                .push(crate::models::CooldownRange::new(*min, *max, *days));
            settings.cooldowns.sort_by(|a, b| a.min.total_cmp(&b.min));
        }
        SettingsCommands::ClearRanges => settings.cooldowns.clear(),
    }
    validate_ranges(&settings.cooldowns)?;
    store.save_settings(nick, &settings)?;
    println_colored!(GREEN, "  ✓ Settings saved");
    print_settings(&settings);
    Ok(())
}

// ─── Notify ──────────────────────────────────────────────────────────────────

pub fn handle_notify(
    store: &dyn WishStore,
    nick: &str,
    title: &str,
    message: &str,
    kind: &str,
) -> Result<()> {
    let notification = Notification {
        title: title.to_string(),
        message: message.to_string(),
        kind: kind.to_string(),
    };
    store.notify(nick, &notification)?;
    println_colored!(GREEN, "  ✓ Notification sent");
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}

fn confirm(message: &str) -> Result<bool> {
    let answer = prompt(message)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "д" | "да"))
}
