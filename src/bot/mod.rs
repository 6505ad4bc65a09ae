//! Telegram bot module - profile submissions and plan lookups

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;
use teloxide::{prelude::*, types::ChatId, utils::command::BotCommands};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::db::Database;
use crate::planner::{Planner, WeeklyPlan};
use crate::profile::{RawProfile, UserProfile};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
/// Latest stored plan id per chat
type ChatPlans = Arc<Mutex<HashMap<ChatId, i64>>>;

const PROFILE_EXAMPLE: &str = r#"/plan {"age": 25, "weight": 70, "height": 175, "gender": "male", "diet": "non-vegetarian", "goal": "fitness", "work_start": "9:00 AM", "work_end": "6:00 PM", "lunch_time": "1:00 PM"}"#;

const LOOKUP_FAILED: &str = "Could not read your plan, try again later.";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Commands:")]
pub enum Command {
    #[command(description = "Start")]
    Start,
    #[command(description = "Show help")]
    Help,
    #[command(description = "Submit a profile as JSON and get today's plan")]
    Plan(String),
    #[command(description = "Show day N (0-6) of your latest plan")]
    Day(String),
    #[command(description = "Summary of your latest week")]
    Week,
}

/// Start the Telegram bot
pub async fn run_bot(token: String, db_path: &str, planner: Planner) -> anyhow::Result<()> {
    let bot = Bot::new(token);
    let db = Arc::new(Mutex::new(Database::open(db_path)?));
    let planner = Arc::new(planner);
    let chat_plans: ChatPlans = Arc::new(Mutex::new(HashMap::new()));

    info!("Bot started with {} workouts and {} meals", planner.catalog().workouts().len(), planner.catalog().meals().len());

    let handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![db, planner, chat_plans])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    db: Arc<Mutex<Database>>,
    planner: Arc<Planner>,
    chat_plans: ChatPlans,
) -> HandlerResult {
    match cmd {
        Command::Start => {
            let text = format!(
                "fitplan\n\n\
                Daily workouts and meals on a push/pull/legs week.\n\n\
                /plan <profile json> - plan your week\n\
                /day <n> - one day of your latest plan\n\
                /week - week summary\n\n\
                Example:\n{}",
                PROFILE_EXAMPLE
            );
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }

        Command::Plan(body) => {
            let raw = match RawProfile::from_json(body.trim()) {
                Ok(raw) => raw,
                Err(e) => {
                    bot.send_message(msg.chat.id, format!("Could not read profile: {}\n\n{}", e, PROFILE_EXAMPLE))
                        .await?;
                    return Ok(());
                }
            };

            let profile = UserProfile::from_raw(&raw);
            let plan = planner.plan_week(&profile, Local::now().date_naive());

            let stored = {
                let db = db.lock().await;
                db.save_submission(&raw, &plan)
            };
            match stored {
                Ok(id) => {
                    chat_plans.lock().await.insert(msg.chat.id, id);
                    info!("Chat {} submitted profile {}", msg.chat.id, id);
                }
                Err(e) => {
                    error!("Failed to store plan for {}: {:#}", msg.chat.id, e);
                    bot.send_message(msg.chat.id, "Could not save your plan, try again later.").await?;
                    return Ok(());
                }
            }

            bot.send_message(msg.chat.id, format_day(&plan, 0)).await?;
        }

        Command::Day(arg) => {
            let Some(id) = chat_plans.lock().await.get(&msg.chat.id).copied() else {
                bot.send_message(msg.chat.id, "No plan yet. Send /plan first.").await?;
                return Ok(());
            };
            let day = match arg.trim().parse::<u32>() {
                Ok(day) if day < 7 => day,
                _ => {
                    bot.send_message(msg.chat.id, "Day must be a number from 0 to 6").await?;
                    return Ok(());
                }
            };

            let text = day_reply(&*db.lock().await, id, day);
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::Week => {
            let Some(id) = chat_plans.lock().await.get(&msg.chat.id).copied() else {
                bot.send_message(msg.chat.id, "No plan yet. Send /plan first.").await?;
                return Ok(());
            };

            let text = week_reply(&*db.lock().await, id);
            bot.send_message(msg.chat.id, text).await?;
        }
    }

    Ok(())
}

/// Reply for `/day`; storage errors are logged and answered with a short line
fn day_reply(db: &Database, id: i64, day: u32) -> String {
    match db.get_schedule(id, day) {
        Ok(Some(schedule)) if schedule.is_empty() => format!("Day {}: nothing scheduled", day),
        Ok(Some(schedule)) => format!("Day {}\n\n{}", day, schedule),
        Ok(None) => format!("Day {} not found", day),
        Err(e) => {
            error!("Failed to read day {} of plan {}: {:#}", day, id, e);
            LOOKUP_FAILED.to_string()
        }
    }
}

/// Reply for `/week`, one line per stored day
fn week_reply(db: &Database, id: i64) -> String {
    let days = match db.get_weekly_plan(id) {
        Ok(days) => days,
        Err(e) => {
            error!("Failed to read plan {}: {:#}", id, e);
            return LOOKUP_FAILED.to_string();
        }
    };

    let mut text = String::from("Your week:\n\n");
    for (day, schedule) in days {
        let workout = schedule
            .workout()
            .map(|(key, block)| format!("{} {}", key, block.name))
            .unwrap_or_else(|| "rest".to_string());
        text.push_str(&format!("Day {} - {} meals, {}\n", day, schedule.meal_count(), workout));
    }
    text
}

/// Text for one planned day
pub fn format_day(plan: &WeeklyPlan, offset: usize) -> String {
    match plan.day(offset) {
        Some(day) => format!(
            "{} ({} day)\n\n{}",
            day.date.format("%A %Y-%m-%d"),
            day.split.label(),
            day.schedule
        ),
        None => format!("Day {} is outside the plan", offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::planner::PlannerConfig;
    use chrono::NaiveDate;

    fn plan() -> WeeklyPlan {
        let planner = Planner::new(Arc::new(Catalog::sample()), PlannerConfig::default());
        planner.plan_week(&UserProfile::default(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn test_format_day() {
        let text = format_day(&plan(), 0);
        assert!(text.starts_with("Monday 2024-01-01 (Push day)"), "Text: {}", text);
        assert!(text.contains("Push Day"));
        assert!(text.contains("07:00 |"));
    }

    #[test]
    fn test_format_rest_day() {
        let text = format_day(&plan(), 3);
        assert!(text.contains("(Rest day)"));
        assert!(!text.contains("warm-up"));
    }

    #[test]
    fn test_format_day_out_of_range() {
        assert_eq!(format_day(&plan(), 9), "Day 9 is outside the plan");
    }

    #[test]
    fn test_day_and_week_replies() {
        let db = Database::open_in_memory().unwrap();
        let id = db.save_submission(&RawProfile::default(), &plan()).unwrap();

        assert!(day_reply(&db, id, 0).contains("Push Day"));
        assert_eq!(day_reply(&db, id + 1, 0), "Day 0 not found");

        let week = week_reply(&db, id);
        assert_eq!(week.lines().filter(|l| l.starts_with("Day ")).count(), 7);
        assert!(week.contains("Day 3 - 3 meals, rest"));
    }

    #[test]
    fn test_unreadable_plan_gets_reply() {
        let path = std::env::temp_dir().join(format!("fitplan-bot-{}.db", std::process::id()));
        let path_str = path.to_str().unwrap();
        let db = Database::open(path_str).unwrap();
        let id = db.save_submission(&RawProfile::default(), &plan()).unwrap();

        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute("UPDATE weekly_plan SET schedule = 'not json' WHERE profile_id = ?1", [id])
            .unwrap();

        assert_eq!(day_reply(&db, id, 0), LOOKUP_FAILED);
        assert_eq!(week_reply(&db, id), LOOKUP_FAILED);

        drop(conn);
        drop(db);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_profile_example_parses() {
        let body = PROFILE_EXAMPLE.trim_start_matches("/plan ");
        let raw = RawProfile::from_json(body).unwrap();
        assert_eq!(raw.lunch_time.as_deref(), Some("1:00 PM"));
    }
}
