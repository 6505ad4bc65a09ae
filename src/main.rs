//! fitplan - Daily workout and meal planner

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;

use fitplan::bot::format_day;
use fitplan::catalog::Catalog;
use fitplan::db::Database;
use fitplan::planner::{Planner, PlannerConfig};
use fitplan::profile::{RawProfile, UserProfile};
use fitplan::tui::App;

#[derive(Parser)]
#[command(name = "fitplan")]
#[command(author, version, about = "Daily workout and meal planner")]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true, env = "FITPLAN_DB", default_value = "fitplan.db")]
    db: String,

    /// Workout catalog (JSON array); built-in sample when omitted
    #[arg(long, global = true, env = "FITPLAN_WORKOUTS", requires = "meals")]
    workouts: Option<PathBuf>,

    /// Meal catalog (JSON array); built-in sample when omitted
    #[arg(long, global = true, env = "FITPLAN_MEALS", requires = "workouts")]
    meals: Option<PathBuf>,

    /// Items recommended per day and item type
    #[arg(long, global = true, env = "FITPLAN_TOP_K", default_value = "3")]
    top_k: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI plan viewer
    Tui {
        /// Plan to open (defaults to the latest)
        id: Option<i64>,
    },

    /// Plan a week from a profile and store it
    Plan {
        /// Profile JSON file, "-" for stdin; all defaults when omitted
        #[arg(short, long)]
        profile: Option<String>,

        /// First day of the plan (YYYY-MM-DD), today by default
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Print all seven days instead of day 0
        #[arg(short, long)]
        week: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show a stored plan
    Show {
        /// Plan id
        id: i64,

        /// Only this day (0-6)
        #[arg(short, long)]
        day: Option<u32>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List stored plans
    List {
        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Start Telegram bot
    Bot {
        /// Telegram bot token (or set TELOXIDE_TOKEN env var)
        #[arg(short, long, env = "TELOXIDE_TOKEN")]
        token: String,
    },
}

impl Cli {
    fn planner(&self) -> Result<Planner> {
        let catalog = match (&self.workouts, &self.meals) {
            (Some(workouts), Some(meals)) => Catalog::load(workouts, meals)?,
            _ => {
                info!("No catalog files given, using the built-in sample catalog");
                Catalog::sample()
            }
        };
        Ok(Planner::new(Arc::new(catalog), PlannerConfig { top_k: self.top_k }))
    }
}

fn read_profile(source: Option<&str>) -> Result<RawProfile> {
    let body = match source {
        None => return Ok(RawProfile::default()),
        Some("-") => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            body
        }
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading profile {}", path))?,
    };
    RawProfile::from_json(&body).context("parsing profile")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Plan { profile, date, week, json }) => {
            let raw = read_profile(profile.as_deref())?;
            let planner = cli.planner()?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let plan = planner.plan_week(&UserProfile::from_raw(&raw), date);

            let db = Database::open(&cli.db)?;
            let id = db.save_submission(&raw, &plan)?;
            info!("Stored plan {}", id);

            if *json {
                if *week {
                    println!("{}", serde_json::to_string_pretty(&plan)?);
                } else {
                    println!("{}", serde_json::to_string_pretty(&plan.days[0].schedule)?);
                }
            } else {
                println!("Plan #{}", id);
                let days = if *week { plan.days.len() } else { 1 };
                for offset in 0..days {
                    println!("{:-<60}", "");
                    println!("{}", format_day(&plan, offset));
                }
            }
        }

        Some(Commands::Show { id, day, json }) => {
            let db = Database::open(&cli.db)?;
            let days = match day {
                Some(day) => db.get_schedule(*id, *day)?.map(|s| vec![(*day, s)]).unwrap_or_default(),
                None => db.get_weekly_plan(*id)?,
            };
            if days.is_empty() {
                anyhow::bail!("no stored plan {}", id);
            }

            for (day, schedule) in days {
                if *json {
                    println!("{}", serde_json::to_string_pretty(&schedule)?);
                } else {
                    println!("Day {}", day);
                    println!("{:-<60}", "");
                    print!("{}", schedule);
                    println!();
                }
            }
        }

        Some(Commands::List { limit }) => {
            let db = Database::open(&cli.db)?;
            println!("Recent plans:");
            println!("{:-<60}", "");
            for s in db.get_submissions(*limit)? {
                println!(
                    "#{:<5} | {} | starts {} | {:12} | {}",
                    s.id,
                    s.created_at.format("%Y-%m-%d %H:%M"),
                    s.reference_date,
                    s.goal.as_deref().unwrap_or("-"),
                    s.diet.as_deref().unwrap_or("-")
                );
            }
        }

        Some(Commands::Bot { token }) => {
            println!("Starting Telegram bot...");
            println!("Database: {}", cli.db);
            let planner = cli.planner()?;
            fitplan::bot::run_bot(token.clone(), &cli.db, planner).await?;
        }

        Some(Commands::Tui { id }) => {
            let db = Database::open(&cli.db)?;
            let mut app = App::new(db)?;
            if let Some(id) = id {
                app.select(*id)?;
            }
            app.run()?;
        }

        None => {
            // Default: show TUI
            let db = Database::open(&cli.db)?;
            let mut app = App::new(db)?;
            app.run()?;
        }
    }

    Ok(())
}
