//! Database module - SQLite storage for submitted profiles and weekly plans

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::planner::{DailySchedule, WeeklyPlan};
use crate::profile::RawProfile;

/// Stored submission header
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub reference_date: NaiveDate,
    pub goal: Option<String>,
    pub diet: Option<String>,
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("opening database {}", path))?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Self { conn: Connection::open_in_memory()? };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                reference_date TEXT NOT NULL,
                age TEXT,
                weight TEXT,
                height TEXT,
                gender TEXT,
                diet TEXT,
                goal TEXT,
                work_start TEXT,
                work_end TEXT,
                lunch_time TEXT
            );
            CREATE TABLE IF NOT EXISTS weekly_plan (
                profile_id INTEGER NOT NULL REFERENCES profiles(id),
                day INTEGER NOT NULL,
                schedule TEXT NOT NULL,
                PRIMARY KEY (profile_id, day)
            );",
        )?;
        Ok(())
    }

    /// Store the profile as a new record and each day's schedule under it
    pub fn save_submission(&self, raw: &RawProfile, plan: &WeeklyPlan) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO profiles (created_at, reference_date, age, weight, height, gender, diet, goal, work_start, work_end, lunch_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                Utc::now().to_rfc3339(),
                plan.reference_date.to_string(),
                raw.age,
                raw.weight,
                raw.height,
                raw.gender,
                raw.diet,
                raw.goal,
                raw.work_start,
                raw.work_end,
                raw.lunch_time,
            ],
        )?;
        let profile_id = tx.last_insert_rowid();

        for day in &plan.days {
            let schedule = serde_json::to_string(&day.schedule)?;
            tx.execute(
                "INSERT INTO weekly_plan (profile_id, day, schedule) VALUES (?1, ?2, ?3)",
                params![profile_id, day.offset, schedule],
            )?;
        }

        tx.commit()?;
        debug!("Stored {} days for profile {}", plan.days.len(), profile_id);
        Ok(profile_id)
    }

    /// Schedule for one day of a stored plan
    pub fn get_schedule(&self, profile_id: i64, day: u32) -> Result<Option<DailySchedule>> {
        let text: Option<String> = self
            .conn
            .query_row(
                "SELECT schedule FROM weekly_plan WHERE profile_id = ?1 AND day = ?2",
                params![profile_id, day],
                |row| row.get(0),
            )
            .optional()?;

        text.map(|t| serde_json::from_str(&t).context("decoding stored schedule"))
            .transpose()
    }

    /// All stored days of a plan, ordered by day offset
    pub fn get_weekly_plan(&self, profile_id: i64) -> Result<Vec<(u32, DailySchedule)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT day, schedule FROM weekly_plan WHERE profile_id = ?1 ORDER BY day")?;

        let rows = stmt
            .query_map(params![profile_id], |row| {
                Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(day, text)| {
                let schedule = serde_json::from_str(&text)
                    .with_context(|| format!("decoding stored schedule for day {}", day))?;
                Ok((day, schedule))
            })
            .collect()
    }

    /// Profile exactly as submitted
    pub fn get_raw_profile(&self, profile_id: i64) -> Result<Option<RawProfile>> {
        let raw = self
            .conn
            .query_row(
                "SELECT age, weight, height, gender, diet, goal, work_start, work_end, lunch_time
                 FROM profiles WHERE id = ?1",
                params![profile_id],
                |row| {
                    Ok(RawProfile {
                        age: row.get(0)?,
                        weight: row.get(1)?,
                        height: row.get(2)?,
                        gender: row.get(3)?,
                        diet: row.get(4)?,
                        goal: row.get(5)?,
                        work_start: row.get(6)?,
                        work_end: row.get(7)?,
                        lunch_time: row.get(8)?,
                    })
                },
            )
            .optional()?;
        Ok(raw)
    }

    /// Most recent submissions first
    pub fn get_submissions(&self, limit: usize) -> Result<Vec<Submission>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, created_at, reference_date, goal, diet FROM profiles ORDER BY id DESC LIMIT ?1",
        )?;

        let submissions = stmt
            .query_map(params![limit as i64], |row| {
                let created: String = row.get(1)?;
                let reference: String = row.get(2)?;
                Ok(Submission {
                    id: row.get(0)?,
                    created_at: DateTime::parse_from_rfc3339(&created)
                        .map(|d| d.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                    reference_date: reference.parse().unwrap_or_else(|_| Utc::now().date_naive()),
                    goal: row.get(3)?,
                    diet: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(submissions)
    }
}
