//! zhelezo - workout program parser and Telegram training log

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use zhelezo::config::{BotConfig, MAX_PROGRAMS_PER_USER, ParserConfig};
use zhelezo::db::Database;
use zhelezo::parser::format::display_line;
use zhelezo::parser::{parse_exercise_line, segment_program};

#[derive(Parser)]
#[command(name = "zhelezo")]
#[command(author, version, about = "Workout program parser and Telegram training log")]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true, env = "ZHELEZO_DB", default_value = "zhelezo.db")]
    db: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start Telegram bot
    Bot {
        /// Telegram bot token (or set TELOXIDE_TOKEN env var)
        #[arg(short, long, env = "TELOXIDE_TOKEN")]
        token: String,

        /// Programs a single user may keep
        #[arg(long, env = "MAX_PROGRAMS_PER_USER", default_value_t = MAX_PROGRAMS_PER_USER)]
        max_programs: usize,
    },

    /// Parse one exercise line (e.g. "Жим лёжа — 4х10")
    Parse {
        line: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Parse a whole program from a text file
    Program {
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List stored programs of a user
    Programs {
        #[arg(long)]
        telegram_id: i64,
    },

    /// List known users
    Users,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_logging();

    let cli = Cli::parse();
    let parser = ParserConfig::default();

    match cli.command {
        Some(Commands::Bot { token, max_programs }) => {
            println!("Starting Telegram bot...");
            println!("База данных: {}", cli.db);
            let config = BotConfig {
                max_programs_per_user: max_programs,
                ..BotConfig::default()
            };
            zhelezo::bot::run_bot(token, &cli.db, config).await?;
        }

        Some(Commands::Parse { line, json }) => {
            let parsed = parse_exercise_line(&line, &parser);
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
                return Ok(());
            }
            match parsed.validate(&line) {
                Ok(exercise) => {
                    println!("Название:  {}", exercise.name);
                    println!("Подходы:   {:?}", exercise.reps);
                    println!("Хранится:  {}", exercise.canonical_name());
                    println!("Исходный:  {}", exercise.raw_line());
                }
                Err(e) => println!("{}", e),
            }
        }

        Some(Commands::Program { file, json }) => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;

            let Some(segmented) = segment_program(&text, &parser) else {
                println!("Не похоже на программу тренировок.");
                return Ok(());
            };
            let resolved = segmented.resolve(&parser);
            let errors: Vec<String> = resolved.errors.iter().map(ToString::to_string).collect();

            if json {
                let out = serde_json::json!({
                    "program": resolved.draft,
                    "errors": errors,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            match &resolved.draft {
                Some(draft) => {
                    println!("📋 {}", draft.name());
                    for day in draft.days() {
                        println!("\n📅 {}", day.name);
                        for exercise in day.parsed() {
                            println!("  {}  {:?}", exercise.canonical_name(), exercise.reps);
                        }
                    }
                }
                None => println!("Ни одно упражнение не распознано."),
            }
            for error in errors {
                println!("{}", error);
            }
        }

        Some(Commands::Programs { telegram_id }) => {
            let db = Database::open(&cli.db)?;
            let Some(user) = db.find_user(telegram_id)? else {
                println!("Пользователь {} не найден", telegram_id);
                return Ok(());
            };

            let programs = db.list_programs(user.id)?;
            if programs.is_empty() {
                println!("Программ нет");
            }
            for program in programs {
                println!(
                    "{} | {} | {}",
                    program.id,
                    program.created_at.format("%Y-%m-%d %H:%M"),
                    program.name
                );
                for day in db.get_workout_days(program.id)? {
                    println!("  📅 {}", day.name);
                    for exercise in db.get_exercises(day.id)? {
                        println!("    {}", display_line(&exercise.name, &exercise.reps(), &parser));
                    }
                }
            }
        }

        Some(Commands::Users) => {
            let db = Database::open(&cli.db)?;
            let users = db.list_users()?;
            println!("Users:");
            println!("{:-<60}", "");
            for u in users {
                println!(
                    "{:>4} | {:>12} | {:20} | {} programs",
                    u.id,
                    u.telegram_id,
                    u.username.as_deref().unwrap_or("-"),
                    db.count_programs(u.id)?
                );
            }
        }

        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
