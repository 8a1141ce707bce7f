//! Telegram bot module - program entry and guided training runs

mod keyboards;
mod messages;
mod program;
mod stats;
mod training;

use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::{Dialogue, InMemStorage},
    prelude::*,
    types::{ChatId, InlineKeyboardMarkup, MessageId},
    utils::command::BotCommands,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::db::{Database, Exercise, Program, WorkoutDay};
use crate::parser::{ProgramBuilder, ProgramDraft};
use crate::training::TrainingRun;

use keyboards::CallbackAction;

type MyDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type Db = Arc<Mutex<Database>>;

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    /// Program parsed from a message, waiting for Save / Cancel
    ConfirmProgram { draft: ProgramDraft },
    /// /add: waiting for the day-count button
    ChoosingDayCount,
    WaitingForDayName(AddProgress),
    AddingExercises(AddProgress),
    WaitingForProgramName { builder: ProgramBuilder },
    /// Waiting for the weight of the current set
    Training { run: TrainingRun },
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Команды бота:")]
pub enum Command {
    #[command(description = "Начать работу")]
    Start,
    #[command(description = "Показать помощь")]
    Help,
    #[command(description = "Мои программы")]
    Programs,
    #[command(description = "Добавить программу по шагам")]
    Add,
    #[command(description = "Закончить день")]
    Done,
    #[command(description = "Отменить текущее действие")]
    Cancel,
    #[command(description = "Начать тренировку")]
    Train,
    #[command(description = "Статистика по упражнению")]
    Stats,
    #[command(description = "Удалить программу")]
    Delete,
}

/// Program being assembled with /add
#[derive(Clone)]
pub struct AddProgress {
    builder: ProgramBuilder,
    /// 1-based day being filled
    day: usize,
    total: usize,
}

/// Where to answer: the chat, and the bot message to edit if the update
/// came from an inline button
#[derive(Clone, Copy)]
struct Origin {
    chat_id: ChatId,
    message_id: Option<MessageId>,
}

impl Origin {
    fn chat(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            message_id: None,
        }
    }

    async fn show(
        &self,
        bot: &Bot,
        text: impl Into<String>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> HandlerResult {
        match self.message_id {
            Some(message_id) => {
                let request = bot.edit_message_text(self.chat_id, message_id, text);
                match keyboard {
                    Some(kb) => request.reply_markup(kb).await?,
                    None => request.await?,
                };
            }
            None => {
                let request = bot.send_message(self.chat_id, text);
                match keyboard {
                    Some(kb) => request.reply_markup(kb).await?,
                    None => request.await?,
                };
            }
        }
        Ok(())
    }
}

/// Start the Telegram bot
pub async fn run_bot(token: String, db_path: &str, config: BotConfig) -> anyhow::Result<()> {
    let bot = Bot::new(token);
    let db: Db = Arc::new(Mutex::new(Database::open(db_path)?));
    let config = Arc::new(config);

    info!(
        max_programs = config.max_programs_per_user,
        "starting Telegram bot"
    );

    let handler = dptree::entry()
        .enter_dialogue::<Update, InMemStorage<State>, State>()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<State>::new(), db, config])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Internal user id for a chat, creating the user on first contact
fn user_id(db: &Database, chat_id: ChatId, username: Option<&str>) -> anyhow::Result<i64> {
    Ok(db.get_or_create_user(chat_id.0, username)?.id)
}

fn owned_program(db: &Database, user_id: i64, program_id: i64) -> anyhow::Result<Option<Program>> {
    let program = db.get_program(program_id)?.filter(|p| p.user_id == user_id);
    if program.is_none() {
        warn!(user_id, program_id, "program not found for user");
    }
    Ok(program)
}

fn owned_day(
    db: &Database,
    user_id: i64,
    day_id: i64,
) -> anyhow::Result<Option<(Program, WorkoutDay)>> {
    let Some(day) = db.get_workout_day(day_id)? else {
        return Ok(None);
    };
    Ok(owned_program(db, user_id, day.program_id)?.map(|program| (program, day)))
}

fn owned_exercise(db: &Database, user_id: i64, exercise_id: i64) -> anyhow::Result<Option<Exercise>> {
    let Some(exercise) = db.get_exercise(exercise_id)? else {
        return Ok(None);
    };
    Ok(owned_day(db, user_id, exercise.day_id)?.map(|_| exercise))
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: MyDialogue,
    db: Db,
    config: Arc<BotConfig>,
) -> HandlerResult {
    let origin = Origin::chat(msg.chat.id);
    let user_id = {
        let db = db.lock().await;
        user_id(&db, msg.chat.id, msg.chat.username())?
    };

    match cmd {
        Command::Start => {
            dialogue.reset().await?;
            bot.send_message(msg.chat.id, messages::WELCOME).await?;
        }

        Command::Help => {
            let text = format!("{}\n\n{}", messages::HELP, Command::descriptions());
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::Programs => {
            program::show_programs(&bot, origin, &db, &config, user_id).await?;
        }

        Command::Add => {
            program::start_add(&bot, origin, &dialogue, &db, &config, user_id).await?;
        }

        Command::Done => {
            program::finish_day(&bot, origin, &dialogue).await?;
        }

        Command::Cancel => {
            dialogue.reset().await?;
            bot.send_message(msg.chat.id, messages::CANCELLED).await?;
        }

        Command::Train => {
            training::choose_program(&bot, origin, &db, user_id).await?;
        }

        Command::Stats => {
            stats::choose_program(&bot, origin, &db, user_id).await?;
        }

        Command::Delete => {
            program::start_delete(&bot, origin, &db, user_id).await?;
        }
    }

    Ok(())
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    dialogue: MyDialogue,
    db: Db,
    config: Arc<BotConfig>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let origin = Origin::chat(msg.chat.id);
    let state = dialogue.get().await?.unwrap_or_default();

    match state {
        State::Start | State::ConfirmProgram { .. } => {
            let user_id = {
                let db = db.lock().await;
                user_id(&db, msg.chat.id, msg.chat.username())?
            };
            program::receive_program_text(&bot, origin, &dialogue, &db, &config, user_id, text)
                .await?;
        }

        State::ChoosingDayCount => {
            bot.send_message(msg.chat.id, messages::DAY_COUNT_PROMPT)
                .reply_markup(keyboards::day_count_keyboard())
                .await?;
        }

        State::WaitingForDayName(progress) => {
            program::receive_day_name(&bot, origin, &dialogue, progress, text).await?;
        }

        State::AddingExercises(progress) => {
            program::receive_exercises(&bot, origin, &dialogue, &config, progress, text).await?;
        }

        State::WaitingForProgramName { builder } => {
            program::receive_program_name(&bot, origin, &dialogue, &db, &config, builder, text)
                .await?;
        }

        State::Training { run } => {
            training::receive_weight(&bot, origin, &dialogue, &db, &config, run, text).await?;
        }
    }

    Ok(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dialogue: MyDialogue,
    db: Db,
    config: Arc<BotConfig>,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(action) = q.data.as_deref().and_then(CallbackAction::parse) else {
        return Ok(());
    };

    let origin = Origin {
        chat_id: q
            .message
            .as_ref()
            .map(|m| m.chat().id)
            .unwrap_or(ChatId(q.from.id.0 as i64)),
        message_id: q.message.as_ref().map(|m| m.id()),
    };
    let user_id = {
        let db = db.lock().await;
        user_id(&db, origin.chat_id, q.from.username.as_deref())?
    };

    match action {
        CallbackAction::DayCount(total) => {
            program::choose_day_count(&bot, origin, &dialogue, total).await?;
        }
        CallbackAction::SaveProgram => {
            program::save_confirmed(&bot, origin, &dialogue, &db, &config, user_id).await?;
        }
        CallbackAction::CancelProgram | CallbackAction::CancelDelete => {
            dialogue.reset().await?;
            origin.show(&bot, messages::CANCELLED, None).await?;
        }
        CallbackAction::TrainProgram(program_id) => {
            training::choose_day(&bot, origin, &db, user_id, program_id).await?;
        }
        CallbackAction::TrainDay(day_id) => {
            training::show_day(&bot, origin, &db, &config, user_id, day_id).await?;
        }
        CallbackAction::StartTraining(day_id) => {
            training::start_run(&bot, origin, &dialogue, &db, &config, user_id, day_id).await?;
        }
        CallbackAction::CancelTraining => {
            dialogue.reset().await?;
            origin.show(&bot, "Тренировка отменена.", None).await?;
        }
        CallbackAction::DeleteProgram(program_id) => {
            program::ask_delete(&bot, origin, &db, user_id, program_id).await?;
        }
        CallbackAction::ConfirmDelete(program_id) => {
            program::confirm_delete(&bot, origin, &db, user_id, program_id).await?;
        }
        CallbackAction::StatsProgram(program_id) => {
            stats::choose_day(&bot, origin, &db, user_id, program_id).await?;
        }
        CallbackAction::StatsDay(day_id) => {
            stats::choose_exercise(&bot, origin, &db, &config, user_id, day_id).await?;
        }
        CallbackAction::StatsExercise(exercise_id) => {
            stats::show_exercise(&bot, origin, &db, &config, user_id, exercise_id).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let user = db.get_or_create_user(100, None).unwrap();
        let program_id = db.create_program(user.id, "Сила").unwrap();
        let day_id = db.create_workout_day(program_id, 0, "Спина").unwrap();
        db.create_exercise(day_id, "Тяга — 3 подхода", 0).unwrap();
        (db, user.id)
    }

    #[test]
    fn test_ownership_checks() {
        let (db, owner) = setup();
        let stranger = user_id(&db, ChatId(200), None).unwrap();
        let program = &db.list_programs(owner).unwrap()[0];
        let day = &db.get_workout_days(program.id).unwrap()[0];
        let exercise = &db.get_exercises(day.id).unwrap()[0];

        assert!(owned_program(&db, owner, program.id).unwrap().is_some());
        assert!(owned_program(&db, stranger, program.id).unwrap().is_none());
        assert!(owned_day(&db, owner, day.id).unwrap().is_some());
        assert!(owned_day(&db, stranger, day.id).unwrap().is_none());
        assert!(owned_exercise(&db, owner, exercise.id).unwrap().is_some());
        assert!(owned_exercise(&db, stranger, exercise.id).unwrap().is_none());
    }

    #[test]
    fn test_user_id_is_stable_per_chat() {
        let (db, owner) = setup();
        assert_eq!(user_id(&db, ChatId(100), Some("ivan")).unwrap(), owner);
    }
}
