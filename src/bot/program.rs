//! Program entry: pasted text, step-by-step /add, listing and deletion

use teloxide::prelude::*;
use tracing::info;

use super::keyboards::{self, CallbackAction};
use super::{AddProgress, Db, HandlerResult, MyDialogue, Origin, State, messages, owned_program};
use crate::config::BotConfig;
use crate::db::Database;
use crate::parser::{
    DraftExercise, ProgramBuilder, ProgramDraft, is_program_text, parse_exercise_lines,
    segment_program,
};

fn limit_reached(db: &Database, config: &BotConfig, user_id: i64) -> anyhow::Result<bool> {
    Ok(db.count_programs(user_id)? >= config.max_programs_per_user)
}

/// Free text while idle: parse it as a whole program and ask to save
pub async fn receive_program_text(
    bot: &Bot,
    origin: Origin,
    dialogue: &MyDialogue,
    db: &Db,
    config: &BotConfig,
    user_id: i64,
    text: &str,
) -> HandlerResult {
    let parser = &config.parser;
    if !is_program_text(text, parser) {
        origin.show(bot, messages::PROGRAM_HINT, None).await?;
        return Ok(());
    }

    let at_limit = {
        let db = db.lock().await;
        limit_reached(&db, config, user_id)?
    };
    if at_limit {
        origin
            .show(bot, messages::limit_reached(config.max_programs_per_user), None)
            .await?;
        return Ok(());
    }

    let Some(segmented) = segment_program(text, parser) else {
        origin.show(bot, messages::PROGRAM_HINT, None).await?;
        return Ok(());
    };

    let resolved = segmented.resolve(parser);
    let Some(draft) = resolved.draft else {
        origin
            .show(bot, messages::nothing_parsed(&resolved.errors), None)
            .await?;
        return Ok(());
    };

    info!(
        user_id,
        days = draft.days().len(),
        exercises = draft.exercise_count(),
        errors = resolved.errors.len(),
        "program parsed from text"
    );

    let preview = messages::program_preview(&draft, &resolved.errors);
    dialogue.update(State::ConfirmProgram { draft }).await?;
    origin
        .show(bot, preview, Some(keyboards::confirm_program_keyboard()))
        .await?;
    Ok(())
}

/// Save button under a preview
pub async fn save_confirmed(
    bot: &Bot,
    origin: Origin,
    dialogue: &MyDialogue,
    db: &Db,
    config: &BotConfig,
    user_id: i64,
) -> HandlerResult {
    let Some(State::ConfirmProgram { draft }) = dialogue.get().await? else {
        origin.show(bot, "Нечего сохранять. Отправьте программу ещё раз.", None).await?;
        return Ok(());
    };
    dialogue.reset().await?;
    store_program(bot, origin, db, config, user_id, &draft).await
}

async fn store_program(
    bot: &Bot,
    origin: Origin,
    db: &Db,
    config: &BotConfig,
    user_id: i64,
    draft: &ProgramDraft,
) -> HandlerResult {
    let saved = {
        let db = db.lock().await;
        if limit_reached(&db, config, user_id)? {
            None
        } else {
            Some(db.save_program(user_id, draft)?)
        }
    };

    let text = match saved {
        Some(_) => messages::program_saved(draft.name(), draft.days().len()),
        None => messages::limit_reached(config.max_programs_per_user),
    };
    origin.show(bot, text, None).await?;
    Ok(())
}

/// /add
pub async fn start_add(
    bot: &Bot,
    origin: Origin,
    dialogue: &MyDialogue,
    db: &Db,
    config: &BotConfig,
    user_id: i64,
) -> HandlerResult {
    let at_limit = {
        let db = db.lock().await;
        limit_reached(&db, config, user_id)?
    };
    if at_limit {
        origin
            .show(bot, messages::limit_reached(config.max_programs_per_user), None)
            .await?;
        return Ok(());
    }

    dialogue.update(State::ChoosingDayCount).await?;
    origin
        .show(bot, messages::DAY_COUNT_PROMPT, Some(keyboards::day_count_keyboard()))
        .await?;
    Ok(())
}

pub async fn choose_day_count(
    bot: &Bot,
    origin: Origin,
    dialogue: &MyDialogue,
    total: usize,
) -> HandlerResult {
    if !matches!(dialogue.get().await?, Some(State::ChoosingDayCount)) {
        return Ok(());
    }

    dialogue
        .update(State::WaitingForDayName(AddProgress {
            builder: ProgramBuilder::new(),
            day: 1,
            total,
        }))
        .await?;
    origin.show(bot, messages::day_name_prompt(1, total), None).await?;
    Ok(())
}

pub async fn receive_day_name(
    bot: &Bot,
    origin: Origin,
    dialogue: &MyDialogue,
    mut progress: AddProgress,
    text: &str,
) -> HandlerResult {
    let name = text.trim();
    if name.is_empty() {
        origin.show(bot, "Пожалуйста, введите название дня.", None).await?;
        return Ok(());
    }

    progress.builder.add_day(name);
    dialogue.update(State::AddingExercises(progress)).await?;
    origin.show(bot, messages::day_added(name), None).await?;
    Ok(())
}

pub async fn receive_exercises(
    bot: &Bot,
    origin: Origin,
    dialogue: &MyDialogue,
    config: &BotConfig,
    mut progress: AddProgress,
    text: &str,
) -> HandlerResult {
    let batch = parse_exercise_lines(text, &config.parser);
    for exercise in &batch.parsed {
        progress
            .builder
            .add_exercise(DraftExercise::Parsed(exercise.clone()));
    }

    dialogue.update(State::AddingExercises(progress)).await?;
    origin.show(bot, messages::batch_report(&batch), None).await?;
    Ok(())
}

/// /done: close the current day, then ask for the next one or the name
pub async fn finish_day(bot: &Bot, origin: Origin, dialogue: &MyDialogue) -> HandlerResult {
    let Some(State::AddingExercises(progress)) = dialogue.get().await? else {
        origin
            .show(bot, "/done нужен при добавлении упражнений. Начните с /add", None)
            .await?;
        return Ok(());
    };

    let day_is_empty = progress
        .builder
        .current_day()
        .is_none_or(|day| day.exercises.is_empty());
    if day_is_empty {
        origin
            .show(bot, "Добавьте хотя бы одно упражнение для этого дня.", None)
            .await?;
        return Ok(());
    }

    if progress.day < progress.total {
        let next = AddProgress {
            day: progress.day + 1,
            ..progress
        };
        let prompt = messages::day_name_prompt(next.day, next.total);
        dialogue.update(State::WaitingForDayName(next)).await?;
        origin.show(bot, prompt, None).await?;
    } else {
        dialogue
            .update(State::WaitingForProgramName {
                builder: progress.builder,
            })
            .await?;
        origin
            .show(bot, "Все дни добавлены! Введите название программы:", None)
            .await?;
    }
    Ok(())
}

pub async fn receive_program_name(
    bot: &Bot,
    origin: Origin,
    dialogue: &MyDialogue,
    db: &Db,
    config: &BotConfig,
    mut builder: ProgramBuilder,
    text: &str,
) -> HandlerResult {
    let name = text.trim();
    if name.is_empty() {
        origin.show(bot, "Пожалуйста, введите название программы.", None).await?;
        return Ok(());
    }

    builder.set_name(name);
    dialogue.reset().await?;
    match builder.finalize(&config.parser.default_program_name) {
        Some(draft) => {
            let user_id = {
                let db = db.lock().await;
                super::user_id(&db, origin.chat_id, None)?
            };
            store_program(bot, origin, db, config, user_id, &draft).await?;
        }
        None => {
            origin.show(bot, "В программе нет упражнений, она не сохранена.", None).await?;
        }
    }
    Ok(())
}

/// /programs
pub async fn show_programs(
    bot: &Bot,
    origin: Origin,
    db: &Db,
    config: &BotConfig,
    user_id: i64,
) -> HandlerResult {
    let text = {
        let db = db.lock().await;
        let mut listing = Vec::new();
        for program in db.list_programs(user_id)? {
            let mut days = Vec::new();
            for day in db.get_workout_days(program.id)? {
                let exercises = db.get_exercises(day.id)?;
                days.push((day, exercises));
            }
            listing.push((program, days));
        }
        messages::program_list(&listing, &config.parser)
    };
    origin.show(bot, text, None).await?;
    Ok(())
}

/// /delete
pub async fn start_delete(bot: &Bot, origin: Origin, db: &Db, user_id: i64) -> HandlerResult {
    let programs = db.lock().await.list_programs(user_id)?;
    if programs.is_empty() {
        origin.show(bot, messages::NO_PROGRAMS, None).await?;
        return Ok(());
    }

    let keyboard = keyboards::programs_keyboard(&programs, CallbackAction::DeleteProgram);
    origin
        .show(bot, "Какую программу удалить?", Some(keyboard))
        .await?;
    Ok(())
}

pub async fn ask_delete(
    bot: &Bot,
    origin: Origin,
    db: &Db,
    user_id: i64,
    program_id: i64,
) -> HandlerResult {
    let program = {
        let db = db.lock().await;
        owned_program(&db, user_id, program_id)?
    };
    let Some(program) = program else {
        origin.show(bot, "❌ Программа не найдена.", None).await?;
        return Ok(());
    };

    let text = format!(
        "Удалить программу «{}»?\nИстория тренировок по ней тоже будет удалена.",
        program.name
    );
    origin
        .show(bot, text, Some(keyboards::confirm_delete_keyboard(program.id)))
        .await?;
    Ok(())
}

pub async fn confirm_delete(
    bot: &Bot,
    origin: Origin,
    db: &Db,
    user_id: i64,
    program_id: i64,
) -> HandlerResult {
    let deleted = db.lock().await.delete_program(program_id, user_id)?;
    let text = if deleted {
        "🗑 Программа удалена."
    } else {
        "❌ Программа не найдена."
    };
    origin.show(bot, text, None).await?;
    Ok(())
}
