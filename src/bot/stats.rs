//! /stats: program → day → exercise → weight history per set

use teloxide::prelude::*;

use super::keyboards::{self, CallbackAction};
use super::{Db, HandlerResult, Origin, messages, owned_day, owned_exercise, owned_program};
use crate::config::BotConfig;

pub async fn choose_program(bot: &Bot, origin: Origin, db: &Db, user_id: i64) -> HandlerResult {
    let programs = db.lock().await.list_programs(user_id)?;
    match programs.as_slice() {
        [] => origin.show(bot, messages::NO_PROGRAMS, None).await?,
        [only] => choose_day(bot, origin, db, user_id, only.id).await?,
        _ => {
            let keyboard = keyboards::programs_keyboard(&programs, CallbackAction::StatsProgram);
            origin
                .show(bot, "📊 Выберите программу:", Some(keyboard))
                .await?;
        }
    }
    Ok(())
}

pub async fn choose_day(
    bot: &Bot,
    origin: Origin,
    db: &Db,
    user_id: i64,
    program_id: i64,
) -> HandlerResult {
    let days = {
        let db = db.lock().await;
        match owned_program(&db, user_id, program_id)? {
            Some(program) => Some(db.get_workout_days(program.id)?),
            None => None,
        }
    };

    match days {
        Some(days) if !days.is_empty() => {
            let keyboard = keyboards::days_keyboard(&days, CallbackAction::StatsDay);
            origin.show(bot, "📊 Выберите день:", Some(keyboard)).await?;
        }
        _ => origin.show(bot, "❌ Дни не найдены.", None).await?,
    }
    Ok(())
}

pub async fn choose_exercise(
    bot: &Bot,
    origin: Origin,
    db: &Db,
    config: &BotConfig,
    user_id: i64,
    day_id: i64,
) -> HandlerResult {
    let exercises = {
        let db = db.lock().await;
        match owned_day(&db, user_id, day_id)? {
            Some((_, day)) => db.get_exercises(day.id)?,
            None => Vec::new(),
        }
    };

    if exercises.is_empty() {
        origin.show(bot, "❌ Упражнения не найдены.", None).await?;
        return Ok(());
    }
    let keyboard =
        keyboards::exercises_keyboard(&exercises, &config.parser, CallbackAction::StatsExercise);
    origin
        .show(bot, "📊 Выберите упражнение:", Some(keyboard))
        .await?;
    Ok(())
}

pub async fn show_exercise(
    bot: &Bot,
    origin: Origin,
    db: &Db,
    config: &BotConfig,
    user_id: i64,
    exercise_id: i64,
) -> HandlerResult {
    let text = {
        let db = db.lock().await;
        match owned_exercise(&db, user_id, exercise_id)? {
            Some(exercise) => {
                let history = db.exercise_history(user_id, exercise.id)?;
                messages::exercise_stats(&exercise, &history, &config.parser)
            }
            None => "❌ Упражнение не найдено.".to_string(),
        }
    };
    origin.show(bot, text, None).await?;
    Ok(())
}
