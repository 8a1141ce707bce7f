//! Guided training run: program → day → one weight per set → summary

use teloxide::prelude::*;
use tracing::info;

use super::keyboards::{self, CallbackAction};
use super::{Db, HandlerResult, MyDialogue, Origin, State, messages, owned_day, owned_program};
use crate::config::{BotConfig, ParserConfig};
use crate::db::Database;
use crate::parser::format::base_exercise_name;
use crate::progress::{SetQuery, compare, previous_set, run_comparisons};
use crate::training::{RunExercise, Step, TrainingRun};

/// What the user typed as a weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightInput {
    Valid(f64),
    Negative,
    Invalid,
}

/// "42.5", "42,5", " 40 " are weights in kg
pub fn parse_weight(text: &str) -> WeightInput {
    match text.trim().replace(',', ".").parse::<f64>() {
        Ok(w) if !w.is_finite() => WeightInput::Invalid,
        Ok(w) if w < 0.0 => WeightInput::Negative,
        Ok(w) => WeightInput::Valid(w),
        Err(_) => WeightInput::Invalid,
    }
}

/// /train
pub async fn choose_program(bot: &Bot, origin: Origin, db: &Db, user_id: i64) -> HandlerResult {
    let programs = db.lock().await.list_programs(user_id)?;
    match programs.as_slice() {
        [] => origin.show(bot, messages::NO_PROGRAMS, None).await?,
        [only] => choose_day(bot, origin, db, user_id, only.id).await?,
        _ => {
            let keyboard = keyboards::programs_keyboard(&programs, CallbackAction::TrainProgram);
            origin
                .show(bot, "Выберите программу для тренировки:", Some(keyboard))
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
        None => origin.show(bot, "❌ Программа не найдена.", None).await?,
        Some(days) if days.is_empty() => {
            origin.show(bot, "В программе нет тренировочных дней.", None).await?
        }
        Some(days) => {
            let keyboard = keyboards::days_keyboard(&days, CallbackAction::TrainDay);
            origin
                .show(bot, "Выберите тренировочный день:", Some(keyboard))
                .await?;
        }
    }
    Ok(())
}

/// Day listing with the start button
pub async fn show_day(
    bot: &Bot,
    origin: Origin,
    db: &Db,
    config: &BotConfig,
    user_id: i64,
    day_id: i64,
) -> HandlerResult {
    let found = {
        let db = db.lock().await;
        match owned_day(&db, user_id, day_id)? {
            Some((_, day)) => {
                let exercises = db.get_exercises(day.id)?;
                Some((day, exercises))
            }
            None => None,
        }
    };

    let Some((day, exercises)) = found else {
        origin.show(bot, "❌ День не найден.", None).await?;
        return Ok(());
    };
    if exercises.is_empty() {
        origin.show(bot, "В этом дне нет упражнений.", None).await?;
        return Ok(());
    }

    let text = format!(
        "{}\nГотовы начать тренировку?",
        messages::day_info(&day, &exercises, &config.parser)
    );
    origin
        .show(bot, text, Some(keyboards::start_training_keyboard(day.id)))
        .await?;
    Ok(())
}

pub async fn start_run(
    bot: &Bot,
    origin: Origin,
    dialogue: &MyDialogue,
    db: &Db,
    config: &BotConfig,
    user_id: i64,
    day_id: i64,
) -> HandlerResult {
    let started = {
        let db = db.lock().await;
        match owned_day(&db, user_id, day_id)? {
            Some((program, day)) => {
                let exercises: Vec<RunExercise> =
                    db.get_exercises(day.id)?.iter().map(RunExercise::from).collect();
                let run_id = db.create_session_run(user_id, program.id)?;
                match TrainingRun::new(run_id, user_id, program.id, exercises) {
                    Some(run) => {
                        let prompt = set_prompt(&db, &config.parser, &run)?;
                        Some((run, prompt))
                    }
                    None => None,
                }
            }
            None => None,
        }
    };

    let Some((run, prompt)) = started else {
        origin.show(bot, "В этом дне нет подходов для тренировки.", None).await?;
        return Ok(());
    };

    info!(user_id, run_id = run.run_id, day_id, "training started");
    dialogue.update(State::Training { run }).await?;
    origin.show(bot, prompt, None).await?;
    Ok(())
}

/// Prompt for the current set, with the last weight if there is one
fn set_prompt(db: &Database, config: &ParserConfig, run: &TrainingRun) -> anyhow::Result<String> {
    let Some((exercise, target)) = run.current() else {
        return Ok(String::new());
    };
    let query = SetQuery {
        user_id: run.user_id,
        exercise_id: exercise.exercise_id,
        exercise_name: &exercise.name,
        set_index: target.set_index,
        exclude_id: None,
    };
    let previous = previous_set(db, &query)?;
    Ok(messages::set_prompt(exercise, target, previous.as_ref(), config))
}

/// Weight for the current set
pub async fn receive_weight(
    bot: &Bot,
    origin: Origin,
    dialogue: &MyDialogue,
    db: &Db,
    config: &BotConfig,
    mut run: TrainingRun,
    text: &str,
) -> HandlerResult {
    let weight = match parse_weight(text) {
        WeightInput::Valid(w) => w,
        WeightInput::Negative => {
            origin.show(bot, messages::NEGATIVE_WEIGHT, None).await?;
            return Ok(());
        }
        WeightInput::Invalid => {
            origin.show(bot, messages::INVALID_WEIGHT, None).await?;
            return Ok(());
        }
    };

    let Some((exercise, target)) = run.current() else {
        dialogue.reset().await?;
        return Ok(());
    };
    let (exercise_id, set_index) = (exercise.exercise_id, target.set_index);

    let comparison = {
        let db = db.lock().await;
        let record = db.add_performed_set(run.run_id, exercise_id, set_index, weight)?;
        compare(&*db, &SetQuery::before(run.user_id, &record), weight)?
    };
    origin.show(bot, messages::set_recorded(&comparison), None).await?;

    match run.advance() {
        Step::NextSet => {}
        Step::ExerciseFinished { name } => {
            let name = base_exercise_name(&name, &config.parser);
            origin.show(bot, messages::exercise_finished(&name), None).await?;
        }
        Step::Finished => {
            dialogue.reset().await?;
            return finish_run(bot, origin, db, config, &run).await;
        }
    }

    let prompt = {
        let db = db.lock().await;
        set_prompt(&db, &config.parser, &run)?
    };
    dialogue.update(State::Training { run }).await?;
    origin.show(bot, prompt, None).await?;
    Ok(())
}

async fn finish_run(
    bot: &Bot,
    origin: Origin,
    db: &Db,
    config: &BotConfig,
    run: &TrainingRun,
) -> HandlerResult {
    let (program_name, comparisons) = {
        let db = db.lock().await;
        let sets = db.get_performed_sets_by_run(run.run_id)?;
        let comparisons = run_comparisons(&*db, run.user_id, &sets)?;
        let program_name = db
            .get_program(run.program_id)?
            .map(|p| p.name)
            .unwrap_or_default();
        (program_name, comparisons)
    };

    info!(
        user_id = run.user_id,
        run_id = run.run_id,
        sets = comparisons.len(),
        "training finished"
    );
    let summary = messages::training_summary(&program_name, &comparisons, &config.parser);
    origin.show(bot, summary, None).await?;
    Ok(())
}
