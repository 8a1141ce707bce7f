//! Inline keyboards and the callback data they carry

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::config::ParserConfig;
use crate::db::{Exercise, Program, WorkoutDay};
use crate::parser::format::base_exercise_name;

/// Most days a program built with /add can have
pub const MAX_DAYS: usize = 7;

/// Parsed callback data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    DayCount(usize),
    SaveProgram,
    CancelProgram,
    TrainProgram(i64),
    TrainDay(i64),
    StartTraining(i64),
    CancelTraining,
    DeleteProgram(i64),
    ConfirmDelete(i64),
    CancelDelete,
    StatsProgram(i64),
    StatsDay(i64),
    StatsExercise(i64),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "save_program" => return Some(Self::SaveProgram),
            "cancel_program" => return Some(Self::CancelProgram),
            "cancel_training" => return Some(Self::CancelTraining),
            "cancel_delete" => return Some(Self::CancelDelete),
            _ => {}
        }

        let (prefix, id) = data.split_once(':')?;
        if prefix == "days" {
            return id
                .parse()
                .ok()
                .filter(|n| (1..=MAX_DAYS).contains(n))
                .map(Self::DayCount);
        }

        let id: i64 = id.parse().ok()?;
        let action = match prefix {
            "train_program" => Self::TrainProgram(id),
            "train_day" => Self::TrainDay(id),
            "start_training" => Self::StartTraining(id),
            "delete_program" => Self::DeleteProgram(id),
            "confirm_delete" => Self::ConfirmDelete(id),
            "stats_program" => Self::StatsProgram(id),
            "stats_day" => Self::StatsDay(id),
            "stats_exercise" => Self::StatsExercise(id),
            _ => return None,
        };
        Some(action)
    }

    pub fn data(&self) -> String {
        match self {
            Self::DayCount(n) => format!("days:{}", n),
            Self::SaveProgram => "save_program".to_string(),
            Self::CancelProgram => "cancel_program".to_string(),
            Self::TrainProgram(id) => format!("train_program:{}", id),
            Self::TrainDay(id) => format!("train_day:{}", id),
            Self::StartTraining(id) => format!("start_training:{}", id),
            Self::CancelTraining => "cancel_training".to_string(),
            Self::DeleteProgram(id) => format!("delete_program:{}", id),
            Self::ConfirmDelete(id) => format!("confirm_delete:{}", id),
            Self::CancelDelete => "cancel_delete".to_string(),
            Self::StatsProgram(id) => format!("stats_program:{}", id),
            Self::StatsDay(id) => format!("stats_day:{}", id),
            Self::StatsExercise(id) => format!("stats_exercise:{}", id),
        }
    }
}

fn button(label: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.data())
}

/// Buttons 1..=7 in one row
pub fn day_count_keyboard() -> InlineKeyboardMarkup {
    let row = (1..=MAX_DAYS)
        .map(|n| button(n.to_string(), CallbackAction::DayCount(n)))
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(vec![row])
}

pub fn confirm_program_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button("✅ Сохранить", CallbackAction::SaveProgram),
        button("❌ Отмена", CallbackAction::CancelProgram),
    ]])
}

/// One program per row
pub fn programs_keyboard(
    programs: &[Program],
    action: impl Fn(i64) -> CallbackAction,
) -> InlineKeyboardMarkup {
    let rows = programs
        .iter()
        .map(|p| vec![button(format!("📋 {}", p.name), action(p.id))])
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

pub fn days_keyboard(
    days: &[WorkoutDay],
    action: impl Fn(i64) -> CallbackAction,
) -> InlineKeyboardMarkup {
    let rows = days
        .iter()
        .map(|d| vec![button(format!("📅 {}", d.name), action(d.id))])
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

pub fn exercises_keyboard(
    exercises: &[Exercise],
    config: &ParserConfig,
    action: impl Fn(i64) -> CallbackAction,
) -> InlineKeyboardMarkup {
    let rows = exercises
        .iter()
        .map(|e| vec![button(base_exercise_name(&e.name, config), action(e.id))])
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

pub fn start_training_keyboard(day_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button("▶️ Начать", CallbackAction::StartTraining(day_id)),
        button("❌ Отмена", CallbackAction::CancelTraining),
    ]])
}

pub fn confirm_delete_keyboard(program_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button("🗑 Удалить", CallbackAction::ConfirmDelete(program_id)),
        button("Отмена", CallbackAction::CancelDelete),
    ]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_data_round_trip() {
        let actions = [
            CallbackAction::DayCount(3),
            CallbackAction::SaveProgram,
            CallbackAction::TrainDay(12),
            CallbackAction::StartTraining(5),
            CallbackAction::ConfirmDelete(9),
            CallbackAction::CancelDelete,
            CallbackAction::StatsExercise(77),
        ];
        for action in actions {
            assert_eq!(CallbackAction::parse(&action.data()), Some(action));
        }
    }

    #[test]
    fn test_rejects_unknown_data() {
        assert_eq!(CallbackAction::parse("ex:jab"), None);
        assert_eq!(CallbackAction::parse("train_day:abc"), None);
        assert_eq!(CallbackAction::parse("days:0"), None);
        assert_eq!(CallbackAction::parse("days:8"), None);
        assert_eq!(CallbackAction::parse(""), None);
    }

    #[test]
    fn test_day_count_keyboard() {
        let kb = day_count_keyboard();
        assert_eq!(kb.inline_keyboard.len(), 1);
        assert_eq!(kb.inline_keyboard[0].len(), MAX_DAYS);
    }
}
