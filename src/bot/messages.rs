//! Message texts

use std::collections::BTreeMap;

use crate::config::ParserConfig;
use crate::db::{Exercise, PerformedSet, Program, WorkoutDay};
use crate::error::LineError;
use crate::parser::batch::{ExerciseBatch, error_sample};
use crate::parser::format::{base_exercise_name, display_line};
use crate::parser::{DayDraft, ProgramDraft};
use crate::progress::{Comparison, SetComparison};
use crate::training::{RunExercise, SetTarget};

/// Exercises per day shown in a program preview
const PREVIEW_EXERCISES: usize = 3;

/// Entries per set shown in exercise stats
const HISTORY_ENTRIES: usize = 10;

const DATE_FORMAT: &str = "%d.%m.%Y";

pub const WELCOME: &str = "🏋️ Привет! Я веду твои тренировки.\n\n\
    Отправь программу текстом, например:\n\n\
    ДЕНЬ 1: Спина\n\
    Тяга штанги в наклоне — 12-10-8\n\
    Подтягивания — 4х8\n\n\
    ДЕНЬ 2: Ноги\n\
    Гакк-присед — 20-16-14-12\n\n\
    Или собери её по шагам: /add\n\
    /programs - мои программы\n\
    /train - начать тренировку\n\
    /stats - статистика\n\
    /help - помощь";

pub const HELP: &str = "📖 Помощь\n\n\
    /add - добавить программу по шагам\n\
    /programs - показать программы\n\
    /train - начать тренировку\n\
    /stats - история весов по упражнению\n\
    /delete - удалить программу\n\
    /cancel - отменить текущее действие\n\n\
    Форматы подходов:\n\
    • Гакк-присед — 20-16-14-12\n\
    • Жим лёжа — 4х10\n\
    • Подтягивания — 4 подхода по 10 раз\n\
    • Тяга блока 3*10-12 (берётся нижняя граница)";

pub const PROGRAM_HINT: &str = "Не похоже на программу тренировок.\n\n\
    Отправь дни и упражнения, например:\n\
    ДЕНЬ 1: Грудь\n\
    Жим лёжа — 4х10\n\n\
    Или воспользуйся /add";

pub const DAY_COUNT_PROMPT: &str = "Сколько тренировочных дней будет в программе?";

pub const NO_PROGRAMS: &str = "У вас пока нет программ. Отправьте программу текстом или используйте /add.";

pub const WEIGHT_PROMPT: &str = "Введите вес для этого подхода (в кг):";

pub const INVALID_WEIGHT: &str = "Пожалуйста, введите число (например: 20 или 20.5):";

pub const NEGATIVE_WEIGHT: &str = "Вес не может быть отрицательным. Введите корректное значение:";

pub const CANCELLED: &str = "Отменено.";

pub fn limit_reached(max: usize) -> String {
    format!(
        "❌ У вас уже есть максимальное количество программ ({}).\n\n\
        Чтобы добавить новую, сначала удалите одну из существующих: /delete",
        max
    )
}

pub fn day_name_prompt(day: usize, total: usize) -> String {
    format!(
        "Введите название для дня {} из {} (например: Спина, Грудь, Ноги):",
        day, total
    )
}

pub fn day_added(name: &str) -> String {
    format!(
        "День «{}» добавлен.\n\n\
        Теперь добавьте упражнения, каждое на новой строке:\n\
        • Гакк-присед — 20-16-14-12\n\
        • Жим лёжа — 4х10\n\
        • Подтягивания — 4 подхода по 10 раз\n\n\
        Когда закончите с этим днём, отправьте /done",
        name
    )
}

pub fn program_saved(name: &str, days: usize) -> String {
    format!(
        "✅ Программа «{}» сохранена!\n\nДней: {}\nНачать тренировку: /train",
        name, days
    )
}

fn push_errors(text: &mut String, errors: &[LineError], hidden: usize) {
    if errors.is_empty() {
        return;
    }
    text.push_str("\n⚠️ Ошибки:\n");
    for e in errors {
        text.push_str(&format!("{}\n", e));
    }
    if hidden > 0 {
        text.push_str(&format!("  ... и ещё {} ошибок\n", hidden));
    }
}

/// Reply to a message with exercise lines during /add
pub fn batch_report(batch: &ExerciseBatch) -> String {
    let mut text = String::new();

    if batch.added() > 0 {
        text.push_str(&format!("✅ Добавлено упражнений: {}\n", batch.added()));
        for exercise in batch.parsed.iter().take(PREVIEW_EXERCISES) {
            text.push_str(&format!("  • {}\n", exercise.raw_line()));
        }
        if batch.added() > PREVIEW_EXERCISES {
            text.push_str(&format!(
                "  ... и ещё {} упражнений\n",
                batch.added() - PREVIEW_EXERCISES
            ));
        }
    }

    let (errors, hidden) = batch.error_sample();
    push_errors(&mut text, errors, hidden);

    text.push_str("\nПродолжайте добавлять упражнения или отправьте /done для завершения дня.");
    text
}

fn preview_day(text: &mut String, day: &DayDraft) {
    text.push_str(&format!("📅 {}\n", day.name));
    for exercise in day.exercises.iter().take(PREVIEW_EXERCISES) {
        text.push_str(&format!("  • {}\n", exercise.display()));
    }
    if day.exercises.len() > PREVIEW_EXERCISES {
        text.push_str(&format!(
            "  ... и ещё {} упражнений\n",
            day.exercises.len() - PREVIEW_EXERCISES
        ));
    }
    text.push('\n');
}

/// Parsed program shown before saving
pub fn program_preview(draft: &ProgramDraft, errors: &[LineError]) -> String {
    let mut text = format!(
        "📋 {}\n\nДней: {}, упражнений: {}\n\n",
        draft.name(),
        draft.days().len(),
        draft.exercise_count()
    );
    for day in draft.days() {
        preview_day(&mut text, day);
    }

    let (shown, hidden) = error_sample(errors);
    push_errors(&mut text, shown, hidden);

    text.push_str("\nСохранить программу?");
    text
}

/// Text that looked like a program but had no usable line
pub fn nothing_parsed(errors: &[LineError]) -> String {
    let mut text = String::from("❌ Не удалось распознать ни одного упражнения.\n");
    let (shown, hidden) = error_sample(errors);
    push_errors(&mut text, shown, hidden);
    text
}

/// Day with its exercises shown the way they were typed
pub fn day_info(day: &WorkoutDay, exercises: &[Exercise], config: &ParserConfig) -> String {
    let mut text = format!("📅 {}\n\n", day.name);
    if exercises.is_empty() {
        text.push_str("Упражнения пока не добавлены.");
        return text;
    }
    for exercise in exercises {
        text.push_str(&display_line(&exercise.name, &exercise.reps(), config));
        text.push('\n');
    }
    text
}

/// All programs of a user with their days
pub fn program_list(
    programs: &[(Program, Vec<(WorkoutDay, Vec<Exercise>)>)],
    config: &ParserConfig,
) -> String {
    if programs.is_empty() {
        return NO_PROGRAMS.to_string();
    }

    let mut text = String::from("📋 Ваши программы:\n\n");
    for (i, (program, days)) in programs.iter().enumerate() {
        text.push_str(&format!("{}. {}\n\n", i + 1, program.name));
        for (day, exercises) in days {
            text.push_str(&day_info(day, exercises, config));
            text.push('\n');
        }
    }
    text
}

pub fn set_prompt(
    exercise: &RunExercise,
    target: &SetTarget,
    previous: Option<&PerformedSet>,
    config: &ParserConfig,
) -> String {
    let mut text = format!(
        "💪 {}\nПодход {} из {}: {} раз\n\n",
        base_exercise_name(&exercise.name, config),
        target.set_index,
        exercise.sets.len(),
        target.reps
    );
    match previous {
        Some(previous) => text.push_str(&format!(
            "📊 Прошлый вес: {:.1} кг\n   (последняя тренировка: {})\n\n",
            previous.weight,
            previous.performed_at.format(DATE_FORMAT)
        )),
        None => text.push_str("📊 Это первый раз для этого подхода\n\n"),
    }
    text.push_str(WEIGHT_PROMPT);
    text
}

pub fn set_recorded(comparison: &Comparison) -> String {
    format!("✅ Записано: {:.1} кг ({})", comparison.current, comparison.delta)
}

pub fn exercise_finished(name: &str) -> String {
    format!("✅ Упражнение «{}» завершено", name)
}

/// Per-set results of a finished run, grouped by exercise
pub fn training_summary(
    program_name: &str,
    sets: &[SetComparison],
    config: &ParserConfig,
) -> String {
    let mut text = format!("🎉 Тренировка «{}» закончена!\n\n📊 Итоги:\n", program_name);
    if sets.is_empty() {
        text.push_str("\nНи одного подхода не записано.");
        return text;
    }

    let mut current: Option<&str> = None;
    for set in sets {
        if current != Some(set.exercise_name.as_str()) {
            text.push_str(&format!(
                "\n💪 {}\n",
                base_exercise_name(&set.exercise_name, config)
            ));
            current = Some(&set.exercise_name);
        }
        text.push_str(&format!(
            "  Подход {}: {:.1} кг ({})\n",
            set.set_index, set.comparison.current, set.comparison.delta
        ));
    }
    text
}

/// Weight history of one exercise, newest entries last
pub fn exercise_stats(
    exercise: &Exercise,
    history: &BTreeMap<u32, Vec<PerformedSet>>,
    config: &ParserConfig,
) -> String {
    let mut text = format!(
        "📊 Упражнение: {}\n\n",
        base_exercise_name(&exercise.name, config)
    );
    if history.is_empty() {
        text.push_str("По этому упражнению пока нет выполненных подходов.");
        return text;
    }

    for (set_index, records) in history {
        let reps = exercise
            .sets
            .iter()
            .find(|s| s.set_index == *set_index)
            .map(|s| format!(", {} повторений", s.reps))
            .unwrap_or_default();
        text.push_str(&format!("{} подход{}\n", set_index, reps));

        let skip = records.len().saturating_sub(HISTORY_ENTRIES);
        for record in records.iter().skip(skip) {
            text.push_str(&format!(
                "{} - {:.1} кг\n",
                record.performed_at.format(DATE_FORMAT),
                record.weight
            ));
        }
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::db::SetTemplate;
    use crate::parser::batch::MAX_REPORTED_ERRORS;
    use crate::parser::{parse_exercise_lines, segment_program};
    use crate::progress::WeightDelta;

    fn config() -> ParserConfig {
        ParserConfig::default()
    }

    fn stored_exercise(name: &str, reps: &[u32]) -> Exercise {
        Exercise {
            id: 1,
            day_id: 1,
            name: name.to_string(),
            position: 0,
            sets: reps
                .iter()
                .enumerate()
                .map(|(i, &reps)| SetTemplate {
                    id: i as i64 + 1,
                    exercise_id: 1,
                    set_index: i as u32 + 1,
                    reps,
                    weight: None,
                })
                .collect(),
        }
    }

    fn performed(set_index: u32, weight: f64, day: u32) -> PerformedSet {
        PerformedSet {
            id: day as i64,
            run_id: 1,
            exercise_id: 1,
            exercise_name: "Жим — 2 подхода".to_string(),
            set_index,
            weight,
            performed_at: Utc.with_ymd_and_hms(2026, 10, day, 18, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_batch_report_caps_samples_and_errors() {
        let text = "А — 10\nБ — 10\nВ — 10\nГ — 10\nх\nц\nч\nш";
        let report = batch_report(&parse_exercise_lines(text, &config()));
        assert!(report.contains("Добавлено упражнений: 4"));
        assert!(report.contains("А — 10"));
        assert!(!report.contains("Г — 10"));
        assert!(report.contains("... и ещё 1 упражнений"));
        assert!(report.contains("... и ещё 1 ошибок"));
    }

    #[test]
    fn test_preview_truncates_days() {
        let text = "ПРОГРАММА: Объём\nДЕНЬ 1: Грудь\n\
                    Жим — 4x10\nРазводка — 3x12\nОтжимания — 3x15\nПуловер — 3x12";
        let draft = segment_program(text, &config()).unwrap();
        let preview = program_preview(&draft, &[]);
        assert!(preview.starts_with("📋 Объём"));
        assert!(preview.contains("📅 Грудь"));
        assert!(preview.contains("Отжимания — 3x15"));
        assert!(!preview.contains("Пуловер"));
        assert!(preview.contains("... и ещё 1 упражнений"));
    }

    #[test]
    fn test_preview_errors_share_batch_cap() {
        let text = "ПРОГРАММА: Объём\nДЕНЬ 1: Грудь\nЖим — 4x10";
        let draft = segment_program(text, &config()).unwrap();
        let errors: Vec<LineError> = (0..MAX_REPORTED_ERRORS + 2)
            .map(|i| LineError::UnrecognizedName {
                line: format!("строка {}", i),
            })
            .collect();

        let preview = program_preview(&draft, &errors);
        assert_eq!(preview.matches("❌").count(), MAX_REPORTED_ERRORS);
        assert!(preview.contains("... и ещё 2 ошибок"));

        let nothing = nothing_parsed(&errors);
        assert!(nothing.contains("... и ещё 2 ошибок"));
    }

    #[test]
    fn test_day_info_rebuilds_raw_lines() {
        let day = WorkoutDay {
            id: 1,
            program_id: 1,
            day_index: 0,
            name: "Спина".to_string(),
        };
        let exercises = vec![stored_exercise("Хаммер верхний — 3 подхода", &[16, 10, 12])];
        let text = day_info(&day, &exercises, &config());
        assert_eq!(text, "📅 Спина\n\nХаммер верхний — 16-10-12\n");
    }

    #[test]
    fn test_set_prompt_mentions_previous_date() {
        let exercise = RunExercise {
            exercise_id: 1,
            name: "Жим — 2 подхода".to_string(),
            sets: vec![
                SetTarget { set_index: 1, reps: 10 },
                SetTarget { set_index: 2, reps: 8 },
            ],
        };
        let previous = performed(2, 45.0, 14);
        let text = set_prompt(&exercise, &exercise.sets[1], Some(&previous), &config());
        assert!(text.starts_with("💪 Жим\nПодход 2 из 2: 8 раз"));
        assert!(text.contains("45.0 кг"));
        assert!(text.contains("14.10.2026"));

        let first = set_prompt(&exercise, &exercise.sets[0], None, &config());
        assert!(first.contains("первый раз"));
    }

    #[test]
    fn test_training_summary_groups_exercises() {
        let comparison = |current: f64, delta: WeightDelta| Comparison {
            current,
            previous: None,
            delta,
        };
        let sets = vec![
            SetComparison {
                exercise_name: "Жим — 2 подхода".to_string(),
                set_index: 1,
                comparison: comparison(50.0, WeightDelta::Up(5.0)),
            },
            SetComparison {
                exercise_name: "Жим — 2 подхода".to_string(),
                set_index: 2,
                comparison: comparison(50.0, WeightDelta::New),
            },
        ];
        let text = training_summary("Сила", &sets, &config());
        assert_eq!(text.matches("💪 Жим").count(), 1);
        assert!(text.contains("Подход 1: 50.0 кг (+5.0 кг)"));
        assert!(text.contains("Подход 2: 50.0 кг (новая запись)"));
    }

    #[test]
    fn test_exercise_stats() {
        let exercise = stored_exercise("Жим — 2 подхода", &[10, 8]);
        let mut history = BTreeMap::new();
        history.insert(1, vec![performed(1, 40.0, 1), performed(1, 42.5, 4)]);
        let text = exercise_stats(&exercise, &history, &config());
        assert!(text.contains("1 подход, 10 повторений"));
        assert!(text.contains("04.10.2026 - 42.5 кг"));

        let empty = exercise_stats(&exercise, &BTreeMap::new(), &config());
        assert!(empty.contains("пока нет"));
    }

    #[test]
    fn test_limit_message() {
        assert!(limit_reached(2).contains("(2)"));
    }
}
