//! Built-in Chapter 1 exercises, embedded at compile time.

use std::path::Path;

use anyhow::Result;

use crate::model::Exercise;
use crate::parser::parse_exercise_str;

const BUILTIN: &[(&str, &str)] = &[
    ("ch1-b.toml", include_str!("../exercises/ch1-b.toml")),
    ("ch1-d.toml", include_str!("../exercises/ch1-d.toml")),
    ("ch1-e.toml", include_str!("../exercises/ch1-e.toml")),
    ("ch1-f.toml", include_str!("../exercises/ch1-f.toml")),
    ("ch1-k.toml", include_str!("../exercises/ch1-k.toml")),
    ("ch1-l.toml", include_str!("../exercises/ch1-l.toml")),
];

/// Parse every built-in exercise, in page order.
///
/// A built-in that fails to parse is a packaging fault and is returned as
/// an error rather than skipped.
pub fn builtin_exercises() -> Result<Vec<Exercise>> {
    BUILTIN
        .iter()
        .map(|(file, content)| parse_exercise_str(content, Path::new(file)))
        .collect()
}

/// Look up a built-in exercise by id (`ch1-b`) or by letter (`b`, `B`).
pub fn find_builtin(id: &str) -> Result<Option<Exercise>> {
    let wanted = id.trim().to_lowercase();
    let wanted = if wanted.len() == 1 {
        format!("ch1-{wanted}")
    } else {
        wanted
    };
    Ok(builtin_exercises()?.into_iter().find(|e| e.id == wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::{evaluate_exercise, verify_alignment};
    use crate::model::{Answer, AnswerShape, Submission};
    use crate::parser::{parse_submission_str, submission_template, validate_exercise};

    #[test]
    fn all_builtins_parse_and_align() {
        let exercises = builtin_exercises().unwrap();
        let ids: Vec<&str> = exercises.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["ch1-b", "ch1-d", "ch1-e", "ch1-f", "ch1-k", "ch1-l"]);
        for ex in &exercises {
            verify_alignment(ex).unwrap();
        }
    }

    #[test]
    fn builtin_shapes_and_sizes() {
        let exercises = builtin_exercises().unwrap();
        let summary: Vec<(AnswerShape, usize)> = exercises
            .iter()
            .map(|e| (e.shape, e.questions.len()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (AnswerShape::FreeTextRow, 7),
                (AnswerShape::FreeTextRow, 8),
                (AnswerShape::MultiselectSet, 18),
                (AnswerShape::FixedColumnsRow, 11),
                (AnswerShape::SingleChoiceNumeric, 12),
                (AnswerShape::SingleChoiceText, 6),
            ]
        );
    }

    #[test]
    fn find_by_id_or_letter() {
        assert_eq!(find_builtin("ch1-k").unwrap().unwrap().tag, "ExerciseK");
        assert_eq!(find_builtin("L").unwrap().unwrap().id, "ch1-l");
        assert!(find_builtin("ch9-z").unwrap().is_none());
    }

    #[test]
    fn exercise_d_is_ungraded_with_diagrams() {
        let d = find_builtin("d").unwrap().unwrap();
        assert!(!d.is_graded());
        assert!(d.image_url("c").unwrap().ends_with("fig-16-a.png"));
        assert!(d.image_url("z").is_none());
        let warnings = validate_exercise(&d);
        assert!(warnings.iter().any(|w| w.message.contains("not graded")));
    }

    #[test]
    fn exercise_f_locks_adder() {
        let f = find_builtin("f").unwrap().unwrap();
        let adder = f.question("adder").unwrap();
        assert!(adder.example);
        assert_eq!(
            f.key.get("adder"),
            Some(&Answer::Row(vec!["voiced".into(), "alveolar".into(), "stop".into()]))
        );
    }

    #[test]
    fn answer_key_scores_full_marks() {
        for ex in builtin_exercises().unwrap() {
            let submission: Submission = ex
                .questions
                .iter()
                .filter_map(|q| ex.key.get(&q.id).map(|a| (q.id.clone(), a.clone())))
                .collect();
            let verdicts = evaluate_exercise(&ex, &submission).unwrap();
            assert!(verdicts.iter().all(|v| v.is_correct()), "{}", ex.id);
        }
    }

    #[test]
    fn templates_parse_for_every_builtin() {
        for ex in builtin_exercises().unwrap() {
            let template = submission_template(&ex);
            let file = parse_submission_str(&ex, &template, Path::new("template.toml"))
                .unwrap_or_else(|e| panic!("{}: {e:#}", ex.id));
            assert!(file.name.is_none());
            assert!(file.submission.get("adder").is_none());
        }
    }
}
