use crate::model::{Outcome, QuestionSet};

use super::AnswerSheet;

/// Number of questions whose selected label equals the correct label.
///
/// Unanswered slots never match. Questions beyond the sheet's length count
/// as unanswered.
#[must_use]
pub fn count_correct(questions: &QuestionSet, answers: &AnswerSheet) -> u32 {
    let correct = questions
        .questions()
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.selection(*i) == Some(q.correct()))
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}

/// Score an answer sheet against its question set.
#[must_use]
pub fn score(questions: &QuestionSet, answers: &AnswerSheet) -> Outcome {
    Outcome {
        score: count_correct(questions, answers),
        total: u32::try_from(questions.len()).unwrap_or(u32::MAX),
        category: questions.category().to_string(),
        difficulty: questions.difficulty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChoiceLabel, Difficulty, Question};

    fn set(correct: &[ChoiceLabel]) -> QuestionSet {
        let questions = correct
            .iter()
            .enumerate()
            .map(|(i, label)| {
                Question::new(
                    format!("Q{i}"),
                    ["a", "b", "c", "d"],
                    *label,
                    "Java",
                    Difficulty::Easy,
                )
            })
            .collect();
        QuestionSet::new("Java", Difficulty::Easy, questions)
    }

    #[test]
    fn counts_exact_label_matches() {
        let questions = set(&[ChoiceLabel::A, ChoiceLabel::B, ChoiceLabel::C]);
        let mut answers = AnswerSheet::new(3);
        answers.select(0, ChoiceLabel::A).unwrap();
        answers.select(1, ChoiceLabel::D).unwrap();

        let outcome = score(&questions, &answers);
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.category, "Java");
        assert_eq!(outcome.difficulty, Difficulty::Easy);
    }

    #[test]
    fn scoring_is_repeatable() {
        let questions = set(&[ChoiceLabel::D, ChoiceLabel::D]);
        let mut answers = AnswerSheet::new(2);
        answers.select(1, ChoiceLabel::D).unwrap();
        assert_eq!(score(&questions, &answers), score(&questions, &answers));
    }

    #[test]
    fn empty_set_scores_zero_of_zero() {
        let questions = set(&[]);
        let outcome = score(&questions, &AnswerSheet::new(0));
        assert_eq!((outcome.score, outcome.total), (0, 0));
    }
}
