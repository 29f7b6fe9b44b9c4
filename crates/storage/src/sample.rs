use quiz_core::model::{ChoiceLabel, Difficulty, Question, QuestionId};

use crate::repository::{QuestionBank, StorageError};

/// A small built-in question bank used for seeding local databases.
#[must_use]
pub fn sample_questions() -> Vec<Question> {
    use quiz_core::model::ChoiceLabel::{A, B, C, D};
    use quiz_core::model::Difficulty::{Easy, Hard, Medium};

    let rows: [(&str, Difficulty, &str, [&str; 4], ChoiceLabel); 9] = [
        (
            "Java",
            Easy,
            "Which keyword declares a subclass?",
            ["implements", "extends", "inherits", "super"],
            B,
        ),
        ("Java", Easy, "Size of an int in bits?", ["16", "64", "32", "8"], C),
        ("Java", Easy, "Entry point method name?", ["main", "start", "run", "init"], A),
        (
            "Java",
            Easy,
            "Which type holds true/false?",
            ["bit", "int", "Boolean only", "boolean"],
            D,
        ),
        ("Java", Easy, "Operator for string concatenation?", ["+", "&", ".", "++"], A),
        (
            "Java",
            Medium,
            "Which collection keeps insertion order and rejects duplicates?",
            ["HashSet", "TreeSet", "LinkedHashSet", "ArrayList"],
            C,
        ),
        (
            "Java",
            Medium,
            "Default value of an object field?",
            ["0", "null", "undefined", "empty"],
            B,
        ),
        (
            "Java",
            Hard,
            "Which memory area holds class metadata since Java 8?",
            ["PermGen", "Heap", "Stack", "Metaspace"],
            D,
        ),
        ("History", Easy, "Year the Berlin Wall fell?", ["1989", "1991", "1979", "1961"], A),
    ];

    rows.into_iter()
        .map(|(category, difficulty, text, choices, correct)| {
            Question::new(text, choices, correct, category, difficulty)
        })
        .collect()
}

/// Add the sample bank, skipping questions that are already present.
///
/// Returns the identifiers of the questions actually added; empty when the
/// bank was already seeded.
///
/// # Errors
///
/// Returns `StorageError` if the bank rejects the batch.
pub async fn seed_sample_bank(bank: &dyn QuestionBank) -> Result<Vec<QuestionId>, StorageError> {
    bank.add_questions(&sample_questions()).await
}
