use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Difficulty, Question, QuestionError, QuestionId, Topic};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),
    #[error("invalid built-in question {id}: {source}")]
    InvalidQuestion {
        id: QuestionId,
        #[source]
        source: QuestionError,
    },
}

/// Read-only, ordered collection of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank, keeping definition order.
    ///
    /// # Errors
    ///
    /// Returns `BankError::DuplicateId` if two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        let mut seen = HashSet::with_capacity(questions.len());
        for q in &questions {
            if !seen.insert(q.id()) {
                return Err(BankError::DuplicateId(q.id()));
            }
        }
        Ok(Self { questions })
    }

    /// The built-in question set.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if a built-in entry fails validation.
    pub fn try_builtin() -> Result<Self, BankError> {
        let questions = BUILTIN
            .iter()
            .map(|raw| {
                Question::new(
                    QuestionId::new(raw.id),
                    raw.prompt,
                    raw.options.iter().map(|o| (*o).to_owned()).collect(),
                    raw.correct,
                    Some(raw.explanation.to_owned()),
                    raw.difficulty,
                    raw.topic,
                )
                .map_err(|source| BankError::InvalidQuestion {
                    id: QuestionId::new(raw.id),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(questions)
    }

    /// Questions for a run, in bank order.
    ///
    /// `Difficulty::Mixed` matches every difficulty; `topic: None` matches every topic.
    /// An empty result is valid; callers must not start a session from it.
    #[must_use]
    pub fn filter(&self, difficulty: Difficulty, topic: Option<Topic>) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| topic.is_none_or(|t| q.topic() == t))
            .filter(|q| difficulty.matches(q.difficulty()))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

struct RawQuestion {
    id: u32,
    difficulty: Difficulty,
    topic: Topic,
    prompt: &'static str,
    options: [&'static str; 4],
    correct: usize,
    explanation: &'static str,
}

const fn raw(
    id: u32,
    difficulty: Difficulty,
    topic: Topic,
    prompt: &'static str,
    options: [&'static str; 4],
    correct: usize,
    explanation: &'static str,
) -> RawQuestion {
    RawQuestion {
        id,
        difficulty,
        topic,
        prompt,
        options,
        correct,
        explanation,
    }
}

use Difficulty::{Hard, Medium, Normal};
use Topic::{Gk, Math, Science, Sports};

#[rustfmt::skip]
const BUILTIN: [RawQuestion; 28] = [
    // Math
    raw(1, Normal, Math, "What is 12 + 8?", ["18", "20", "22", "24"], 1, "12 + 8 = 20"),
    raw(2, Normal, Math, "What is 5 × 6?", ["25", "30", "35", "40"], 1, "5 × 6 = 30"),
    raw(3, Normal, Math, "What is 100 - 37?", ["63", "73", "67", "57"], 0, "100 - 37 = 63"),
    raw(4, Medium, Math, "What is the square root of 144?", ["10", "11", "12", "13"], 2, "√144 = 12"),
    raw(5, Medium, Math, "If x + 5 = 12, what is x?", ["5", "6", "7", "8"], 2, "x = 12 - 5 = 7"),
    raw(6, Hard, Math, "What is 15% of 240?", ["30", "32", "36", "40"], 2, "15% of 240 = 0.15 × 240 = 36"),
    raw(7, Hard, Math, "What is the value of π (pi) rounded to 2 decimal places?", ["3.12", "3.14", "3.16", "3.18"], 1, "π ≈ 3.14159..."),
    // Science
    raw(8, Normal, Science, "What planet is known as the Red Planet?", ["Venus", "Mars", "Jupiter", "Saturn"], 1, "Mars is called the Red Planet due to iron oxide on its surface."),
    raw(9, Normal, Science, "How many legs does a spider have?", ["6", "8", "10", "12"], 1, "Spiders have 8 legs."),
    raw(10, Normal, Science, "What gas do plants absorb from the atmosphere?", ["Oxygen", "Nitrogen", "Carbon Dioxide", "Hydrogen"], 2, "Plants absorb CO2 for photosynthesis."),
    raw(11, Medium, Science, "What is the chemical symbol for gold?", ["Go", "Gd", "Au", "Ag"], 2, "Au is from the Latin 'aurum'."),
    raw(12, Medium, Science, "What is the speed of light?", ["300,000 km/s", "150,000 km/s", "450,000 km/s", "200,000 km/s"], 0, "Light travels at approximately 300,000 km/s."),
    raw(13, Hard, Science, "What is the powerhouse of the cell?", ["Nucleus", "Ribosome", "Mitochondria", "Chloroplast"], 2, "Mitochondria produce energy (ATP) for the cell."),
    raw(14, Hard, Science, "What is the pH of pure water?", ["5", "6", "7", "8"], 2, "Pure water has a neutral pH of 7."),
    // Sports
    raw(15, Normal, Sports, "How many players are on a soccer team?", ["9", "10", "11", "12"], 2, "Each soccer team has 11 players on the field."),
    raw(16, Normal, Sports, "In which sport do you use a shuttlecock?", ["Tennis", "Badminton", "Squash", "Table Tennis"], 1, "Badminton uses a shuttlecock."),
    raw(17, Normal, Sports, "How many points is a touchdown worth in American football?", ["3", "5", "6", "7"], 2, "A touchdown is worth 6 points."),
    raw(18, Medium, Sports, "Which country won the FIFA World Cup in 2018?", ["Germany", "Brazil", "France", "Argentina"], 2, "France won the 2018 FIFA World Cup."),
    raw(19, Medium, Sports, "How many Grand Slam tournaments are there in tennis?", ["3", "4", "5", "6"], 1, "There are 4 Grand Slams: Australian Open, French Open, Wimbledon, US Open."),
    raw(20, Hard, Sports, "What is the diameter of a basketball hoop in inches?", ["16", "18", "20", "22"], 1, "A basketball hoop is 18 inches in diameter."),
    raw(21, Hard, Sports, "Which country has won the most Olympic gold medals in history?", ["China", "Russia", "USA", "Germany"], 2, "The USA has won the most Olympic gold medals."),
    // General knowledge
    raw(22, Normal, Gk, "What is the capital of France?", ["London", "Berlin", "Paris", "Madrid"], 2, "Paris is the capital of France."),
    raw(23, Normal, Gk, "How many continents are there?", ["5", "6", "7", "8"], 2, "There are 7 continents."),
    raw(24, Normal, Gk, "What is the largest ocean on Earth?", ["Atlantic", "Indian", "Arctic", "Pacific"], 3, "The Pacific Ocean is the largest."),
    raw(25, Medium, Gk, "Who painted the Mona Lisa?", ["Picasso", "Van Gogh", "Da Vinci", "Michelangelo"], 2, "Leonardo da Vinci painted the Mona Lisa."),
    raw(26, Medium, Gk, "What year did World War II end?", ["1943", "1944", "1945", "1946"], 2, "World War II ended in 1945."),
    raw(27, Hard, Gk, "What is the smallest country in the world?", ["Monaco", "Vatican City", "San Marino", "Liechtenstein"], 1, "Vatican City is the smallest country."),
    raw(28, Hard, Gk, "Who wrote 'Romeo and Juliet'?", ["Charles Dickens", "William Shakespeare", "Jane Austen", "Mark Twain"], 1, "William Shakespeare wrote Romeo and Juliet."),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(questions: &[Question]) -> Vec<u32> {
        questions.iter().map(|q| q.id().value()).collect()
    }

    #[test]
    fn builtin_table_is_valid() {
        let bank = QuestionBank::try_builtin().unwrap();
        assert_eq!(bank.len(), 28);
        assert_eq!(bank.get(QuestionId::new(24)).unwrap().correct().get(), 3);
    }

    #[test]
    fn filter_by_difficulty_and_topic_preserves_order() {
        let bank = QuestionBank::try_builtin().unwrap();
        assert_eq!(ids(&bank.filter(Difficulty::Normal, Some(Topic::Math))), vec![1, 2, 3]);
        assert_eq!(ids(&bank.filter(Difficulty::Hard, Some(Topic::Sports))), vec![20, 21]);
        assert_eq!(
            ids(&bank.filter(Difficulty::Mixed, Some(Topic::Science))),
            vec![8, 9, 10, 11, 12, 13, 14]
        );
    }

    #[test]
    fn filter_matches_tags_for_every_selector_pair() {
        let bank = QuestionBank::try_builtin().unwrap();
        for difficulty in Difficulty::ALL {
            for topic in Topic::ALL {
                let picked = bank.filter(difficulty, Some(topic));
                assert!(!picked.is_empty());
                for q in &picked {
                    assert_eq!(q.topic(), topic);
                    assert!(difficulty.matches(q.difficulty()));
                }
                let mut sorted = ids(&picked);
                sorted.sort_unstable();
                assert_eq!(sorted, ids(&picked));
            }
        }
    }

    #[test]
    fn filter_without_topic_spans_all_topics() {
        let bank = QuestionBank::try_builtin().unwrap();
        assert_eq!(bank.filter(Difficulty::Mixed, None).len(), 28);
        assert_eq!(bank.filter(Difficulty::Medium, None).len(), 8);
    }

    #[test]
    fn empty_result_is_valid() {
        let bank = QuestionBank::new(Vec::new()).unwrap();
        assert!(bank.filter(Difficulty::Hard, Some(Topic::Gk)).is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let bank = QuestionBank::try_builtin().unwrap();
        let mut questions = bank.questions().to_vec();
        questions.push(questions[0].clone());
        assert_eq!(
            QuestionBank::new(questions).unwrap_err(),
            BankError::DuplicateId(QuestionId::new(1))
        );
    }
}
