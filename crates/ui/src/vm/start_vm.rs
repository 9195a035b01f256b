use quiz_core::QuestionBank;
use quiz_core::model::{Difficulty, QuizSelection, Topic};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DifficultyCardVm {
    pub difficulty: Difficulty,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicCardVm {
    pub topic: Topic,
    pub name: &'static str,
    pub question_count: usize,
    pub link: String,
}

/// Two-step start screen: pick a difficulty, then a topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartVm {
    pub difficulties: Vec<DifficultyCardVm>,
    pub chosen: Option<Difficulty>,
}

impl StartVm {
    #[must_use]
    pub fn new() -> Self {
        let difficulties = Difficulty::ALL
            .into_iter()
            .map(|difficulty| DifficultyCardVm {
                difficulty,
                name: difficulty.label(),
                description: difficulty.description(),
            })
            .collect();
        Self {
            difficulties,
            chosen: None,
        }
    }

    pub fn choose(&mut self, difficulty: Difficulty) {
        self.chosen = Some(difficulty);
    }

    pub fn back(&mut self) {
        self.chosen = None;
    }

    /// Topic cards for the chosen difficulty; empty until one is chosen.
    #[must_use]
    pub fn topics(&self, bank: &QuestionBank) -> Vec<TopicCardVm> {
        let Some(difficulty) = self.chosen else {
            return Vec::new();
        };
        Topic::ALL
            .into_iter()
            .map(|topic| TopicCardVm {
                topic,
                name: topic.label(),
                question_count: bank.filter(difficulty, Some(topic)).len(),
                link: quiz_link(QuizSelection::new(difficulty, topic)),
            })
            .collect()
    }
}

impl Default for StartVm {
    fn default() -> Self {
        Self::new()
    }
}

/// Route that starts a quiz for `selection`.
#[must_use]
pub fn quiz_link(selection: QuizSelection) -> String {
    format!(
        "/quiz?difficulty={}&topic={}",
        selection.difficulty.as_str(),
        selection.topic.as_str()
    )
}
