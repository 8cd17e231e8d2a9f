use fake::faker::lorem::en::{Sentence, Word};
use fake::Fake;
use flashcards_repo::card_repo::NewCard;
use flashcards_repo::label_repo::{LabelId, NewLabel};
use rand::Rng;

#[allow(dead_code)]
pub fn new_label() -> NewLabel {
    NewLabel::new(Word().fake())
}

#[allow(dead_code)]
pub struct NewCardGenerator {
    label_ids: Vec<LabelId>,
}

#[allow(dead_code)]
impl NewCardGenerator {
    pub fn new() -> NewCardGenerator {
        NewCardGenerator {
            label_ids: Vec::new(),
        }
    }

    pub fn with_labels(mut self, label_ids: Vec<LabelId>) -> NewCardGenerator {
        self.label_ids = label_ids;
        self
    }

    pub fn generate(&self) -> NewCard {
        NewCard::new(
            Sentence(1..4).fake(),
            Sentence(1..4).fake(),
            rand::thread_rng().gen_range(0..=5),
            self.label_ids.clone(),
        )
    }

    pub fn generate_many(&self, count: usize) -> Vec<NewCard> {
        (0..count).map(|_| self.generate()).collect()
    }
}
