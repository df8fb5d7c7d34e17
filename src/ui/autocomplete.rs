//! Completion of room member names in the composer input.

use crate::{
    domain::composer_input::SelectionRange,
    ui::contracts::{Autocomplete, Completion},
};

/// Suggests members whose id or display name starts with the word under
/// the cursor.
#[derive(Debug, Clone, Default)]
pub struct MemberAutocomplete {
    candidates: Vec<String>,
    matches: Vec<String>,
    selected: Option<usize>,
    word: SelectionRange,
}

impl MemberAutocomplete {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    pub fn matches(&self) -> &[String] {
        &self.matches
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected
            .and_then(|index| self.matches.get(index))
            .map(String::as_str)
    }
}

impl Autocomplete for MemberAutocomplete {
    fn update_query(&mut self, query: &str, selection: SelectionRange) {
        self.word = word_before(query, selection.end);
        self.selected = None;

        let word: String = query
            .chars()
            .skip(self.word.start)
            .take(self.word.end - self.word.start)
            .collect();
        let needle = word.trim_start_matches('@').to_lowercase();

        self.matches = if needle.is_empty() {
            Vec::new()
        } else {
            self.candidates
                .iter()
                .filter(|candidate| {
                    candidate
                        .trim_start_matches('@')
                        .to_lowercase()
                        .starts_with(&needle)
                })
                .cloned()
                .collect()
        };
    }

    fn on_up_arrow(&mut self) -> bool {
        if self.matches.is_empty() {
            return false;
        }

        self.selected = Some(match self.selected {
            Some(0) | None => self.matches.len() - 1,
            Some(index) => index - 1,
        });
        true
    }

    fn on_down_arrow(&mut self) -> bool {
        if self.matches.is_empty() {
            return false;
        }

        self.selected = Some(match self.selected {
            Some(index) if index + 1 < self.matches.len() => index + 1,
            _ => 0,
        });
        true
    }

    fn on_confirm(&mut self) -> Option<Completion> {
        let completion = self.selected()?.to_owned();
        self.selected = None;
        self.matches.clear();

        Some(Completion {
            range: self.word,
            completion,
        })
    }
}

/// Range of the whitespace-delimited word ending at `cursor`.
fn word_before(text: &str, cursor: usize) -> SelectionRange {
    let cursor = cursor.min(text.chars().count());
    let start = text
        .chars()
        .take(cursor)
        .collect::<Vec<_>>()
        .iter()
        .rposition(|ch| ch.is_whitespace())
        .map_or(0, |index| index + 1);

    SelectionRange::new(start, cursor)
}
