use log::debug;

use crate::config::{ChoiceInput, VoteTallyResult};

/// Counts the votes of each choice and finds the majority choice, if any.
///
/// The tally keeps the order in which the choices were first seen. A choice only wins
/// with strictly more votes than every other choice: a shared top count has no winner.
pub fn calculate_vote_tally(choices: &[ChoiceInput]) -> VoteTallyResult {
    let mut tally: Vec<(String, u64)> = Vec::new();
    let mut max_count: u64 = 0;
    let mut winner: Option<String> = None;

    for c in choices.iter() {
        let count = match tally.iter_mut().find(|(label, _)| *label == c.choice) {
            Some((_, count)) => {
                *count += 1;
                *count
            }
            None => {
                tally.push((c.choice.clone(), 1));
                1
            }
        };

        if count > max_count {
            max_count = count;
            winner = Some(c.choice.clone());
        } else if count == max_count {
            // Tied with the current leader.
            winner = None;
        }
    }

    let total: u64 = tally.iter().map(|(_, count)| *count).sum();
    debug!(
        "calculate_vote_tally: tally: {:?} total: {:?} winner: {:?}",
        tally, total, winner
    );
    VoteTallyResult {
        tally,
        total,
        winner,
    }
}
