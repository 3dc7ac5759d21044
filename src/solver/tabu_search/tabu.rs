//! Tabu bookkeeping: recently relocated units are forbidden from being
//! relocated again until their tenure expires, unless the aspiration
//! criterion grants an exception.
//!
//! Tracks tabu status keyed on this problem's move unit: the unit index
//! being relocated.

use std::collections::VecDeque;

use crate::solver::tabu_search::neighborhood::Move;

#[derive(Debug, Clone)]
pub struct TabuList {
    recent: VecDeque<usize>,
    tenure: usize,
}

impl TabuList {
    pub fn new(tenure: usize) -> Self {
        TabuList {
            recent: VecDeque::new(),
            tenure,
        }
    }

    pub fn is_tabu(&self, unit_index: usize) -> bool {
        self.recent.contains(&unit_index)
    }

    pub fn insert(&mut self, unit_index: usize) {
        self.recent.push_front(unit_index);
        while self.recent.len() > self.tenure {
            self.recent.pop_back();
        }
    }
}

/// Picks the best-scoring move by resulting makespan, skipping tabu moves
/// unless the aspiration criterion (this move beats the best makespan seen
/// so far by more than `aspiration_margin`) applies.
pub fn choose_best_move(
    moves: &[Move],
    tabu_list: &TabuList,
    best_makespan_so_far: u32,
    aspiration_margin: u32,
) -> Option<Move> {
    let mut ranked: Vec<&Move> = moves.iter().collect();
    ranked.sort_by_key(|m| (m.resulting_visit_time, m.unit_index, m.to_agent));

    ranked
        .iter()
        .find(|m| {
            !tabu_list.is_tabu(m.unit_index)
                || m.resulting_visit_time + aspiration_margin < best_makespan_so_far
        })
        .copied()
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::types::Placement;

    fn mv(unit_index: usize, resulting_visit_time: u32) -> Move {
        Move {
            unit_index,
            from_agent: 0,
            to_agent: 1,
            placement: Placement::NewTrip,
            resulting_visit_time,
        }
    }

    #[test]
    fn non_tabu_move_with_best_time_wins() {
        let moves = vec![mv(1, 50), mv(2, 10)];
        let tabu = TabuList::new(3);
        let chosen = choose_best_move(&moves, &tabu, 1000, 0).unwrap();
        assert_eq!(chosen.unit_index, 2);
    }

    #[test]
    fn tabu_move_is_skipped_without_aspiration() {
        let moves = vec![mv(2, 10), mv(1, 50)];
        let mut tabu = TabuList::new(3);
        tabu.insert(2);
        let chosen = choose_best_move(&moves, &tabu, 1000, 0).unwrap();
        assert_eq!(chosen.unit_index, 1);
    }

    #[test]
    fn aspiration_overrides_tabu_when_clearly_better() {
        let moves = vec![mv(2, 10), mv(1, 50)];
        let mut tabu = TabuList::new(3);
        tabu.insert(2);
        let chosen = choose_best_move(&moves, &tabu, 20, 0).unwrap();
        assert_eq!(chosen.unit_index, 2);
    }

    #[test]
    fn tenure_expires_oldest_entries() {
        let mut tabu = TabuList::new(2);
        tabu.insert(1);
        tabu.insert(2);
        tabu.insert(3);
        assert!(!tabu.is_tabu(1));
        assert!(tabu.is_tabu(2));
        assert!(tabu.is_tabu(3));
    }
}
