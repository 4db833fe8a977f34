use crate::{Cost, CostTree, Extraction, Reward};
use log::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub budget: Cost,
    pub profit: Reward,
    pub remaining: Cost,
    pub extractions: Vec<Extraction>,
}

impl QueryOutcome {
    pub fn spent(&self) -> Cost {
        self.budget.wrapping_sub(self.remaining)
    }
}

impl CostTree {
    /// Greedily spends `budget`: repeatedly takes the best reward at the
    /// highest cost that still fits, until nothing fits or the tree is empty.
    /// Consumed rewards are removed from the tree.
    pub fn query(&mut self, budget: Cost) -> Reward {
        self.query_traced(budget).profit
    }

    pub fn query_traced(&mut self, budget: Cost) -> QueryOutcome {
        let mut remaining = budget;
        let mut profit: Reward = 0;
        let mut extractions = Vec::new();

        while let Some(extraction) = self.extract_one(remaining) {
            trace!("spent: {}, gold: {}", extraction.cost, extraction.reward);
            // both wrap at the integer width instead of panicking
            remaining = remaining.wrapping_sub(extraction.cost);
            profit = profit.wrapping_add(extraction.reward);
            extractions.push(extraction);
        }

        debug!(
            "query {}: profit {} from {} extractions, {} left unspent",
            budget,
            profit,
            extractions.len(),
            remaining
        );
        QueryOutcome {
            budget,
            profit,
            remaining,
            extractions,
        }
    }
}
