/// Current and best score.
///
/// `score` counts rounds completed in the running session; `best` survives
/// restarts for as long as the owner keeps the keeper around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreKeeper {
    score: u32,
    best: u32,
}

impl ScoreKeeper {
    #[must_use]
    pub fn with_best(best: u32) -> Self {
        Self { score: 0, best }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn reset(&mut self) {
        self.score = 0;
    }

    pub fn complete_round(&mut self) {
        self.score = self.score.saturating_add(1);
    }

    /// Fold the final score into `best`. Returns the new best.
    pub fn record_game_over(&mut self) -> u32 {
        self.best = self.best.max(self.score);
        self.best
    }
}
