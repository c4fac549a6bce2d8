pub use crate::config::*;
use crate::{calculate_ravg, calculate_ravg_two_axis, calculate_vote_tally, score_stats};

use log::warn;

/// A builder for accumulating the rankings of one record.
///
/// A user has at most one ranking per record: ranking again replaces the previous
/// score or choice, the user keeps the position of their first ranking.
///
/// ```
/// pub use ravg_engine::builder::Builder;
/// pub use ravg_engine::RavgConfig;
/// # use ravg_engine::RavgErrors;
///
/// let config = RavgConfig::new("owner").with_supervisor_weight(2.0);
/// let mut builder = Builder::new(&config)?;
///
/// builder.add_ranking("owner", 10.0)?;
/// builder.add_ranking("u2", 6.0)?;
/// builder.add_ranking("u3", 8.0)?;
///
/// let res = builder.ravg();
/// assert_eq!(res.team_ravg, 7.0);
/// assert_eq!(res.super_ravg, Some(9.0));
///
/// # Ok::<(), RavgErrors>(())
/// ```
pub struct Builder {
    pub(crate) _config: RavgConfig,
    pub(crate) _mode: RankingMode,
    pub(crate) _collaborators: Vec<CollaboratorInfo>,
    pub(crate) _rankings: Vec<(RankingInput, Option<f64>)>,
    pub(crate) _choices: Vec<ChoiceInput>,
}

impl Builder {
    pub fn new(config: &RavgConfig) -> Result<Builder, RavgErrors> {
        config.validate()?;
        Ok(Builder {
            _config: config.clone(),
            _mode: RankingMode::default(),
            _collaborators: Vec::new(),
            _rankings: Vec::new(),
            _choices: Vec::new(),
        })
    }

    pub fn collaborators(self, collabs: &[CollaboratorInfo]) -> Result<Builder, RavgErrors> {
        Ok(Builder {
            _collaborators: collabs.to_vec(),
            ..self
        })
    }

    pub fn ranking_mode(self, mode: RankingMode) -> Result<Builder, RavgErrors> {
        Ok(Builder {
            _mode: mode,
            ..self
        })
    }

    /// Adds the score of a user.
    pub fn add_ranking(&mut self, user_id: &str, score: f64) -> Result<(), RavgErrors> {
        self.add_ranking_2(user_id, score, None)
    }

    /// Adds the scores of a user on both axes of a grid.
    pub fn add_ranking_two_axis(
        &mut self,
        user_id: &str,
        score_x: f64,
        score_y: f64,
    ) -> Result<(), RavgErrors> {
        self.add_ranking_2(user_id, score_x, Some(score_y))
    }

    fn add_ranking_2(
        &mut self,
        user_id: &str,
        score: f64,
        score_y: Option<f64>,
    ) -> Result<(), RavgErrors> {
        let all_finite = score.is_finite() && score_y.map(|y| y.is_finite()).unwrap_or(true);
        if !all_finite {
            return Err(RavgErrors::NonFiniteScore {
                user_id: user_id.to_string(),
            });
        }
        let ranking = RankingInput::new(user_id, score);
        if let Some(existing) = self._rankings.iter_mut().find(|(r, _)| r.user_id == user_id) {
            warn!(
                "add_ranking: user {} ranked again, replacing {:?} by {:?}",
                user_id, existing.0.score, score
            );
            *existing = (ranking, score_y);
        } else {
            self._rankings.push((ranking, score_y));
        }
        Ok(())
    }

    /// Adds the vote of a user. The choice must be valid for the ranking mode.
    pub fn add_choice(&mut self, user_id: &str, choice: &str) -> Result<(), RavgErrors> {
        if !self._mode.allowed_choices().contains(&choice) {
            return Err(RavgErrors::UnknownChoice {
                user_id: user_id.to_string(),
                choice: choice.to_string(),
            });
        }
        let ci = ChoiceInput::new(user_id, choice);
        if let Some(existing) = self._choices.iter_mut().find(|c| c.user_id == user_id) {
            warn!(
                "add_choice: user {} voted again, replacing {:?} by {:?}",
                user_id, existing.choice, choice
            );
            *existing = ci;
        } else {
            self._choices.push(ci);
        }
        Ok(())
    }

    pub fn rankings(&self) -> Vec<RankingInput> {
        self._rankings.iter().map(|(r, _)| r.clone()).collect()
    }

    /// The users who ranked or voted, depending on the ranking mode.
    pub fn rankers(&self) -> Vec<String> {
        if self._mode.is_categorical() {
            self._choices.iter().map(|c| c.user_id.clone()).collect()
        } else {
            self._rankings.iter().map(|(r, _)| r.user_id.clone()).collect()
        }
    }

    pub fn ravg(&self) -> RavgResult {
        calculate_ravg(&self.rankings(), &self._collaborators, &self._config)
    }

    pub fn ravg_two_axis(&self) -> TwoAxisResult {
        calculate_ravg_two_axis(&self._rankings, &self._collaborators, &self._config)
    }

    pub fn tally(&self) -> VoteTallyResult {
        calculate_vote_tally(&self._choices)
    }

    pub fn stats(&self) -> Option<ScoreStats> {
        score_stats(&self.rankings())
    }
}
