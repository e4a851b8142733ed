use crate::{CommentAggregates, CommentView, Error};

/// A vote, as the integer Lemmy puts on the wire
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum ScoringOperation {
    Upvote,
    Downvote,
    ResetVote,
}

impl ScoringOperation {
    /// What pressing `requested` does given the current vote: pressing the
    /// vote already cast takes it back.
    pub fn toggled(current: Option<ScoringOperation>, requested: ScoringOperation) -> Self {
        match current {
            Some(c) if c == requested => ScoringOperation::ResetVote,
            _ => requested,
        }
    }

    fn contribution(self) -> (i64, i64) {
        match self {
            ScoringOperation::Upvote => (1, 0),
            ScoringOperation::Downvote => (0, 1),
            ScoringOperation::ResetVote => (0, 0),
        }
    }
}

impl From<ScoringOperation> for i8 {
    fn from(op: ScoringOperation) -> i8 {
        match op {
            ScoringOperation::Upvote => 1,
            ScoringOperation::Downvote => -1,
            ScoringOperation::ResetVote => 0,
        }
    }
}

impl TryFrom<i8> for ScoringOperation {
    type Error = Error;

    fn try_from(v: i8) -> Result<ScoringOperation, Error> {
        match v {
            1 => Ok(ScoringOperation::Upvote),
            -1 => Ok(ScoringOperation::Downvote),
            0 => Ok(ScoringOperation::ResetVote),
            v => Err(Error::InvalidVote(v)),
        }
    }
}

impl CommentAggregates {
    fn replace_vote(&mut self, previous: ScoringOperation, next: ScoringOperation) {
        let (prev_up, prev_down) = previous.contribution();
        let (next_up, next_down) = next.contribution();
        self.upvotes += next_up - prev_up;
        self.downvotes += next_down - prev_down;
        self.score += (next_up - prev_up) - (next_down - prev_down);
    }
}

impl CommentView {
    /// The vote currently cast by the user, `ResetVote` if none
    pub fn my_vote(&self) -> ScoringOperation {
        self.my_vote.unwrap_or(ScoringOperation::ResetVote)
    }

    /// Replaces the user's vote, adjusting the counts the way the server will
    pub fn apply_vote(&mut self, op: ScoringOperation) {
        self.counts.replace_vote(self.my_vote(), op);
        self.my_vote = match op {
            ScoringOperation::ResetVote => None,
            op => Some(op),
        };
    }

    pub fn with_vote(mut self, op: ScoringOperation) -> CommentView {
        self.apply_vote(op);
        self
    }
}
