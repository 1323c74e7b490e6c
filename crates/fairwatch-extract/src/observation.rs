//! Time-control classes and per-game observations.

use serde::{Deserialize, Serialize};

/// Coarse time-control class of a rated game.
///
/// Classified from the free-text `Event` header by case-insensitive substring
/// match, in priority order bullet → blitz → rapid → classical. Anything that
/// matches none of the four recognized classes is [`Other`](Self::Other);
/// such games still flow through extraction and aggregation but are excluded
/// from threshold modelling.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TimeControlClass {
    #[display("bullet")]
    Bullet,
    #[display("blitz")]
    Blitz,
    #[display("rapid")]
    Rapid,
    #[display("classical")]
    Classical,
    #[display("other")]
    Other,
}

impl TimeControlClass {
    /// The four recognized classes, in classification priority order.
    pub const RECOGNIZED: [Self; 4] = [Self::Bullet, Self::Blitz, Self::Rapid, Self::Classical];

    /// Classifies an `Event` header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use fairwatch_extract::TimeControlClass;
    ///
    /// assert_eq!(
    ///     TimeControlClass::classify("Rated Blitz game"),
    ///     TimeControlClass::Blitz
    /// );
    /// assert_eq!(
    ///     TimeControlClass::classify("Casual Correspondence game"),
    ///     TimeControlClass::Other
    /// );
    /// ```
    #[must_use]
    pub fn classify(event: &str) -> Self {
        let event = event.to_lowercase();
        Self::RECOGNIZED
            .into_iter()
            .find(|class| event.contains(class.label()))
            .unwrap_or(Self::Other)
    }

    /// Lowercase label of this class, as used in artifacts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
            Self::Blitz => "blitz",
            Self::Rapid => "rapid",
            Self::Classical => "classical",
            Self::Other => "other",
        }
    }

    /// Returns `true` for the four modelled classes, `false` for `other`.
    #[must_use]
    pub fn is_recognized(self) -> bool {
        self != Self::Other
    }
}

/// One side's view of one accepted game.
///
/// Every accepted game yields exactly two observations (white's and black's
/// perspectives) whose actual scores sum to 1.0.
///
/// The serialized field names are the plural column names of the observation
/// table artifact, which downstream tooling already reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameObservation {
    /// Player handle.
    pub player: String,
    /// Time-control class of the game.
    pub time_control: TimeControlClass,
    /// The player's rating going into the game.
    #[serde(rename = "ratings")]
    pub rating: f64,
    /// The opponent's rating going into the game.
    #[serde(rename = "opponent_ratings")]
    pub opponent_rating: f64,
    /// Actual score from this side's perspective: 1.0, 0.5, or 0.0.
    #[serde(rename = "actual_scores")]
    pub actual_score: f64,
    /// Rating change the player received for the game.
    #[serde(rename = "rating_gains")]
    pub rating_gain: f64,
    /// Whether the game was played with an increment.
    #[serde(rename = "increments")]
    pub has_increment: bool,
}
