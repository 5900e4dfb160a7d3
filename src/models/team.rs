//! Team and Sport data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches and lookups).
pub type TeamId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    #[default]
    Basketball,
    Volleyball,
}

/// A team registered for a bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub sport: Sport,
}

impl Team {
    /// Create a new team with the given name and sport.
    pub fn new(name: impl Into<String>, sport: Sport) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sport,
        }
    }
}
