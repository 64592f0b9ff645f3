//! Player roles and team labels.
//!
//! The ruleset is fixed: every session has exactly 2 Werewolves, 1 Seer,
//! 1 Doctor, and the remaining players are Villagers. Roles are serialized
//! as their capitalized English names to keep persisted sessions readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The four player roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Villager,
    Werewolf,
    Seer,
    Doctor,
}

impl Role {
    pub fn is_werewolf(&self) -> bool {
        matches!(self, Self::Werewolf)
    }

    /// The team this role wins with.
    pub fn team(&self) -> Team {
        if self.is_werewolf() {
            Team::Werewolves
        } else {
            Team::Villagers
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Villager => "Villager",
            Self::Werewolf => "Werewolf",
            Self::Seer => "Seer",
            Self::Doctor => "Doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Villager" => Ok(Self::Villager),
            "Werewolf" => Ok(Self::Werewolf),
            "Seer" => Ok(Self::Seer),
            "Doctor" => Ok(Self::Doctor),
            _ => Err(DomainError::parse(format!("Unknown role: {}", s))),
        }
    }
}

/// Winning team label. Set exactly once on the session state; terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Villagers,
    Werewolves,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Villagers => write!(f, "Villagers"),
            Self::Werewolves => write!(f, "Werewolves"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Villager, Role::Werewolf, Role::Seer, Role::Doctor] {
            let parsed: Role = role.as_str().parse().expect("parse role");
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn unknown_role_is_a_parse_error() {
        assert!(matches!(
            "Minion".parse::<Role>(),
            Err(DomainError::Parse(_))
        ));
    }

    #[test]
    fn only_werewolves_are_on_the_werewolf_team() {
        assert_eq!(Role::Werewolf.team(), Team::Werewolves);
        assert_eq!(Role::Villager.team(), Team::Villagers);
        assert_eq!(Role::Seer.team(), Team::Villagers);
        assert_eq!(Role::Doctor.team(), Team::Villagers);
    }
}
