//! Reaction domain: the target sum type and the toggle state machine.
//!
//! The state machine is a pure function so the storage layer can run it
//! inside a transaction and the tests can drive it without a database.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The sentiment a user attaches to a post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionType {
    Like,
    Love,
    Celebrate,
    Insightful,
    Funny,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "LIKE",
            ReactionType::Love => "LOVE",
            ReactionType::Celebrate => "CELEBRATE",
            ReactionType::Insightful => "INSIGHTFUL",
            ReactionType::Funny => "FUNNY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LIKE" => Some(ReactionType::Like),
            "LOVE" => Some(ReactionType::Love),
            "CELEBRATE" => Some(ReactionType::Celebrate),
            "INSIGHTFUL" => Some(ReactionType::Insightful),
            "FUNNY" => Some(ReactionType::Funny),
            _ => None,
        }
    }
}

/// Discriminant for the two kinds of reactable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetKind {
    Post,
    Comment,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Post => "POST",
            TargetKind::Comment => "COMMENT",
        }
    }
}

/// What a reaction points at. Carries only the owning entity's id, so the
/// reaction path never needs the entity itself once visibility is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTarget {
    Post(Uuid),
    Comment(Uuid),
}

impl ReactionTarget {
    pub fn id(&self) -> Uuid {
        match self {
            ReactionTarget::Post(id) | ReactionTarget::Comment(id) => *id,
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            ReactionTarget::Post(_) => TargetKind::Post,
            ReactionTarget::Comment(_) => TargetKind::Comment,
        }
    }
}

/// How a toggle changed the stored reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Created,
    Updated,
    Removed,
}

/// Outcome of one toggle: the reaction state afterwards (`None` means the
/// reaction was retracted) and which write produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: Option<ReactionType>,
    pub action: ToggleAction,
}

/// The toggle state machine. Submitting the current type retracts it,
/// submitting a different type replaces it in place, and with no prior
/// reaction one is created.
pub fn apply(current: Option<ReactionType>, requested: ReactionType) -> Transition {
    match current {
        None => Transition {
            next: Some(requested),
            action: ToggleAction::Created,
        },
        Some(existing) if existing == requested => Transition {
            next: None,
            action: ToggleAction::Removed,
        },
        Some(_) => Transition {
            next: Some(requested),
            action: ToggleAction::Updated,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_prior_reaction_creates() {
        let t = apply(None, ReactionType::Like);
        assert_eq!(t.action, ToggleAction::Created);
        assert_eq!(t.next, Some(ReactionType::Like));
    }

    #[test]
    fn same_type_retracts() {
        let t = apply(Some(ReactionType::Like), ReactionType::Like);
        assert_eq!(t.action, ToggleAction::Removed);
        assert_eq!(t.next, None);
    }

    #[test]
    fn different_type_replaces() {
        let t = apply(Some(ReactionType::Like), ReactionType::Love);
        assert_eq!(t.action, ToggleAction::Updated);
        assert_eq!(t.next, Some(ReactionType::Love));
    }

    #[test]
    fn double_toggle_returns_to_empty() {
        let first = apply(None, ReactionType::Celebrate);
        let second = apply(first.next, ReactionType::Celebrate);
        assert_eq!(second.next, None);
        assert_eq!(second.action, ToggleAction::Removed);
    }

    #[test]
    fn wire_form_is_screaming_snake_case() {
        let json = serde_json::to_string(&ReactionType::Insightful).unwrap();
        assert_eq!(json, "\"INSIGHTFUL\"");
        let back: ReactionType = serde_json::from_str("\"LIKE\"").unwrap();
        assert_eq!(back, ReactionType::Like);
        assert!(serde_json::from_str::<ReactionType>("\"WOW\"").is_err());
    }

    #[test]
    fn target_exposes_id_and_kind() {
        let id = Uuid::new_v4();
        let target = ReactionTarget::Comment(id);
        assert_eq!(target.id(), id);
        assert_eq!(target.kind(), TargetKind::Comment);
        assert_eq!(target.kind().as_str(), "COMMENT");
    }
}
