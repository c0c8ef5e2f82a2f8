//! Ownership and visibility decisions, as pure functions over the caller's
//! resolved identity. Handlers run these before every restricted read or
//! mutation and translate `false` into the HTTP error.

use devconnect_types::models::{Principal, Visibility};
use uuid::Uuid;

/// Whether `principal` may read a resource owned by `owner` with the given
/// visibility. Public content is readable by anyone, anonymous callers
/// included; private content only by its owner.
pub fn can_read(principal: Option<&Principal>, owner: Uuid, visibility: Visibility) -> bool {
    match visibility {
        Visibility::Public => true,
        Visibility::Private => principal.is_some_and(|p| p.id == owner),
    }
}

/// Whether `principal` may edit or delete a resource owned by `owner`.
pub fn can_mutate(principal: Option<&Principal>, owner: Uuid) -> bool {
    principal.is_some_and(|p| p.id == owner)
}

/// Whether comments and reactions may be created under a post with the
/// given visibility. Independent of ownership: even the author cannot
/// comment on or react to their own private post.
pub fn can_comment_or_react(visibility: Visibility) -> bool {
    visibility == Visibility::Public
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(id: Uuid) -> Principal {
        Principal {
            id,
            username: "someone".into(),
        }
    }

    #[test]
    fn public_content_is_readable_by_everyone() {
        let owner = Uuid::new_v4();
        assert!(can_read(None, owner, Visibility::Public));
        assert!(can_read(Some(&principal(Uuid::new_v4())), owner, Visibility::Public));
        assert!(can_read(Some(&principal(owner)), owner, Visibility::Public));
    }

    #[test]
    fn private_content_is_owner_only() {
        let owner = Uuid::new_v4();
        assert!(can_read(Some(&principal(owner)), owner, Visibility::Private));
        assert!(!can_read(Some(&principal(Uuid::new_v4())), owner, Visibility::Private));
        assert!(!can_read(None, owner, Visibility::Private));
    }

    #[test]
    fn mutation_requires_ownership() {
        let owner = Uuid::new_v4();
        assert!(can_mutate(Some(&principal(owner)), owner));
        assert!(!can_mutate(Some(&principal(Uuid::new_v4())), owner));
        assert!(!can_mutate(None, owner));
    }

    #[test]
    fn interaction_follows_visibility_not_ownership() {
        assert!(can_comment_or_react(Visibility::Public));
        assert!(!can_comment_or_react(Visibility::Private));
    }
}
