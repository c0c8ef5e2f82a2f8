use crate::Database;
use crate::models::{CommentRow, NewPost, NewUser, PostRow, ReactionRow, ReactionWithUser, UserRow};
use anyhow::{Result, anyhow};
use devconnect_types::models::Visibility;
use devconnect_types::reaction::{self, ReactionTarget, ReactionType, ToggleAction, Transition};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

/// Shared SELECT for post listings. Comment and reaction counts come from
/// correlated subqueries so listings stay a single round trip.
const POST_SELECT: &str = "SELECT p.id, p.author_id, u.username, p.title, p.content, p.tech_stack,
            p.visibility, p.created_at, p.updated_at,
            (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id),
            (SELECT COUNT(*) FROM reactions r WHERE r.target_kind = 'POST' AND r.target_id = p.id)
     FROM posts p
     JOIN users u ON p.author_id = u.id";

impl Database {
    // -- Users --

    pub fn create_user(&self, user: NewUser) -> Result<()> {
        let skills_json = serde_json::to_string(user.skills)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, bio, skills, show_email_publicly)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user.id,
                    user.username,
                    user.email,
                    user.password_hash,
                    user.bio,
                    skills_json,
                    user.show_email_publicly
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, email, password, bio, skills, show_email_publicly, created_at
                 FROM users ORDER BY username",
            )?;
            let rows = stmt
                .query_map([], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        bio: Option<&str>,
        skills: &[String],
        show_email_publicly: bool,
    ) -> Result<()> {
        let skills_json = serde_json::to_string(skills)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET username = ?1, email = ?2, bio = ?3, skills = ?4,
                        show_email_publicly = ?5
                 WHERE id = ?6",
                params![username, email, bio, skills_json, show_email_publicly, id],
            )?;
            Ok(())
        })
    }

    // -- Posts --

    pub fn create_post(&self, post: NewPost) -> Result<()> {
        let tech_stack_json = serde_json::to_string(post.tech_stack)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO posts (id, author_id, title, content, tech_stack, visibility)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    post.id,
                    post.author_id,
                    post.title,
                    post.content,
                    tech_stack_json,
                    post.visibility.as_str()
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_post(&self, id: &str) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!("{POST_SELECT} WHERE p.id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            Ok(stmt.query_row([id], map_post).optional()?)
        })
    }

    pub fn update_post(
        &self,
        id: &str,
        title: &str,
        content: &str,
        tech_stack: &[String],
        visibility: Visibility,
    ) -> Result<()> {
        let tech_stack_json = serde_json::to_string(tech_stack)?;
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE posts SET title = ?1, content = ?2, tech_stack = ?3, visibility = ?4,
                        updated_at = datetime('now')
                 WHERE id = ?5",
                params![title, content, tech_stack_json, visibility.as_str(), id],
            )?;
            Ok(())
        })
    }

    /// Remove a post together with its comments and every reaction hanging
    /// off the post or those comments, in one transaction.
    pub fn delete_post(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM reactions WHERE target_kind = 'COMMENT'
                   AND target_id IN (SELECT id FROM comments WHERE post_id = ?1)",
                [id],
            )?;
            tx.execute(
                "DELETE FROM reactions WHERE target_kind = 'POST' AND target_id = ?1",
                [id],
            )?;
            tx.execute("DELETE FROM comments WHERE post_id = ?1", [id])?;
            tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn list_public_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{POST_SELECT} WHERE p.visibility = 'PUBLIC'
                 ORDER BY p.created_at DESC, p.rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_post)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Posts by one author. `include_private` is for the author's own view;
    /// everyone else gets the public subset.
    pub fn list_posts_by_author(&self, username: &str, include_private: bool) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let sql = if include_private {
                format!(
                    "{POST_SELECT} WHERE u.username = ?1
                     ORDER BY p.created_at DESC, p.rowid DESC"
                )
            } else {
                format!(
                    "{POST_SELECT} WHERE u.username = ?1 AND p.visibility = 'PUBLIC'
                     ORDER BY p.created_at DESC, p.rowid DESC"
                )
            };
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([username], map_post)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Case-insensitive keyword match over public posts' titles and tech
    /// stacks. Returns the requested page plus the total match count.
    pub fn search_public_posts(
        &self,
        keyword: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<PostRow>, u64)> {
        let pattern = format!("%{}%", keyword);
        self.with_conn(|conn| {
            let total: i64 = conn.query_row(
                "SELECT COUNT(*) FROM posts
                 WHERE visibility = 'PUBLIC' AND (title LIKE ?1 OR tech_stack LIKE ?1)",
                [&pattern],
                |row| row.get(0),
            )?;

            let sql = format!(
                "{POST_SELECT} WHERE p.visibility = 'PUBLIC'
                   AND (p.title LIKE ?1 OR p.tech_stack LIKE ?1)
                 ORDER BY p.created_at DESC, p.rowid DESC
                 LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![pattern, limit, offset], map_post)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok((rows, total as u64))
        })
    }

    // -- Comments --

    pub fn create_comment(&self, id: &str, post_id: &str, author_id: &str, content: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO comments (id, post_id, author_id, content) VALUES (?1, ?2, ?3, ?4)",
                params![id, post_id, author_id, content],
            )?;
            Ok(())
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.post_id, c.author_id, u.username, c.content, c.created_at
                 FROM comments c
                 JOIN users u ON c.author_id = u.id
                 WHERE c.id = ?1",
            )?;
            Ok(stmt.query_row([id], map_comment).optional()?)
        })
    }

    pub fn list_comments_for_post(&self, post_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.post_id, c.author_id, u.username, c.content, c.created_at
                 FROM comments c
                 JOIN users u ON c.author_id = u.id
                 WHERE c.post_id = ?1
                 ORDER BY c.rowid",
            )?;
            let rows = stmt
                .query_map([post_id], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Remove a comment and its reactions in one transaction.
    pub fn delete_comment(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM reactions WHERE target_kind = 'COMMENT' AND target_id = ?1",
                [id],
            )?;
            tx.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(())
        })
    }

    // -- Reactions --

    /// Apply one reaction toggle atomically and report the transition.
    ///
    /// Read-decide-write runs under one IMMEDIATE transaction, so the state
    /// read is the state written against and a failed sequence leaves no
    /// partial write. Together with the UNIQUE(user_id, target_kind,
    /// target_id) constraint this keeps at most one reaction per user and
    /// target no matter how toggles interleave.
    ///
    /// `id` is the row id used if this toggle creates a reaction.
    pub fn toggle_reaction(
        &self,
        id: &str,
        user_id: &str,
        target: ReactionTarget,
        requested: ReactionType,
    ) -> Result<Transition> {
        let target_id = target.id().to_string();
        let kind = target.kind().as_str();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let stored: Option<String> = tx
                .query_row(
                    "SELECT type FROM reactions
                     WHERE user_id = ?1 AND target_kind = ?2 AND target_id = ?3",
                    params![user_id, kind, target_id],
                    |row| row.get(0),
                )
                .optional()?;
            let current = match stored {
                Some(raw) => Some(
                    ReactionType::parse(&raw)
                        .ok_or_else(|| anyhow!("unknown reaction type in store: {raw}"))?,
                ),
                None => None,
            };

            let transition = reaction::apply(current, requested);
            match transition.action {
                ToggleAction::Created => {
                    tx.execute(
                        "INSERT INTO reactions (id, user_id, target_kind, target_id, type)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![id, user_id, kind, target_id, requested.as_str()],
                    )?;
                }
                ToggleAction::Updated => {
                    tx.execute(
                        "UPDATE reactions SET type = ?1
                         WHERE user_id = ?2 AND target_kind = ?3 AND target_id = ?4",
                        params![requested.as_str(), user_id, kind, target_id],
                    )?;
                }
                ToggleAction::Removed => {
                    tx.execute(
                        "DELETE FROM reactions
                         WHERE user_id = ?1 AND target_kind = ?2 AND target_id = ?3",
                        params![user_id, kind, target_id],
                    )?;
                }
            }
            tx.commit()?;
            Ok(transition)
        })
    }

    pub fn get_reaction(&self, user_id: &str, target: ReactionTarget) -> Result<Option<ReactionRow>> {
        let target_id = target.id().to_string();
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, target_kind, target_id, type, created_at
                 FROM reactions
                 WHERE user_id = ?1 AND target_kind = ?2 AND target_id = ?3",
            )?;
            Ok(stmt
                .query_row(params![user_id, target.kind().as_str(), target_id], |row| {
                    Ok(ReactionRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        target_kind: row.get(2)?,
                        target_id: row.get(3)?,
                        reaction_type: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })
                .optional()?)
        })
    }

    /// Reactions on one target joined with usernames, in insertion order.
    pub fn list_reactions_for_target(&self, target: ReactionTarget) -> Result<Vec<ReactionWithUser>> {
        let target_id = target.id().to_string();
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.target_id, r.type, u.username
                 FROM reactions r
                 JOIN users u ON r.user_id = u.id
                 WHERE r.target_kind = ?1 AND r.target_id = ?2
                 ORDER BY r.rowid",
            )?;
            let rows = stmt
                .query_map(params![target.kind().as_str(), target_id], map_reaction_with_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Batch-fetch reactions for a set of comment ids, for building comment
    /// listings without a query per comment.
    pub fn list_reactions_for_comments(&self, comment_ids: &[String]) -> Result<Vec<ReactionWithUser>> {
        if comment_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=comment_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT r.target_id, r.type, u.username
                 FROM reactions r
                 JOIN users u ON r.user_id = u.id
                 WHERE r.target_kind = 'COMMENT' AND r.target_id IN ({})
                 ORDER BY r.rowid",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = comment_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), map_reaction_with_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, email, password, bio, skills, show_email_publicly, created_at
         FROM users WHERE {column} = ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    Ok(stmt.query_row([value], map_user).optional()?)
}

fn map_user(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        bio: row.get(4)?,
        skills: row.get(5)?,
        show_email_publicly: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn map_post(row: &rusqlite::Row) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        author_username: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        tech_stack: row.get(5)?,
        visibility: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        comment_count: row.get(9)?,
        reaction_count: row.get(10)?,
    })
}

fn map_comment(row: &rusqlite::Row) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        post_id: row.get(1)?,
        author_id: row.get(2)?,
        author_username: row.get(3)?,
        content: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_reaction_with_user(row: &rusqlite::Row) -> rusqlite::Result<ReactionWithUser> {
    Ok(ReactionWithUser {
        target_id: row.get(0)?,
        reaction_type: row.get(1)?,
        username: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use devconnect_types::models::Visibility;
    use std::sync::Arc;
    use uuid::Uuid;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn uid() -> String {
        Uuid::new_v4().to_string()
    }

    fn seed_user(db: &Database, id: &str, username: &str) {
        let email = format!("{username}@example.com");
        db.create_user(NewUser {
            id,
            username,
            email: &email,
            password_hash: "phc-placeholder",
            bio: None,
            skills: &[],
            show_email_publicly: false,
        })
        .unwrap();
    }

    fn seed_post(db: &Database, id: &str, author_id: &str, visibility: Visibility) {
        db.create_post(NewPost {
            id,
            author_id,
            title: "Building a CLI in Rust",
            content: "notes from the trenches",
            tech_stack: &["rust".to_string(), "clap".to_string()],
            visibility,
        })
        .unwrap();
    }

    #[test]
    fn toggle_cycles_create_remove_recreate() {
        let db = test_db();
        let user = uid();
        let post = Uuid::new_v4();
        seed_user(&db, &user, "alice");
        seed_post(&db, &post.to_string(), &user, Visibility::Public);
        let target = ReactionTarget::Post(post);

        let t = db.toggle_reaction(&uid(), &user, target, ReactionType::Like).unwrap();
        assert_eq!(t.action, ToggleAction::Created);
        assert_eq!(t.next, Some(ReactionType::Like));
        assert!(db.get_reaction(&user, target).unwrap().is_some());

        let t = db.toggle_reaction(&uid(), &user, target, ReactionType::Like).unwrap();
        assert_eq!(t.action, ToggleAction::Removed);
        assert_eq!(t.next, None);
        assert!(db.get_reaction(&user, target).unwrap().is_none());

        let t = db.toggle_reaction(&uid(), &user, target, ReactionType::Like).unwrap();
        assert_eq!(t.action, ToggleAction::Created);
    }

    #[test]
    fn toggle_replaces_different_type_in_place() {
        let db = test_db();
        let user = uid();
        let post = Uuid::new_v4();
        seed_user(&db, &user, "alice");
        seed_post(&db, &post.to_string(), &user, Visibility::Public);
        let target = ReactionTarget::Post(post);

        db.toggle_reaction(&uid(), &user, target, ReactionType::Like).unwrap();
        let t = db.toggle_reaction(&uid(), &user, target, ReactionType::Love).unwrap();
        assert_eq!(t.action, ToggleAction::Updated);
        assert_eq!(t.next, Some(ReactionType::Love));

        let stored = db.get_reaction(&user, target).unwrap().unwrap();
        assert_eq!(stored.reaction_type, "LOVE");
        assert_eq!(db.list_reactions_for_target(target).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_toggles_never_duplicate() {
        let db = Arc::new(test_db());
        let user = uid();
        let post = Uuid::new_v4();
        seed_user(&db, &user, "alice");
        seed_post(&db, &post.to_string(), &user, Visibility::Public);
        let target = ReactionTarget::Post(post);

        let mut handles = Vec::new();
        for t in 0..8u32 {
            let db = Arc::clone(&db);
            let user = user.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..25u32 {
                    let requested = if (t + i) % 2 == 0 {
                        ReactionType::Like
                    } else {
                        ReactionType::Love
                    };
                    db.toggle_reaction(&Uuid::new_v4().to_string(), &user, target, requested)
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let count: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM reactions WHERE user_id = ?1",
                    [user.as_str()],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert!(count <= 1, "expected at most one reaction row, found {count}");
    }

    #[test]
    fn duplicate_reaction_row_trips_unique_constraint() {
        let db = test_db();
        let user = uid();
        let post = Uuid::new_v4();
        seed_user(&db, &user, "alice");
        seed_post(&db, &post.to_string(), &user, Visibility::Public);

        let insert = |rid: &str| {
            db.with_conn_mut(|conn| {
                conn.execute(
                    "INSERT INTO reactions (id, user_id, target_kind, target_id, type)
                     VALUES (?1, ?2, 'POST', ?3, 'LIKE')",
                    params![rid, user, post.to_string()],
                )?;
                Ok(())
            })
        };
        insert(&uid()).unwrap();
        let err = insert(&uid()).unwrap_err();
        assert!(crate::is_unique_violation(&err));
    }

    #[test]
    fn reaction_listing_keeps_insertion_order() {
        let db = test_db();
        let (bob, carol, dave) = (uid(), uid(), uid());
        seed_user(&db, &bob, "bob");
        seed_user(&db, &carol, "carol");
        seed_user(&db, &dave, "dave");
        let post = Uuid::new_v4();
        seed_post(&db, &post.to_string(), &bob, Visibility::Public);
        let target = ReactionTarget::Post(post);

        db.toggle_reaction(&uid(), &bob, target, ReactionType::Like).unwrap();
        db.toggle_reaction(&uid(), &carol, target, ReactionType::Like).unwrap();
        db.toggle_reaction(&uid(), &dave, target, ReactionType::Love).unwrap();

        let rows = db.list_reactions_for_target(target).unwrap();
        let usernames: Vec<&str> = rows.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(usernames, ["bob", "carol", "dave"]);
        assert_eq!(rows[2].reaction_type, "LOVE");
    }

    #[test]
    fn delete_post_sweeps_comments_and_reactions() {
        let db = test_db();
        let user = uid();
        seed_user(&db, &user, "alice");
        let post = Uuid::new_v4();
        seed_post(&db, &post.to_string(), &user, Visibility::Public);
        let comment = Uuid::new_v4();
        db.create_comment(&comment.to_string(), &post.to_string(), &user, "nice write-up")
            .unwrap();
        db.toggle_reaction(&uid(), &user, ReactionTarget::Post(post), ReactionType::Like)
            .unwrap();
        db.toggle_reaction(&uid(), &user, ReactionTarget::Comment(comment), ReactionType::Love)
            .unwrap();

        db.delete_post(&post.to_string()).unwrap();

        assert!(db.get_post(&post.to_string()).unwrap().is_none());
        assert!(db.get_comment(&comment.to_string()).unwrap().is_none());
        let total: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM reactions", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn delete_comment_sweeps_its_reactions() {
        let db = test_db();
        let user = uid();
        seed_user(&db, &user, "alice");
        let post = Uuid::new_v4();
        seed_post(&db, &post.to_string(), &user, Visibility::Public);
        let comment = Uuid::new_v4();
        db.create_comment(&comment.to_string(), &post.to_string(), &user, "agreed")
            .unwrap();
        db.toggle_reaction(&uid(), &user, ReactionTarget::Post(post), ReactionType::Like)
            .unwrap();
        db.toggle_reaction(&uid(), &user, ReactionTarget::Comment(comment), ReactionType::Funny)
            .unwrap();

        db.delete_comment(&comment.to_string()).unwrap();

        assert!(db.get_comment(&comment.to_string()).unwrap().is_none());
        assert!(db.get_reaction(&user, ReactionTarget::Comment(comment)).unwrap().is_none());
        // The post's own reaction is untouched.
        assert!(db.get_reaction(&user, ReactionTarget::Post(post)).unwrap().is_some());
    }

    #[test]
    fn post_rows_carry_comment_and_reaction_counts() {
        let db = test_db();
        let user = uid();
        seed_user(&db, &user, "alice");
        let post = Uuid::new_v4();
        seed_post(&db, &post.to_string(), &user, Visibility::Public);
        let comment = Uuid::new_v4();
        db.create_comment(&comment.to_string(), &post.to_string(), &user, "first").unwrap();
        db.create_comment(&uid(), &post.to_string(), &user, "second").unwrap();
        db.toggle_reaction(&uid(), &user, ReactionTarget::Post(post), ReactionType::Like)
            .unwrap();
        // Comment reactions must not count toward the post.
        db.toggle_reaction(&uid(), &user, ReactionTarget::Comment(comment), ReactionType::Love)
            .unwrap();

        let row = db.get_post(&post.to_string()).unwrap().unwrap();
        assert_eq!(row.comment_count, 2);
        assert_eq!(row.reaction_count, 1);
        assert_eq!(row.author_username, "alice");
    }

    #[test]
    fn author_listing_hides_private_posts_from_others() {
        let db = test_db();
        let user = uid();
        seed_user(&db, &user, "alice");
        seed_post(&db, &uid(), &user, Visibility::Public);
        seed_post(&db, &uid(), &user, Visibility::Private);

        assert_eq!(db.list_posts_by_author("alice", true).unwrap().len(), 2);
        assert_eq!(db.list_posts_by_author("alice", false).unwrap().len(), 1);
        assert!(db.list_posts_by_author("nobody", true).unwrap().is_empty());
    }

    #[test]
    fn search_scans_title_and_tech_stack_public_only() {
        let db = test_db();
        let user = uid();
        seed_user(&db, &user, "alice");
        db.create_post(NewPost {
            id: &uid(),
            author_id: &user,
            title: "Async patterns",
            content: "",
            tech_stack: &["tokio".to_string()],
            visibility: Visibility::Public,
        })
        .unwrap();
        db.create_post(NewPost {
            id: &uid(),
            author_id: &user,
            title: "Go generics",
            content: "",
            tech_stack: &["go".to_string()],
            visibility: Visibility::Public,
        })
        .unwrap();
        db.create_post(NewPost {
            id: &uid(),
            author_id: &user,
            title: "secret tokio notes",
            content: "",
            tech_stack: &[],
            visibility: Visibility::Private,
        })
        .unwrap();

        let (rows, total) = db.search_public_posts("TOKIO", 10, 0).unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Async patterns");

        let (rows, total) = db.search_public_posts("generics", 10, 0).unwrap();
        assert_eq!((rows.len(), total), (1, 1));

        let (page, total) = db.search_public_posts("o", 1, 0).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(total, 2);
    }

    #[test]
    fn batch_comment_reactions_cover_requested_ids_only() {
        let db = test_db();
        let user = uid();
        seed_user(&db, &user, "alice");
        let post = Uuid::new_v4();
        seed_post(&db, &post.to_string(), &user, Visibility::Public);
        let (c1, c2, c3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        for c in [c1, c2, c3] {
            db.create_comment(&c.to_string(), &post.to_string(), &user, "hm").unwrap();
        }
        db.toggle_reaction(&uid(), &user, ReactionTarget::Comment(c1), ReactionType::Like).unwrap();
        db.toggle_reaction(&uid(), &user, ReactionTarget::Comment(c2), ReactionType::Love).unwrap();
        db.toggle_reaction(&uid(), &user, ReactionTarget::Comment(c3), ReactionType::Funny).unwrap();

        let rows = db
            .list_reactions_for_comments(&[c1.to_string(), c2.to_string()])
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.target_id != c3.to_string()));

        assert!(db.list_reactions_for_comments(&[]).unwrap().is_empty());
    }

    #[test]
    fn update_user_persists_profile_fields() {
        let db = test_db();
        let user = uid();
        seed_user(&db, &user, "alice");

        let skills = vec!["rust".to_string(), "sql".to_string()];
        db.update_user(&user, "alice", "alice@devconnect.dev", Some("systems person"), &skills, true)
            .unwrap();

        let row = db.get_user_by_id(&user).unwrap().unwrap();
        assert_eq!(row.email, "alice@devconnect.dev");
        assert_eq!(row.bio.as_deref(), Some("systems person"));
        assert!(row.show_email_publicly);
        let parsed: Vec<String> = serde_json::from_str(&row.skills).unwrap();
        assert_eq!(parsed, skills);
    }
}
