use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id                  TEXT PRIMARY KEY,
            username            TEXT NOT NULL UNIQUE,
            email               TEXT NOT NULL UNIQUE,
            password            TEXT NOT NULL,
            bio                 TEXT,
            skills              TEXT NOT NULL DEFAULT '[]',
            show_email_publicly INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS posts (
            id          TEXT PRIMARY KEY,
            author_id   TEXT NOT NULL REFERENCES users(id),
            title       TEXT NOT NULL,
            content     TEXT NOT NULL,
            tech_stack  TEXT NOT NULL DEFAULT '[]',
            visibility  TEXT NOT NULL DEFAULT 'PUBLIC',
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id);
        CREATE INDEX IF NOT EXISTS idx_posts_visibility ON posts(visibility);

        CREATE TABLE IF NOT EXISTS comments (
            id          TEXT PRIMARY KEY,
            post_id     TEXT NOT NULL REFERENCES posts(id),
            author_id   TEXT NOT NULL REFERENCES users(id),
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id);

        -- Targets are polymorphic (posts and comments), so there is no FK
        -- on target_id; deletes clean up reactions explicitly. The UNIQUE
        -- constraint backs the one-reaction-per-user-per-target rule.
        CREATE TABLE IF NOT EXISTS reactions (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            target_kind TEXT NOT NULL,
            target_id   TEXT NOT NULL,
            type        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, target_kind, target_id)
        );

        CREATE INDEX IF NOT EXISTS idx_reactions_target ON reactions(target_kind, target_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
