//! SQL schema for the Shelf SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id         TEXT PRIMARY KEY,
    username        TEXT NOT NULL UNIQUE,
    email           TEXT NOT NULL COLLATE NOCASE UNIQUE,
    password_hash   TEXT NOT NULL,
    display_name    TEXT NOT NULL,
    bio             TEXT NOT NULL DEFAULT '',
    avatar          TEXT NOT NULL DEFAULT '',
    favorite_genres TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    reading_goal    INTEGER NOT NULL DEFAULT 12,
    is_public       INTEGER NOT NULL DEFAULT 1,
    is_admin        INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,                -- RFC 3339 UTC, fixed width
    updated_at      TEXT NOT NULL
);

-- One row per edge; both users' follower/following sets are read from it.
CREATE TABLE IF NOT EXISTS follows (
    follower_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    followee_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,
    PRIMARY KEY (follower_id, followee_id),
    CHECK (follower_id != followee_id)
);

-- NULL isbn / external_id never collide: sparse uniqueness.
CREATE TABLE IF NOT EXISTS books (
    book_id        TEXT PRIMARY KEY,
    title          TEXT NOT NULL,
    author         TEXT NOT NULL,
    isbn           TEXT UNIQUE,
    external_id    TEXT UNIQUE,
    description    TEXT NOT NULL DEFAULT '',
    published_date TEXT,                          -- YYYY-MM-DD
    page_count     INTEGER NOT NULL DEFAULT 0,
    genres         TEXT NOT NULL DEFAULT '[]',
    cover_image    TEXT NOT NULL DEFAULT '',
    language       TEXT NOT NULL DEFAULT 'en',
    publisher      TEXT NOT NULL DEFAULT '',
    average_rating REAL NOT NULL DEFAULT 0,
    ratings_count  INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

-- user_id carries no foreign key: reviews outlive a deleted author.
CREATE TABLE IF NOT EXISTS reviews (
    review_id   TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    book_id     TEXT NOT NULL REFERENCES books(book_id),
    rating      INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    review_text TEXT NOT NULL DEFAULT '',
    read_status TEXT NOT NULL
                CHECK (read_status IN ('want-to-read', 'currently-reading', 'read')),
    start_date  TEXT,
    finish_date TEXT,
    is_public   INTEGER NOT NULL DEFAULT 1,
    tags        TEXT NOT NULL DEFAULT '[]',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE (user_id, book_id)
);

CREATE TABLE IF NOT EXISTS review_likes (
    review_id TEXT NOT NULL REFERENCES reviews(review_id) ON DELETE CASCADE,
    user_id   TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    PRIMARY KEY (review_id, user_id)
);

CREATE INDEX IF NOT EXISTS follows_followee_idx ON follows(followee_id);
CREATE INDEX IF NOT EXISTS books_created_idx    ON books(created_at);
CREATE INDEX IF NOT EXISTS reviews_book_idx     ON reviews(book_id);
CREATE INDEX IF NOT EXISTS reviews_updated_idx  ON reviews(updated_at);

PRAGMA user_version = 1;
";
