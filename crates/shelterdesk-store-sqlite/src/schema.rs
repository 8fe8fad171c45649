//! SQL schema for the shelterdesk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    person_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT,
    phone       TEXT,
    role        TEXT NOT NULL,   -- 'admin' | 'leader' | 'teacher' | 'sheltered'
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS shelters (
    shelter_id   TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    street       TEXT NOT NULL,
    number       TEXT NOT NULL,
    district     TEXT NOT NULL,
    city         TEXT NOT NULL,
    state        TEXT NOT NULL,
    postal_code  TEXT NOT NULL,
    complement   TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

-- One row per (person, kind). The single nullable shelter_id column is what
-- keeps a profile linked to at most one shelter.
CREATE TABLE IF NOT EXISTS profiles (
    profile_id  TEXT PRIMARY KEY,
    person_id   TEXT NOT NULL REFERENCES people(person_id),
    kind        TEXT NOT NULL,   -- 'leader' | 'teacher'
    shelter_id  TEXT REFERENCES shelters(shelter_id) ON DELETE SET NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (person_id, kind)
);

-- Pagelas are append-only.
CREATE TABLE IF NOT EXISTS pagelas (
    pagela_id       TEXT PRIMARY KEY,
    person_id       TEXT NOT NULL REFERENCES people(person_id),
    shelter_id      TEXT REFERENCES shelters(shelter_id) ON DELETE SET NULL,
    reference_date  TEXT NOT NULL,   -- YYYY-MM-DD
    present         INTEGER NOT NULL,
    notes           TEXT,
    recorded_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS people_role_idx       ON people(role);
CREATE INDEX IF NOT EXISTS profiles_shelter_idx  ON profiles(shelter_id);
CREATE INDEX IF NOT EXISTS pagelas_person_idx    ON pagelas(person_id, reference_date);

PRAGMA user_version = 1;
";
