//! SQL schema for the Muster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS personnel (
    id                    TEXT PRIMARY KEY,
    personal_number       TEXT UNIQUE,
    full_name             TEXT NOT NULL,
    rank                  TEXT,            -- rank slug
    birth_date            TEXT,            -- YYYY-MM-DD
    military_id           TEXT,
    unit                  TEXT,
    phone                 TEXT,
    current_status        TEXT NOT NULL DEFAULT 'active',
    fitness_category      TEXT,            -- 'A', 'B', 'V', 'G' or 'D'
    fitness_category_date TEXT,
    notes                 TEXT,
    created_at            TEXT NOT NULL,   -- RFC 3339 UTC
    updated_at            TEXT NOT NULL
);

-- Movements and checkups are append-only timeline records.
CREATE TABLE IF NOT EXISTS movements (
    id                   TEXT PRIMARY KEY,
    person_id            TEXT NOT NULL REFERENCES personnel(id),
    kind                 TEXT NOT NULL,
    start_date           TEXT NOT NULL,
    end_date             TEXT,
    destination          TEXT,
    vmo                  TEXT,
    expected_return_date TEXT,
    notes                TEXT,
    created_at           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS checkups (
    id               TEXT PRIMARY KEY,
    person_id        TEXT NOT NULL REFERENCES personnel(id),
    checkup_date     TEXT NOT NULL,
    diagnosis        TEXT NOT NULL,
    fitness_category TEXT,
    doctor_specialty TEXT,
    recommendations  TEXT,
    notes            TEXT,
    created_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS personnel_name_idx   ON personnel(full_name);
CREATE INDEX IF NOT EXISTS movements_person_idx ON movements(person_id, kind);
CREATE INDEX IF NOT EXISTS checkups_person_idx  ON checkups(person_id);

PRAGMA user_version = 1;
";
