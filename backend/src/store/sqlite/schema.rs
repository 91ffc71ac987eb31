//! Table definitions and the seeded role/permission graph.

use rusqlite::{params, Connection};
use uuid::Uuid;

const TABLES: &str = "
CREATE TABLE IF NOT EXISTS roles (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS permissions (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    resource    TEXT NOT NULL,
    action      TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS role_permissions (
    role_id       TEXT NOT NULL REFERENCES roles(id),
    permission_id TEXT NOT NULL REFERENCES permissions(id),
    PRIMARY KEY (role_id, permission_id)
);

CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    full_name     TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    role_id       TEXT NOT NULL REFERENCES roles(id),
    is_active     INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lecturers (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL UNIQUE REFERENCES users(id),
    lecturer_id TEXT NOT NULL UNIQUE,
    department  TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    id            TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL UNIQUE REFERENCES users(id),
    student_id    TEXT NOT NULL UNIQUE,
    program_study TEXT NOT NULL,
    academic_year TEXT NOT NULL,
    advisor_id    TEXT REFERENCES lecturers(id),
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS achievement_references (
    id                   TEXT PRIMARY KEY,
    student_id           TEXT NOT NULL REFERENCES students(id),
    mongo_achievement_id TEXT NOT NULL,
    status               TEXT NOT NULL CHECK (status IN ('draft', 'submitted', 'verified', 'rejected')),
    submitted_at         TEXT,
    verified_at          TEXT,
    verified_by          TEXT,
    rejection_note       TEXT,
    created_at           TEXT NOT NULL,
    updated_at           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_achievement_references_student
    ON achievement_references (student_id);
";

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STUDENT: &str = "student";
pub const ROLE_LECTURER: &str = "lecturer";

const ROLES: [(&str, &str); 3] = [
    (ROLE_ADMIN, "Manages users, roles and profiles"),
    (ROLE_STUDENT, "Reports achievements"),
    (ROLE_LECTURER, "Verifies advisees' achievements"),
];

const PERMISSIONS: [(&str, &str); 7] = [
    ("achievement:create", "Create achievement drafts"),
    ("achievement:read", "Read achievements"),
    ("achievement:update", "Edit achievement drafts"),
    ("achievement:delete", "Delete achievement drafts"),
    ("achievement:verify", "Verify or reject submitted achievements"),
    ("user:manage", "Manage user accounts and profiles"),
    ("report:read", "Read achievement reports"),
];

const GRANTS: [(&str, &[&str]); 3] = [
    (
        ROLE_ADMIN,
        &[
            "achievement:create",
            "achievement:read",
            "achievement:update",
            "achievement:delete",
            "achievement:verify",
            "user:manage",
            "report:read",
        ],
    ),
    (
        ROLE_STUDENT,
        &[
            "achievement:create",
            "achievement:read",
            "achievement:update",
            "achievement:delete",
        ],
    ),
    (
        ROLE_LECTURER,
        &["achievement:read", "achievement:verify", "report:read"],
    ),
];

/// Creates missing tables and seeds the built-in roles. Safe to run on every start.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(TABLES)?;

    for (name, description) in ROLES {
        conn.execute(
            "INSERT OR IGNORE INTO roles (id, name, description) VALUES (?1, ?2, ?3)",
            params![Uuid::new_v4().to_string(), name, description],
        )?;
    }

    for (name, description) in PERMISSIONS {
        let (resource, action) = name.split_once(':').unwrap_or((name, ""));
        conn.execute(
            "INSERT OR IGNORE INTO permissions (id, name, resource, action, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![Uuid::new_v4().to_string(), name, resource, action, description],
        )?;
    }

    for (role, permissions) in GRANTS {
        for permission in permissions {
            conn.execute(
                "INSERT OR IGNORE INTO role_permissions (role_id, permission_id)
                 SELECT r.id, p.id FROM roles r, permissions p WHERE r.name = ?1 AND p.name = ?2",
                params![role, permission],
            )?;
        }
    }

    Ok(())
}
