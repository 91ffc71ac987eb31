use async_trait::async_trait;
use chrono::Utc;
use common::model::directory::{Lecturer, Role, Student, User};
use common::requests::{CreateLecturerRequest, CreateStudentRequest, CreateUserRequest, UpdateUserRequest};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{opt_uuid_at, time_at, unique, uuid_at, SqliteStore};
use crate::store::{DirectoryStore, StoreError, StoreResult};

const USER_TAKEN: &str = "A user with this username or email";

const USER_SELECT: &str = "SELECT u.id, u.username, u.email, u.full_name, u.password_hash, u.role_id, \
                           r.name, u.is_active, u.created_at, u.updated_at \
                           FROM users u JOIN roles r ON r.id = u.role_id";

const STUDENT_SELECT: &str = "SELECT s.id, s.user_id, s.student_id, s.program_study, s.academic_year, \
                              s.advisor_id, u.full_name, s.created_at \
                              FROM students s JOIN users u ON u.id = s.user_id";

const LECTURER_SELECT: &str = "SELECT l.id, l.user_id, l.lecturer_id, l.department, u.full_name, l.created_at \
                               FROM lecturers l JOIN users u ON u.id = l.user_id";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_at(row, 0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        full_name: row.get(3)?,
        password_hash: row.get(4)?,
        role_id: uuid_at(row, 5)?,
        role_name: row.get(6)?,
        is_active: row.get(7)?,
        created_at: time_at(row, 8)?,
        updated_at: time_at(row, 9)?,
    })
}

fn role_from_row(row: &Row<'_>) -> rusqlite::Result<Role> {
    Ok(Role {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        student_id: row.get(2)?,
        program_study: row.get(3)?,
        academic_year: row.get(4)?,
        advisor_id: opt_uuid_at(row, 5)?,
        full_name: row.get(6)?,
        created_at: time_at(row, 7)?,
    })
}

fn lecturer_from_row(row: &Row<'_>) -> rusqlite::Result<Lecturer> {
    Ok(Lecturer {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        lecturer_id: row.get(2)?,
        department: row.get(3)?,
        full_name: row.get(4)?,
        created_at: time_at(row, 5)?,
    })
}

fn query_all<T>(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> StoreResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let items = stmt.query_map(params, map)?.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(items)
}

fn exists(conn: &Connection, table: &str, id: Uuid) -> StoreResult<bool> {
    let found = conn
        .query_row(
            &format!("SELECT 1 FROM {table} WHERE id = ?1"),
            params![id.to_string()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn user_by_id(conn: &Connection, id: Uuid) -> StoreResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("{USER_SELECT} WHERE u.id = ?1"),
            params![id.to_string()],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

fn student_where(conn: &Connection, clause: &str, value: Uuid) -> StoreResult<Option<Student>> {
    let student = conn
        .query_row(
            &format!("{STUDENT_SELECT} WHERE {clause} = ?1"),
            params![value.to_string()],
            student_from_row,
        )
        .optional()?;
    Ok(student)
}

fn lecturer_where(conn: &Connection, clause: &str, value: Uuid) -> StoreResult<Option<Lecturer>> {
    let lecturer = conn
        .query_row(
            &format!("{LECTURER_SELECT} WHERE {clause} = ?1"),
            params![value.to_string()],
            lecturer_from_row,
        )
        .optional()?;
    Ok(lecturer)
}

#[async_trait]
impl DirectoryStore for SqliteStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let conn = self.conn.lock().await;
        query_all(&conn, &format!("{USER_SELECT} ORDER BY u.created_at DESC"), [], user_from_row)
    }

    async fn user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().await;
        user_by_id(&conn, id)
    }

    async fn create_user(&self, request: &CreateUserRequest) -> StoreResult<User> {
        let conn = self.conn.lock().await;
        if !exists(&conn, "roles", request.role_id)? {
            return Err(StoreError::NotFound("role"));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO users (id, username, email, full_name, password_hash, role_id, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
            params![
                id.to_string(),
                request.username,
                request.email,
                request.full_name,
                request.password_hash,
                request.role_id.to_string(),
                now,
            ],
        )
        .map_err(unique(USER_TAKEN))?;

        user_by_id(&conn, id)?.ok_or(StoreError::NotFound("user"))
    }

    async fn update_user(&self, id: Uuid, request: &UpdateUserRequest) -> StoreResult<User> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE users SET
                 username = COALESCE(?1, username),
                 email = COALESCE(?2, email),
                 full_name = COALESCE(?3, full_name),
                 updated_at = ?4
             WHERE id = ?5",
            params![request.username, request.email, request.full_name, Utc::now(), id.to_string()],
        )
        .map_err(unique(USER_TAKEN))?;
        if changed == 0 {
            return Err(StoreError::NotFound("user"));
        }

        user_by_id(&conn, id)?.ok_or(StoreError::NotFound("user"))
    }

    async fn deactivate_user(&self, id: Uuid) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE users SET is_active = 0, updated_at = ?1 WHERE id = ?2",
            params![Utc::now(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }

    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        if !exists(&conn, "roles", role_id)? {
            return Err(StoreError::NotFound("role"));
        }
        let changed = conn.execute(
            "UPDATE users SET role_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![role_id.to_string(), Utc::now(), user_id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let conn = self.conn.lock().await;
        query_all(&conn, "SELECT id, name, description FROM roles ORDER BY name", [], role_from_row)
    }

    async fn role(&self, id: Uuid) -> StoreResult<Option<Role>> {
        let conn = self.conn.lock().await;
        let role = conn
            .query_row(
                "SELECT id, name, description FROM roles WHERE id = ?1",
                params![id.to_string()],
                role_from_row,
            )
            .optional()?;
        Ok(role)
    }

    async fn role_permissions(&self, role_id: Uuid) -> StoreResult<Vec<String>> {
        let conn = self.conn.lock().await;
        query_all(
            &conn,
            "SELECT p.name FROM permissions p
             JOIN role_permissions rp ON rp.permission_id = p.id
             WHERE rp.role_id = ?1 ORDER BY p.name",
            params![role_id.to_string()],
            |row| row.get(0),
        )
    }

    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        let conn = self.conn.lock().await;
        query_all(&conn, &format!("{STUDENT_SELECT} ORDER BY s.created_at DESC"), [], student_from_row)
    }

    async fn student(&self, id: Uuid) -> StoreResult<Option<Student>> {
        let conn = self.conn.lock().await;
        student_where(&conn, "s.id", id)
    }

    async fn student_by_user(&self, user_id: Uuid) -> StoreResult<Option<Student>> {
        let conn = self.conn.lock().await;
        student_where(&conn, "s.user_id", user_id)
    }

    async fn create_student(&self, request: &CreateStudentRequest) -> StoreResult<Student> {
        let conn = self.conn.lock().await;
        if !exists(&conn, "users", request.user_id)? {
            return Err(StoreError::NotFound("user"));
        }
        if let Some(advisor) = request.advisor_id {
            if !exists(&conn, "lecturers", advisor)? {
                return Err(StoreError::NotFound("lecturer"));
            }
        }

        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO students (id, user_id, student_id, program_study, academic_year, advisor_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id.to_string(),
                request.user_id.to_string(),
                request.student_id,
                request.program_study,
                request.academic_year,
                request.advisor_id.map(|a| a.to_string()),
                Utc::now(),
            ],
        )
        .map_err(unique("A student profile for this user or NIM"))?;

        student_where(&conn, "s.id", id)?.ok_or(StoreError::NotFound("student"))
    }

    async fn set_advisor(&self, student_id: Uuid, lecturer_id: Uuid) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        if !exists(&conn, "lecturers", lecturer_id)? {
            return Err(StoreError::NotFound("lecturer"));
        }
        let changed = conn.execute(
            "UPDATE students SET advisor_id = ?1 WHERE id = ?2",
            params![lecturer_id.to_string(), student_id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("student"));
        }
        Ok(())
    }

    async fn list_lecturers(&self) -> StoreResult<Vec<Lecturer>> {
        let conn = self.conn.lock().await;
        query_all(&conn, &format!("{LECTURER_SELECT} ORDER BY l.created_at DESC"), [], lecturer_from_row)
    }

    async fn lecturer(&self, id: Uuid) -> StoreResult<Option<Lecturer>> {
        let conn = self.conn.lock().await;
        lecturer_where(&conn, "l.id", id)
    }

    async fn lecturer_by_user(&self, user_id: Uuid) -> StoreResult<Option<Lecturer>> {
        let conn = self.conn.lock().await;
        lecturer_where(&conn, "l.user_id", user_id)
    }

    async fn create_lecturer(&self, request: &CreateLecturerRequest) -> StoreResult<Lecturer> {
        let conn = self.conn.lock().await;
        if !exists(&conn, "users", request.user_id)? {
            return Err(StoreError::NotFound("user"));
        }

        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO lecturers (id, user_id, lecturer_id, department, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.to_string(),
                request.user_id.to_string(),
                request.lecturer_id,
                request.department,
                Utc::now(),
            ],
        )
        .map_err(unique("A lecturer profile for this user or NIP"))?;

        lecturer_where(&conn, "l.id", id)?.ok_or(StoreError::NotFound("lecturer"))
    }

    async fn advisees(&self, lecturer_id: Uuid) -> StoreResult<Vec<Student>> {
        let conn = self.conn.lock().await;
        query_all(
            &conn,
            &format!("{STUDENT_SELECT} WHERE s.advisor_id = ?1 ORDER BY s.student_id"),
            params![lecturer_id.to_string()],
            student_from_row,
        )
    }
}
