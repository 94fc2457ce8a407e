//! User repository: CRUD over borrowers.

use super::{ensure_connection_ready, CrudRepository, RepoError, RepoResult, TableSpec};
use crate::model::user::{User, UserId};
use log::{debug, trace};
use rusqlite::{params, Connection, Params};

const USER_SELECT_SQL: &str = "SELECT id, first_name, last_name, email FROM users";

const USER_TABLES: &[TableSpec] = &[("users", &["id", "first_name", "last_name", "email"])];

pub trait UserRepository: CrudRepository<UserId, User> {}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, USER_TABLES)?;
        Ok(Self { conn })
    }

    fn query_users<P: Params>(&self, clause: &str, params: P) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!("{USER_SELECT_SQL} {clause}"))?;
        let mut rows = stmt.query(params)?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            let user = User {
                id: Some(row.get("id")?),
                first_name: row.get("first_name")?,
                last_name: row.get("last_name")?,
                email: row.get("email")?,
            };
            user.validate()?;
            users.push(user);
        }
        trace!(
            "event=user_query module=repo status=ok result_count={}",
            users.len()
        );
        Ok(users)
    }
}

impl CrudRepository<UserId, User> for SqliteUserRepository<'_> {
    fn save(&self, mut user: User) -> RepoResult<User> {
        user.validate()?;

        let id = match user.id {
            Some(id) => {
                self.conn.execute(
                    "INSERT INTO users (id, first_name, last_name, email)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT (id) DO UPDATE SET
                        first_name = excluded.first_name,
                        last_name = excluded.last_name,
                        email = excluded.email;",
                    params![id, user.first_name, user.last_name, user.email],
                )?;
                id
            }
            None => {
                self.conn.execute(
                    "INSERT INTO users (first_name, last_name, email) VALUES (?1, ?2, ?3);",
                    params![user.first_name, user.last_name, user.email],
                )?;
                self.conn.last_insert_rowid()
            }
        };

        user.id = Some(id);
        debug!("event=user_save module=repo status=ok user_id={id}");
        Ok(user)
    }

    fn get(&self, id: &UserId) -> RepoResult<Option<User>> {
        Ok(self.query_users("WHERE id = ?1;", [id])?.into_iter().next())
    }

    fn delete(&self, user: &User) -> RepoResult<()> {
        let not_persisted = || RepoError::NotPersisted {
            entity: "user",
            id: user.id.map(|id| id.to_string()),
        };
        let id = user.id.ok_or_else(not_persisted)?;

        if self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])? == 0 {
            return Err(not_persisted());
        }
        debug!("event=user_delete module=repo status=ok user_id={id}");
        Ok(())
    }

    fn all(&self) -> RepoResult<Vec<User>> {
        self.query_users("ORDER BY last_name ASC, first_name ASC, id ASC;", [])
    }
}

impl UserRepository for SqliteUserRepository<'_> {}
