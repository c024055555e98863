//! The user table and queries for the app's single user.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::PasswordHash,
    user_group::{UserGroupId, add_group_member},
};

/// A newtype wrapper for integer user IDs.
///
/// This keeps user IDs apart from the other IDs, which are plain integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The group used when a request does not name one.
    pub user_group_id: UserGroupId,
}

pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            password TEXT NOT NULL,
            user_group_id INTEGER NOT NULL,
            FOREIGN KEY(user_group_id) REFERENCES user_group(id)
        )",
        (),
    )?;

    Ok(())
}

/// Create a user whose default group is `user_group_id` and make them a member of it.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn create_user(
    password_hash: PasswordHash,
    user_group_id: UserGroupId,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (password, user_group_id) VALUES (?1, ?2)",
        (password_hash.as_ref(), user_group_id),
    )?;

    let id = UserID::new(connection.last_insert_rowid());
    add_group_member(id, user_group_id, connection)?;

    Ok(User {
        id,
        password_hash,
        user_group_id,
    })
}

/// Get the user with the ID `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such user.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, password, user_group_id FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], |row| {
            let raw_password_hash: String = row.get(1)?;

            Ok(User {
                id: UserID::new(row.get(0)?),
                password_hash: PasswordHash::new_unchecked(&raw_password_hash),
                user_group_id: row.get(2)?,
            })
        })
        .map_err(|error| error.into())
}

/// Replace the password of `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such user.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
