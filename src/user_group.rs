//! User groups (financial administrations) and the extractor that checks a
//! user may access the group a request is for.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::request::Parts,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    currency::{Currency, CurrencyId, get_currency_by_id},
    database_id::DatabaseId,
};

/// The database ID of a user group.
pub type UserGroupId = DatabaseId;

/// A financial administration that owns accounts, budgets, journals and exchange rates.
#[derive(Debug, Clone, PartialEq)]
pub struct UserGroup {
    /// The ID of the group in the database.
    pub id: UserGroupId,
    /// The display name of the group.
    pub title: String,
    /// The currency reports for this group are shown in.
    pub primary_currency_id: CurrencyId,
}

pub fn create_user_group_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_group (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            primary_currency_id INTEGER NOT NULL,
            FOREIGN KEY(primary_currency_id) REFERENCES currency(id)
        )",
        (),
    )?;

    Ok(())
}

pub fn create_group_membership_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS group_membership (
            user_id INTEGER NOT NULL,
            user_group_id INTEGER NOT NULL,
            PRIMARY KEY(user_id, user_group_id),
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
            FOREIGN KEY(user_group_id) REFERENCES user_group(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Create a new user group whose reports are shown in `primary_currency_id`.
///
/// # Errors
/// Returns an [Error::SqlError] if the title is already taken or the query fails.
pub fn create_user_group(
    title: &str,
    primary_currency_id: CurrencyId,
    connection: &Connection,
) -> Result<UserGroup, Error> {
    connection.execute(
        "INSERT INTO user_group (title, primary_currency_id) VALUES (?1, ?2)",
        (title, primary_currency_id),
    )?;

    Ok(UserGroup {
        id: connection.last_insert_rowid(),
        title: title.to_owned(),
        primary_currency_id,
    })
}

/// Make `user_id` a member of `user_group_id`. Adding an existing member does nothing.
pub fn add_group_member(
    user_id: UserID,
    user_group_id: UserGroupId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT OR IGNORE INTO group_membership (user_id, user_group_id) VALUES (?1, ?2)",
        (user_id.as_i64(), user_group_id),
    )?;

    Ok(())
}

pub fn get_user_group(id: UserGroupId, connection: &Connection) -> Result<UserGroup, Error> {
    connection
        .prepare("SELECT id, title, primary_currency_id FROM user_group WHERE id = :id")?
        .query_row(&[(":id", &id)], |row| {
            Ok(UserGroup {
                id: row.get(0)?,
                title: row.get(1)?,
                primary_currency_id: row.get(2)?,
            })
        })
        .map_err(|error| error.into())
}

fn is_group_member(
    user_id: UserID,
    user_group_id: UserGroupId,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM group_membership WHERE user_id = ?1 AND user_group_id = ?2
            )",
            (user_id.as_i64(), user_group_id),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// A user group the authenticated user is allowed to act on.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedUserGroup {
    pub group: UserGroup,
    pub primary_currency: Currency,
}

impl ValidatedUserGroup {
    pub fn id(&self) -> UserGroupId {
        self.group.id
    }
}

/// Resolve the group a request from `user_id` is for.
///
/// Without a `requested` group the user's default group is used.
///
/// # Errors
/// Returns:
/// - [Error::NotFound] if the requested group does not exist.
/// - [Error::UserGroupForbidden] if the user is not a member of the requested group.
pub fn resolve_user_group(
    user_id: UserID,
    requested: Option<UserGroupId>,
    connection: &Connection,
) -> Result<ValidatedUserGroup, Error> {
    let group = match requested {
        None => {
            let user = get_user_by_id(user_id, connection)?;
            get_user_group(user.user_group_id, connection)?
        }
        Some(group_id) => {
            let group = get_user_group(group_id, connection)?;

            if !is_group_member(user_id, group_id, connection)? {
                tracing::warn!("User {user_id} tried to access user group {group_id}");
                return Err(Error::UserGroupForbidden(group_id));
            }

            group
        }
    };

    let primary_currency = get_currency_by_id(group.primary_currency_id, connection)?;

    Ok(ValidatedUserGroup {
        group,
        primary_currency,
    })
}

/// The state needed to validate a user group.
#[derive(Debug, Clone)]
pub struct UserGroupState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UserGroupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct UserGroupQuery {
    user_group_id: Option<UserGroupId>,
}

/// Reads the [UserID] set by the auth middleware and the optional
/// `user_group_id` query parameter.
impl<S> FromRequestParts<S> for ValidatedUserGroup
where
    UserGroupState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .extensions
            .get::<UserID>()
            .copied()
            .ok_or(Error::Unauthenticated)?;

        let Query(query) =
            Query::<UserGroupQuery>::try_from_uri(&parts.uri).map_err(|rejection| {
                tracing::debug!("Invalid user group query: {rejection}");
                Error::NotFound
            })?;

        let state = UserGroupState::from_ref(state);
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        resolve_user_group(user_id, query.user_group_id, &connection)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        auth::{UserID, create_user},
        currency::get_currency_by_code,
        db::initialize,
    };

    use super::{
        UserGroupState, ValidatedUserGroup, add_group_member, create_user_group,
        resolve_user_group,
    };

    fn get_test_connection() -> (Connection, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let euro = get_currency_by_code("EUR", &connection).unwrap();
        let group = create_user_group("Default", euro.id, &connection).unwrap();
        let user = create_user(
            PasswordHash::new_unchecked("hunter2"),
            group.id,
            &connection,
        )
        .unwrap();

        (connection, user.id)
    }

    #[test]
    fn resolves_default_group() {
        let (connection, user_id) = get_test_connection();

        let group = resolve_user_group(user_id, None, &connection).unwrap();

        assert_eq!(group.group.title, "Default");
        assert_eq!(group.primary_currency.code, "EUR");
    }

    #[test]
    fn resolves_requested_group_for_member() {
        let (connection, user_id) = get_test_connection();
        let dollar = get_currency_by_code("USD", &connection).unwrap();
        let other = create_user_group("Holiday", dollar.id, &connection).unwrap();
        add_group_member(user_id, other.id, &connection).unwrap();

        let group = resolve_user_group(user_id, Some(other.id), &connection).unwrap();

        assert_eq!(group.id(), other.id);
        assert_eq!(group.primary_currency.code, "USD");
    }

    #[test]
    fn rejects_group_user_is_not_member_of() {
        let (connection, user_id) = get_test_connection();
        let dollar = get_currency_by_code("USD", &connection).unwrap();
        let other = create_user_group("Someone else", dollar.id, &connection).unwrap();

        let result = resolve_user_group(user_id, Some(other.id), &connection);

        assert_eq!(result, Err(Error::UserGroupForbidden(other.id)));
    }

    #[test]
    fn rejects_unknown_group() {
        let (connection, user_id) = get_test_connection();

        let result = resolve_user_group(user_id, Some(42), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    async fn group_title(group: ValidatedUserGroup) -> String {
        group.group.title
    }

    #[tokio::test]
    async fn extractor_reads_query_parameter() {
        let (connection, user_id) = get_test_connection();
        let dollar = get_currency_by_code("USD", &connection).unwrap();
        let other = create_user_group("Holiday", dollar.id, &connection).unwrap();
        add_group_member(user_id, other.id, &connection).unwrap();
        let state = UserGroupState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route("/group", get(group_title))
            .layer(Extension(user_id))
            .with_state(state);
        let server = TestServer::try_new(app).expect("could not create test server");

        server.get("/group").await.assert_text("Default");
        server
            .get(&format!("/group?user_group_id={}", other.id))
            .await
            .assert_text("Holiday");
        server
            .get("/group?user_group_id=abc")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
