use time::OffsetDateTime;

use crate::core::db::state::parse_rfc3339;

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub(super) _guard: (),
}

/// Registration data; the password must already be hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

#[derive(sqlx::FromRow)]
pub(super) struct UserRecord {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl TryFrom<UserRecord> for User {
    type Error = anyhow::Error;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: record.id,
            email: record.email,
            password_hash: record.password_hash,
            created_at: parse_rfc3339(&record.created_at)?,
            _guard: (),
        })
    }
}

pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> impl Future<Output = anyhow::Result<User>>;
    fn get_user(&self, id: i64) -> impl Future<Output = anyhow::Result<Option<User>>>;
    fn get_user_by_email(&self, email: &str) -> impl Future<Output = anyhow::Result<Option<User>>>;
}
