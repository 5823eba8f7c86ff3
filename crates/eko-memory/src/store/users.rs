//! User accounts: create, lookup, profile updates, soft delete.

use super::{format_ts, now, parse_ts, Store};
use eko_core::{
    error::EkoError,
    language::Language,
    models::{new_id, NewUser, Onboarding, User, UserKind, UserStatus},
};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, uid, email, name, provider, status, welcome, image, kind, \
     notification_token, is_deleted, age, gender, language, purpose, profile_completed, \
     created_at, updated_at, deleted_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    uid: Option<String>,
    email: String,
    name: String,
    provider: String,
    status: String,
    welcome: bool,
    image: String,
    kind: String,
    notification_token: String,
    is_deleted: bool,
    age: Option<i64>,
    gender: Option<String>,
    language: Option<String>,
    purpose: Option<String>,
    profile_completed: bool,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = EkoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let status = UserStatus::parse(&row.status)
            .ok_or_else(|| EkoError::Memory(format!("unknown user status '{}'", row.status)))?;
        let kind = UserKind::parse(&row.kind)
            .ok_or_else(|| EkoError::Memory(format!("unknown user type '{}'", row.kind)))?;
        let deleted_at = match row.deleted_at.as_deref() {
            Some(raw) => Some(parse_ts(raw)?),
            None => None,
        };

        Ok(User {
            id: row.id,
            uid: row.uid,
            email: row.email,
            name: row.name,
            provider: row.provider,
            status,
            welcome: row.welcome,
            image: row.image,
            kind,
            notification_token: row.notification_token,
            is_deleted: row.is_deleted,
            age: row.age,
            gender: row.gender,
            language: row
                .language
                .as_deref()
                .map(|value| Language::from_stored(Some(value))),
            purpose: row.purpose,
            profile_completed: row.profile_completed,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
            deleted_at,
        })
    }
}

/// Random 8-hex suffix for anonymized accounts.
fn short_hex() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

impl Store {
    /// Insert a new active account.
    pub async fn create_user(&self, new: &NewUser) -> Result<User, EkoError> {
        let id = new_id();
        let at = format_ts(&now()?);

        sqlx::query(
            "INSERT INTO users (id, uid, email, name, provider, status, welcome, image, kind, \
             notification_token, is_deleted, profile_completed, created_at, updated_at) \
             VALUES (?, ?, ?, '', ?, 'active', 1, ?, ?, '', 0, 0, ?, ?)",
        )
        .bind(&id)
        .bind(&new.uid)
        .bind(&new.email)
        .bind(&new.provider)
        .bind(&new.image)
        .bind(new.kind.as_str())
        .bind(&at)
        .bind(&at)
        .execute(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("insert user failed: {e}")))?;

        self.find_user(&id)
            .await?
            .ok_or_else(|| EkoError::Memory(format!("user {id} vanished after insert")))
    }

    /// Look up an account by id, deleted or not.
    pub async fn find_user(&self, id: &str) -> Result<Option<User>, EkoError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| EkoError::Memory(format!("query failed: {e}")))?;

        row.map(User::try_from).transpose()
    }

    /// Look up an account by email, deleted or not.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, EkoError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| EkoError::Memory(format!("query failed: {e}")))?;

        row.map(User::try_from).transpose()
    }

    pub async fn update_user_name(&self, id: &str, name: &str) -> Result<Option<User>, EkoError> {
        let at = format_ts(&now()?);
        let result = sqlx::query("UPDATE users SET name = ?, updated_at = ? WHERE id = ?")
            .bind(name)
            .bind(&at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| EkoError::Memory(format!("update failed: {e}")))?;
        self.updated(id, result.rows_affected()).await
    }

    pub async fn update_user_image(&self, id: &str, image: &str) -> Result<Option<User>, EkoError> {
        let at = format_ts(&now()?);
        let result = sqlx::query("UPDATE users SET image = ?, updated_at = ? WHERE id = ?")
            .bind(image)
            .bind(&at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| EkoError::Memory(format!("update failed: {e}")))?;
        self.updated(id, result.rows_affected()).await
    }

    /// Clear the welcome flag after the second welcome step.
    pub async fn finish_welcome(&self, id: &str) -> Result<Option<User>, EkoError> {
        let at = format_ts(&now()?);
        let result = sqlx::query("UPDATE users SET welcome = 0, updated_at = ? WHERE id = ?")
            .bind(&at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| EkoError::Memory(format!("update failed: {e}")))?;
        self.updated(id, result.rows_affected()).await
    }

    pub async fn update_notification_token(
        &self,
        id: &str,
        token: &str,
    ) -> Result<Option<User>, EkoError> {
        let at = format_ts(&now()?);
        let result =
            sqlx::query("UPDATE users SET notification_token = ?, updated_at = ? WHERE id = ?")
                .bind(token)
                .bind(&at)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| EkoError::Memory(format!("update failed: {e}")))?;
        self.updated(id, result.rows_affected()).await
    }

    pub async fn update_language(
        &self,
        id: &str,
        language: Language,
    ) -> Result<Option<User>, EkoError> {
        let at = format_ts(&now()?);
        let result = sqlx::query("UPDATE users SET language = ?, updated_at = ? WHERE id = ?")
            .bind(language.as_stored())
            .bind(&at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| EkoError::Memory(format!("update failed: {e}")))?;
        self.updated(id, result.rows_affected()).await
    }

    /// Store onboarding answers and mark the profile complete.
    pub async fn complete_onboarding(
        &self,
        id: &str,
        answers: &Onboarding,
    ) -> Result<Option<User>, EkoError> {
        let at = format_ts(&now()?);
        let result = sqlx::query(
            "UPDATE users SET name = ?, age = ?, gender = ?, language = ?, purpose = ?, \
             profile_completed = 1, updated_at = ? WHERE id = ?",
        )
        .bind(&answers.name)
        .bind(answers.age)
        .bind(&answers.gender)
        .bind(answers.language.as_stored())
        .bind(&answers.purpose)
        .bind(&at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("update failed: {e}")))?;
        self.updated(id, result.rows_affected()).await
    }

    /// Anonymize and deactivate an account. Returns `false` when the account
    /// does not exist or is already deleted.
    pub async fn soft_delete_user(&self, id: &str, default_image: &str) -> Result<bool, EkoError> {
        let at = format_ts(&now()?);
        let result = sqlx::query(
            "UPDATE users SET is_deleted = 1, status = 'deleted', name = ?, email = ?, \
             image = ?, notification_token = '', updated_at = ?, deleted_at = ? \
             WHERE id = ? AND is_deleted = 0",
        )
        .bind(format!("deleted_user_{}", short_hex()))
        .bind(format!("deleted_{}@deleted.local", short_hex()))
        .bind(default_image)
        .bind(&at)
        .bind(&at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| EkoError::Memory(format!("update failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn updated(&self, id: &str, rows_affected: u64) -> Result<Option<User>, EkoError> {
        if rows_affected == 0 {
            return Ok(None);
        }
        self.find_user(id).await
    }
}
