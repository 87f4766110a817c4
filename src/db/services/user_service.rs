use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, QueryFilter, Set, SqlErr};
use tracing::info;

use crate::db::entities::{prelude::User, user};
use crate::db::services::ServiceError;

pub struct UserService;

impl UserService {
    /// Stores a new account. The password must already be hashed by whoever
    /// provisions the account.
    pub async fn create_user(
        db: &DbConn,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<user::Model, ServiceError> {
        let email = normalize_email(email);

        if Self::get_user_by_email(db, &email).await?.is_some() {
            return Err(ServiceError::AlreadyExists(format!("User with email {email}")));
        }

        let new_user = user::ActiveModel {
            email: Set(email.clone()),
            name: Set(name.trim().to_string()),
            password_hash: Set(password_hash.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        // A concurrent insert can still pass the check above; the unique index decides.
        let user = new_user.insert(db).await.map_err(|db_err| match db_err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::AlreadyExists(format!("User with email {email}"))
            }
            _ => ServiceError::DbErr(db_err),
        })?;
        info!(user_id = user.id, "User created.");
        Ok(user)
    }

    pub async fn get_user_by_email(
        db: &DbConn,
        email: &str,
    ) -> Result<Option<user::Model>, ServiceError> {
        Ok(User::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(db)
            .await?)
    }

    /// Looks up the account behind a token. Deactivated accounts count as absent.
    pub async fn get_active_user(
        db: &DbConn,
        user_id: i32,
    ) -> Result<Option<user::Model>, ServiceError> {
        Ok(User::find_by_id(user_id)
            .filter(user::Column::IsActive.eq(true))
            .one(db)
            .await?)
    }

    pub async fn deactivate_user(db: &DbConn, user_id: i32) -> Result<user::Model, ServiceError> {
        let user = User::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound { resource: "User", id: user_id })?;

        let mut active_user: user::ActiveModel = user.into();
        active_user.is_active = Set(false);
        Ok(active_user.update(db).await?)
    }
}

/// Trims the address and lower-cases the domain part; the local part keeps its case.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}
