//! User repository: the persistence session the user model works against.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Select, TransactionTrait,
};
use tokio::sync::{Mutex, MutexGuard};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult};
use domain::{Criterion, User, UserFilter};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Writes (`persist`, `merge`, `remove`) are staged until `flush`; reads made
/// through the same session observe staged writes.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by primary key
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Find every user matching all criteria of `filter`
    async fn find_by(&self, filter: &UserFilter) -> AppResult<Vec<User>>;

    /// List all users ordered by id
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Insert a new user; the returned record carries the assigned id
    async fn persist(&self, user: User) -> AppResult<User>;

    /// Overwrite the stored row with the same id
    async fn merge(&self, user: User) -> AppResult<User>;

    /// Permanently delete the user's row
    async fn remove(&self, user: &User) -> AppResult<()>;

    /// Commit staged writes
    async fn flush(&self) -> AppResult<()>;
}

/// SeaORM implementation of UserRepository.
///
/// The first write opens a transaction that stays open until `flush`.
/// Dropping the store with an open transaction rolls it back.
pub struct UserStore {
    db: DatabaseConnection,
    pending: Mutex<Option<DatabaseTransaction>>,
}

impl UserStore {
    /// Create new repository session
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            pending: Mutex::new(None),
        }
    }

    /// Lock the session, opening a transaction if none is pending.
    async fn begin(&self) -> AppResult<MutexGuard<'_, Option<DatabaseTransaction>>> {
        let mut pending = self.pending.lock().await;
        if pending.is_none() {
            *pending = Some(self.db.begin().await?);
        }
        Ok(pending)
    }

    async fn fetch_all(&self, select: Select<UserEntity>) -> AppResult<Vec<User>> {
        let pending = self.pending.lock().await;
        let models = match pending.as_ref() {
            Some(txn) => select.all(txn).await?,
            None => select.all(&self.db).await?,
        };

        Ok(models.into_iter().map(User::from).collect())
    }
}

fn condition(filter: &UserFilter) -> Condition {
    filter
        .criteria()
        .iter()
        .fold(Condition::all(), |condition, criterion| {
            condition.add(match criterion {
                Criterion::Id(id) => user::Column::Id.eq(*id),
                Criterion::Email(email) => user::Column::Email.eq(email.as_str()),
                Criterion::Password(password) => user::Column::Password.eq(password.as_str()),
                Criterion::Role(role) => user::Column::Role.eq(role.as_str()),
                Criterion::Name(name) => user::Column::Name.eq(name.as_str()),
                Criterion::GatewayCustomerId(id) => user::Column::GatewayCustomerId.eq(*id),
            })
        })
}

fn staged(pending: &Option<DatabaseTransaction>) -> AppResult<&DatabaseTransaction> {
    pending
        .as_ref()
        .ok_or_else(|| AppError::internal("no open transaction"))
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let select = UserEntity::find_by_id(id);
        let pending = self.pending.lock().await;
        let result = match pending.as_ref() {
            Some(txn) => select.one(txn).await?,
            None => select.one(&self.db).await?,
        };

        Ok(result.map(User::from))
    }

    async fn find_by(&self, filter: &UserFilter) -> AppResult<Vec<User>> {
        self.fetch_all(
            UserEntity::find()
                .filter(condition(filter))
                .order_by_asc(user::Column::Id),
        )
        .await
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        self.fetch_all(UserEntity::find().order_by_asc(user::Column::Id))
            .await
    }

    async fn persist(&self, user: User) -> AppResult<User> {
        let pending = self.begin().await?;
        let model = ActiveModel::for_insert(user)
            .insert(staged(&pending)?)
            .await?;

        Ok(User::from(model))
    }

    async fn merge(&self, user: User) -> AppResult<User> {
        let pending = self.begin().await?;
        let model = ActiveModel::for_update(user)
            .update(staged(&pending)?)
            .await?;

        Ok(User::from(model))
    }

    async fn remove(&self, user: &User) -> AppResult<()> {
        let pending = self.begin().await?;
        let result = UserEntity::delete_by_id(user.id)
            .exec(staged(&pending)?)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn flush(&self) -> AppResult<()> {
        let mut pending = self.pending.lock().await;
        if let Some(txn) = pending.take() {
            txn.commit().await?;
        }
        Ok(())
    }
}
