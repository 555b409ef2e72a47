//! User model - validation, password salting and CRUD orchestration.
//!
//! SOLID (SRP): Handles user-related use cases only. Each `UserManager` works
//! against one repository session and is discarded with it.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use common::{AppError, AppResult};
use domain::{PasswordSalt, User, UserChanges, UserFilter, ROLE_ANONYMOUS};

use crate::repository::UserRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a user from decoded input. Email and password are required;
    /// the role defaults to `anonymous`.
    async fn create_user(&self, data: UserChanges) -> AppResult<User>;

    /// Create (no positive id) or merge into an existing user, returning its id
    async fn save(&self, data: UserChanges) -> AppResult<i64>;

    /// Resolve credentials to a stored identity
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<User>>;

    /// True when no user has this email
    async fn is_email_unique(&self, email: &str) -> AppResult<bool>;

    /// All users, no pagination
    async fn get_users(&self) -> AppResult<Vec<User>>;

    /// Single user, `None` when absent
    async fn get_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Users matching the recognized keys of `params`; all users if none remain
    async fn get_by_params(&self, params: &Map<String, Value>) -> AppResult<Vec<User>>;

    /// Hard delete. `false` when the user does not exist.
    async fn delete_user(&self, id: i64) -> AppResult<bool>;

    /// Payment gateway customer id, `0` when the user or the value is absent
    async fn get_gateway_customer_id(&self, id: i64) -> AppResult<i64>;
}

/// Concrete implementation of UserService using a repository session.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    salt: PasswordSalt,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>, salt: PasswordSalt) -> Self {
        Self { repo, salt }
    }

    /// Replace a plain text password in `data` by its salted hash.
    fn hash_password(&self, mut data: UserChanges) -> AppResult<UserChanges> {
        if let Some(plain) = data.password.take() {
            data.password = Some(self.salt.hash(&plain)?);
        }
        Ok(data)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, data: UserChanges) -> AppResult<User> {
        if data.is_empty() {
            return Err(AppError::validation("User data is missing"));
        }
        if is_blank(&data.email) || is_blank(&data.password) {
            return Err(AppError::validation("email & password are required"));
        }

        let mut data = self.hash_password(data)?;
        if is_blank(&data.role) {
            data.role = Some(ROLE_ANONYMOUS.to_string());
        }

        let mut user = User::default();
        data.apply_to(&mut user);

        let user = self.repo.persist(user).await?;
        self.repo.flush().await?;

        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    async fn save(&self, data: UserChanges) -> AppResult<i64> {
        let data = self.hash_password(data)?;

        let user = match data.target_id() {
            Some(id) => {
                let mut user = self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)?;
                data.apply_to(&mut user);
                self.repo.merge(user).await?
            }
            None => {
                let mut user = User::default();
                data.apply_to(&mut user);
                self.repo.persist(user).await?
            }
        };
        self.repo.flush().await?;

        tracing::debug!(user_id = user.id, "User saved");
        Ok(user.id)
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<User>> {
        let candidates = self.repo.find_by(&UserFilter::by_email(email)).await?;

        Ok(candidates
            .into_iter()
            .find(|user| self.salt.verify(password, &user.password)))
    }

    async fn is_email_unique(&self, email: &str) -> AppResult<bool> {
        let matches = self.repo.find_by(&UserFilter::by_email(email)).await?;
        Ok(matches.is_empty())
    }

    async fn get_users(&self) -> AppResult<Vec<User>> {
        self.repo.find_all().await
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.repo.find_by_id(id).await
    }

    async fn get_by_params(&self, params: &Map<String, Value>) -> AppResult<Vec<User>> {
        let filter = UserFilter::from_params(params)?;
        if filter.is_empty() {
            return self.get_users().await;
        }
        self.repo.find_by(&filter).await
    }

    async fn delete_user(&self, id: i64) -> AppResult<bool> {
        let Some(user) = self.repo.find_by_id(id).await? else {
            return Ok(false);
        };

        self.repo.remove(&user).await?;
        self.repo.flush().await?;

        tracing::info!(user_id = id, "User deleted");
        Ok(true)
    }

    async fn get_gateway_customer_id(&self, id: i64) -> AppResult<i64> {
        Ok(self
            .repo
            .find_by_id(id)
            .await?
            .and_then(|user| user.gateway_customer_id)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use mockall::predicate::eq;

    fn salt() -> PasswordSalt {
        PasswordSalt::new("test-salt")
    }

    fn stored(id: i64) -> User {
        User {
            id,
            email: "stored@example.com".to_string(),
            password: "stored-hash".to_string(),
            role: "user".to_string(),
            name: "Stored".to_string(),
            last_login: None,
            gateway_customer_id: None,
        }
    }

    fn manager(repo: MockUserRepository) -> UserManager {
        UserManager::new(Arc::new(repo), salt())
    }

    #[tokio::test]
    async fn test_create_user_requires_data() {
        let repo = MockUserRepository::new();

        let err = manager(repo)
            .create_user(UserChanges::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(msg) if msg == "User data is missing"));
    }

    #[tokio::test]
    async fn test_create_user_requires_email_and_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_persist().never();
        repo.expect_flush().never();

        let data = UserChanges {
            email: Some("a@b.com".to_string()),
            password: Some(String::new()),
            ..UserChanges::default()
        };
        let err = manager(repo).create_user(data).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(msg) if msg == "email & password are required"));
    }

    #[tokio::test]
    async fn test_create_user_defaults_role_and_hashes_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_persist()
            .withf(|user| {
                user.role == "anonymous" && user.password != "pw" && salt().verify("pw", &user.password)
            })
            .times(1)
            .returning(|user| Ok(User { id: 1, ..user }));
        repo.expect_flush().times(1).returning(|| Ok(()));

        let data = UserChanges {
            email: Some("a@b.com".to_string()),
            password: Some("pw".to_string()),
            ..UserChanges::default()
        };
        let user = manager(repo).create_user(data).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.role, "anonymous");
    }

    #[tokio::test]
    async fn test_save_unknown_id_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().with(eq(5)).returning(|_| Ok(None));
        repo.expect_merge().never();
        repo.expect_flush().never();

        let data = UserChanges {
            id: Some(5),
            name: Some("New".to_string()),
            ..UserChanges::default()
        };
        let err = manager(repo).save(data).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_save_merges_present_fields_only() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().with(eq(3)).returning(|id| Ok(Some(stored(id))));
        repo.expect_merge()
            .withf(|user| {
                user.id == 3
                    && user.name == "New"
                    && user.email == "stored@example.com"
                    && user.password == "stored-hash"
            })
            .times(1)
            .returning(Ok);
        repo.expect_flush().times(1).returning(|| Ok(()));

        let data = UserChanges {
            id: Some(3),
            name: Some("New".to_string()),
            ..UserChanges::default()
        };

        assert_eq!(manager(repo).save(data).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_persistence_errors_propagate_without_flush() {
        let mut repo = MockUserRepository::new();
        repo.expect_persist()
            .returning(|_| Err(AppError::internal("insert failed")));
        repo.expect_flush().never();

        let data = UserChanges {
            name: Some("Nobody".to_string()),
            ..UserChanges::default()
        };
        let err = manager(repo).save(data).await.unwrap_err();

        assert!(matches!(err, AppError::Internal(msg) if msg == "insert failed"));
    }

    #[tokio::test]
    async fn test_delete_missing_user_returns_false() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_remove().never();

        assert!(!manager(repo).delete_user(42).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_by_params_without_criteria_lists_all() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by().never();
        repo.expect_find_all()
            .times(1)
            .returning(|| Ok(vec![stored(1), stored(2)]));

        let mut params = Map::new();
        params.insert("unknown".to_string(), Value::from("x"));
        params.insert("role".to_string(), Value::from(""));

        let users = manager(repo).get_by_params(&params).await.unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn test_gateway_customer_id_defaults_to_zero() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(User { gateway_customer_id: Some(77), ..stored(id) })));
        repo.expect_find_by_id().with(eq(2)).returning(|id| Ok(Some(stored(id))));
        repo.expect_find_by_id().with(eq(3)).returning(|_| Ok(None));

        let manager = manager(repo);
        assert_eq!(manager.get_gateway_customer_id(1).await.unwrap(), 77);
        assert_eq!(manager.get_gateway_customer_id(2).await.unwrap(), 0);
        assert_eq!(manager.get_gateway_customer_id(3).await.unwrap(), 0);
    }
}
