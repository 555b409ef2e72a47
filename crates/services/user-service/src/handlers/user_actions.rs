//! Handlers for the user actions: register, read, getusers, getuser, update and cancel.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use common::{AppError, AppResult};
use domain::{UserChanges, UserView};

use crate::dispatch::{to_payload, ActionContext, ActionHandler};

fn changes_from_body(ctx: &ActionContext<'_>) -> AppResult<UserChanges> {
    Ok(UserChanges::from_value(ctx.body.unwrap_or(&Value::Null))?)
}

fn require(value: &Option<String>, message: &str) -> AppResult<()> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(AppError::validation(message)),
    }
}

fn views<I, T>(users: I) -> AppResult<Value>
where
    I: IntoIterator<Item = T>,
    T: Into<UserView>,
{
    let views: Vec<UserView> = users.into_iter().map(Into::into).collect();
    to_payload(&views)
}

fn user_not_found() -> AppError {
    AppError::validation("User not found.")
}

/// `POST register`: create an account from the request body.
pub struct Register;

#[async_trait]
impl ActionHandler for Register {
    fn method(&self) -> &'static str {
        "register"
    }

    fn payload_key(&self) -> &'static str {
        "user"
    }

    async fn run(&self, ctx: &ActionContext<'_>) -> AppResult<Value> {
        let mut data = changes_from_body(ctx)?;
        data.id = None;

        require(&data.email, "Email is required.")?;
        require(&data.password, "Password is required.")?;
        require(&data.role, "Role is required.")?;
        require(&data.name, "Name is required.")?;

        let user = ctx.users.create_user(data).await?;
        to_payload(&UserView::from(user))
    }
}

/// `GET read[/<id>]`: one user by id, or users matching the request parameters.
pub struct Read;

impl Read {
    /// Parameters from a non-empty JSON body object, else from the query string.
    fn params(ctx: &ActionContext<'_>) -> Map<String, Value> {
        match ctx.body {
            Some(Value::Object(map)) if !map.is_empty() => map.clone(),
            _ => ctx
                .query
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect(),
        }
    }
}

#[async_trait]
impl ActionHandler for Read {
    fn method(&self) -> &'static str {
        "read"
    }

    fn payload_key(&self) -> &'static str {
        "body"
    }

    async fn run(&self, ctx: &ActionContext<'_>) -> AppResult<Value> {
        if ctx.id >= 1 {
            return match ctx.users.get_by_id(ctx.id).await? {
                Some(user) => to_payload(&UserView::from(user)),
                None => Ok(Value::Null),
            };
        }

        let users = ctx.users.get_by_params(&Self::params(ctx)).await?;
        views(users)
    }
}

/// `GET getusers`: every user.
pub struct GetUsers;

#[async_trait]
impl ActionHandler for GetUsers {
    fn method(&self) -> &'static str {
        "getusers"
    }

    fn payload_key(&self) -> &'static str {
        "users"
    }

    async fn run(&self, ctx: &ActionContext<'_>) -> AppResult<Value> {
        views(ctx.users.get_users().await?)
    }
}

/// `GET getuser/<id>` or `GET getuser?id=<id>`.
pub struct GetUser;

#[async_trait]
impl ActionHandler for GetUser {
    fn method(&self) -> &'static str {
        "getuser"
    }

    fn payload_key(&self) -> &'static str {
        "user"
    }

    async fn run(&self, ctx: &ActionContext<'_>) -> AppResult<Value> {
        let id = ctx.path_or_query_id();
        if id <= 0 {
            return Err(AppError::validation("ID is required."));
        }

        let user = ctx.users.get_by_id(id).await?.ok_or_else(user_not_found)?;
        to_payload(&UserView::from(user))
    }
}

/// `POST update[/<id>]`: merge the body into an existing user.
pub struct Update;

#[async_trait]
impl ActionHandler for Update {
    fn method(&self) -> &'static str {
        "update"
    }

    fn payload_key(&self) -> &'static str {
        "user"
    }

    async fn run(&self, ctx: &ActionContext<'_>) -> AppResult<Value> {
        let mut data = changes_from_body(ctx)?;
        let id = data
            .target_id()
            .or((ctx.id > 0).then_some(ctx.id))
            .ok_or_else(|| AppError::validation("Id is required."))?;

        if ctx.users.get_by_id(id).await?.is_none() {
            return Err(user_not_found());
        }

        data.id = Some(id);
        let saved = ctx.users.save(data).await?;

        let user = ctx.users.get_by_id(saved).await?.ok_or_else(user_not_found)?;
        to_payload(&UserView::from(user))
    }
}

/// `GET cancel/<id>` or `GET cancel?id=<id>`: delete a user.
pub struct Cancel;

#[async_trait]
impl ActionHandler for Cancel {
    fn method(&self) -> &'static str {
        "cancel"
    }

    fn payload_key(&self) -> &'static str {
        "user"
    }

    async fn run(&self, ctx: &ActionContext<'_>) -> AppResult<Value> {
        let id = ctx.path_or_query_id();
        if id <= 0 {
            return Err(AppError::validation("Id is required."));
        }

        if !ctx.users.delete_user(id).await? {
            return Err(AppError::validation("User could not be deleted."));
        }

        Ok(json!({ "id": id }))
    }
}
