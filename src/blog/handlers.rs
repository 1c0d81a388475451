// URL handlers

use crate::blog::store::repository;
use crate::blog::User;
use quire_core::{ApiError, Error, HttpRequest, Reply};
use quire_macro::{get, post};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;
use tracing::info;

const PAGE_SIZE: usize = 10;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9.\-_]+@[a-z0-9\-_]+(\.[a-z0-9\-_]+){1,4}$")
        .expect("email pattern compiles")
});

fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[get("/")]
pub async fn index(request: HttpRequest) -> Result<Reply, Error> {
    let users = repository().find_all().await?;
    info!(path = %request.path, users = users.len(), "render index");
    Ok(Reply::template("test.html", json!({ "users": users })))
}

#[get("/api/users")]
pub async fn api_get_users(#[named] page: Option<usize>) -> Result<Value, Error> {
    let users = repository().find_all().await?;
    let total = users.len();
    let index = page.unwrap_or(1).max(1);
    let items: Vec<User> = users
        .into_iter()
        .skip(index.saturating_sub(1).saturating_mul(PAGE_SIZE))
        .take(PAGE_SIZE)
        .collect();

    Ok(json!({
        "page": {"index": index, "size": PAGE_SIZE, "total": total},
        "users": items,
    }))
}

#[get("/api/users/{id}")]
pub async fn api_get_user(id: String) -> Result<Value, Error> {
    match repository().find(&id).await? {
        Some(user) => Ok(serde_json::to_value(user)?),
        None => Err(
            ApiError::resource_not_found("user", format!("no user with id {}", id)).into(),
        ),
    }
}

#[post("/api/users")]
pub async fn api_register_user(
    #[named] name: String,
    #[named] email: String,
    #[named] image: Option<String>,
) -> Result<Value, Error> {
    let name = name.trim().to_string();
    let email = email.trim().to_lowercase();

    if name.is_empty() {
        return Err(ApiError::value_error("name", "name cannot be empty").into());
    }
    if !is_valid_email(&email) {
        return Err(ApiError::value_error("email", "invalid email address").into());
    }

    let store = repository();
    if store.find_by_email(&email).await?.is_some() {
        return Err(
            ApiError::new("register:failed", json!("email"), "Email is already in use.").into(),
        );
    }

    let mut user = User::new(name, email);
    if let Some(image) = image.filter(|i| !i.trim().is_empty()) {
        user = user.with_image(image);
    }
    let user = store.save(user).await?;
    info!(id = %user.id, "user registered");

    Ok(serde_json::to_value(user)?)
}
