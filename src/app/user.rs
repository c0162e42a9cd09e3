//! User accounts: registration, login and lookup.
//!
//! Users are stored under `user:<email>` in the [`KeyValueStore`](crate::storage::KeyValueStore),
//! so an email address can only be registered once. Passwords are stored as digests
//! derived with the configured salt; the digest never leaves the store.

use super::failure;
use crate::codec::{boolean, field, intersection, number, optional, required, string, CodecExt, ObjectCodec};
use crate::context::{HasEnv, HasPasswordHasher, HasRequest, HasStore, HasTokens};
use crate::ids::UserId;
use crate::pipeline::{Cause, Defect};
use crate::request::{discriminate, get_path_params};
use crate::response::{data_response, ApiResponse};
use crate::storage;
use http::StatusCode;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Header carrying the pre-shared key that registers an admin
pub const PSK_HEADER: &str = "X-EffEng-PSK";

/// Store key of the user registered with `email`
pub fn user_key(email: &str) -> String {
    format!("user:{email}")
}

/// Registration payload
#[derive(Debug, Clone, PartialEq)]
pub struct CreateUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub phone: Option<f64>,
}

impl CreateUser {
    pub fn codec() -> impl ObjectCodec<Value = Self> {
        intersection(
            required((
                field("name", string()),
                field("surname", string()),
                field("email", string()),
                field("password", string()),
            )),
            optional((field("phone", number()),)),
        )
        .map(
            |((name, surname, email, password), (phone,))| Self {
                name,
                surname,
                email,
                password,
                phone,
            },
            |u| {
                (
                    (u.name.clone(), u.surname.clone(), u.email.clone(), u.password.clone()),
                    (u.phone,),
                )
            },
        )
    }
}

/// A stored user record. `password` holds the digest.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
    pub phone: Option<f64>,
}

impl User {
    pub fn codec() -> impl ObjectCodec<Value = Self> {
        intersection(
            required((
                field("id", string()),
                field("name", string()),
                field("surname", string()),
                field("email", string()),
                field("password", string()),
                field("isAdmin", boolean()),
            )),
            optional((field("phone", number()),)),
        )
        .map(
            |((id, name, surname, email, password, is_admin), (phone,))| Self {
                id,
                name,
                surname,
                email,
                password,
                is_admin,
                phone,
            },
            |u| {
                (
                    (
                        u.id.clone(),
                        u.name.clone(),
                        u.surname.clone(),
                        u.email.clone(),
                        u.password.clone(),
                        u.is_admin,
                    ),
                    (u.phone,),
                )
            },
        )
    }

    /// The record without its password digest
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            surname: self.surname.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
            phone: self.phone,
        }
    }
}

/// Registration response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonUser {
    pub id: String,
    pub name: String,
    pub is_admin: Option<bool>,
}

impl CommonUser {
    pub fn codec() -> impl ObjectCodec<Value = Self> {
        intersection(
            required((field("id", string()), field("name", string()))),
            optional((field("isAdmin", boolean()),)),
        )
        .map(
            |((id, name), (is_admin,))| Self { id, name, is_admin },
            |u| ((u.id.clone(), u.name.clone()), (u.is_admin,)),
        )
    }
}

/// What `GET /v1/user/:email` reveals about a user
#[derive(Debug, Clone, PartialEq)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub is_admin: bool,
    pub phone: Option<f64>,
}

impl PublicUser {
    pub fn codec() -> impl ObjectCodec<Value = Self> {
        intersection(
            required((
                field("id", string()),
                field("name", string()),
                field("surname", string()),
                field("email", string()),
                field("isAdmin", boolean()),
            )),
            optional((field("phone", number()),)),
        )
        .map(
            |((id, name, surname, email, is_admin), (phone,))| Self {
                id,
                name,
                surname,
                email,
                is_admin,
                phone,
            },
            |u| {
                (
                    (u.id.clone(), u.name.clone(), u.surname.clone(), u.email.clone(), u.is_admin),
                    (u.phone,),
                )
            },
        )
    }
}

/// Login credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
    pub password: String,
}

impl AuthUser {
    pub fn codec() -> impl ObjectCodec<Value = Self> {
        required((field("email", string()), field("password", string()))).map(
            |(email, password)| Self { email, password },
            |a| (a.email.clone(), a.password.clone()),
        )
    }
}

/// Login response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtToken {
    pub token: String,
}

impl JwtToken {
    pub fn codec() -> impl ObjectCodec<Value = Self> {
        required((field("token", string()),)).map(|(token,)| Self { token }, |t| (t.token.clone(),))
    }
}

/// Expected failures of the user routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    /// Request body or path did not decode
    Invalid(String),
    UserNotFound,
    /// The email is already registered
    UnableToCreateUser(String),
    NotAuthorized,
}

impl UserError {
    pub fn status(&self) -> StatusCode {
        match self {
            UserError::Invalid(_) | UserError::UnableToCreateUser(_) => StatusCode::BAD_REQUEST,
            UserError::UserNotFound => StatusCode::NOT_FOUND,
            UserError::NotAuthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn into_response(self) -> ApiResponse {
        failure(self.status(), &self.to_string())
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserError::Invalid(m) | UserError::UnableToCreateUser(m) => f.write_str(m),
            UserError::UserNotFound => f.write_str("User not found"),
            UserError::NotAuthorized => f.write_str("You are not authorized"),
        }
    }
}

impl std::error::Error for UserError {}

// Typed failures become their response; defects continue to the sandbox.
fn respond(result: Result<ApiResponse, Cause<UserError>>) -> Result<ApiResponse, Defect> {
    match result {
        Ok(response) => Ok(response),
        Err(Cause::Fail(e)) => {
            debug!(error = %e, status = e.status().as_u16(), "User request refused");
            Ok(e.into_response())
        }
        Err(Cause::Die(defect)) => Err(defect),
    }
}

async fn find_user<C: HasStore>(ctx: &C, email: &str) -> Result<User, Cause<UserError>> {
    storage::load(ctx.store(), &User::codec(), &user_key(email))
        .await
        .map_err(Defect::new)?
        .ok_or(Cause::Fail(UserError::UserNotFound))
}

async fn register<C>(ctx: &C) -> Result<CommonUser, Cause<UserError>>
where
    C: HasRequest + HasEnv + HasPasswordHasher + HasStore,
{
    let request = ctx.request();
    let input = discriminate(&CreateUser::codec(), request)
        .map_err(|e| Cause::Fail(UserError::Invalid(e.to_string())))?;

    let env = ctx.env();
    let is_admin = !env.auth_header_key.is_empty()
        && request.header(PSK_HEADER) == Some(env.auth_header_key.as_str());

    let user = User {
        id: UserId::new().to_string(),
        password: ctx.password_hasher().hash(&env.password_salt, &input.password),
        name: input.name,
        surname: input.surname,
        email: input.email,
        is_admin,
        phone: input.phone,
    };

    let stored = storage::store(ctx.store(), &User::codec(), &user_key(&user.email), &user)
        .await
        .map_err(Defect::new)?;
    if !stored {
        return Err(Cause::Fail(UserError::UnableToCreateUser(
            "User already exists".to_owned(),
        )));
    }

    info!(user_id = %user.id, is_admin, "User created");
    Ok(CommonUser {
        id: user.id,
        name: user.name,
        is_admin: Some(user.is_admin),
    })
}

async fn login<C>(ctx: &C) -> Result<JwtToken, Cause<UserError>>
where
    C: HasRequest + HasEnv + HasPasswordHasher + HasStore + HasTokens,
{
    let credentials = discriminate(&AuthUser::codec(), ctx.request())
        .map_err(|e| Cause::Fail(UserError::Invalid(e.to_string())))?;
    let user = find_user(ctx, &credentials.email).await?;

    let matches = ctx.password_hasher().verify(
        &ctx.env().password_salt,
        &credentials.password,
        &user.password,
    );
    if !matches {
        warn!(user_id = %user.id, "Password mismatch");
        return Err(Cause::Fail(UserError::NotAuthorized));
    }

    let token = ctx
        .tokens()
        .issue(&user.email, user.is_admin)
        .map_err(Defect::new)?;
    info!(user_id = %user.id, "Token issued");
    Ok(JwtToken { token })
}

async fn lookup<C: HasRequest + HasStore>(ctx: &C) -> Result<PublicUser, Cause<UserError>> {
    let email = get_path_params(ctx.request().url(), "email", true)
        .map_err(|e| Cause::Fail(UserError::Invalid(e.to_string())))?;
    Ok(find_user(ctx, &email).await?.public())
}

/// `POST /v1/user`
///
/// Registers a user. The user is an admin when the request carries `X-EffEng-PSK`
/// equal to the configured `auth_header_key`.
pub async fn create_user<C>(ctx: Arc<C>) -> Result<ApiResponse, Defect>
where
    C: HasRequest + HasEnv + HasPasswordHasher + HasStore,
{
    let result = register(ctx.as_ref()).await;
    respond(result.map(|user| data_response(&CommonUser::codec(), user)))
}

/// `POST /v1/login`
pub async fn login_user<C>(ctx: Arc<C>) -> Result<ApiResponse, Defect>
where
    C: HasRequest + HasEnv + HasPasswordHasher + HasStore + HasTokens,
{
    let result = login(ctx.as_ref()).await;
    respond(result.map(|token| data_response(&JwtToken::codec(), token)))
}

/// `GET /v1/user/:email`
pub async fn get_user<C: HasRequest + HasStore>(ctx: Arc<C>) -> Result<ApiResponse, Defect> {
    let result = lookup(ctx.as_ref()).await;
    respond(result.map(|user| data_response(&PublicUser::codec(), user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Codec;
    use serde_json::json;

    #[test]
    fn test_create_user_phone_is_optional() {
        let codec = CreateUser::codec();
        let wire = json!({"name": "Ada", "surname": "Lovelace", "email": "ada@x.io", "password": "pw"});
        let user = codec.decode(&wire).unwrap();
        assert_eq!(user.phone, None);
        assert_eq!(codec.encode(&user), wire);

        let err = codec
            .decode(&json!({"name": "Ada", "surname": "L", "email": "e", "password": "p", "phone": "123"}))
            .unwrap_err();
        assert_eq!(err.message(), "Error decoding field phone: Expected number but got -> string");
    }

    #[test]
    fn test_public_user_omits_password() {
        let user = User {
            id: "01J".into(),
            name: "Ada".into(),
            surname: "Lovelace".into(),
            email: "ada@x.io".into(),
            password: "digest".into(),
            is_admin: true,
            phone: Some(5.0),
        };
        let wire = PublicUser::codec().encode(&user.public());
        assert_eq!(
            wire,
            json!({"id": "01J", "name": "Ada", "surname": "Lovelace", "email": "ada@x.io", "isAdmin": true, "phone": 5.0})
        );
    }

    #[test]
    fn test_common_user_encodes_admin_flag() {
        let codec = CommonUser::codec();
        let wire = codec.encode(&CommonUser {
            id: "1".into(),
            name: "Ada".into(),
            is_admin: None,
        });
        assert_eq!(wire, json!({"id": "1", "name": "Ada"}));
    }

    #[test]
    fn test_user_error_statuses() {
        assert_eq!(UserError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(UserError::NotAuthorized.to_string(), "You are not authorized");
        assert_eq!(
            UserError::UnableToCreateUser("User already exists".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
