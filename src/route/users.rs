use std::collections::HashMap;

use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::ack::{DeleteAck, InsertAck, UpdateAck};
use crate::data::filter;
use crate::data::user::db::{AddUserOutcome, UserDbExt};
use crate::data::user::{NewUser, User, UserRoleView};
use crate::data::Store;
use crate::middleware::auth::Authenticated;
use crate::resp::problem::Problem;
use crate::role::Role;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum AddUserResponse {
    Inserted(InsertAck),
    Exists { message: String },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExistsResponse {
    pub result: bool,
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All user documents", body = [User]),
    )
)]
#[get("/users")]
#[tracing::instrument(skip(store))]
pub async fn users_list(store: &State<Store>) -> Result<Json<Vec<User>>, Problem> {
    Ok(Json(store.list_users().await?))
}

/// Role of the user with given e-mail
#[utoipa::path(
    get,
    path = "/userRole/{email}",
    params(("email" = String, Path, description = "user e-mail")),
    responses(
        (status = 200, description = "Id and role of the user, `null` if the user doesn't exist", body = UserRoleView),
    )
)]
#[get("/userRole/<email>")]
#[tracing::instrument(skip(store))]
pub async fn user_role(
    email: &str,
    store: &State<Store>,
) -> Result<Json<Option<UserRoleView>>, Problem> {
    Ok(Json(store.user_role(email).await?))
}

/// Whether a user with given e-mail exists
#[utoipa::path(
    get,
    path = "/isUser/{email}",
    params(("email" = String, Path, description = "user e-mail")),
    responses(
        (status = 200, description = "Existence flag", body = ExistsResponse),
    )
)]
#[get("/isUser/<email>")]
#[tracing::instrument(skip(store))]
pub async fn user_exists(email: &str, store: &State<Store>) -> Result<Json<ExistsResponse>, Problem> {
    let result = store.user_exists(email).await?;
    Ok(Json(ExistsResponse { result }))
}

/// Register a user unless the e-mail is already known
#[utoipa::path(
    post,
    path = "/addUser",
    request_body = NewUser,
    responses(
        (status = 200, description = "Insert acknowledgement or `user already exists` message", body = AddUserResponse),
        (status = 400, description = "Invalid e-mail", body = Problem),
        (status = 422, description = "Malformed body", body = Problem),
    )
)]
#[post("/addUser", data = "<user>")]
#[tracing::instrument(skip(store))]
pub async fn user_add(
    user: Json<NewUser>,
    store: &State<Store>,
) -> Result<Json<AddUserResponse>, Problem> {
    user.validate()?;

    let response = match store.add_user(&user).await? {
        AddUserOutcome::Inserted(ack) => AddUserResponse::Inserted(ack),
        AddUserOutcome::AlreadyExists => AddUserResponse::Exists {
            message: "user already exists".to_string(),
        },
    };

    Ok(Json(response))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "user id")),
    responses(
        (status = 200, description = "Delete acknowledgement", body = DeleteAck),
        (status = 400, description = "Malformed id", body = Problem),
    )
)]
#[delete("/users/<id>")]
#[tracing::instrument(skip(store))]
pub async fn user_delete(id: &str, store: &State<Store>) -> Result<Json<DeleteAck>, Problem> {
    let id = filter::parse_id(id)?;
    Ok(Json(store.delete_user(id).await?))
}

/// Answers `{<role>: bool}`. A token issued for a different e-mail gets `false`
/// right away without a lookup.
async fn role_check(
    store: &Store,
    auth: &Authenticated,
    email: &str,
    role: Role,
) -> Result<Json<HashMap<&'static str, bool>>, Problem> {
    if auth.email() != email {
        tracing::debug!("token issued for {} can't check {}", auth.email(), email);
        return Ok(Json(HashMap::from([(role.as_str(), false)])));
    }

    let user = store.find_user_by_email(email).await?;
    let has_role = user.and_then(|it| it.role) == Some(role);

    Ok(Json(HashMap::from([(role.as_str(), has_role)])))
}

async fn promote(store: &Store, id: &str, role: Role) -> Result<Json<UpdateAck>, Problem> {
    let id = filter::parse_id(id)?;
    let ack = store.set_user_role(id, role).await?;
    if ack.matched_count > 0 {
        tracing::info!("User {} is now {}", id, role);
    }
    Ok(Json(ack))
}

/// Check whether the token holder is an admin
#[utoipa::path(
    get,
    path = "/users/admin/{email}",
    params(("email" = String, Path, description = "user e-mail")),
    responses(
        (status = 200, description = "`{admin: bool}`"),
        (status = 401, description = "Missing, invalid or expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/users/admin/<email>")]
#[tracing::instrument(skip(store))]
pub async fn admin_check(
    email: &str,
    auth: Authenticated,
    store: &State<Store>,
) -> Result<Json<HashMap<&'static str, bool>>, Problem> {
    role_check(store, &auth, email, Role::Admin).await
}

/// Make a user an admin
#[utoipa::path(
    patch,
    path = "/users/admin/{id}",
    params(("id" = String, Path, description = "user id")),
    responses(
        (status = 200, description = "Update acknowledgement", body = UpdateAck),
        (status = 400, description = "Malformed id", body = Problem),
    )
)]
#[patch("/users/admin/<id>")]
#[tracing::instrument(skip(store))]
pub async fn admin_promote(id: &str, store: &State<Store>) -> Result<Json<UpdateAck>, Problem> {
    promote(store, id, Role::Admin).await
}

/// Check whether the token holder is an instructor
#[utoipa::path(
    get,
    path = "/users/instructor/{email}",
    params(("email" = String, Path, description = "user e-mail")),
    responses(
        (status = 200, description = "`{instructor: bool}`"),
        (status = 401, description = "Missing, invalid or expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/users/instructor/<email>")]
#[tracing::instrument(skip(store))]
pub async fn instructor_check(
    email: &str,
    auth: Authenticated,
    store: &State<Store>,
) -> Result<Json<HashMap<&'static str, bool>>, Problem> {
    role_check(store, &auth, email, Role::Instructor).await
}

/// List all instructors
#[utoipa::path(
    get,
    path = "/instructors",
    responses(
        (status = 200, description = "Users with the instructor role", body = [User]),
    )
)]
#[get("/instructors")]
#[tracing::instrument(skip(store))]
pub async fn instructors_list(store: &State<Store>) -> Result<Json<Vec<User>>, Problem> {
    Ok(Json(store.list_users_with_role(Role::Instructor).await?))
}

/// Make a user an instructor
#[utoipa::path(
    patch,
    path = "/users/instructor/{id}",
    params(("id" = String, Path, description = "user id")),
    responses(
        (status = 200, description = "Update acknowledgement", body = UpdateAck),
        (status = 400, description = "Malformed id", body = Problem),
    )
)]
#[patch("/users/instructor/<id>")]
#[tracing::instrument(skip(store))]
pub async fn instructor_promote(
    id: &str,
    store: &State<Store>,
) -> Result<Json<UpdateAck>, Problem> {
    promote(store, id, Role::Instructor).await
}

/// Check whether the token holder is a student
#[utoipa::path(
    get,
    path = "/users/student/{email}",
    params(("email" = String, Path, description = "user e-mail")),
    responses(
        (status = 200, description = "`{student: bool}`"),
        (status = 401, description = "Missing, invalid or expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/users/student/<email>")]
#[tracing::instrument(skip(store))]
pub async fn student_check(
    email: &str,
    auth: Authenticated,
    store: &State<Store>,
) -> Result<Json<HashMap<&'static str, bool>>, Problem> {
    role_check(store, &auth, email, Role::Student).await
}

///////////////////////
//       TESTS
///////////////////////
