use rocket::serde::json::Json;
use rocket::{Build, Request, Rocket, Route};

pub mod auth;
pub mod cart;
pub mod classes;
pub mod payments;
pub mod users;

use auth::*;
use cart::*;
use classes::*;
use payments::*;
use users::*;

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::{
    data::{
        ack::{DeleteAck, InsertAck, UpdateAck},
        cart::{CartItemView, NewCartItem},
        class::{Class, ClassDetails, ClassStatus, FeedbackUpdate, InstructorClass, NewClass, StatusUpdate},
        payment::{NewPayment, PaymentHistoryEntry, PaymentIntentRequest, PaymentIntentResponse},
        user::{NewUser, User, UserRoleView},
    },
    middleware::auth::GuardProblem,
    resp::{
        jwt::{TokenRequest, TokenResponse},
        problem::{problems, Problem},
    },
    role::Role,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        index,
        token_issue,
        users_list,
        user_role,
        user_exists,
        user_add,
        user_delete,
        admin_check,
        admin_promote,
        instructor_check,
        instructors_list,
        instructor_promote,
        student_check,
        classes_all,
        classes_approved,
        class_get,
        class_feedback,
        class_status,
        class_delete,
        class_add,
        classes_by_instructor,
        seats_take,
        cart_add,
        cart_selected,
        cart_enrolled,
        cart_delete,
        cart_enroll,
        payment_intent_create,
        payment_record,
        payment_history
    ),
    components(schemas(
        Role,
        User,
        NewUser,
        UserRoleView,
        AddUserResponse,
        ExistsResponse,
        Class,
        ClassStatus,
        ClassDetails,
        InstructorClass,
        NewClass,
        FeedbackUpdate,
        StatusUpdate,
        NewCartItem,
        CartItemView,
        NewPayment,
        PaymentHistoryEntry,
        PaymentIntentRequest,
        PaymentIntentResponse,
        TokenRequest,
        TokenResponse,
        InsertAck,
        UpdateAck,
        DeleteAck,
        Problem
    )),
    modifiers(&JwtAuth)
)]
pub struct ApiDoc;

/// Registers the `jwt` bearer scheme referenced by guarded endpoints.
pub struct JwtAuth;

impl Modify for JwtAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Server is running", body = String),
    )
)]
#[get("/")]
pub fn index() -> &'static str {
    "Summer camp is running..."
}

#[get("/api-docs/openapi.json")]
fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn api() -> Vec<Route> {
    routes![
        index,
        openapi,
        token_issue,
        users_list,
        user_role,
        user_exists,
        user_add,
        user_delete,
        admin_check,
        admin_promote,
        instructor_check,
        instructors_list,
        instructor_promote,
        student_check,
        classes_all,
        classes_approved,
        class_get,
        class_feedback,
        class_status,
        class_delete,
        class_add,
        classes_by_instructor,
        seats_take,
        cart_add,
        cart_selected,
        cart_enrolled,
        cart_delete,
        cart_enroll,
        payment_intent_create,
        payment_record,
        payment_history
    ]
}

fn guard_problem(req: &Request<'_>) -> Option<Problem> {
    req.local_cache(GuardProblem::default).0.clone()
}

#[catch(400)]
fn bad_request(req: &Request<'_>) -> Problem {
    guard_problem(req).unwrap_or_else(problems::parse_problem)
}

#[catch(401)]
fn unauthorized(req: &Request<'_>) -> Problem {
    guard_problem(req).unwrap_or_else(|| problems::unauthorized("Missing or invalid token."))
}

#[catch(403)]
fn forbidden(req: &Request<'_>) -> Problem {
    guard_problem(req).unwrap_or_else(|| problems::forbidden("Access denied."))
}

#[catch(404)]
fn not_found(req: &Request<'_>) -> Problem {
    problems::not_found().instance_uri(req.uri().to_string()).to_owned()
}

#[catch(422)]
fn unprocessable(_: &Request<'_>) -> Problem {
    problems::body_shape_problem()
}

#[catch(500)]
fn internal(req: &Request<'_>) -> Problem {
    guard_problem(req).unwrap_or_else(problems::internal)
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/", api()).register(
        "/",
        catchers![
            bad_request,
            unauthorized,
            forbidden,
            not_found,
            unprocessable,
            internal
        ],
    )
}
