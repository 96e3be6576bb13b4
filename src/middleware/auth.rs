use std::marker::PhantomData;

use rocket::http::Status;
use rocket::outcome::{try_outcome, Outcome};
use rocket::request::{self, FromRequest, Request};

use crate::data::user::db::UserDbExt;
use crate::data::Store;
use crate::resp::jwt::SessionClaims;
use crate::resp::problem::{problems, Problem};
use crate::role::Role;
use crate::security::Security;

/// Problem produced by a failing request guard, picked up by the matching catcher.
#[derive(Debug, Clone, Default)]
pub struct GuardProblem(pub Option<Problem>);

fn fail<T>(req: &Request<'_>, problem: Problem) -> request::Outcome<T, Problem> {
    let status = problem.status;
    req.local_cache(|| GuardProblem(Some(problem.clone())));
    Outcome::Error((status, problem))
}

fn bearer_token<'r>(req: &'r Request<'_>) -> Result<&'r str, Problem> {
    let header = req
        .headers()
        .get_one("Authorization")
        .ok_or_else(|| problems::unauthorized("Missing Authorization header."))?;

    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|it| !it.is_empty())
        .ok_or_else(|| problems::unauthorized("Expected a bearer token."))
}

/// Identity of a request whose bearer token was verified. Only this guard can
/// produce one, so role checks can't run ahead of token verification.
#[derive(Debug, Clone)]
pub struct Authenticated {
    claims: SessionClaims,
}

impl Authenticated {
    pub fn email(&self) -> &str {
        &self.claims.email
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Authenticated {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let security = match req.rocket().state::<Security>() {
            Some(it) => it,
            None => return fail(req, problems::internal()),
        };

        tracing::trace!("extracting session token from Authorization header");
        let verified = bearer_token(req).and_then(|token| security.verify_token(token));

        match verified {
            Ok(claims) => {
                tracing::debug!("verified session token for: {}", claims.email);
                Outcome::Success(Authenticated { claims })
            }
            Err(problem) => {
                tracing::debug!("rejected session token: {:?}", problem.detail);
                fail(req, problem)
            }
        }
    }
}

/// Looks up the authenticated user's role. A missing user counts as a mismatch.
pub async fn authorize(store: &Store, auth: &Authenticated, role: Role) -> Result<(), Problem> {
    let user = store.find_user_by_email(auth.email()).await?;

    match user.and_then(|it| it.role) {
        Some(actual) if actual == role => Ok(()),
        _ => Err(problems::forbidden(format!(
            "User {} doesn't have the {} role.",
            auth.email(),
            role
        ))),
    }
}

pub trait RequiredRole: Send + Sync + 'static {
    const ROLE: Role;
}

pub struct Admin;
pub struct Instructor;
pub struct Student;

impl RequiredRole for Admin {
    const ROLE: Role = Role::Admin;
}

impl RequiredRole for Instructor {
    const ROLE: Role = Role::Instructor;
}

impl RequiredRole for Student {
    const ROLE: Role = Role::Student;
}

/// Request guard that verifies the token and then requires `R::ROLE`.
pub struct Authorized<R: RequiredRole> {
    pub identity: Authenticated,
    role: PhantomData<R>,
}

pub type AdminUser = Authorized<Admin>;
pub type InstructorUser = Authorized<Instructor>;
pub type StudentUser = Authorized<Student>;

#[rocket::async_trait]
impl<'r, R: RequiredRole> FromRequest<'r> for Authorized<R> {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let identity = try_outcome!(req.guard::<Authenticated>().await);

        let store = match req.rocket().state::<Store>() {
            Some(it) => it,
            None => return fail(req, problems::internal()),
        };

        match authorize(store, &identity, R::ROLE).await {
            Ok(()) => Outcome::Success(Authorized {
                identity,
                role: PhantomData,
            }),
            Err(problem) => {
                if problem.status == Status::Forbidden {
                    tracing::debug!("{} isn't {}", identity.email(), R::ROLE);
                }
                fail(req, problem)
            }
        }
    }
}
