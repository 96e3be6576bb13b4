use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use crate::data::ack::{DeleteAck, InsertAck, UpdateAck};
use crate::data::class::db::ClassDbExt;
use crate::data::class::{
    Class, ClassDetails, FeedbackUpdate, InstructorClass, NewClass, StatusUpdate,
};
use crate::data::filter;
use crate::data::Store;
use crate::resp::problem::Problem;

/// List all classes
#[utoipa::path(
    get,
    path = "/allclasses",
    responses(
        (status = 200, description = "Every class regardless of status", body = [Class]),
    )
)]
#[get("/allclasses")]
#[tracing::instrument(skip(store))]
pub async fn classes_all(store: &State<Store>) -> Result<Json<Vec<Class>>, Problem> {
    Ok(Json(store.list_classes().await?))
}

/// List approved classes
#[utoipa::path(
    get,
    path = "/classes",
    responses(
        (status = 200, description = "Approved classes, most available seats first", body = [Class]),
    )
)]
#[get("/classes")]
#[tracing::instrument(skip(store))]
pub async fn classes_approved(store: &State<Store>) -> Result<Json<Vec<Class>>, Problem> {
    Ok(Json(store.list_approved_classes().await?))
}

/// Single class
#[utoipa::path(
    get,
    path = "/class/{id}",
    params(("id" = String, Path, description = "class id")),
    responses(
        (status = 200, description = "Class details, `null` if the class doesn't exist", body = ClassDetails),
        (status = 400, description = "Malformed id", body = Problem),
    )
)]
#[get("/class/<id>")]
#[tracing::instrument(skip(store))]
pub async fn class_get(
    id: &str,
    store: &State<Store>,
) -> Result<Json<Option<ClassDetails>>, Problem> {
    let id = filter::parse_id(id)?;
    Ok(Json(store.class_details(id).await?))
}

/// Set admin feedback on a class
#[utoipa::path(
    patch,
    path = "/class-feedback/{id}",
    params(("id" = String, Path, description = "class id")),
    request_body = FeedbackUpdate,
    responses(
        (status = 200, description = "Update acknowledgement", body = UpdateAck),
        (status = 400, description = "Malformed id", body = Problem),
    )
)]
#[patch("/class-feedback/<id>", data = "<update>")]
#[tracing::instrument(skip(store))]
pub async fn class_feedback(
    id: &str,
    update: Json<FeedbackUpdate>,
    store: &State<Store>,
) -> Result<Json<UpdateAck>, Problem> {
    let id = filter::parse_id(id)?;
    let update = update.into_inner();
    Ok(Json(store.set_class_feedback(id, update.feedback).await?))
}

/// Approve or deny a class
#[utoipa::path(
    patch,
    path = "/class-status/{id}",
    params(("id" = String, Path, description = "class id")),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Update acknowledgement", body = UpdateAck),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 422, description = "Unknown status", body = Problem),
    )
)]
#[patch("/class-status/<id>", data = "<update>")]
#[tracing::instrument(skip(store))]
pub async fn class_status(
    id: &str,
    update: Json<StatusUpdate>,
    store: &State<Store>,
) -> Result<Json<UpdateAck>, Problem> {
    let id = filter::parse_id(id)?;
    let ack = store.set_class_status(id, update.status).await?;
    if ack.matched_count > 0 {
        tracing::info!("Class {} is now {}", id, update.status.as_str());
    }
    Ok(Json(ack))
}

/// Delete a class
#[utoipa::path(
    delete,
    path = "/delClass/{id}",
    params(("id" = String, Path, description = "class id")),
    responses(
        (status = 200, description = "Delete acknowledgement", body = DeleteAck),
        (status = 400, description = "Malformed id", body = Problem),
    )
)]
#[delete("/delClass/<id>")]
#[tracing::instrument(skip(store))]
pub async fn class_delete(id: &str, store: &State<Store>) -> Result<Json<DeleteAck>, Problem> {
    let id = filter::parse_id(id)?;
    Ok(Json(store.delete_class(id).await?))
}

/// Submit a new class
///
/// New classes always start as `pending` until an admin changes their status.
#[utoipa::path(
    post,
    path = "/addClasses",
    request_body = NewClass,
    responses(
        (status = 200, description = "Insert acknowledgement", body = InsertAck),
        (status = 400, description = "Invalid price or seat count", body = Problem),
        (status = 422, description = "Malformed body", body = Problem),
    )
)]
#[post("/addClasses", data = "<class>")]
#[tracing::instrument(skip(store))]
pub async fn class_add(
    class: Json<NewClass>,
    store: &State<Store>,
) -> Result<Json<InsertAck>, Problem> {
    class.validate()?;
    let record = class.into_inner().into_record();
    let ack = store.insert_class(&record).await?;
    tracing::info!("Class {} submitted by {}", record.class_name, record.instructor_email);
    Ok(Json(ack))
}

/// Classes of an instructor
#[utoipa::path(
    get,
    path = "/myclasses/{email}",
    params(("email" = String, Path, description = "instructor e-mail")),
    responses(
        (status = 200, description = "Classes taught by the instructor", body = [InstructorClass]),
    )
)]
#[get("/myclasses/<email>")]
#[tracing::instrument(skip(store))]
pub async fn classes_by_instructor(
    email: &str,
    store: &State<Store>,
) -> Result<Json<Vec<InstructorClass>>, Problem> {
    Ok(Json(store.list_instructor_classes(email).await?))
}

/// Take one seat in a class
///
/// Seats are decremented without a lower bound.
#[utoipa::path(
    patch,
    path = "/updateAvailableSeats/{id}",
    params(("id" = String, Path, description = "class id")),
    responses(
        (status = 200, description = "Class updated successfully", body = String),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 404, description = "Class not found", body = String),
        (status = 500, description = "Failed to update class", body = String),
    )
)]
#[patch("/updateAvailableSeats/<id>")]
#[tracing::instrument(skip(store))]
pub async fn seats_take(
    id: &str,
    store: &State<Store>,
) -> Result<(Status, &'static str), Problem> {
    let id = filter::parse_id(id)?;

    match store.take_seat(id).await {
        Ok(ack) if ack.matched_count > 0 => Ok((Status::Ok, "Class updated successfully")),
        Ok(_) => Ok((Status::NotFound, "Class not found")),
        Err(e) => {
            tracing::error!("Unable to take a seat in class {}: {}", id, e);
            Ok((Status::InternalServerError, "Failed to update class"))
        }
    }
}
