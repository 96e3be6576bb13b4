use rocket::serde::json::Json;
use rocket::State;

use crate::data::ack::{DeleteAck, InsertAck, UpdateAck};
use crate::data::cart::db::CartDbExt;
use crate::data::cart::{CartItemView, NewCartItem, ENROLLED, SELECTED};
use crate::data::filter;
use crate::data::Store;
use crate::resp::problem::Problem;

/// Put a class into a student's cart
#[utoipa::path(
    post,
    path = "/addSelectedClass",
    request_body = NewCartItem,
    responses(
        (status = 200, description = "Insert acknowledgement", body = InsertAck),
        (status = 400, description = "Invalid e-mail, price or enrollment flag", body = Problem),
        (status = 422, description = "Malformed body", body = Problem),
    )
)]
#[post("/addSelectedClass", data = "<item>")]
#[tracing::instrument(skip(store))]
pub async fn cart_add(
    item: Json<NewCartItem>,
    store: &State<Store>,
) -> Result<Json<InsertAck>, Problem> {
    item.validate()?;
    Ok(Json(store.add_cart_item(&item).await?))
}

/// Selected but unpaid classes
#[utoipa::path(
    get,
    path = "/mySelectedClasses/{email}",
    params(("email" = String, Path, description = "student e-mail")),
    responses(
        (status = 200, description = "Cart items with `isEnrolled = 0`", body = [CartItemView]),
    )
)]
#[get("/mySelectedClasses/<email>")]
#[tracing::instrument(skip(store))]
pub async fn cart_selected(
    email: &str,
    store: &State<Store>,
) -> Result<Json<Vec<CartItemView>>, Problem> {
    Ok(Json(store.list_cart_items(email, SELECTED).await?))
}

/// Enrolled classes
#[utoipa::path(
    get,
    path = "/myEnrolledClasses/{email}",
    params(("email" = String, Path, description = "student e-mail")),
    responses(
        (status = 200, description = "Cart items with `isEnrolled = 1`", body = [CartItemView]),
    )
)]
#[get("/myEnrolledClasses/<email>")]
#[tracing::instrument(skip(store))]
pub async fn cart_enrolled(
    email: &str,
    store: &State<Store>,
) -> Result<Json<Vec<CartItemView>>, Problem> {
    Ok(Json(store.list_cart_items(email, ENROLLED).await?))
}

/// Remove a cart item
#[utoipa::path(
    delete,
    path = "/deleteSelectedClasses/{id}",
    params(("id" = String, Path, description = "cart item id")),
    responses(
        (status = 200, description = "Delete acknowledgement", body = DeleteAck),
        (status = 400, description = "Malformed id", body = Problem),
    )
)]
#[delete("/deleteSelectedClasses/<id>")]
#[tracing::instrument(skip(store))]
pub async fn cart_delete(id: &str, store: &State<Store>) -> Result<Json<DeleteAck>, Problem> {
    let id = filter::parse_id(id)?;
    Ok(Json(store.delete_cart_item(id).await?))
}

/// Mark a cart item as enrolled
///
/// Only flips the flag. The matching payment is recorded by `POST /payments`.
#[utoipa::path(
    patch,
    path = "/classes/enrollment/{id}",
    params(("id" = String, Path, description = "cart item id")),
    responses(
        (status = 200, description = "Update acknowledgement", body = UpdateAck),
        (status = 400, description = "Malformed id", body = Problem),
    )
)]
#[patch("/classes/enrollment/<id>")]
#[tracing::instrument(skip(store))]
pub async fn cart_enroll(id: &str, store: &State<Store>) -> Result<Json<UpdateAck>, Problem> {
    let id = filter::parse_id(id)?;
    let ack = store.mark_enrolled(id).await?;
    if ack.matched_count == 0 {
        tracing::warn!("No cart item {} to enroll", id);
    }
    Ok(Json(ack))
}
