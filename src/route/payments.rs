use rocket::serde::json::Json;
use rocket::State;

use crate::data::ack::InsertAck;
use crate::data::payment::db::PaymentDbExt;
use crate::data::payment::{
    NewPayment, PaymentHistoryEntry, PaymentIntentRequest, PaymentIntentResponse,
};
use crate::data::Store;
use crate::gateway::{Gateway, DEFAULT_CURRENCY};
use crate::middleware::auth::Authenticated;
use crate::resp::problem::Problem;
use crate::util::to_minor_units;

/// Create a payment intent
///
/// `price` is in major currency units and is truncated to cents before it's sent
/// to the payment gateway.
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    request_body = PaymentIntentRequest,
    responses(
        (status = 200, description = "Client secret of the created intent", body = PaymentIntentResponse),
        (status = 400, description = "Price isn't positive", body = Problem),
        (status = 401, description = "Missing, invalid or expired token", body = Problem),
        (status = 500, description = "Payment gateway failed", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/create-payment-intent", data = "<request>")]
#[tracing::instrument(skip(gateway))]
pub async fn payment_intent_create(
    request: Json<PaymentIntentRequest>,
    auth: Authenticated,
    gateway: &State<Gateway>,
) -> Result<Json<PaymentIntentResponse>, Problem> {
    request.validate()?;

    let amount = to_minor_units(request.price);
    let intent = gateway
        .create_payment_intent(amount, DEFAULT_CURRENCY)
        .await?;
    tracing::info!("Payment intent {} created for {}", intent.id, auth.email());

    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Record a confirmed payment
///
/// The cart item isn't touched here: enrollment is flagged by a separate
/// `PATCH /classes/enrollment/{id}` call and nothing rolls either write back.
#[utoipa::path(
    post,
    path = "/payments",
    request_body = NewPayment,
    responses(
        (status = 200, description = "Insert acknowledgement", body = InsertAck),
        (status = 400, description = "Invalid e-mail, price or transaction id", body = Problem),
        (status = 401, description = "Missing, invalid or expired token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/payments", data = "<payment>")]
#[tracing::instrument(skip(store))]
pub async fn payment_record(
    payment: Json<NewPayment>,
    auth: Authenticated,
    store: &State<Store>,
) -> Result<Json<InsertAck>, Problem> {
    payment.validate()?;
    if payment.email != auth.email() {
        tracing::warn!(
            "{} recorded a payment on behalf of {}",
            auth.email(),
            payment.email
        );
    }

    Ok(Json(store.insert_payment(&payment).await?))
}

/// Payment history of a student
#[utoipa::path(
    get,
    path = "/paymenthistory/{email}",
    params(("email" = String, Path, description = "student e-mail")),
    responses(
        (status = 200, description = "Recorded payments", body = [PaymentHistoryEntry]),
    )
)]
#[get("/paymenthistory/<email>")]
#[tracing::instrument(skip(store))]
pub async fn payment_history(
    email: &str,
    store: &State<Store>,
) -> Result<Json<Vec<PaymentHistoryEntry>>, Problem> {
    Ok(Json(store.payment_history(email).await?))
}
