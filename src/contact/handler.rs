//! HTTP surface of the contact endpoint
//!
//! Error taxonomy: unparseable or unsupported body encoding → 415;
//! missing/invalid field → 422 with guidance; missing credential → 500
//! with an operator-facing message; delivery failure → 500 with a generic
//! message and a direct fallback address, the cause logged but never
//! surfaced.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer, Responder,
    http::{StatusCode, header},
    middleware, web,
};

use super::format;
use super::mailer::{EmailSender, OutboundEmail, ResendMailer};
use super::{ContactConfig, ContactPayload};

const MISCONFIGURED_MESSAGE: &str =
    "Email service is not configured yet. Ask the site owner to set the RESEND_API_KEY environment variable.";

#[derive(Clone)]
pub struct AppState {
    pub mailer: Option<Arc<dyn EmailSender>>,
    pub from: String,
    pub recipients: Vec<String>,
    pub fallback_contact: String,
}

pub(crate) fn json_error(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({ "error": message.into() }))
}

/// Decode the body according to the declared content type.
/// Returns the user-facing reason on failure (always a 415).
pub(crate) fn parse_payload(content_type: &str, body: &[u8]) -> Result<ContactPayload, String> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "application/json" => {
            serde_json::from_slice(body).map_err(|_| "Invalid JSON payload.".to_string())
        }
        "application/x-www-form-urlencoded" => {
            serde_urlencoded::from_bytes(body).map_err(|_| "Invalid form payload.".to_string())
        }
        "" => Err("Missing content type.".to_string()),
        other => Err(format!("Unsupported content type: {other}.")),
    }
}

pub(crate) async fn submit(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> impl Responder {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let payload = match parse_payload(content_type, &body) {
        Ok(payload) => payload,
        Err(reason) => return json_error(StatusCode::UNSUPPORTED_MEDIA_TYPE, reason),
    };

    let request = match payload.validate() {
        Ok(request) => request,
        Err(reason) => return json_error(StatusCode::UNPROCESSABLE_ENTITY, reason),
    };

    let Some(mailer) = state.mailer.as_ref() else {
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, MISCONFIGURED_MESSAGE);
    };

    let email = OutboundEmail {
        from: state.from.clone(),
        to: state.recipients.clone(),
        reply_to: request.email.clone(),
        subject: format::subject(&request),
        html: format::format_html(&request),
        text: format::format_text(&request),
    };

    match mailer.send(&email).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Thanks for reaching out! Your message is on its way.",
        })),
        Err(err) => {
            tracing::error!("contact form send failed: {err}");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "We could not send your message right now. Please try again or email {} directly.",
                    state.fallback_contact
                ),
            )
        }
    }
}

pub(crate) async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "starshot-contact",
    }))
}

/// Build the mailer from the environment and run the server
pub async fn serve() -> std::io::Result<()> {
    let config = ContactConfig::from_env();

    let mailer: Option<Arc<dyn EmailSender>> = match &config.api_key {
        Some(key) => match ResendMailer::new(key.clone()) {
            Ok(mailer) => Some(Arc::new(mailer)),
            Err(err) => {
                tracing::error!("Failed to build email client: {err}");
                None
            }
        },
        None => {
            tracing::warn!("RESEND_API_KEY is not set; contact submissions will be rejected");
            None
        }
    };

    let state = web::Data::new(AppState {
        mailer,
        from: config.from.clone(),
        recipients: config.recipients.clone(),
        fallback_contact: config.fallback_contact.clone(),
    });

    tracing::info!(
        "starting contact api: bind_addr={} recipients={}",
        config.bind_addr,
        config.recipients.len()
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health))
            .route("/api/contact", web::post().to(submit))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
