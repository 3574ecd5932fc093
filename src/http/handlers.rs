use axum::{
    extract::{rejection::FormRejection, ConnectInfo, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use tracing::{debug, error, Instrument};

use super::forms::{encode_query_component, parse_leading_int, RegistrationForm};
use super::{pages, session, AppState};
use crate::auth::LoginError;
use crate::roster::RosterError;
use crate::telemetry::{create_registration_span, generate_correlation_id};

/// Failure modes a handler turns into a response
#[derive(Debug)]
pub enum HandlerError {
    Unauthorized,
    Internal(RosterError),
}

impl From<RosterError> for HandlerError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::Unauthorized => HandlerError::Unauthorized,
            other => HandlerError::Internal(other),
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            HandlerError::Internal(err) => {
                error!(error = %err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(pages::server_error())).into_response()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub success: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub pin: String,
}

fn token(state: &AppState, headers: &HeaderMap) -> Option<String> {
    session::read_token(headers, &state.cookie_name)
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, HandlerError> {
    let settings = state.roster.settings().await?;
    Ok(Html(pages::landing(
        &settings,
        query.success.as_deref().filter(|m| !m.is_empty()),
        query.error.as_deref().filter(|m| !m.is_empty()),
    )))
}

pub async fn register(
    State(state): State<AppState>,
    fields: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Response, HandlerError> {
    // An unreadable body registers as an empty form and fails validation
    let fields = fields.map(|Form(fields)| fields).unwrap_or_else(|rejection| {
        debug!(reason = %rejection, "Registration body is not a form");
        HashMap::new()
    });
    let form = RegistrationForm::from_fields(&fields);
    let correlation_id = generate_correlation_id();

    let result = state
        .roster
        .register(&form.name, &form.phone)
        .instrument(create_registration_span(&correlation_id))
        .await;

    match result {
        Ok(registrant) => Ok(Redirect::to(&format!("/registered/{}", registrant.id)).into_response()),
        Err(e) if e.is_user_facing() => {
            Ok(Redirect::to(&format!("/?error={}", encode_query_component(&e.to_string()))).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn registered(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, HandlerError> {
    match state.roster.find_registrant(&id).await? {
        Some(registrant) => Ok(Html(pages::confirmation(&registrant)).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Html(pages::not_found())).into_response()),
    }
}

pub async fn admin_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, HandlerError> {
    let token = token(&state, &headers);
    match state.admin.overview(token.as_deref()).await {
        Ok(overview) => Ok(Html(pages::admin_dashboard(
            &overview.settings,
            &overview.registrants,
        ))),
        Err(RosterError::Unauthorized) => Ok(Html(pages::admin_login(None))),
        Err(e) => Err(e.into()),
    }
}

pub async fn admin_login(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let client = peer.map(|ConnectInfo(addr)| addr.ip());
    match state.guard.login(client, &form.pin).await {
        Ok(token) => (
            [(header::SET_COOKIE, session::trust_cookie(&state.cookie_name, &token))],
            Redirect::to("/admin"),
        )
            .into_response(),
        Err(e @ LoginError::InvalidPin) => {
            (StatusCode::UNAUTHORIZED, Html(pages::admin_login(Some(&e.to_string())))).into_response()
        }
        Err(e @ LoginError::Throttled) => {
            (StatusCode::TOO_MANY_REQUESTS, Html(pages::admin_login(Some(&e.to_string())))).into_response()
        }
    }
}

pub async fn admin_toggle(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Redirect, HandlerError> {
    let token = token(&state, &headers);
    state.admin.toggle_registrations(token.as_deref()).await?;
    Ok(Redirect::to("/admin"))
}

pub async fn admin_set_game(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Redirect, HandlerError> {
    let token = token(&state, &headers);
    let game = fields
        .get("game")
        .and_then(|raw| parse_leading_int(raw))
        .unwrap_or(0);
    state.admin.set_active_game(token.as_deref(), game).await?;
    Ok(Redirect::to("/admin"))
}

pub async fn admin_export(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, HandlerError> {
    let token = token(&state, &headers);
    let csv = state.admin.export_csv(token.as_deref()).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"students.csv\""),
        ],
        csv,
    )
        .into_response())
}

pub async fn admin_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = token(&state, &headers);
    if let Err(e) = state.admin.logout(token.as_deref()).await {
        debug!(reason = %e, "Logout without a live session");
    }
    (
        [(header::SET_COOKIE, session::cleared_cookie(&state.cookie_name))],
        Redirect::to("/admin"),
    )
        .into_response()
}
