//! AimHarder booking API.
//!
//! Login goes through the HTML form on the main site; everything else talks
//! to the JSON API under the box's own subdomain. The session cookie set by
//! login is what authorizes the later calls, so [`Client::login`] consumes
//! the client and hands back a [`Session`].

use std::sync::LazyLock;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use wod_core::{
    BOOK_STATE_ALREADY_BOOKED, BOOK_STATE_NO_CREDIT, BookingId, BookingOutcome, ClassId,
    ClassRecord,
};

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const LOGIN_URL: &str = "https://aimharder.com/login";
const ERROR_REGION_ID: &str = "loginErrors";
const TOO_MANY_ATTEMPTS_PHRASE: &str = "demasiadas veces";
const INCORRECT_CREDENTIALS_PHRASE: &str = "incorrecto";

/// Opening tag of the element carrying login errors.
static ERROR_REGION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)<([a-z][a-z0-9]*)[^>]*\sid\s*=\s*["']?{ERROR_REGION_ID}["']?[^>]*?(/?)>"#
    ))
    .unwrap()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Booking client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The box subdomain is unusable.
    #[error("invalid box name: {reason}")]
    InvalidBox { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Login was refused after too many failed attempts.
    #[error("too many wrong login attempts, try again later")]
    TooManyWrongAttempts,
    /// Login was refused because the credentials are wrong.
    #[error("incorrect email or password")]
    IncorrectCredentials,
    /// Login page reported an error we do not recognize.
    #[error("login rejected: {message}")]
    LoginRejected { message: String },
    /// The service answered with an unexpected HTTP status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Whether the error means the credentials themselves were refused.
    pub const fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::TooManyWrongAttempts | Self::IncorrectCredentials | Self::LoginRejected { .. }
        )
    }
}

/// Where the booking service lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    login_url: String,
    api_base: String,
}

impl Endpoints {
    /// Production endpoints for the box with the given subdomain.
    pub fn aimharder(box_name: &str) -> Result<Self, ClientError> {
        let box_name = box_name.trim();
        if box_name.is_empty() {
            return Err(ClientError::InvalidBox {
                reason: "box name cannot be empty",
            });
        }
        if !box_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ClientError::InvalidBox {
                reason: "box name must be a bare subdomain (letters, digits, '-')",
            });
        }
        Ok(Self {
            login_url: LOGIN_URL.to_string(),
            api_base: format!("https://{box_name}.aimharder.com/api"),
        })
    }

    /// Endpoints rooted elsewhere, e.g. a local test server.
    pub fn custom(login_url: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn bookings_url(&self) -> String {
        format!("{}/bookings", self.api_base)
    }

    fn book_url(&self) -> String {
        format!("{}/book", self.api_base)
    }

    fn cancel_url(&self) -> String {
        format!("{}/cancelBooking", self.api_base)
    }
}

/// Unauthenticated booking client for one box.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    endpoints: Endpoints,
    box_id: u64,
}

impl Client {
    /// Creates a client for the production service.
    pub fn new(box_name: &str, box_id: u64) -> Result<Self, ClientError> {
        Self::with_endpoints(Endpoints::aimharder(box_name)?, box_id)
    }

    /// Creates a client against explicit endpoints.
    pub fn with_endpoints(endpoints: Endpoints, box_id: u64) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .cookie_store(true)
            .build()
            .map_err(ClientError::ClientBuild)?;

        Ok(Self {
            http,
            endpoints,
            box_id,
        })
    }

    /// Submits the login form and returns an authenticated session.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::TooManyWrongAttempts`],
    /// [`ClientError::IncorrectCredentials`] or
    /// [`ClientError::LoginRejected`] when the login page shows an error.
    pub async fn login(self, email: &str, password: &str) -> Result<Session, ClientError> {
        let response = self
            .http
            .post(&self.endpoints.login_url)
            .form(&[("login", "Log in"), ("mail", email), ("pw", password)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(identity = email, status = status.as_u16(), "login request failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if let Err(err) = check_login_page(&body) {
            tracing::error!(identity = email, error = %err, "login rejected");
            return Err(err);
        }

        tracing::info!(identity = email, "logged in");
        Ok(Session {
            http: self.http,
            endpoints: self.endpoints,
            box_id: self.box_id,
            identity: email.to_string(),
        })
    }
}

/// Authenticated session for one identity.
///
/// Sessions are never shared between identities; create one per login.
#[derive(Debug)]
pub struct Session {
    http: reqwest::Client,
    endpoints: Endpoints,
    box_id: u64,
    identity: String,
}

/// Result of a cancellation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    UnknownFailure { status: u16, body: String },
}

impl Session {
    /// Email the session was opened with.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Lists the classes scheduled on `day`.
    ///
    /// An empty list means the box has no sessions that day.
    pub async fn list_classes(&self, day: NaiveDate) -> Result<Vec<ClassRecord>, ClientError> {
        let response = self
            .http
            .get(self.endpoints.bookings_url())
            .query(&[
                ("box", self.box_id.to_string()),
                ("day", day_param(day)),
                ("familyId", String::new()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(
                identity = %self.identity,
                %day,
                status = status.as_u16(),
                "class listing failed"
            );
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let classes = parse_bookings(&body)?;
        tracing::info!(
            identity = %self.identity,
            %day,
            count = classes.len(),
            "retrieved classes"
        );
        Ok(classes)
    }

    /// Requests a reservation for `class_id` on `day`.
    ///
    /// Business answers (no credit, already booked, unknown shapes) come back
    /// as a [`BookingOutcome`]; only transport failures are errors.
    pub async fn book(
        &self,
        day: NaiveDate,
        class_id: &ClassId,
    ) -> Result<BookingOutcome, ClientError> {
        let day_value = day_param(day);
        let response = self
            .http
            .post(self.endpoints.book_url())
            .form(&[
                ("id", class_id.as_str()),
                ("day", day_value.as_str()),
                ("insist", "0"),
                ("familyId", ""),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let outcome = interpret_booking_response(status, &body);
        match &outcome {
            BookingOutcome::Success => {
                tracing::info!(identity = %self.identity, %day, %class_id, "booking completed");
            }
            BookingOutcome::UnknownFailure { status, body } => {
                tracing::error!(
                    identity = %self.identity,
                    %day,
                    %class_id,
                    status,
                    body = %body,
                    "booking failed with unexpected response"
                );
            }
            other => {
                tracing::warn!(
                    identity = %self.identity,
                    %day,
                    %class_id,
                    outcome = other.as_str(),
                    "booking refused"
                );
            }
        }
        Ok(outcome)
    }

    /// Cancels an existing reservation.
    pub async fn cancel(&self, booking_id: &BookingId) -> Result<CancelOutcome, ClientError> {
        let response = self
            .http
            .post(self.endpoints.cancel_url())
            .form(&[("id", booking_id.as_str()), ("late", "0"), ("familyId", "")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let outcome = if status == StatusCode::OK && is_clean_object(&body) {
            CancelOutcome::Cancelled
        } else {
            CancelOutcome::UnknownFailure {
                status: status.as_u16(),
                body,
            }
        };
        tracing::info!(identity = %self.identity, %booking_id, ?outcome, "cancellation finished");
        Ok(outcome)
    }
}

/// Date format the API expects for `day` parameters.
fn day_param(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

/// Inspects the login page for the error region.
fn check_login_page(html: &str) -> Result<(), ClientError> {
    let Some(text) = login_error_text(html) else {
        return Ok(());
    };
    if text.contains(TOO_MANY_ATTEMPTS_PHRASE) {
        return Err(ClientError::TooManyWrongAttempts);
    }
    if text.contains(INCORRECT_CREDENTIALS_PHRASE) {
        return Err(ClientError::IncorrectCredentials);
    }
    if text.is_empty() {
        return Ok(());
    }
    Err(ClientError::LoginRejected { message: text })
}

/// Text content of the login error element, whitespace-collapsed.
fn login_error_text(html: &str) -> Option<String> {
    let caps = ERROR_REGION_RE.captures(html)?;
    let open_tag = caps.get(0)?;
    if caps.get(2).is_some_and(|slash| !slash.as_str().is_empty()) {
        return Some(String::new());
    }

    let rest = &html[open_tag.end()..];
    let closing = format!("</{}", caps[1].to_ascii_lowercase());
    let end = rest.to_ascii_lowercase().find(&closing).unwrap_or(rest.len());
    let inner = TAG_RE.replace_all(&rest[..end], " ");
    Some(inner.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Reads the `bookings` array. Entries that do not parse are skipped with a
/// warning; a missing array is an error.
fn parse_bookings(body: &str) -> Result<Vec<ClassRecord>, ClientError> {
    #[derive(Deserialize)]
    struct Payload {
        bookings: Vec<Value>,
    }

    let payload = serde_json::from_str::<Payload>(body)
        .map_err(|err| ClientError::InvalidResponse(err.to_string()))?;

    Ok(payload
        .bookings
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match ClassRecord::deserialize(&entry) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(index, error = %err, %entry, "skipping unreadable class entry");
                None
            }
        })
        .collect())
}

/// Maps a booking response to an outcome.
fn interpret_booking_response(status: StatusCode, body: &str) -> BookingOutcome {
    let unknown = || BookingOutcome::UnknownFailure {
        status: status.as_u16(),
        body: body.to_string(),
    };
    if status != StatusCode::OK {
        return unknown();
    }
    let Ok(Value::Object(payload)) = serde_json::from_str::<Value>(body) else {
        return unknown();
    };

    match payload.get("bookState").and_then(Value::as_i64) {
        Some(BOOK_STATE_NO_CREDIT) => BookingOutcome::NoCredit,
        Some(BOOK_STATE_ALREADY_BOOKED) => BookingOutcome::AlreadyBooked,
        _ if !has_error_fields(&payload) => BookingOutcome::Success,
        _ => unknown(),
    }
}

fn has_error_fields(payload: &serde_json::Map<String, Value>) -> bool {
    payload.contains_key("errorMssg") || payload.contains_key("errorMssgLang")
}

fn is_clean_object(body: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(body),
        Ok(Value::Object(payload)) if !has_error_fields(&payload)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_credit_sentinel() {
        assert_eq!(
            interpret_booking_response(StatusCode::OK, r#"{"bookState": -2}"#),
            BookingOutcome::NoCredit
        );
    }

    #[test]
    fn already_booked_sentinel() {
        assert_eq!(
            interpret_booking_response(
                StatusCode::OK,
                r#"{"bookState": -12, "errorMssg": "Ya tienes reserva"}"#
            ),
            BookingOutcome::AlreadyBooked
        );
    }

    #[test]
    fn empty_object_is_success() {
        assert_eq!(
            interpret_booking_response(StatusCode::OK, "{}"),
            BookingOutcome::Success
        );
        assert_eq!(
            interpret_booking_response(StatusCode::OK, r#"{"bookState": 1, "id": "55"}"#),
            BookingOutcome::Success
        );
    }

    #[test]
    fn error_fields_are_unknown_failure() {
        let body = r#"{"bookState": -8, "errorMssg": "Clase llena", "errorMssgLang": "FULL"}"#;
        assert_eq!(
            interpret_booking_response(StatusCode::OK, body),
            BookingOutcome::UnknownFailure {
                status: 200,
                body: body.to_string(),
            }
        );
    }

    #[test]
    fn non_ok_status_is_unknown_failure() {
        assert_eq!(
            interpret_booking_response(StatusCode::INTERNAL_SERVER_ERROR, "{}"),
            BookingOutcome::UnknownFailure {
                status: 500,
                body: "{}".to_string(),
            }
        );
        assert!(matches!(
            interpret_booking_response(StatusCode::CREATED, "{}"),
            BookingOutcome::UnknownFailure { status: 201, .. }
        ));
    }

    #[test]
    fn non_object_body_is_unknown_failure() {
        assert!(interpret_booking_response(StatusCode::OK, "<html>oops</html>").is_failure());
        assert!(interpret_booking_response(StatusCode::OK, "[]").is_failure());
    }

    #[test]
    fn login_page_without_error_region_is_accepted() {
        assert!(check_login_page("<html><body>Bienvenido</body></html>").is_ok());
    }

    #[test]
    fn login_page_with_empty_error_region_is_accepted() {
        let html = r#"<form><div id="loginErrors" class="err">  </div></form>"#;
        assert!(check_login_page(html).is_ok());
        assert!(check_login_page(r#"<p><span id="loginErrors"/></p>"#).is_ok());
    }

    #[test]
    fn too_many_attempts_is_recognized() {
        let html = r#"<div id="loginErrors"><p>Has fallado demasiadas veces. Espera unos minutos.</p></div>"#;
        assert!(matches!(
            check_login_page(html),
            Err(ClientError::TooManyWrongAttempts)
        ));
    }

    #[test]
    fn incorrect_credentials_is_recognized() {
        let html = r#"<div class="box" id='loginErrors'>Usuario o contraseña <b>incorrecto</b></div>"#;
        assert!(matches!(
            check_login_page(html),
            Err(ClientError::IncorrectCredentials)
        ));
    }

    #[test]
    fn unknown_login_error_keeps_message() {
        let html = r#"<div id="loginErrors">
            Cuenta   bloqueada
        </div><div>other</div>"#;
        match check_login_page(html) {
            Err(ClientError::LoginRejected { message }) => {
                assert_eq!(message, "Cuenta bloqueada");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn data_attributes_do_not_count_as_error_region() {
        let html = r#"<div data-id="loginErrors">incorrecto</div>"#;
        assert!(check_login_page(html).is_ok());
    }

    #[test]
    fn endpoints_reject_bad_box_names() {
        assert!(Endpoints::aimharder("").is_err());
        assert!(Endpoints::aimharder("evil.com/x").is_err());
        let endpoints = Endpoints::aimharder("crossfitbox").unwrap();
        assert_eq!(
            endpoints.book_url(),
            "https://crossfitbox.aimharder.com/api/book"
        );
        assert_eq!(
            endpoints.bookings_url(),
            "https://crossfitbox.aimharder.com/api/bookings"
        );
    }

    #[test]
    fn day_param_is_compact() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
        assert_eq!(day_param(day), "20261021");
    }

    #[test]
    fn malformed_class_entry_is_skipped() {
        let body = r#"{"bookings": [
            {"id": 501, "timeid": "1000_60", "className": "CrossFit", "ocupation": 10, "limit": 14},
            {"id": 502, "timeid": "1000_60", "className": "Hyrox", "bookState": "booked"},
            {"id": 503, "timeid": "1100_60"}
        ]}"#;

        let classes = parse_bookings(body).unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].id.as_str(), "501");
    }

    #[test]
    fn bookings_payload_requires_array() {
        assert!(parse_bookings(r#"{"bookings": []}"#).unwrap().is_empty());
        assert!(matches!(
            parse_bookings(r#"{"error": "session expired"}"#),
            Err(ClientError::InvalidResponse(_))
        ));
    }
}
