//! Shipment wizard handlers.
//!
//! `GET` renders the current step. `POST` applies the posted fields plus one
//! action (`next`, `back`, `reset`, `preset`, `refresh`) and renders again;
//! `next` on the last step submits the shipment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use shipdesk_api::{ApiError, ClientAddress, ParcelSize, ShippingCompany};
use shipdesk_core::{FieldErrors, Money, PaymentMethod};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireUser;
use crate::models::CurrentUser;
use crate::routes::{Layout, inline};
use crate::state::AppState;
use crate::wizard::{self, Step, Transition, WizardAction, WizardState};

/// Modal text after the backend accepts a shipment.
pub const SUCCESS_MESSAGE: &str = "تمت إضافة الشحنة بنجاح";

/// Modal text when the backend rejects a shipment without saying why.
pub const FAILURE_FALLBACK: &str = "حدث خطأ أثناء إضافة الشحنة";

const PARCEL_SIZES_ERROR: &str = "تعذر تحميل أحجام الطرود";

const REFRESH: HeaderName = HeaderName::from_static("refresh");

/// Result shown in the wizard's modal.
#[derive(Debug, Clone)]
pub struct Modal {
    pub success: bool,
    pub message: String,
}

/// A service level of the selected carrier, priced for the chosen payment.
#[derive(Debug, Clone)]
pub struct ServiceOption {
    pub name: String,
    pub price: Money,
    pub delivery_days: Option<String>,
    pub selected: bool,
}

/// Wizard page template.
#[derive(Template, WebTemplate)]
#[template(path = "wizard/show.html")]
pub struct WizardTemplate {
    pub layout: Layout,
    pub wizard: WizardState,
    pub errors: FieldErrors,
    pub addresses: Vec<ClientAddress>,
    pub parcel_sizes: Vec<ParcelSize>,
    pub companies: Vec<ShippingCompany>,
    pub services: Vec<ServiceOption>,
    pub payment_methods: &'static [PaymentMethod],
    pub estimate: Option<Money>,
    pub lookup_error: Option<String>,
    pub modal: Option<Modal>,
    pub redirect_delay_secs: String,
}

impl WizardTemplate {
    /// Whether the step is already done (for the progress bar).
    pub fn is_done(&self, step: &Step) -> bool {
        step.number() < self.wizard.step.number()
    }
}

/// Show the wizard at its current step.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<Response, AppError> {
    let wizard = wizard::load(&session).await?;
    wizard::save(&session, &wizard).await?;

    let page = render(&state, &session, &user, wizard, FieldErrors::new(), None).await?;
    Ok(page.into_response())
}

/// Apply one wizard action.
#[instrument(skip_all, fields(action = tracing::field::Empty))]
pub async fn act(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let mut current = wizard::load(&session).await?;

    let mut action = String::from("next");
    let mut fields = Vec::with_capacity(pairs.len());
    for (name, value) in pairs {
        if name == "action" {
            action = value;
        } else {
            fields.push((name, value));
        }
    }
    tracing::Span::current().record("action", action.as_str());

    let mut errors = FieldErrors::new();
    let mut preset_error = None;
    // Updates never fail; they only copy whitelisted fields.
    let _ = current.apply(WizardAction::Update(fields));

    match action.as_str() {
        "back" => {
            let _ = current.apply(WizardAction::Back);
        }
        "reset" => {
            let _ = current.apply(WizardAction::Reset);
        }
        "refresh" => {}
        "preset" => {
            match inline(state.backend().parcel_sizes(&user.token).await, PARCEL_SIZES_ERROR)? {
                Ok(sizes) => {
                    if let Some(size) = sizes
                        .iter()
                        .find(|s| s.id.as_str() == current.draft.parcel_size_id)
                    {
                        current.draft.apply_parcel_size(size);
                    }
                }
                Err(message) => preset_error = Some(message),
            }
        }
        _ => match current.apply(WizardAction::Next) {
            Ok(Transition::ReadyToSubmit) => {
                return submit(&state, &session, &user, current).await;
            }
            Ok(_) => {}
            Err(field_errors) => errors = field_errors,
        },
    }

    wizard::save(&session, &current).await?;

    let status = if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let mut page = render(&state, &session, &user, current, errors, None).await?;
    if page.lookup_error.is_none() {
        page.lookup_error = preset_error;
    }
    Ok((status, page).into_response())
}

async fn submit(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    mut current: WizardState,
) -> Result<Response, AppError> {
    let request = match wizard::build_request(&current.draft) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Wizard draft could not be sent: {e}");
            return failed(state, session, user, current, FAILURE_FALLBACK.to_string()).await;
        }
    };

    match state.backend().create_shipment(&user.token, &request).await {
        Ok(_) => {
            tracing::info!(user_id = %user.id, "Shipment created");
            wizard::clear(session).await?;
            let _ = current.apply(WizardAction::Complete);

            let delay = state.config().redirect_delay_secs();
            let modal = Modal {
                success: true,
                message: SUCCESS_MESSAGE.to_string(),
            };
            let page = render(state, session, user, current, FieldErrors::new(), Some(modal)).await?;

            let mut response = page.into_response();
            if let Ok(value) = HeaderValue::from_str(&format!("{delay}; url=/shipments")) {
                response.headers_mut().insert(REFRESH, value);
            }
            Ok(response)
        }
        Err(e @ ApiError::InvalidToken(_)) => Err(e.into()),
        Err(e) => {
            tracing::warn!("Shipment creation failed: {e}");
            failed(state, session, user, current, e.user_message(FAILURE_FALLBACK)).await
        }
    }
}

/// Keep the wizard where it is and show why the submission failed.
async fn failed(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    current: WizardState,
    message: String,
) -> Result<Response, AppError> {
    wizard::save(session, &current).await?;
    let modal = Modal {
        success: false,
        message,
    };
    let page = render(state, session, user, current, FieldErrors::new(), Some(modal)).await?;
    Ok(page.into_response())
}

async fn render(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    current: WizardState,
    errors: FieldErrors,
    modal: Option<Modal>,
) -> Result<WizardTemplate, AppError> {
    let backend = state.backend();
    let mut lookup_error = None;
    let mut addresses = Vec::new();
    let mut parcel_sizes = Vec::new();
    let mut companies = Vec::new();

    match current.step {
        Step::Parties => {
            match inline(backend.client_addresses(&user.token).await, "تعذر تحميل العناوين")? {
                Ok(list) => addresses = list,
                Err(message) => lookup_error = Some(message),
            }
        }
        Step::Package => {
            match inline(backend.parcel_sizes(&user.token).await, PARCEL_SIZES_ERROR)? {
                Ok(list) => parcel_sizes = list,
                Err(message) => lookup_error = Some(message),
            }
        }
        Step::Carrier => {
            match inline(backend.shipping_companies(&user.token).await, "تعذر تحميل شركات الشحن")? {
                Ok(list) => companies = list,
                Err(message) => lookup_error = Some(message),
            }
        }
        Step::Submitted => {}
    }

    let payment = current.draft.payment();
    let services = companies
        .iter()
        .find(|c| c.id.as_str() == current.draft.company_id)
        .map(|company| {
            company
                .shipping_types
                .iter()
                .map(|t| ServiceOption {
                    name: t.name.clone(),
                    price: t.estimate(payment),
                    delivery_days: t.delivery_days.clone(),
                    selected: t.name == current.draft.shipping_type,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(WizardTemplate {
        layout: Layout::load(session, Some(user)).await,
        estimate: wizard::estimate(&current.draft, &companies),
        wizard: current,
        errors,
        addresses,
        parcel_sizes,
        companies,
        services,
        payment_methods: PaymentMethod::ALL,
        lookup_error,
        modal,
        redirect_delay_secs: state.config().redirect_delay_secs(),
    })
}
