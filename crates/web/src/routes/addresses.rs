//! Sender address book.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shipdesk_api::{ClientAddress, ClientAddressInput};
use shipdesk_core::{AddressId, FieldErrors, validation::Validate};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireUser;
use crate::models::{CurrentUser, Flash};
use crate::routes::{Layout, flash_outcome, inline};
use crate::state::AppState;

/// Address form data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddressForm {
    pub contact_name: String,
    pub phone: String,
    pub city: String,
    pub district: String,
    pub details: String,
    pub country: String,
}

impl Validate for AddressForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("contact_name", &self.contact_name);
        errors.require_phone("phone", &self.phone);
        errors.require("city", &self.city);
        errors.require("details", &self.details);
        errors.into_result()
    }
}

impl AddressForm {
    fn to_input(&self) -> ClientAddressInput {
        let country = self.country.trim();
        ClientAddressInput {
            contact_name: self.contact_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            city: self.city.trim().to_string(),
            district: self.district.trim().to_string(),
            details: self.details.trim().to_string(),
            country: if country.is_empty() { "SA" } else { country }.to_string(),
        }
    }
}

impl From<&ClientAddress> for AddressForm {
    fn from(address: &ClientAddress) -> Self {
        Self {
            contact_name: address.contact_name.clone(),
            phone: address.phone.clone(),
            city: address.city.clone(),
            district: address.district.clone(),
            details: address.details.clone(),
            country: address.country.clone(),
        }
    }
}

/// Address list template.
#[derive(Template, WebTemplate)]
#[template(path = "addresses/index.html")]
pub struct AddressesTemplate {
    pub layout: Layout,
    pub addresses: Vec<ClientAddress>,
    pub error: Option<String>,
}

/// Address form template, for both create and edit.
#[derive(Template, WebTemplate)]
#[template(path = "addresses/form.html")]
pub struct AddressFormTemplate {
    pub layout: Layout,
    pub action: String,
    pub title: &'static str,
    pub form: AddressForm,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// List the signed-in user's addresses.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse, AppError> {
    let (addresses, error) =
        match inline(state.backend().client_addresses(&user.token).await, "تعذر تحميل العناوين")? {
            Ok(list) => (list, None),
            Err(message) => (Vec::new(), Some(message)),
        };

    Ok(AddressesTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        addresses,
        error,
    })
}

/// Display the new address form.
pub async fn new_address(session: Session, RequireUser(user): RequireUser) -> impl IntoResponse {
    AddressFormTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        action: "/addresses".to_string(),
        title: "إضافة عنوان",
        form: AddressForm::default(),
        errors: FieldErrors::new(),
        error: None,
    }
}

/// Display the edit form for one address.
#[instrument(skip_all, fields(address_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<AddressId>,
) -> Result<impl IntoResponse, AppError> {
    let addresses = state.backend().client_addresses(&user.token).await?;
    let address = addresses
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| AppError::NotFound(format!("address {id}")))?;

    Ok(AddressFormTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        action: format!("/addresses/{id}"),
        title: "تعديل العنوان",
        form: AddressForm::from(address),
        errors: FieldErrors::new(),
        error: None,
    })
}

/// Create an address.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Form(form): Form<AddressForm>,
) -> Result<Response, AppError> {
    save(&state, &session, &user, None, form).await
}

/// Update an address.
#[instrument(skip_all, fields(address_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<AddressId>,
    Form(form): Form<AddressForm>,
) -> Result<Response, AppError> {
    save(&state, &session, &user, Some(id), form).await
}

async fn save(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    id: Option<AddressId>,
    form: AddressForm,
) -> Result<Response, AppError> {
    let (action, title) = match &id {
        Some(id) => (format!("/addresses/{id}"), "تعديل العنوان"),
        None => ("/addresses".to_string(), "إضافة عنوان"),
    };

    let (errors, error) = match form.validate() {
        Err(errors) => (errors, None),
        Ok(()) => {
            let input = form.to_input();
            let backend = state.backend();
            let result = match &id {
                Some(id) => backend.update_client_address(&user.token, id, &input).await,
                None => backend.create_client_address(&user.token, &input).await,
            };
            match inline(result, "تعذر حفظ العنوان")? {
                Ok(_) => {
                    Flash::success("تم حفظ العنوان").set(session).await;
                    return Ok(Redirect::to("/addresses").into_response());
                }
                Err(message) => (FieldErrors::new(), Some(message)),
            }
        }
    };

    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        AddressFormTemplate {
            layout: Layout::load(session, Some(user)).await,
            action,
            title,
            form,
            errors,
            error,
        },
    )
        .into_response())
}

/// Delete an address.
#[instrument(skip_all, fields(address_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(id): Path<AddressId>,
) -> Result<Redirect, AppError> {
    let result = state.backend().delete_client_address(&user.token, &id).await;
    flash_outcome(&session, result, "تم حذف العنوان", "تعذر حذف العنوان").await?;
    Ok(Redirect::to("/addresses"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shipdesk_core::validation::{PHONE_MESSAGE, REQUIRED_MESSAGE};

    use super::*;

    #[test]
    fn test_missing_fields_each_get_an_error() {
        let form = AddressForm {
            phone: "abc".to_string(),
            district: "Olaya".to_string(),
            ..AddressForm::default()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("contact_name"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("phone"), Some(PHONE_MESSAGE));
        assert_eq!(errors.get("city"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("details"), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_blank_country_defaults_to_saudi_arabia() {
        let form = AddressForm {
            contact_name: " Warehouse ".to_string(),
            phone: "0500000000".to_string(),
            city: "Riyadh".to_string(),
            details: "Exit 5".to_string(),
            ..AddressForm::default()
        };

        assert!(form.validate().is_ok());
        let input = form.to_input();
        assert_eq!(input.contact_name, "Warehouse");
        assert_eq!(input.country, "SA");
    }
}
