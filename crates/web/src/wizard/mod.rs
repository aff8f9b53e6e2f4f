//! The shipment-creation wizard.
//!
//! The wizard is a pure state machine ([`WizardState`]) persisted in the
//! session between requests. Handlers load it, apply one [`WizardAction`],
//! save it back and render the step it lands on.

pub mod payload;
pub mod state;

pub use payload::{WizardError, build_request, clamp_box_count, estimate};
pub use state::{ShipmentDraft, Step, Transition, WizardAction, WizardState};

use tower_sessions::Session;

use crate::models::session_keys;

/// Load the wizard from the session.
///
/// A fresh wizard consumes any "ship again" draft waiting in the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load(session: &Session) -> Result<WizardState, tower_sessions::session::Error> {
    if let Some(state) = session
        .get::<WizardState>(session_keys::SHIPMENT_WIZARD)
        .await?
    {
        return Ok(state);
    }

    let mut state = WizardState::default();
    if let Some(draft) = session
        .remove::<ShipmentDraft>(session_keys::SHIPMENT_PREFILL)
        .await?
    {
        // Prefill cannot fail validation.
        let _ = state.apply(WizardAction::Prefill(draft));
    }
    Ok(state)
}

/// Persist the wizard.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save(
    session: &Session,
    state: &WizardState,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::SHIPMENT_WIZARD, state).await
}

/// Forget the wizard so the next visit starts fresh.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<WizardState>(session_keys::SHIPMENT_WIZARD)
        .await
        .map(|_| ())
}

/// Queue a draft for the next fresh wizard and drop any wizard in progress.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn queue_prefill(
    session: &Session,
    draft: &ShipmentDraft,
) -> Result<(), tower_sessions::session::Error> {
    clear(session).await?;
    session.insert(session_keys::SHIPMENT_PREFILL, draft).await
}
