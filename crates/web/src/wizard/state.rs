//! The wizard's state machine.
//!
//! Steps run `Parties → Package → Carrier` and end in `Submitted` once the
//! backend accepts the shipment. Every change goes through
//! [`WizardState::apply`]; the handler only persists the result.

use serde::{Deserialize, Serialize};
use shipdesk_api::{ParcelSize, Shipment};
use shipdesk_core::{FieldErrors, PaymentMethod};

/// A wizard step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Sender address and recipient details.
    #[default]
    Parties,
    /// Dimensions, weight and box count.
    Package,
    /// Carrier, service level and payment.
    Carrier,
    /// Accepted by the backend.
    Submitted,
}

impl Step {
    /// Steps that carry a form, in order.
    pub const FORM_STEPS: &'static [Self] = &[Self::Parties, Self::Package, Self::Carrier];

    /// 1-based position shown in the progress bar.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Parties => 1,
            Self::Package => 2,
            Self::Carrier => 3,
            Self::Submitted => 4,
        }
    }

    /// Heading shown above the step's form.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Parties => "المرسل والمستلم",
            Self::Package => "تفاصيل الطرد",
            Self::Carrier => "شركة الشحن والدفع",
            Self::Submitted => "تم الإرسال",
        }
    }

    /// Fields that must be filled before leaving this step.
    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Parties => &[
                "sender_address_id",
                "receiver_name",
                "receiver_phone",
                "receiver_city",
                "receiver_address",
            ],
            Self::Package => &["length", "width", "height", "weight"],
            Self::Carrier => &["company_id", "shipping_type", "payment_method"],
            Self::Submitted => &[],
        }
    }

    const fn next(self) -> Option<Self> {
        match self {
            Self::Parties => Some(Self::Package),
            Self::Package => Some(Self::Carrier),
            Self::Carrier | Self::Submitted => None,
        }
    }

    const fn previous(self) -> Option<Self> {
        match self {
            Self::Package => Some(Self::Parties),
            Self::Carrier => Some(Self::Package),
            Self::Parties | Self::Submitted => None,
        }
    }
}

/// Everything the user has typed so far, as submitted by the forms.
///
/// Values stay strings until the payload is built so a half-filled form can
/// be shown back exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipmentDraft {
    pub sender_address_id: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_email: String,
    pub receiver_city: String,
    pub receiver_district: String,
    pub receiver_address: String,
    pub receiver_country: String,
    pub parcel_size_id: String,
    pub length: String,
    pub width: String,
    pub height: String,
    pub weight: String,
    pub box_num: String,
    pub description: String,
    pub company_id: String,
    pub shipping_type: String,
    pub payment_method: String,
    pub cod_amount: String,
}

impl ShipmentDraft {
    /// Set one field by its form name. Unknown names are ignored.
    ///
    /// Returns whether the name was recognised.
    pub fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "sender_address_id" => &mut self.sender_address_id,
            "receiver_name" => &mut self.receiver_name,
            "receiver_phone" => &mut self.receiver_phone,
            "receiver_email" => &mut self.receiver_email,
            "receiver_city" => &mut self.receiver_city,
            "receiver_district" => &mut self.receiver_district,
            "receiver_address" => &mut self.receiver_address,
            "receiver_country" => &mut self.receiver_country,
            "parcel_size_id" => &mut self.parcel_size_id,
            "length" => &mut self.length,
            "width" => &mut self.width,
            "height" => &mut self.height,
            "weight" => &mut self.weight,
            "box_num" => &mut self.box_num,
            "description" => &mut self.description,
            "company_id" => &mut self.company_id,
            "shipping_type" => &mut self.shipping_type,
            "payment_method" => &mut self.payment_method,
            "cod_amount" => &mut self.cod_amount,
            _ => return false,
        };
        *slot = value.trim().to_string();
        true
    }

    /// Value of one field by its form name; empty for unknown names.
    #[must_use]
    pub fn get(&self, field: &str) -> &str {
        match field {
            "sender_address_id" => &self.sender_address_id,
            "receiver_name" => &self.receiver_name,
            "receiver_phone" => &self.receiver_phone,
            "receiver_email" => &self.receiver_email,
            "receiver_city" => &self.receiver_city,
            "receiver_district" => &self.receiver_district,
            "receiver_address" => &self.receiver_address,
            "receiver_country" => &self.receiver_country,
            "parcel_size_id" => &self.parcel_size_id,
            "length" => &self.length,
            "width" => &self.width,
            "height" => &self.height,
            "weight" => &self.weight,
            "box_num" => &self.box_num,
            "description" => &self.description,
            "company_id" => &self.company_id,
            "shipping_type" => &self.shipping_type,
            "payment_method" => &self.payment_method,
            "cod_amount" => &self.cod_amount,
            _ => "",
        }
    }

    /// The chosen payment method, defaulting to the wallet.
    #[must_use]
    pub fn payment(&self) -> PaymentMethod {
        self.payment_method.parse().unwrap_or_default()
    }

    /// Copy a parcel preset's dimensions into the draft.
    pub fn apply_parcel_size(&mut self, size: &ParcelSize) {
        self.parcel_size_id = size.id.to_string();
        self.length = size.length.to_string();
        self.width = size.width.to_string();
        self.height = size.height.to_string();
    }

    /// A draft that repeats an earlier shipment to the same recipient.
    #[must_use]
    pub fn from_shipment(shipment: &Shipment) -> Self {
        let receiver = &shipment.receiver;
        Self {
            receiver_name: receiver.name.clone(),
            receiver_phone: receiver.phone.clone(),
            receiver_city: receiver.city.clone(),
            receiver_district: receiver.district.clone(),
            receiver_address: receiver.details.clone(),
            receiver_country: receiver.country.clone(),
            length: shipment.dimensions.length.to_string(),
            width: shipment.dimensions.width.to_string(),
            height: shipment.dimensions.height.to_string(),
            weight: shipment.weight.to_string(),
            box_num: shipment.box_num.to_string(),
            payment_method: shipment.payment_method.as_str().to_string(),
            ..Self::default()
        }
    }

    /// Check the fields belonging to `step`.
    ///
    /// # Errors
    ///
    /// Returns one message per invalid field.
    pub fn validate_step(&self, step: Step) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for field in step.required_fields() {
            errors.require(field, self.get(field));
        }

        match step {
            Step::Parties => {
                errors.require_phone("receiver_phone", &self.receiver_phone);
                if !self.receiver_email.is_empty() {
                    errors.require_email("receiver_email", &self.receiver_email);
                }
            }
            Step::Package => {
                for field in ["length", "width", "height", "weight"] {
                    errors.require_positive(field, self.get(field));
                }
            }
            Step::Carrier => {
                if self.payment_method.parse::<PaymentMethod>().is_err() {
                    errors.require("payment_method", "");
                }
                if self.payment() == PaymentMethod::Cod {
                    errors.require_positive("cod_amount", &self.cod_amount);
                }
            }
            Step::Submitted => {}
        }

        errors.into_result()
    }
}

/// Something the user did in the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAction {
    /// Form fields posted from the current step.
    Update(Vec<(String, String)>),
    /// Validate the current step and move forward.
    Next,
    /// Move back one step without validating.
    Back,
    /// Discard everything and start over.
    Reset,
    /// Seed a fresh wizard with a saved draft.
    Prefill(ShipmentDraft),
    /// The backend accepted the shipment.
    Complete,
}

/// What an accepted action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The step did not change.
    Unchanged,
    /// The wizard is now on this step.
    Moved(Step),
    /// The last step validated; the shipment can be submitted.
    ReadyToSubmit,
}

/// The wizard: current step plus draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub step: Step,
    pub draft: ShipmentDraft,
}

impl WizardState {
    /// Apply an action.
    ///
    /// # Errors
    ///
    /// `Next` returns the current step's field errors when it does not
    /// validate; the step is left unchanged. On the last step every earlier
    /// step is checked again, and the wizard moves back to the first one
    /// that fails.
    pub fn apply(&mut self, action: WizardAction) -> Result<Transition, FieldErrors> {
        match action {
            WizardAction::Update(fields) => {
                for (name, value) in fields {
                    self.draft.set(&name, value);
                }
                Ok(Transition::Unchanged)
            }
            WizardAction::Next => {
                if self.step == Step::Submitted {
                    return Ok(Transition::Unchanged);
                }
                self.draft.validate_step(self.step)?;
                match self.step.next() {
                    Some(next) => {
                        self.step = next;
                        Ok(Transition::Moved(next))
                    }
                    None => {
                        for step in Step::FORM_STEPS {
                            if let Err(errors) = self.draft.validate_step(*step) {
                                self.step = *step;
                                return Err(errors);
                            }
                        }
                        Ok(Transition::ReadyToSubmit)
                    }
                }
            }
            WizardAction::Back => match self.step.previous() {
                Some(previous) => {
                    self.step = previous;
                    Ok(Transition::Moved(previous))
                }
                None => Ok(Transition::Unchanged),
            },
            WizardAction::Reset => {
                *self = Self::default();
                Ok(Transition::Moved(Step::Parties))
            }
            WizardAction::Prefill(draft) => {
                *self = Self {
                    step: Step::Parties,
                    draft,
                };
                Ok(Transition::Moved(Step::Parties))
            }
            WizardAction::Complete => {
                self.step = Step::Submitted;
                Ok(Transition::Moved(Step::Submitted))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shipdesk_core::validation::{PHONE_MESSAGE, REQUIRED_MESSAGE};

    use super::*;

    fn update(pairs: &[(&str, &str)]) -> WizardAction {
        WizardAction::Update(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    fn parties() -> WizardAction {
        update(&[
            ("sender_address_id", "a1"),
            ("receiver_name", "Huda"),
            ("receiver_phone", "0500000002"),
            ("receiver_city", "Dammam"),
            ("receiver_address", "King Fahd Rd"),
        ])
    }

    #[test]
    fn test_next_refuses_with_errors_per_field() {
        let mut wizard = WizardState::default();
        wizard.apply(update(&[("receiver_name", "Huda")])).unwrap();

        let errors = wizard.apply(WizardAction::Next).unwrap_err();

        assert_eq!(wizard.step, Step::Parties);
        assert_eq!(errors.get("sender_address_id"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("receiver_phone"), Some(REQUIRED_MESSAGE));
        assert!(!errors.has("receiver_name"));
    }

    #[test]
    fn test_bad_phone_and_email_are_reported() {
        let mut wizard = WizardState::default();
        wizard.apply(parties()).unwrap();
        wizard
            .apply(update(&[("receiver_phone", "12ab"), ("receiver_email", "nope")]))
            .unwrap();

        let errors = wizard.apply(WizardAction::Next).unwrap_err();

        assert_eq!(errors.get("receiver_phone"), Some(PHONE_MESSAGE));
        assert!(errors.has("receiver_email"));
    }

    #[test]
    fn test_walks_forward_and_back() {
        let mut wizard = WizardState::default();
        wizard.apply(parties()).unwrap();
        assert_eq!(
            wizard.apply(WizardAction::Next).unwrap(),
            Transition::Moved(Step::Package)
        );

        wizard
            .apply(update(&[("length", "30"), ("width", "20"), ("height", "10"), ("weight", "2.5")]))
            .unwrap();
        assert_eq!(
            wizard.apply(WizardAction::Next).unwrap(),
            Transition::Moved(Step::Carrier)
        );

        assert_eq!(
            wizard.apply(WizardAction::Back).unwrap(),
            Transition::Moved(Step::Package)
        );
        assert_eq!(wizard.draft.weight, "2.5");
    }

    #[test]
    fn test_back_on_first_step_is_a_no_op() {
        let mut wizard = WizardState::default();
        assert_eq!(wizard.apply(WizardAction::Back).unwrap(), Transition::Unchanged);
        assert_eq!(wizard.step, Step::Parties);
    }

    #[test]
    fn test_back_does_not_validate() {
        let mut wizard = WizardState {
            step: Step::Package,
            draft: ShipmentDraft::default(),
        };
        assert!(wizard.apply(WizardAction::Back).is_ok());
    }

    #[test]
    fn test_carrier_requires_cod_amount_for_cod() {
        let mut wizard = WizardState::default();
        wizard.apply(parties()).unwrap();
        wizard
            .apply(update(&[("length", "30"), ("width", "20"), ("height", "10"), ("weight", "2")]))
            .unwrap();
        wizard.step = Step::Carrier;
        wizard
            .apply(update(&[
                ("company_id", "c1"),
                ("shipping_type", "express"),
                ("payment_method", "cod"),
            ]))
            .unwrap();

        let errors = wizard.apply(WizardAction::Next).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.has("cod_amount"));

        wizard.apply(update(&[("cod_amount", "120")])).unwrap();
        assert_eq!(
            wizard.apply(WizardAction::Next).unwrap(),
            Transition::ReadyToSubmit
        );
        assert_eq!(wizard.step, Step::Carrier);
    }

    #[test]
    fn test_submit_returns_to_first_step_that_no_longer_validates() {
        let mut wizard = WizardState::default();
        wizard.apply(parties()).unwrap();
        wizard.apply(WizardAction::Next).unwrap();
        wizard
            .apply(update(&[("length", "30"), ("width", "20"), ("height", "10"), ("weight", "2")]))
            .unwrap();
        wizard.apply(WizardAction::Next).unwrap();

        wizard
            .apply(update(&[
                ("company_id", "c1"),
                ("shipping_type", "express"),
                ("payment_method", "wallet"),
                ("receiver_name", ""),
            ]))
            .unwrap();
        let errors = wizard.apply(WizardAction::Next).unwrap_err();

        assert_eq!(wizard.step, Step::Parties);
        assert_eq!(errors.get("receiver_name"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let mut draft = ShipmentDraft::default();
        assert!(!draft.set("is_admin", "true".to_string()));
        assert_eq!(draft, ShipmentDraft::default());
    }

    #[test]
    fn test_prefill_and_reset() {
        let mut wizard = WizardState {
            step: Step::Carrier,
            draft: ShipmentDraft::default(),
        };
        let draft = ShipmentDraft {
            receiver_name: "Huda".to_string(),
            ..ShipmentDraft::default()
        };

        wizard.apply(WizardAction::Prefill(draft)).unwrap();
        assert_eq!(wizard.step, Step::Parties);
        assert_eq!(wizard.draft.receiver_name, "Huda");

        wizard.apply(WizardAction::Reset).unwrap();
        assert_eq!(wizard, WizardState::default());
    }
}
