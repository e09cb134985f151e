//! Command frame builder
//!
//! Checks a [`TransactionRequest`] against the validity rules of its
//! [`RequestSchema`], then fills every field-group position and hands the
//! groups to the framer. Nothing is encoded unless validation passes.

use bytes::Bytes;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use termwire_types::TransactionRequest;

use crate::{
    command::AdminCommand,
    constants::{DUPLICATE_OVERRIDE, PROTOCOL_VERSION},
    error::ValidationError,
    framer::{self, Frame},
    schema::{self, account, amount, trace, DuplicatePolicy, FieldGroup, RequestSchema},
};

/// Builds outbound command frames
///
/// # Examples
///
/// ```
/// use termwire_core::{framer, RequestBuilder};
/// use termwire_types::{CurrencyType, Decimal, TransactionRequest};
///
/// let request = TransactionRequest::purchase(1, Decimal::new(1000, 2), CurrencyType::FoodStamps)
///     .with_allow_duplicates(true);
///
/// let bytes = RequestBuilder::new().build(&request).unwrap();
/// assert_eq!(
///     framer::render(&bytes),
///     "[STX]T04[FS]1.35[FS]01[FS]1000[FS][US][US][US]F[US][US]1[FS]1[FS][FS][ETX]"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    version: String,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
        }
    }

    /// Override the protocol version written into every frame
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Validate and encode a transaction request
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the request breaks the validity
    /// matrix, lacks a required field, or carries an unusable amount.
    pub fn build(&self, request: &TransactionRequest) -> Result<Bytes, ValidationError> {
        let frame = self.frame(request)?;
        Ok(frame.encode())
    }

    /// Validate a request and lay out its field-groups without encoding them
    pub fn frame(&self, request: &TransactionRequest) -> Result<Frame, ValidationError> {
        let schema = schema::request_schema(request.transaction_type);
        let amounts = validate_with(schema, request)?;

        let groups = schema
            .groups
            .iter()
            .map(|group| trim_trailing(self.populate(*group, schema, request, &amounts)))
            .collect::<Vec<_>>();

        debug_assert_eq!(groups.len(), schema.group_count());

        let frame = Frame::new(groups);
        debug!(request = %request, frame = %frame, "Built transaction frame");

        Ok(frame)
    }

    /// Encode an administrative command
    pub fn build_admin(&self, command: AdminCommand) -> Bytes {
        let bytes = framer::encode(&[[command.code()], [self.version.as_str()]]);
        debug!(command = %command, "Built admin frame");
        bytes
    }

    fn populate(
        &self,
        group: FieldGroup,
        schema: &RequestSchema,
        request: &TransactionRequest,
        amounts: &MinorUnits,
    ) -> Vec<String> {
        let mut subs = vec![String::new(); group.arity()];

        match group {
            FieldGroup::Command => subs[0] = schema.command.to_string(),
            FieldGroup::Version => subs[0] = self.version.clone(),
            FieldGroup::TransactionCode => subs[0] = schema.type_code.to_string(),
            FieldGroup::Amount => {
                if let Some(value) = amounts.amount {
                    subs[amount::AMOUNT] = value.to_string();
                }
                if let Some(value) = amounts.cash_back {
                    subs[amount::CASH_BACK] = value.to_string();
                }
            }
            FieldGroup::Account => {
                subs[account::EBT_TYPE] = schema::currency_code(request.currency).to_string();
                if schema.writes_override(request.currency, request.allow_duplicates) {
                    subs[account::DUPLICATE_OVERRIDE] = DUPLICATE_OVERRIDE.to_string();
                }
            }
            FieldGroup::Trace => {
                subs[trace::REFERENCE_NUMBER] = request.reference_number.to_string();
            }
            FieldGroup::Cashier | FieldGroup::Extended => {}
        }

        subs
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate and encode with the default protocol version
pub fn build(request: &TransactionRequest) -> Result<Bytes, ValidationError> {
    RequestBuilder::new().build(request)
}

/// Check a request against its type's validity rules
pub fn validate(request: &TransactionRequest) -> Result<(), ValidationError> {
    let schema = schema::request_schema(request.transaction_type);
    validate_with(schema, request).map(|_| ())
}

/// Convert a currency amount to integer minor units (cents)
///
/// # Errors
///
/// Returns [`ValidationError::InvalidAmount`] for negative values, values
/// with sub-cent precision, or values too large to represent.
pub fn to_minor_units(value: Decimal, field: &'static str) -> Result<u64, ValidationError> {
    let invalid = || ValidationError::InvalidAmount { field, amount: value };

    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid());
    }

    let cents = value.checked_mul(Decimal::ONE_HUNDRED).ok_or_else(invalid)?;
    if !cents.fract().is_zero() {
        return Err(invalid());
    }

    cents.trunc().to_u64().ok_or_else(invalid)
}

/// Validated amounts, already in minor units
#[derive(Debug, Default)]
struct MinorUnits {
    amount: Option<u64>,
    cash_back: Option<u64>,
}

fn validate_with(
    schema: &RequestSchema,
    request: &TransactionRequest,
) -> Result<MinorUnits, ValidationError> {
    let combination = |field: &'static str, reason: &'static str| ValidationError::InvalidCombination {
        transaction_type: request.transaction_type,
        currency: request.currency,
        field,
        reason,
    };

    if !schema.allows_currency(request.currency) {
        return Err(combination("currency", "currency not accepted for this transaction type"));
    }

    let cash_back = match request.effective_cash_back() {
        Some(value) => {
            if schema.cash_back != Some(request.currency) {
                return Err(combination("cash_back_amount", "cashback not allowed"));
            }
            Some(to_minor_units(value, "cash_back_amount")?)
        }
        None => None,
    };

    if request.allow_duplicates && schema.duplicates == DuplicatePolicy::Rejected {
        return Err(combination("allow_duplicates", "duplicates not allowed"));
    }

    if request.reference_number == 0 {
        return Err(ValidationError::MissingField {
            field: "reference_number",
        });
    }

    let amount = if request.transaction_type.requires_amount() {
        let value = request
            .amount
            .ok_or(ValidationError::MissingField { field: "amount" })?;
        let cents = to_minor_units(value, "amount")?;
        if cents == 0 {
            return Err(ValidationError::InvalidAmount {
                field: "amount",
                amount: value,
            });
        }
        Some(cents)
    } else {
        None
    };

    Ok(MinorUnits { amount, cash_back })
}

/// Drop trailing empty sub-fields, keeping at least one so the group holds its position
fn trim_trailing(mut subs: Vec<String>) -> Vec<String> {
    while subs.len() > 1 && subs.last().is_some_and(String::is_empty) {
        subs.pop();
    }
    subs
}
