use std::str::FromStr;

use crate::error::CrmError;

/// Card brand codes accepted by the `PaymentType` order field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentType {
    Amex = 1,
    Discover = 2,
    Mastercard = 3,
    Visa = 4,
    Other = 5,
}

impl PaymentType {
    /// Numeric code sent to the vendor.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Resolves a caller-supplied brand name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::UnknownPaymentType`] for any brand outside the
    /// supported set, so an order is never sent without a payment type.
    pub fn from_brand(brand: &str) -> Result<Self, CrmError> {
        match brand.trim().to_ascii_lowercase().as_str() {
            "amex" | "americanexpress" | "american_express" | "american express" => {
                Ok(PaymentType::Amex)
            }
            "discover" => Ok(PaymentType::Discover),
            "mastercard" => Ok(PaymentType::Mastercard),
            "visa" => Ok(PaymentType::Visa),
            "other" => Ok(PaymentType::Other),
            _ => Err(CrmError::UnknownPaymentType(brand.to_owned())),
        }
    }
}

impl FromStr for PaymentType {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_brand(s)
    }
}
