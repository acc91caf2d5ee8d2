//! Store-wide settings (a singleton record).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::TaxRate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// Store identity, receipt text and a few behaviour toggles.
///
/// Every field has a default, so a stored object missing fields (older
/// versions, hand-edited backups) is completed from [`StoreSettings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct StoreSettings {
    pub store_name: String,
    pub store_address: String,
    pub store_city: String,
    pub store_postal_code: String,
    pub store_phone: String,
    pub store_email: String,

    /// Shown on receipts and reports. Checkout always charges the fixed
    /// cart rate (see [`crate::cart::CART_TAX_RATE`]).
    pub tax_rate_percent: f64,

    pub currency: Currency,
    pub currency_symbol: String,

    pub receipt_header: String,
    pub receipt_footer: String,
    pub receipt_show_logo: bool,

    pub theme: Theme,
    pub print_receipt: bool,
    pub email_receipt: bool,

    /// Loyalty points earned per whole currency unit spent.
    pub loyalty_points_per_unit: i64,
}

impl StoreSettings {
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_percentage(self.tax_rate_percent)
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            store_name: "My POS Store".to_string(),
            store_address: "123 Main Street".to_string(),
            store_city: "City".to_string(),
            store_postal_code: "12345".to_string(),
            store_phone: "+1 (555) 123-4567".to_string(),
            store_email: "info@pos.local".to_string(),
            tax_rate_percent: 10.0,
            currency: Currency::Usd,
            currency_symbol: "$".to_string(),
            receipt_header: "Thank you for your purchase!".to_string(),
            receipt_footer: "Visit us again soon.".to_string(),
            receipt_show_logo: true,
            theme: Theme::Light,
            print_receipt: true,
            email_receipt: false,
            loyalty_points_per_unit: 1,
        }
    }
}

patch_struct! {
    StoreSettingsPatch for StoreSettings {
        store_name: String,
        store_address: String,
        store_city: String,
        store_postal_code: String,
        store_phone: String,
        store_email: String,
        tax_rate_percent: f64,
        currency: Currency,
        currency_symbol: String,
        receipt_header: String,
        receipt_footer: String,
        receipt_show_logo: bool,
        theme: Theme,
        print_receipt: bool,
        email_receipt: bool,
        loyalty_points_per_unit: i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: StoreSettings =
            serde_json::from_str(r#"{"storeName":"Corner Shop","currency":"EUR"}"#).unwrap();
        assert_eq!(settings.store_name, "Corner Shop");
        assert_eq!(settings.currency, Currency::Eur);
        assert_eq!(settings.receipt_footer, "Visit us again soon.");
        assert_eq!(settings.tax_rate().bps(), 1000);
    }
}
