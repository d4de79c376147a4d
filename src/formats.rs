use serde::{Deserialize, Serialize};

/// One reservation as captured from a booking-site page.
///
/// Field names follow the wire format the sync server expects
/// (`confirmationCode`, `guestName`, ...). `check_in`/`check_out` are the
/// matched date fragments, absent when no date pattern matched;
/// `total_price` falls back to 0 when the price text is unparseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedReservation {
    pub channel: String,
    pub guest_name: String,
    pub raw_date_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    pub raw_price_text: String,
    pub total_price: f64,
    pub status: String,
    pub confirmation_code: String,
    pub captured_at: String,
    pub source_url: String,
}

/// On-disk capture store. One JSON file standing in for the browser
/// extension's storage area, keyed the same way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreFile {
    #[serde(default)]
    pub captured_reservations: Vec<CapturedReservation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_base_url: Option<String>,
}

/// Body of `POST {base}/api/extension/sync/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPayload {
    pub channel: String,
    pub bookings: Vec<CapturedReservation>,
}
