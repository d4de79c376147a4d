use anyhow::Context as _;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::channels::ChannelProfile;
use crate::formats::CapturedReservation;

/// Turn one page into the ordered batch of reservations it lists.
///
/// A reservation element that cannot be read is logged and skipped; the
/// rest of the batch is unaffected. The batch may be empty.
pub fn extract_reservations(
    profile: &ChannelProfile,
    html: &str,
    source_url: &str,
) -> anyhow::Result<Vec<CapturedReservation>> {
    let document = Html::parse_document(html);
    let reservations = parse_selector(profile.locators.reservations)
        .with_context(|| format!("reservations locator for {}", profile.display_name))?;

    let captured_at = chrono::Utc::now().to_rfc3339();
    let mut batch = Vec::new();
    for element in document.select(&reservations) {
        match extract_one(profile, element, source_url, &captured_at) {
            Ok(record) => batch.push(record),
            Err(err) => {
                tracing::warn!(
                    channel = profile.display_name,
                    ?err,
                    "skipping unreadable reservation element"
                );
            }
        }
    }

    Ok(batch)
}

fn extract_one(
    profile: &ChannelProfile,
    element: ElementRef<'_>,
    source_url: &str,
    captured_at: &str,
) -> anyhow::Result<CapturedReservation> {
    let locators = &profile.locators;
    let guest_name = locator_text(element, locators.guest_name)?;
    let raw_date_text = locator_text(element, locators.dates)?;
    let confirmation_code = locator_text(element, locators.confirmation_code)?;
    let status = locator_text(element, locators.status)?;
    let raw_price_text = locator_text(element, locators.price)?;

    let (check_in, check_out) = parse_date_range(&raw_date_text);
    let total_price = parse_price(&raw_price_text);

    Ok(CapturedReservation {
        channel: profile.display_name.to_owned(),
        guest_name,
        raw_date_text,
        check_in,
        check_out,
        raw_price_text,
        total_price,
        status,
        confirmation_code,
        captured_at: captured_at.to_owned(),
        source_url: source_url.to_owned(),
    })
}

/// First-match text for a locator within `scope`. No match reads as "".
fn locator_text(scope: ElementRef<'_>, locator: &str) -> anyhow::Result<String> {
    let selector = parse_selector(locator)?;
    Ok(scope
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_owned())
        .unwrap_or_default())
}

fn parse_selector(locator: &str) -> anyhow::Result<Selector> {
    Selector::parse(locator).map_err(|err| anyhow::anyhow!("parse selector {locator:?}: {err}"))
}

/// Split a raw date string into check-in/check-out fragments.
///
/// Patterns are tried in order and the first match wins:
///   1. "Jan 1 - Jan 5" (month-name fragments, no year)
///   2. "01/01/2024 - 01/05/2024"
/// No match leaves both sides absent; the record is still kept.
fn parse_date_range(raw: &str) -> (Option<String>, Option<String>) {
    let patterns = [
        r"([A-Za-z]+\s+\d{1,2})\s*-\s*([A-Za-z]+\s+\d{1,2})",
        r"(\d{2}/\d{2}/\d{4})\s*-\s*(\d{2}/\d{2}/\d{4})",
    ];

    for pattern in patterns {
        let re = Regex::new(pattern).expect("valid date range regex");
        if let Some(caps) = re.captures(raw) {
            return (Some(caps[1].to_owned()), Some(caps[2].to_owned()));
        }
    }

    (None, None)
}

/// Strip everything that is not a digit or decimal point, then parse.
/// Unparseable leftovers read as 0.
fn parse_price(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}
