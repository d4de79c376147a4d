/// CSS locator strings for the reservation fields of one booking site.
///
/// Locators are opaque configuration: the extractor only ever asks "first
/// match of this selector under this scope". A locator that matches
/// nothing reads as an empty field, so a site tweaking part of its markup
/// degrades that field instead of the whole capture.
#[derive(Debug, Clone, Copy)]
pub struct FieldLocators {
    pub reservations: &'static str,
    pub guest_name: &'static str,
    pub dates: &'static str,
    pub confirmation_code: &'static str,
    pub status: &'static str,
    pub price: &'static str,
}

/// Static description of one supported booking channel.
#[derive(Debug, Clone, Copy)]
pub struct ChannelProfile {
    pub domain: &'static str,
    pub display_name: &'static str,
    pub locators: FieldLocators,
}

/// Built-in channel table, checked in declaration order by [`detect`].
pub const CHANNELS: &[ChannelProfile] = &[
    ChannelProfile {
        domain: "airbnb.com",
        display_name: "Airbnb",
        locators: FieldLocators {
            reservations: "[data-testid='reservation-item']",
            guest_name: "[data-testid='guest-name']",
            dates: "[data-testid='reservation-dates']",
            confirmation_code: "[data-testid='confirmation-code']",
            status: "[data-testid='reservation-status']",
            price: "[data-testid='reservation-price']",
        },
    },
    ChannelProfile {
        domain: "booking.com",
        display_name: "Booking.com",
        locators: FieldLocators {
            reservations: ".res-table__row",
            guest_name: ".res-guest-name",
            dates: ".res-dates",
            confirmation_code: ".res-number",
            status: ".res-status",
            price: ".res-price",
        },
    },
    ChannelProfile {
        domain: "vrbo.com",
        display_name: "Vrbo",
        locators: FieldLocators {
            reservations: "[data-wdio='reservation-list-item']",
            guest_name: "[data-wdio='guest-name']",
            dates: "[data-wdio='reservation-dates']",
            confirmation_code: "[data-wdio='reservation-id']",
            status: "[data-wdio='reservation-status']",
            price: "[data-wdio='payout-amount']",
        },
    },
];

/// First profile whose domain appears in `hostname`, if any. `None` means
/// the pipeline stays inactive for this page.
pub fn detect(hostname: &str) -> Option<&'static ChannelProfile> {
    CHANNELS
        .iter()
        .find(|profile| hostname.contains(profile.domain))
}

/// `channels` subcommand: print the built-in profile table.
pub fn list() {
    for profile in CHANNELS {
        println!("{:<14} {}", profile.domain, profile.display_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_matches_domain_as_substring() {
        let profile = detect("www.airbnb.com").expect("airbnb host should match");
        assert_eq!(profile.display_name, "Airbnb");

        let profile = detect("admin.booking.com").expect("booking host should match");
        assert_eq!(profile.display_name, "Booking.com");

        let profile = detect("vrbo.com").expect("vrbo host should match");
        assert_eq!(profile.display_name, "Vrbo");
    }

    #[test]
    fn detect_returns_none_for_unknown_hosts() {
        assert!(detect("example.com").is_none());
        assert!(detect("airbnb.example.org").is_none());
        assert!(detect("").is_none());
    }

    #[test]
    fn detect_prefers_the_first_declared_profile() {
        // Contrived host that mentions two channel domains.
        let profile = detect("airbnb.com.booking.com").expect("should match something");
        assert_eq!(profile.display_name, "Airbnb");
    }
}
