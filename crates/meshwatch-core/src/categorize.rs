// ── Device categorization ──
//
// Keyword heuristics over the lowercased "{manufacturer} {hostname}" text.
// Rules are checked in a fixed priority order; the first hit wins.

use crate::model::DeviceCategory;

const LAPTOP: &[&str] = &["macbook", "laptop", "dell", "hp", "lenovo"];
const TABLET: &[&str] = &["ipad", "tablet"];
const GAMING: &[&str] = &["playstation", "xbox", "nintendo", "steam"];
const STREAMING: &[&str] = &["roku", "chromecast", "apple tv", "fire tv"];
const SMART_HOME: &[&str] = &["echo", "alexa", "nest", "ring", "philips hue", "smart"];

/// Guess a device's category from its manufacturer and hostname.
///
/// Missing values are treated as empty strings. Total: anything that
/// matches no rule is [`DeviceCategory::Other`].
pub fn categorize_device(manufacturer: Option<&str>, hostname: Option<&str>) -> DeviceCategory {
    let text = format!(
        "{} {}",
        manufacturer.unwrap_or_default(),
        hostname.unwrap_or_default()
    )
    .to_lowercase();
    let has = |needle: &str| text.contains(needle);
    let any = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

    if has("iphone") || has("android") || (has("samsung") && (has("sm-") || has("galaxy"))) {
        DeviceCategory::Phones
    } else if any(LAPTOP) {
        DeviceCategory::Laptops
    } else if any(TABLET) {
        DeviceCategory::Tablets
    } else if any(GAMING) {
        DeviceCategory::Gaming
    } else if any(STREAMING) {
        DeviceCategory::Streaming
    } else if any(SMART_HOME) {
        DeviceCategory::SmartHome
    } else {
        DeviceCategory::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phones_beat_smart_home() {
        assert_eq!(
            categorize_device(Some("Apple"), Some("iPhone-smart")),
            DeviceCategory::Phones
        );
    }

    #[test]
    fn samsung_needs_a_model_hint() {
        assert_eq!(
            categorize_device(Some("Samsung"), Some("Galaxy-S23")),
            DeviceCategory::Phones
        );
        assert_eq!(
            categorize_device(Some("Samsung Electronics"), Some("SM-G991U")),
            DeviceCategory::Phones
        );
        // A Samsung TV with no phone marker falls through to "smart".
        assert_eq!(
            categorize_device(Some("Samsung"), Some("smart-tv")),
            DeviceCategory::SmartHome
        );
    }

    #[test]
    fn each_rule_matches() {
        let cases = [
            (Some("Google"), Some("android-1234"), DeviceCategory::Phones),
            (Some("Apple"), Some("Sams-MacBook-Pro"), DeviceCategory::Laptops),
            (Some("Dell Inc."), None, DeviceCategory::Laptops),
            (Some("Apple"), Some("iPad"), DeviceCategory::Tablets),
            (Some("Sony"), Some("PlayStation-5"), DeviceCategory::Gaming),
            (Some("Roku, Inc."), None, DeviceCategory::Streaming),
            (Some("Amazon"), Some("fire tv stick"), DeviceCategory::Streaming),
            (Some("Google"), Some("Nest-Hub"), DeviceCategory::SmartHome),
            (Some("Espressif"), Some("esp_1a2b3c"), DeviceCategory::Other),
        ];
        for (manufacturer, hostname, expected) in cases {
            assert_eq!(
                categorize_device(manufacturer, hostname),
                expected,
                "{manufacturer:?} {hostname:?}"
            );
        }
    }

    #[test]
    fn laptops_are_checked_before_tablets() {
        // "hp" appears inside the hostname, so the laptop rule wins.
        assert_eq!(
            categorize_device(None, Some("hp-tablet")),
            DeviceCategory::Laptops
        );
    }

    #[test]
    fn missing_fields_are_other() {
        assert_eq!(categorize_device(None, None), DeviceCategory::Other);
        assert_eq!(categorize_device(Some(""), Some("")), DeviceCategory::Other);
    }
}
