use uuid::Uuid;

use super::TRACK_PATH;

/// Attribution page template.
const ATTRIBUTION_TEMPLATE: &str = include_str!("attribution.html");

/// Terminal page shown for unknown or deleted codes.
pub(super) const INVALID_PAGE: &str = include_str!("invalid.html");

/// Terminal page shown when a code cannot be resolved due to a server error.
pub(super) const UNAVAILABLE_PAGE: &str = include_str!("unavailable.html");

/// Render the attribution page of the provided code.
///
/// The page fingerprints the scanning device, reports the scan and only then
/// navigates to the link returned by the tracking route.
pub(super) fn attribution(id: &Uuid) -> String {
    ATTRIBUTION_TEMPLATE
        .replace("{{code_id}}", &id.hyphenated().to_string())
        .replace("{{track_path}}", TRACK_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_replaced() {
        let id = common::id::mint();
        let page = attribution(&id);

        assert!(page.contains(&format!(r#"data-code-id="{id}""#)));
        assert!(page.contains(r#"data-track-path="/track-scan""#));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn navigates_only_after_confirmed_tracking() {
        let page = attribution(&common::id::mint());

        let guard = page
            .find("!body.success || !body.link")
            .expect("tracking confirmation guard");
        let redirecting = page
            .find(r#"enter("redirecting")"#)
            .expect("redirecting phase");

        assert_eq!(page.matches("location.").count(), 1);
        assert!(!page.contains("window.open"));

        let navigation = page
            .find("window.location.replace(body.link)")
            .expect("navigation to the tracked link");

        assert!(guard < redirecting);
        assert!(redirecting < navigation);
        assert!(!page[..redirecting].contains("location."));
    }
}
