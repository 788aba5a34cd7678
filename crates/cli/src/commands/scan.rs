use std::{io, time::Duration};

use attribution::{
    Attribution, AttributionError, DeviceFingerprinter, HttpTracker, InvalidPayload, Navigator,
    ScanTarget,
};
use derive_more::{Display, Error, From};
use indicatif::ProgressBar;

use crate::commands::Scan;

/// `scan` subcommand errors.
#[derive(Debug, Display, From, Error)]
pub(crate) enum ScanError {
    /// Payload cannot be followed.
    Payload(InvalidPayload),

    /// Scan attribution failed, the target URL was not opened.
    Attribution(AttributionError),

    /// Unable to open the slug redirect.
    Io(io::Error),
}

/// [`Navigator`] implementation that opens links in the system browser.
struct BrowserNavigator {
    /// Print links instead of opening them.
    dry_run: bool,
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, link: &str) -> io::Result<()> {
        println!("Link: {link}");

        if self.dry_run {
            return Ok(());
        }

        open::that(link)
    }
}

/// Scan flow entrypoint.
pub(crate) async fn scan(Scan { payload, no_open }: Scan) -> Result<(), ScanError> {
    let navigator = BrowserNavigator { dry_run: no_open };

    let target = match ScanTarget::from_payload(&payload) {
        Ok(target) => target,
        Err(InvalidPayload::Untracked) => {
            // Slug payloads are redirected by the server without attribution.
            navigator.navigate(payload.trim())?;
            return Ok(());
        }
        Err(error) => Err(error)?,
    };

    let pg = ProgressBar::new_spinner();
    pg.enable_steady_tick(Duration::from_millis(150));
    pg.set_message("Recording scan...");

    let tracker = HttpTracker::new(target.origin());
    let mut flow = Attribution::new(target.code_id(), DeviceFingerprinter, tracker, navigator);

    match flow.run().await {
        Ok(_) => {
            pg.finish_with_message("Scan recorded.");
            Ok(())
        }
        Err(error) => {
            pg.abandon_with_message(format!("Scan failed ({}).", flow.phase()));
            Err(error.into())
        }
    }
}
