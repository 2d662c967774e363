//! Opening external links (share pages, help articles).
//!
//! An unopenable link looks exactly like one the user opened and closed
//! again: the failure is logged and nothing is surfaced.

use std::io;
use std::sync::Mutex;

use url::Url;

const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// What the caller sees after handing off a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The browser (or nothing) was shown and the user is back.
    Closed,
    /// Not attempted: the scheme is not one we hand to the system.
    Refused,
}

pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &Url) -> io::Result<()>;
}

/// Opens links with the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLinkOpener;

impl LinkOpener for SystemLinkOpener {
    fn open(&self, url: &Url) -> io::Result<()> {
        open::that_detached(url.as_str())
    }
}

/// Records links instead of opening them.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<Url>>,
    fail: bool,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// An opener whose every attempt fails.
    pub fn failing() -> Self {
        Self {
            opened: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn opened(&self) -> Vec<Url> {
        self.opened.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &Url) -> io::Result<()> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(url.clone());
        }
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no handler for link"));
        }
        Ok(())
    }
}

/// Hand `url` to `opener`.
pub fn open_link(opener: &dyn LinkOpener, url: &Url) -> LinkOutcome {
    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        tracing::warn!(%url, "refusing to open link with unsupported scheme");
        return LinkOutcome::Refused;
    }
    match opener.open(url) {
        Ok(()) => tracing::debug!(%url, "link opened"),
        Err(e) => tracing::warn!(%url, error = %e, "could not open link"),
    }
    LinkOutcome::Closed
}
