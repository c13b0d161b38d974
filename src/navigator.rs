use std::io;

/// Leaves the client for an external page (authorization, media, post permalinks).
pub trait Navigator: Send + Sync {
    fn open_external(&self, url: &str) -> io::Result<()>;
}

/// Opens URLs in the system browser.
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn open_external(&self, url: &str) -> io::Result<()> {
        open::that(url)
    }
}

#[cfg(test)]
pub use recording::RecordingNavigator;
