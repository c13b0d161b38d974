use crate::api::MediaAttachment;

/// The one media item currently shown enlarged, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerSelection {
    current: Option<MediaAttachment>,
}

impl ViewerSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, media: MediaAttachment) {
        self.current = Some(media);
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&MediaAttachment> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(url: &str) -> MediaAttachment {
        MediaAttachment {
            url: url.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_select_replaces_previous() {
        let mut viewer = ViewerSelection::new();
        viewer.select(media("https://files.example/a.png"));
        viewer.select(media("https://files.example/b.png"));
        assert_eq!(viewer.current().unwrap().url, "https://files.example/b.png");
    }

    #[test]
    fn test_dismiss_clears() {
        let mut viewer = ViewerSelection::new();
        viewer.select(media("https://files.example/a.png"));
        viewer.dismiss();
        assert!(!viewer.is_open());
        viewer.dismiss();
        assert!(viewer.current().is_none());
    }
}
