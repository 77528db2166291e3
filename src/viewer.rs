/// Caption shown under every fetched image
pub const CAPTION: &str = "Cute doggo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCard {
    pub src: String,
    pub alt: String,
}

/// The display container. Holds at most one image card; the swap operation
/// creates the card on first use and only rewrites its attributes afterwards.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    image: Option<ImageCard>,
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed image with `src`, creating the card if absent.
    /// Returns a reference to the card now on display.
    pub fn swap(&mut self, src: impl Into<String>) -> &ImageCard {
        let card = self.image.get_or_insert_with(|| ImageCard {
            src: String::new(),
            alt: String::new(),
        });
        card.src = src.into();
        card.alt = CAPTION.to_string();
        card
    }

    pub fn image(&self) -> Option<&ImageCard> {
        self.image.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none()
    }
}
