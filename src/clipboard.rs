/// The clipboard collaborator. Only text-editing widgets reach for it; the
/// frame pipeline never does.
pub trait Clipboard {
    fn get_text(&mut self) -> Option<String>;

    fn set_text(&mut self, text: &str);
}

/// A process-local clipboard, for tests and headless use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.contents.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.contents = Some(text.to_owned());
    }
}
