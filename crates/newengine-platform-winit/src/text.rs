/// Host-side copy of the editable text, sent whole after every edit.
///
/// Plain key presses and IME commits both land here. While the IME is
/// composing, key text is part of the composition and is ignored; the
/// commit delivers it.
#[derive(Debug, Default)]
pub struct TextBuffer {
    text: String,
    composing: bool,
}

impl TextBuffer {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Printable text from a key press. Returns `true` if the buffer changed.
    pub fn key_text(&mut self, text: &str) -> bool {
        if self.composing {
            return false;
        }
        let before = self.text.len();
        self.text.extend(text.chars().filter(|c| !c.is_control()));
        self.text.len() != before
    }

    /// Delete the last character. Returns `true` if the buffer changed.
    pub fn backspace(&mut self) -> bool {
        if self.composing {
            return false;
        }
        self.text.pop().is_some()
    }

    /// IME preedit update; an empty preedit ends the composition.
    #[inline]
    pub fn preedit(&mut self, preedit: &str) {
        self.composing = !preedit.is_empty();
    }

    /// IME commit. Returns `true` if the buffer changed.
    pub fn commit(&mut self, text: &str) -> bool {
        self.composing = false;
        self.text.push_str(text);
        !text.is_empty()
    }

    /// IME switched off mid-composition: drop the composition state only.
    #[inline]
    pub fn ime_disabled(&mut self) {
        self.composing = false;
    }
}
