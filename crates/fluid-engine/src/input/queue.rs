/// DOM key codes the installation reacts to.
pub const KEY_BACKSPACE: u32 = 8;
pub const KEY_SPACE: u32 = 32;
pub const KEY_DELETE: u32 = 46;

/// Input event types the installation understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A click began at canvas coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// The cursor moved to canvas coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    /// A key was released.
    KeyReleased { key_code: u32 },
}

/// Authoring commands bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    ToggleEditMode,
    Undo,
}

impl EditCommand {
    /// Space toggles edit mode; Delete and Backspace undo.
    pub fn from_key(key_code: u32) -> Option<Self> {
        match key_code {
            KEY_SPACE => Some(EditCommand::ToggleEditMode),
            KEY_DELETE | KEY_BACKSPACE => Some(EditCommand::Undo),
            _ => None,
        }
    }
}

/// A queue of input events.
/// The host pushes events as they happen; the driver drains them each tick.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain_in_order() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerDown { x: 10.0, y: 20.0 });
        q.push(InputEvent::KeyReleased { key_code: KEY_SPACE });
        assert_eq!(q.len(), 2);

        let events = q.drain();
        assert_eq!(
            events,
            vec![
                InputEvent::PointerDown { x: 10.0, y: 20.0 },
                InputEvent::KeyReleased { key_code: KEY_SPACE },
            ]
        );
        assert!(q.is_empty());
    }

    #[test]
    fn key_bindings() {
        assert_eq!(EditCommand::from_key(KEY_SPACE), Some(EditCommand::ToggleEditMode));
        assert_eq!(EditCommand::from_key(KEY_DELETE), Some(EditCommand::Undo));
        assert_eq!(EditCommand::from_key(KEY_BACKSPACE), Some(EditCommand::Undo));
        assert_eq!(EditCommand::from_key(65), None);
    }
}
