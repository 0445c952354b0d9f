/// Player input in playfield coordinates. Each game decides what it means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A touch/click began at playfield coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// A touch/click ended at playfield coordinates (x, y).
    PointerUp { x: f32, y: f32 },
    /// A touch/cursor moved to playfield coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    /// A key was pressed.
    KeyDown { key_code: u32 },
    /// A key was released.
    KeyUp { key_code: u32 },
    /// A discrete UI element was chosen: grid cell, card, or answer button.
    Select { index: u32 },
    /// Anything else the page wants to forward; `kind` picks the meaning.
    Custom { kind: u32, a: f32, b: f32, c: f32 },
}

/// DOM `keyCode` values the games react to.
pub mod key_code {
    pub const ARROW_LEFT: u32 = 37;
    pub const ARROW_RIGHT: u32 = 39;
    pub const ESCAPE: u32 = 27;
}

/// Input gathered between two browser frames.
/// The bridge pushes into it; the runner hands it to the first fixed step of
/// the frame and then drains it.
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

    /// Take every pending event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    /// Most recent horizontal pointer position in this batch, if any.
    pub fn last_pointer_x(&self) -> Option<f32> {
        self.events.iter().rev().find_map(|e| match *e {
            InputEvent::PointerMove { x, .. } | InputEvent::PointerDown { x, .. } => Some(x),
            _ => None,
        })
    }

    /// Indices chosen through `Select`, in arrival order.
    pub fn selections(&self) -> impl Iterator<Item = usize> + '_ {
        self.events.iter().filter_map(|e| match *e {
            InputEvent::Select { index } => Some(index as usize),
            _ => None,
        })
    }

    /// Check if there are pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<InputEvent> for InputQueue {
    fn from_iter<I: IntoIterator<Item = InputEvent>>(iter: I) -> Self {
        let mut q = InputQueue::new();
        for e in iter {
            q.push(e);
        }
        q
    }
}
