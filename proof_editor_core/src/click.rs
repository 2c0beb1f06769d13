//! Single/double click disambiguation
//!
//! Driven by a logical clock so gestures replay deterministically.

/// Logical time supplied by the host (milliseconds for browser hosts)
pub type Tick = u64;

/// Default window for the second click of a double click
pub const DEFAULT_DOUBLE_CLICK_WINDOW: Tick = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickState {
    Idle,
    AwaitingSecondClick { deadline: Tick },
}

/// What a mouse-down (or the passage of time) turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// First click of a possible pair; the outcome is not known yet
    Pending,
    /// The window elapsed without a second click
    Single,
    /// A second click landed inside the window
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickDetector {
    window: Tick,
    state: ClickState,
}

impl ClickDetector {
    pub fn new(window: Tick) -> Self {
        Self {
            window,
            state: ClickState::Idle,
        }
    }

    pub fn state(&self) -> ClickState {
        self.state
    }

    pub fn window(&self) -> Tick {
        self.window
    }

    /// Register a mouse-down at `now`
    pub fn press(&mut self, now: Tick) -> Gesture {
        match self.state {
            ClickState::AwaitingSecondClick { deadline } if now < deadline => {
                self.state = ClickState::Idle;
                Gesture::Double
            }
            // Idle, or the previous window lapsed without anyone ticking
            _ => {
                self.state = ClickState::AwaitingSecondClick {
                    deadline: now.saturating_add(self.window),
                };
                Gesture::Pending
            }
        }
    }

    /// Advance the clock; reports a lapsed single click once
    pub fn tick(&mut self, now: Tick) -> Option<Gesture> {
        match self.state {
            ClickState::AwaitingSecondClick { deadline } if now >= deadline => {
                self.state = ClickState::Idle;
                Some(Gesture::Single)
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = ClickState::Idle;
    }
}

impl Default for ClickDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_CLICK_WINDOW)
    }
}
