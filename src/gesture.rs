/// Horizontal distance a release must exceed to commit a swipe.
pub const SWIPE_THRESHOLD: f64 = 100.0;
/// Horizontal distance past which the live like/pass indicator appears.
pub const INDICATOR_THRESHOLD: f64 = 50.0;
/// Degrees of card rotation per pixel of horizontal drag.
pub const ROTATION_FACTOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Dragged right past the threshold.
    Like,
    /// Dragged left past the threshold.
    Pass,
}

/// Transient state of a drag on the top card. Created on pointer-down,
/// dropped on release or cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub pointer_id: i32,
    start_x: f64,
    start_y: f64,
    current_x: f64,
    current_y: f64,
}

impl DragState {
    pub fn new(pointer_id: i32, x: f64, y: f64) -> Self {
        Self {
            pointer_id,
            start_x: x,
            start_y: y,
            current_x: x,
            current_y: y,
        }
    }

    pub fn update(&mut self, x: f64, y: f64) {
        self.current_x = x;
        self.current_y = y;
    }

    pub fn delta_x(&self) -> f64 {
        self.current_x - self.start_x
    }

    pub fn delta_y(&self) -> f64 {
        self.current_y - self.start_y
    }

    /// Outcome if the pointer were released now. Vertical travel never
    /// participates in the classification.
    pub fn classify_release(&self) -> Option<SwipeOutcome> {
        classify(self.delta_x())
    }

    /// Directional indicator to show mid-drag, without committing.
    pub fn indicator(&self) -> Option<SwipeOutcome> {
        let dx = self.delta_x();
        if dx > INDICATOR_THRESHOLD {
            Some(SwipeOutcome::Like)
        } else if dx < -INDICATOR_THRESHOLD {
            Some(SwipeOutcome::Pass)
        } else {
            None
        }
    }
}

pub fn classify(delta_x: f64) -> Option<SwipeOutcome> {
    if delta_x > SWIPE_THRESHOLD {
        Some(SwipeOutcome::Like)
    } else if delta_x < -SWIPE_THRESHOLD {
        Some(SwipeOutcome::Pass)
    } else {
        None
    }
}

/// Inline style for the dragged card: translation, proportional rotation,
/// and an eased snap-back once the pointer is released.
pub fn card_transform(delta_x: f64, delta_y: f64, dragging: bool) -> String {
    format!(
        "transform: translate({:.1}px, {:.1}px) rotate({:.2}deg); transition: {};",
        delta_x,
        delta_y,
        delta_x * ROTATION_FACTOR,
        if dragging {
            "transform 0s"
        } else {
            "transform 0.25s ease"
        }
    )
}
