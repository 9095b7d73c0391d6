//! Tracking Timeline

use crate::orders::OrderStatus;

/// Statuses on the progress line, in order, with their labels.
const STEPS: [(OrderStatus, &str); 5] = [
    (OrderStatus::Pending, "Order Placed"),
    (OrderStatus::PickedUp, "Picked Up"),
    (OrderStatus::Processing, "Processing"),
    (OrderStatus::Ready, "Ready"),
    (OrderStatus::Delivered, "Delivered"),
];

/// Progress of a single timeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// Already passed.
    Completed,

    /// The order's current status.
    Current,

    /// Not reached yet.
    Upcoming,
}

/// One step of the progress line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineStep {
    /// Status this step represents.
    pub status: OrderStatus,

    /// Display label.
    pub label: &'static str,

    /// Progress of this step.
    pub state: StepState,
}

/// Progress line for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    steps: [TimelineStep; 5],
    cancelled: bool,
}

impl Timeline {
    /// Build the timeline for an order's current status.
    ///
    /// Cancelled orders are not on the progress line, so every step is upcoming.
    pub fn for_status(status: OrderStatus) -> Self {
        let current = STEPS.iter().position(|(step, _)| *step == status);

        let mut position = 0_usize;

        let steps = STEPS.map(|(step, label)| {
            let state = match current {
                Some(current) if position < current => StepState::Completed,
                Some(current) if position == current => StepState::Current,
                _ => StepState::Upcoming,
            };

            position += 1;

            TimelineStep {
                status: step,
                label,
                state,
            }
        });

        Self {
            steps,
            cancelled: status == OrderStatus::Cancelled,
        }
    }

    /// Steps in progress order.
    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    /// Check if the order was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Number of steps completed or current.
    pub fn reached(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.state != StepState::Upcoming)
            .count()
    }
}
