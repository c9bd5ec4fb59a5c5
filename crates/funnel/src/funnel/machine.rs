//! Funnel step state machine.
//!
//! The machine only tracks which step is showing. Transitions not listed in
//! the tables below leave the step unchanged.
//!
//! ```text
//! Landing ──(signed out)──> Login ──> Game
//!    └────(signed in)────────────────> Game ──> Feedback ──> Shipping ──> Success
//! ```

use core::fmt;

/// A screen in the funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    #[default]
    Landing,
    Login,
    Game,
    Feedback,
    Shipping,
    Success,
    Orders,
    Profile,
    Settings,
}

impl Step {
    /// Every step, in funnel order.
    pub const ALL: [Self; 9] = [
        Self::Landing,
        Self::Login,
        Self::Game,
        Self::Feedback,
        Self::Shipping,
        Self::Success,
        Self::Orders,
        Self::Profile,
        Self::Settings,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::Login => "login",
            Self::Game => "game",
            Self::Feedback => "feedback",
            Self::Shipping => "shipping",
            Self::Success => "success",
            Self::Orders => "orders",
            Self::Profile => "profile",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown step: {s}"))
    }
}

/// Forward table.
#[must_use]
pub const fn forward(from: Step, authenticated: bool) -> Option<Step> {
    match from {
        Step::Landing if authenticated => Some(Step::Game),
        Step::Landing => Some(Step::Login),
        Step::Login => Some(Step::Game),
        Step::Game => Some(Step::Feedback),
        Step::Feedback => Some(Step::Shipping),
        Step::Shipping => Some(Step::Success),
        Step::Success | Step::Orders | Step::Profile | Step::Settings => None,
    }
}

/// Backward table.
#[must_use]
pub const fn backward(from: Step) -> Option<Step> {
    match from {
        Step::Login | Step::Game => Some(Step::Landing),
        Step::Feedback | Step::Orders | Step::Profile => Some(Step::Game),
        Step::Shipping => Some(Step::Feedback),
        Step::Settings => Some(Step::Profile),
        Step::Landing | Step::Success => None,
    }
}

/// Something a view asked the machine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Advance,
    Back,
    Navigate(Step),
    Reset,
    ViewOrders,
}

/// Outcome of applying an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Step,
    pub to: Step,
    pub action: Action,
}

impl Transition {
    /// Whether the step changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Current-step holder.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunnelMachine {
    current: Step,
}

impl FunnelMachine {
    /// Start at [`Step::Landing`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: Step::Landing,
        }
    }

    #[must_use]
    pub const fn current(&self) -> Step {
        self.current
    }

    /// Apply an action. Undefined transitions are logged and ignored.
    pub fn apply(&mut self, action: Action, authenticated: bool) -> Transition {
        let from = self.current;
        let to = Self::target(from, action, authenticated);

        match to {
            Some(to) => {
                self.current = to;
                tracing::debug!(%from, %to, ?action, "Funnel transition");
            }
            None => tracing::debug!(%from, ?action, "Ignoring undefined funnel transition"),
        }

        Transition {
            from,
            to: self.current,
            action,
        }
    }

    pub fn advance(&mut self, authenticated: bool) -> Step {
        self.apply(Action::Advance, authenticated).to
    }

    pub fn back(&mut self) -> Step {
        self.apply(Action::Back, false).to
    }

    pub fn navigate(&mut self, step: Step) -> Step {
        self.apply(Action::Navigate(step), false).to
    }

    pub fn reset(&mut self) -> Step {
        self.apply(Action::Reset, false).to
    }

    pub fn view_orders(&mut self) -> Step {
        self.apply(Action::ViewOrders, false).to
    }

    const fn target(from: Step, action: Action, authenticated: bool) -> Option<Step> {
        match action {
            Action::Reset => Some(Step::Landing),
            Action::ViewOrders => Some(Step::Orders),
            // Success is only reachable through the forward path.
            Action::Navigate(Step::Success) => None,
            Action::Navigate(to) => match from {
                Step::Success => match to {
                    Step::Landing | Step::Orders => Some(to),
                    _ => None,
                },
                _ => Some(to),
            },
            Action::Advance => forward(from, authenticated),
            Action::Back => backward(from),
        }
    }
}
