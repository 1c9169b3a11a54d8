//! Display descriptors for statuses and priorities.

use crossterm::style::{Color, Stylize};

use crate::model::{Priority, Status};

/// Color family of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Blue,
    Yellow,
    Green,
    Grey,
    Slate,
    Neutral,
    Orange,
    Red,
}

impl Tone {
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Blue => Color::Blue,
            Self::Yellow => Color::Yellow,
            Self::Green => Color::Green,
            Self::Grey | Self::Slate => Color::DarkGrey,
            Self::Neutral => Color::Reset,
            Self::Orange => Color::DarkYellow,
            Self::Red => Color::Red,
        }
    }
}

/// Label, color and icon shown for an enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub label: &'static str,
    pub tone: Tone,
    pub icon: &'static str,
}

#[must_use]
pub const fn status_descriptor(status: Status) -> Descriptor {
    match status {
        Status::Open => Descriptor {
            label: "Open",
            tone: Tone::Blue,
            icon: "○",
        },
        Status::InProgress => Descriptor {
            label: "In Progress",
            tone: Tone::Yellow,
            icon: "◐",
        },
        Status::Done => Descriptor {
            label: "Done",
            tone: Tone::Green,
            icon: "✓",
        },
        Status::Closed => Descriptor {
            label: "Closed",
            tone: Tone::Grey,
            icon: "✗",
        },
    }
}

#[must_use]
pub const fn priority_descriptor(priority: Priority) -> Descriptor {
    match priority {
        Priority::Low => Descriptor {
            label: "Low",
            tone: Tone::Slate,
            icon: "▽",
        },
        Priority::Medium => Descriptor {
            label: "Medium",
            tone: Tone::Neutral,
            icon: "◇",
        },
        Priority::High => Descriptor {
            label: "High",
            tone: Tone::Orange,
            icon: "△",
        },
        Priority::Urgent => Descriptor {
            label: "Urgent",
            tone: Tone::Red,
            icon: "⬆",
        },
    }
}

/// Apply the tone's color when `use_color` is set.
#[must_use]
pub fn paint(text: &str, tone: Tone, use_color: bool) -> String {
    if !use_color || tone == Tone::Neutral {
        return text.to_string();
    }
    text.with(tone.color()).to_string()
}
