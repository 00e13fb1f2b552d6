//! Pet mood and the colour theme each mood is drawn with.

use serde::{Deserialize, Serialize};

/// Closed set of moods the face can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Surprised,
}

impl Mood {
    /// Map a model-provided label onto a mood. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "neutral" | "idle" => Some(Mood::Neutral),
            "happy" => Some(Mood::Happy),
            "sad" => Some(Mood::Sad),
            "angry" => Some(Mood::Angry),
            "surprised" => Some(Mood::Surprised),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Surprised => "surprised",
        }
    }

    pub fn theme(&self) -> Theme {
        match self {
            Mood::Happy => Theme::new((0x33, 0xff, 0x99), (0x00, 0x4a, 0x2a), (51, 255, 153)),
            Mood::Angry => Theme::new((0xff, 0x33, 0x33), (0x4d, 0x00, 0x00), (255, 51, 51)),
            Mood::Sad => Theme::new((0x00, 0x22, 0x22), (0x00, 0x88, 0x88), (0, 34, 34)),
            Mood::Surprised => Theme::new((0xff, 0xff, 0x33), (0x4d, 0x4d, 0x00), (255, 255, 51)),
            Mood::Neutral => Theme::new((0x00, 0xff, 0xff), (0x00, 0x4a, 0x4a), (0, 255, 255)),
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// RGB triple
pub type Rgb = (u8, u8, u8);

/// Screen colours for a mood: background, face ink and outer glow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Rgb,
    pub ink: Rgb,
    pub glow: Rgb,
}

impl Theme {
    const fn new(background: Rgb, ink: Rgb, glow: Rgb) -> Self {
        Self {
            background,
            ink,
            glow,
        }
    }
}
