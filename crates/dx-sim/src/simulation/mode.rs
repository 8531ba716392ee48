use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Digitalization maturity level applied to a piece of paperwork.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Plain,
    Smart,
    Ai,
}

impl Mode {
    pub const fn ordered() -> [Self; 3] {
        [Self::Plain, Self::Smart, Self::Ai]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Smart => "smart",
            Self::Ai => "ai",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Plain => "Plain (digitized forms)",
            Self::Smart => "Smart (data reuse)",
            Self::Ai => "AI (full automation)",
        }
    }

    /// How much of the administration domain's maturity reaches dependent domains.
    pub const fn efficiency(self) -> f64 {
        match self {
            Self::Plain => 0.0,
            Self::Smart => 0.6,
            Self::Ai => 1.0,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "plain" => Some(Self::Plain),
            "smart" => Some(Self::Smart),
            "ai" => Some(Self::Ai),
            _ => None,
        }
    }

    /// Unknown values fall back to `Plain`, i.e. no automation.
    pub fn parse_lenient(raw: &str) -> Self {
        Self::parse(raw).unwrap_or(Self::Plain)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// What the user is looking at. `Summary` compares modes side by side and is
/// never fed to the classifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Plain,
    Smart,
    Ai,
    Summary,
}

impl View {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "summary" => Some(Self::Summary),
            other => Mode::parse(other).map(Self::from),
        }
    }

    /// The mode to classify with; `None` for the summary view.
    pub const fn mode(self) -> Option<Mode> {
        match self {
            Self::Plain => Some(Mode::Plain),
            Self::Smart => Some(Mode::Smart),
            Self::Ai => Some(Mode::Ai),
            Self::Summary => None,
        }
    }
}

impl From<Mode> for View {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Plain => Self::Plain,
            Mode::Smart => Self::Smart,
            Mode::Ai => Self::Ai,
        }
    }
}

/// One value per mode, as used by the dataset's rate and cost tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeTable<T> {
    #[serde(default)]
    pub plain: T,
    #[serde(default)]
    pub smart: T,
    #[serde(default)]
    pub ai: T,
}

impl<T> ModeTable<T> {
    pub fn new(plain: T, smart: T, ai: T) -> Self {
        Self { plain, smart, ai }
    }

    pub fn get(&self, mode: Mode) -> &T {
        match mode {
            Mode::Plain => &self.plain,
            Mode::Smart => &self.smart,
            Mode::Ai => &self.ai,
        }
    }

    pub fn from_fn(mut build: impl FnMut(Mode) -> T) -> Self {
        Self {
            plain: build(Mode::Plain),
            smart: build(Mode::Smart),
            ai: build(Mode::Ai),
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> ModeTable<U> {
        ModeTable {
            plain: f(&self.plain),
            smart: f(&self.smart),
            ai: f(&self.ai),
        }
    }
}

/// Mode selected per domain; domains without an entry run in `Plain`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainModes(BTreeMap<String, Mode>);

impl DomainModes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every listed domain set to the same mode.
    pub fn uniform<'a>(domain_ids: impl IntoIterator<Item = &'a str>, mode: Mode) -> Self {
        Self(
            domain_ids
                .into_iter()
                .map(|id| (id.to_string(), mode))
                .collect(),
        )
    }

    pub fn with(mut self, domain_id: impl Into<String>, mode: Mode) -> Self {
        self.set(domain_id, mode);
        self
    }

    pub fn set(&mut self, domain_id: impl Into<String>, mode: Mode) {
        self.0.insert(domain_id.into(), mode);
    }

    pub fn mode_of(&self, domain_id: &str) -> Mode {
        self.0.get(domain_id).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Mode)> {
        self.0.iter().map(|(id, mode)| (id.as_str(), *mode))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Mode)> for DomainModes {
    fn from_iter<I: IntoIterator<Item = (String, Mode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
