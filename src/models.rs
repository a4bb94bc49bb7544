use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Number of amortization rows shown for a scenario.
pub const PREVIEW_MONTHS: usize = 12;

/// Validated loan parameters, ready to send to the loan service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub amount: f64,
    pub apr: f64,
    pub term_months: u32,
}

/// Opaque scenario identifier as issued by the loan service.
///
/// Numbers and strings are both accepted and written back in the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioId {
    Number(u64),
    Text(String),
}

impl From<&str> for ScenarioId {
    fn from(raw: &str) -> Self {
        match raw.parse::<u64>() {
            Ok(number) => Self::Number(number),
            Err(_) => Self::Text(raw.to_string()),
        }
    }
}

impl ScenarioId {
    /// The id as a single percent-encoded URL path segment.
    pub fn path_segment(&self) -> String {
        urlencoding::encode(&self.to_string()).into_owned()
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub month: u32,
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub remaining_balance: f64,
}

/// A saved (or previewed) loan scenario. Only ever built by decoding a
/// loan service response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanScenario {
    pub id: ScenarioId,
    pub amount: f64,
    pub apr: f64,
    pub term_months: u32,
    pub monthly_payment: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule_preview: Vec<AmortizationEntry>,
}

impl LoanScenario {
    /// The displayed prefix of the schedule, at most [`PREVIEW_MONTHS`] rows.
    pub fn preview(&self) -> &[AmortizationEntry] {
        let len = self.schedule_preview.len().min(PREVIEW_MONTHS);
        &self.schedule_preview[..len]
    }

    /// Month of the first displayed row that breaks the 1, 2, 3... sequence.
    pub fn preview_gap(&self) -> Option<u32> {
        self.preview()
            .iter()
            .zip(1u32..)
            .find(|(entry, expected)| entry.month != *expected)
            .map(|(entry, _)| entry.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Amount,
    Apr,
    Term,
    Server,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::Apr => "apr",
            Self::Term => "term",
            Self::Server => "server",
        }
    }
}

/// Field-level messages. A field without an entry is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(Field::Server, message);
        errors
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}
