use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column order of the CSV export.
pub const CSV_COLUMNS: [&str; 15] = [
    "id",
    "name",
    "vintage",
    "country",
    "winery",
    "grapes",
    "rating",
    "price",
    "acidity",
    "intensity",
    "sweetness",
    "tannin",
    "flavor_rank1",
    "flavor_rank2",
    "flavor_rank3",
];

/// Vintage as reported by the API: a year, or a label such as `N.V.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Vintage {
    Year(i64),
    Label(String),
}

impl Vintage {
    /// Integers and numeric strings become a `Year`; any other number or
    /// string is kept as a `Label`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(match n.as_i64() {
                Some(year) => Self::Year(year),
                None => Self::Label(n.to_string()),
            }),
            Value::String(s) => Some(match s.trim().parse() {
                Ok(year) => Self::Year(year),
                Err(_) => Self::Label(s.clone()),
            }),
            _ => None,
        }
    }

    pub fn year(&self) -> Option<i64> {
        match self {
            Self::Year(year) => Some(*year),
            Self::Label(_) => None,
        }
    }
}

impl From<i64> for Vintage {
    fn from(year: i64) -> Self {
        Self::Year(year)
    }
}

impl fmt::Display for Vintage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(year) => write!(f, "{}", year),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// Flat, analysis-ready record built from one search match plus its detail responses.
///
/// Every field is nullable: an absent source path is a `None`, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WineRecord {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub vintage: Option<Vintage>,
    pub country: Option<String>,
    pub winery: Option<String>,
    /// Grape names joined with `;`
    pub grapes: Option<String>,
    pub rating: Option<f64>,
    pub price: Option<f64>,
    pub reviews_count: Option<u64>,
    pub acidity: Option<f64>,
    pub intensity: Option<f64>,
    pub sweetness: Option<f64>,
    pub tannin: Option<f64>,
    pub flavor_rank1: Option<String>,
    pub flavor_rank2: Option<String>,
    pub flavor_rank3: Option<String>,
}

impl WineRecord {
    /// Clear every taste-derived field.
    pub fn clear_taste_profile(&mut self) {
        self.acidity = None;
        self.intensity = None;
        self.sweetness = None;
        self.tannin = None;
        self.flavor_rank1 = None;
        self.flavor_rank2 = None;
        self.flavor_rank3 = None;
    }

    /// Set the three flavor ranks from an ordered list; missing ranks become `None`.
    pub fn set_flavor_ranks(&mut self, ranked: Vec<Option<String>>) {
        let mut ranked = ranked.into_iter();
        self.flavor_rank1 = ranked.next().flatten();
        self.flavor_rank2 = ranked.next().flatten();
        self.flavor_rank3 = ranked.next().flatten();
    }

    /// Cells in `CSV_COLUMNS` order; nulls are empty cells.
    ///
    /// Floats always keep a fractional part (`4.0`, not `4`).
    pub fn csv_row(&self) -> Vec<String> {
        fn cell<T: ToString>(value: Option<&T>) -> String {
            value.map(ToString::to_string).unwrap_or_default()
        }
        fn float(value: Option<f64>) -> String {
            value.map(|v| format!("{:?}", v)).unwrap_or_default()
        }

        vec![
            cell(self.id.as_ref()),
            cell(self.name.as_ref()),
            cell(self.vintage.as_ref()),
            cell(self.country.as_ref()),
            cell(self.winery.as_ref()),
            cell(self.grapes.as_ref()),
            float(self.rating),
            float(self.price),
            float(self.acidity),
            float(self.intensity),
            float(self.sweetness),
            float(self.tannin),
            cell(self.flavor_rank1.as_ref()),
            cell(self.flavor_rank2.as_ref()),
            cell(self.flavor_rank3.as_ref()),
        ]
    }
}

/// One persisted output unit: `{"wines": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinePage {
    #[serde(default)]
    pub wines: Vec<WineRecord>,
}

impl WinePage {
    pub fn new(wines: Vec<WineRecord>) -> Self {
        Self { wines }
    }
}
