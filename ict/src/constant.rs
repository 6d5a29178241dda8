use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingKind {
    High,
    Low,
}

impl SwingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

/// Directional bias of a zone, gap, break or pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    Bullish,
    Bearish,
}

impl Bias {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Bullish => Self::Bearish,
            Self::Bearish => Self::Bullish,
        }
    }

    pub fn entry_direction(self) -> EntryDirection {
        match self {
            Self::Bullish => EntryDirection::Long,
            Self::Bearish => EntryDirection::Short,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Bullish,
    Bearish,
    Ranging,
}

impl TrendDirection {
    /// Ranging is treated as bullish wherever a directional filter is needed.
    pub fn effective_bias(self) -> Bias {
        match self {
            Self::Bearish => Bias::Bearish,
            Self::Bullish | Self::Ranging => Bias::Bullish,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureBreakKind {
    Bos,
    Choch,
}

impl StructureBreakKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bos => "bos",
            Self::Choch => "choch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBlockStatus {
    Valid,
    Mitigated,
    Invalidated,
}

impl OrderBlockStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Mitigated => "mitigated",
            Self::Invalidated => "invalidated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FvgStatus {
    Unfilled,
    PartiallyFilled,
    Filled,
    Invalidated,
}

impl FvgStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unfilled => "unfilled",
            Self::PartiallyFilled => "partially_filled",
            Self::Filled => "filled",
            Self::Invalidated => "invalidated",
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, Self::Unfilled | Self::PartiallyFilled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillZoneName {
    London,
    NewYorkAm,
    NewYorkPm,
    Asian,
}

impl KillZoneName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::London => "london",
            Self::NewYorkAm => "new_york_am",
            Self::NewYorkPm => "new_york_pm",
            Self::Asian => "asian",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::London => "London Session",
            Self::NewYorkAm => "New York AM",
            Self::NewYorkPm => "New York PM",
            Self::Asian => "Asian Session",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryDirection {
    Long,
    Short,
}

impl EntryDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySignalKind {
    SweepAndShift,
    OrderblockRetest,
    FvgFill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlSource {
    ConfluenceZone,
    OrderBlock,
    SweepPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TpSource {
    SwingPoint,
    FixedRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceZone {
    Premium,
    Discount,
    Equilibrium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::H1 => "1h",
            Self::H4 => "4h",
            Self::D1 => "1d",
        }
    }

    pub fn seconds(self) -> i64 {
        match self {
            Self::M1 => 60,
            Self::M5 => 300,
            Self::M15 => 900,
            Self::H1 => 3_600,
            Self::H4 => 14_400,
            Self::D1 => 86_400,
        }
    }

    pub fn parse(value: &str) -> Result<Self, DataError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1m" => Ok(Self::M1),
            "5m" => Ok(Self::M5),
            "15m" => Ok(Self::M15),
            "1h" => Ok(Self::H1),
            "4h" => Ok(Self::H4),
            "1d" => Ok(Self::D1),
            _ => Err(DataError::InvalidTimeframe(value.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("invalid timeframe: {0}")]
    InvalidTimeframe(String),
    #[error("invalid datetime: {0}")]
    InvalidDatetime(String),
    #[error("invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: String },
    #[error("candle time not increasing at index {index}: {previous} -> {current}")]
    NonMonotonicTime {
        index: usize,
        previous: i64,
        current: i64,
    },
    #[error("missing timeframe: {0}")]
    MissingTimeframe(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
