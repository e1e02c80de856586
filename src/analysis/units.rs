//! Unit normalization for traffic-generator report lines.
//!
//! Generators tag transfer sizes and bandwidths with whatever unit kept the
//! number readable (KBytes one interval, MBytes the next). Everything is
//! converted to a single canonical pair — megabytes and megabits per second —
//! before any record leaves ingestion.

/// Transfer-size unit tags as they appear in report lines.
///
/// Sizes use binary factors (1 MByte = 1024 KBytes), matching the tool that
/// produces the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Bytes,
    KBytes,
    MBytes,
    GBytes,
}

impl SizeUnit {
    /// Parse a unit tag token, e.g. "KBytes".
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Bytes" => Some(SizeUnit::Bytes),
            "KBytes" => Some(SizeUnit::KBytes),
            "MBytes" => Some(SizeUnit::MBytes),
            "GBytes" => Some(SizeUnit::GBytes),
            _ => None,
        }
    }

    /// Conversion factor from this unit to megabytes.
    pub fn to_mbytes_factor(self) -> f64 {
        match self {
            SizeUnit::Bytes => 1.0 / (1024.0 * 1024.0),
            SizeUnit::KBytes => 1.0 / 1024.0,
            SizeUnit::MBytes => 1.0,
            SizeUnit::GBytes => 1024.0,
        }
    }
}

/// Bandwidth unit tags as they appear in report lines.
///
/// Rates use decimal factors (1 Mbit = 1000 Kbits), again matching the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateUnit {
    BitsPerSec,
    KbitsPerSec,
    MbitsPerSec,
    GbitsPerSec,
}

impl RateUnit {
    /// Parse a unit tag token, e.g. "Mbits/sec".
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "bits/sec" => Some(RateUnit::BitsPerSec),
            "Kbits/sec" => Some(RateUnit::KbitsPerSec),
            "Mbits/sec" => Some(RateUnit::MbitsPerSec),
            "Gbits/sec" => Some(RateUnit::GbitsPerSec),
            _ => None,
        }
    }

    /// Conversion factor from this unit to megabits per second.
    pub fn to_mbits_factor(self) -> f64 {
        match self {
            RateUnit::BitsPerSec => 1.0 / 1_000_000.0,
            RateUnit::KbitsPerSec => 1.0 / 1000.0,
            RateUnit::MbitsPerSec => 1.0,
            RateUnit::GbitsPerSec => 1000.0,
        }
    }
}

/// Normalize a tagged transfer size to megabytes.
pub fn normalize_size(value: f64, tag: &str) -> Option<f64> {
    SizeUnit::from_tag(tag).map(|unit| value * unit.to_mbytes_factor())
}

/// Normalize a tagged bandwidth to megabits per second.
pub fn normalize_rate(value: f64, tag: &str) -> Option<f64> {
    RateUnit::from_tag(tag).map(|unit| value * unit.to_mbits_factor())
}
