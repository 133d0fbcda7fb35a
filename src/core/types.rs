use serde::Serialize;
use thiserror::Error;

/// Parameters for the salary / savings / compound-growth projection.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsInputs {
    pub period_years: u32,
    pub monthly_salary: f64,
    pub savings_rate: f64,
    pub annual_return: f64,
    pub current_year: i32,
}

/// Parameters for the mortgage-versus-rent projection.
#[derive(Debug, Clone, PartialEq)]
pub struct MortgageInputs {
    pub deposit: f64,
    pub mortgage_principal: f64,
    pub mortgage_term_years: u32,
    pub annual_interest_rate: f64,
    pub monthly_rent: f64,
    pub annual_return: f64,
    pub current_year: i32,
}

impl MortgageInputs {
    pub fn property_price(&self) -> f64 {
        self.deposit + self.mortgage_principal
    }
}

/// Monthly quantities derived from the mortgage inputs before any series
/// are built. `monthly_investable` is clamped at zero: when rent exceeds
/// the mortgage payment there is no surplus to invest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageFigures {
    pub property_price: f64,
    pub monthly_payment: f64,
    pub monthly_investable: f64,
}

/// One projected value at the end of a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: f64,
}

/// A named line on a chart: one point per projected year, years contiguous
/// and strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub label: &'static str,
    pub points: Vec<SeriesPoint>,
}

/// All series produced by one projection call. Every series spans the same
/// year range so they can share an x-axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionResult {
    pub series: Vec<TimeSeries>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("invalid parameter {field}: {reason}")]
    InvalidParameter {
        field: &'static str,
        reason: &'static str,
    },
    #[error("interest rate {rate} collapses the amortization denominator")]
    DegenerateRate { rate: f64 },
}
