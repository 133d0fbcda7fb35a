use super::types::{
    MortgageFigures, MortgageInputs, ProjectionError, ProjectionResult, SavingsInputs, SeriesPoint,
    TimeSeries,
};

pub const SALARY_SERIES: &str = "Annual salary";
pub const CASH_SAVINGS_SERIES: &str = "Savings (cash)";
pub const INVESTED_SAVINGS_SERIES: &str = "Savings (invested)";
pub const MORTGAGE_SERIES: &str = "Annual mortgage";
pub const PRINCIPAL_PAID_SERIES: &str = "Principal paid";
pub const RENT_SERIES: &str = "Annual rent";
pub const INVESTED_REMAINDER_SERIES: &str = "Remainder (invested)";

const MONTHS_PER_YEAR: f64 = 12.0;

/// Horizons beyond this are rejected rather than projected; keeps the
/// growth-factor exponents in a range where the arithmetic stays meaningful.
const MAX_HORIZON_YEARS: u32 = 200;

/// Projects a flat salary, linearly accumulated cash savings, and invested
/// savings over `period_years`, one point per year starting at
/// `current_year + 1`. A zero-year horizon yields three empty series.
pub fn project_simple_savings(inputs: &SavingsInputs) -> Result<ProjectionResult, ProjectionError> {
    validate_savings(inputs)?;

    let horizon = inputs.period_years as usize;
    let mut salary = Vec::with_capacity(horizon);
    let mut cash = Vec::with_capacity(horizon);
    let mut invested = Vec::with_capacity(horizon);

    let annual_salary = inputs.monthly_salary * MONTHS_PER_YEAR;
    for elapsed in 1..=inputs.period_years {
        let year = inputs.current_year + elapsed as i32;
        let saved = inputs.monthly_salary * inputs.savings_rate * MONTHS_PER_YEAR * elapsed as f64;
        // The invested line scales the whole accumulated-cash figure by one
        // growth factor; it is not a deposit-by-deposit annuity.
        let grown = (1.0 + inputs.annual_return).powi(elapsed as i32)
            * inputs.monthly_salary
            * MONTHS_PER_YEAR
            * inputs.savings_rate
            * elapsed as f64;

        salary.push(SeriesPoint {
            year,
            value: annual_salary,
        });
        cash.push(SeriesPoint { year, value: saved });
        invested.push(SeriesPoint { year, value: grown });
    }

    Ok(ProjectionResult {
        series: vec![
            TimeSeries {
                label: SALARY_SERIES,
                points: salary,
            },
            TimeSeries {
                label: CASH_SAVINGS_SERIES,
                points: cash,
            },
            TimeSeries {
                label: INVESTED_SAVINGS_SERIES,
                points: invested,
            },
        ],
    })
}

/// Fixed monthly payment on an amortized loan, rounded to the nearest
/// currency unit. A zero interest rate uses the `principal / payments`
/// limit of the annuity formula instead of dividing zero by zero.
pub fn monthly_mortgage_payment(
    principal: f64,
    annual_interest_rate: f64,
    term_years: u32,
) -> Result<f64, ProjectionError> {
    require_non_negative("mortgage_principal", principal)?;
    require_non_negative("annual_interest_rate", annual_interest_rate)?;
    require_term("mortgage_term_years", term_years)?;

    let payments = term_years * 12;
    if annual_interest_rate == 0.0 {
        return Ok((principal / payments as f64).round());
    }

    let monthly_rate = annual_interest_rate / 12.0;
    let growth = (1.0 + monthly_rate).powi(payments as i32);
    let denominator = growth - 1.0;
    if denominator == 0.0 {
        return Err(ProjectionError::DegenerateRate {
            rate: annual_interest_rate,
        });
    }

    Ok((principal * monthly_rate * growth / denominator).round())
}

/// Cumulative principal repaid at the end of each year of the term, rounded
/// per year. Uses the remaining-balance formula with the annual rate
/// applied directly; the payment formula above compounds monthly, and that
/// mismatch is part of the model rather than something to reconcile.
pub fn principal_paid_per_year(
    principal: f64,
    annual_interest_rate: f64,
    term_years: u32,
) -> Result<Vec<(u32, f64)>, ProjectionError> {
    require_non_negative("mortgage_principal", principal)?;
    require_non_negative("annual_interest_rate", annual_interest_rate)?;
    require_term("mortgage_term_years", term_years)?;

    if annual_interest_rate != 0.0
        && (1.0 + annual_interest_rate).powi(term_years as i32) == 1.0
    {
        return Err(ProjectionError::DegenerateRate {
            rate: annual_interest_rate,
        });
    }

    let mut cumulative = Vec::with_capacity(term_years as usize);
    let mut paid = 0.0;
    for year in 1..=term_years {
        paid += remaining_balance(principal, annual_interest_rate, term_years, year - 1)
            - remaining_balance(principal, annual_interest_rate, term_years, year);
        cumulative.push((year, paid.round()));
    }
    Ok(cumulative)
}

fn remaining_balance(principal: f64, annual_rate: f64, term_years: u32, elapsed: u32) -> f64 {
    if annual_rate == 0.0 {
        return principal * (term_years - elapsed) as f64 / term_years as f64;
    }
    let growth_full = (1.0 + annual_rate).powi(term_years as i32);
    let growth_elapsed = (1.0 + annual_rate).powi(elapsed as i32);
    principal * (growth_full - growth_elapsed) / (growth_full - 1.0)
}

/// Derives the property price, monthly payment, and investable surplus for
/// a mortgage parameter set. Exposed separately so callers can display the
/// payment without building the full projection.
pub fn mortgage_figures(inputs: &MortgageInputs) -> Result<MortgageFigures, ProjectionError> {
    validate_mortgage(inputs)?;

    let monthly_payment = monthly_mortgage_payment(
        inputs.mortgage_principal,
        inputs.annual_interest_rate,
        inputs.mortgage_term_years,
    )?;

    Ok(MortgageFigures {
        property_price: inputs.property_price(),
        monthly_payment,
        monthly_investable: (monthly_payment - inputs.monthly_rent).max(0.0),
    })
}

/// Projects four series over the mortgage term: cumulative mortgage outflow
/// (negative), cumulative principal repaid, cumulative rent outflow
/// (negative), and the deposit-plus-surplus invested remainder.
pub fn project_mortgage_vs_rent(
    inputs: &MortgageInputs,
) -> Result<ProjectionResult, ProjectionError> {
    let figures = mortgage_figures(inputs)?;
    let principal_paid = principal_paid_per_year(
        inputs.mortgage_principal,
        inputs.annual_interest_rate,
        inputs.mortgage_term_years,
    )?;

    let horizon = inputs.mortgage_term_years as usize;
    let mut mortgage = Vec::with_capacity(horizon);
    let mut paid = Vec::with_capacity(horizon);
    let mut rent = Vec::with_capacity(horizon);
    let mut invested = Vec::with_capacity(horizon);

    for elapsed in 1..=inputs.mortgage_term_years {
        let year = inputs.current_year + elapsed as i32;
        let months = MONTHS_PER_YEAR * elapsed as f64;

        mortgage.push(SeriesPoint {
            year,
            value: -(figures.monthly_payment * months),
        });
        paid.push(SeriesPoint {
            year,
            value: principal_paid[elapsed as usize - 1].1,
        });
        rent.push(SeriesPoint {
            year,
            value: -(inputs.monthly_rent * months),
        });

        // The deposit and all surplus saved before this year compound once
        // per elapsed year; the current year's surplus is added flat.
        let contributed =
            figures.monthly_investable * MONTHS_PER_YEAR * (elapsed - 1) as f64 + inputs.deposit;
        let grown = (1.0 + inputs.annual_return).powi(elapsed as i32) * contributed
            + figures.monthly_investable * MONTHS_PER_YEAR;
        invested.push(SeriesPoint {
            year,
            value: grown.round(),
        });
    }

    Ok(ProjectionResult {
        series: vec![
            TimeSeries {
                label: MORTGAGE_SERIES,
                points: mortgage,
            },
            TimeSeries {
                label: PRINCIPAL_PAID_SERIES,
                points: paid,
            },
            TimeSeries {
                label: RENT_SERIES,
                points: rent,
            },
            TimeSeries {
                label: INVESTED_REMAINDER_SERIES,
                points: invested,
            },
        ],
    })
}

fn validate_savings(inputs: &SavingsInputs) -> Result<(), ProjectionError> {
    require_horizon("period_years", inputs.period_years)?;
    require_non_negative("monthly_salary", inputs.monthly_salary)?;
    require_fraction("savings_rate", inputs.savings_rate)?;
    require_return("annual_return", inputs.annual_return)
}

fn validate_mortgage(inputs: &MortgageInputs) -> Result<(), ProjectionError> {
    require_non_negative("deposit", inputs.deposit)?;
    require_non_negative("mortgage_principal", inputs.mortgage_principal)?;
    require_term("mortgage_term_years", inputs.mortgage_term_years)?;
    require_non_negative("annual_interest_rate", inputs.annual_interest_rate)?;
    require_non_negative("monthly_rent", inputs.monthly_rent)?;
    require_return("annual_return", inputs.annual_return)
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ProjectionError> {
    if !value.is_finite() {
        return Err(ProjectionError::InvalidParameter {
            field,
            reason: "must be a finite number",
        });
    }
    if value < 0.0 {
        return Err(ProjectionError::InvalidParameter {
            field,
            reason: "must be >= 0",
        });
    }
    Ok(())
}

fn require_fraction(field: &'static str, value: f64) -> Result<(), ProjectionError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ProjectionError::InvalidParameter {
            field,
            reason: "must be between 0 and 1",
        });
    }
    Ok(())
}

fn require_return(field: &'static str, value: f64) -> Result<(), ProjectionError> {
    if !value.is_finite() || value < -1.0 {
        return Err(ProjectionError::InvalidParameter {
            field,
            reason: "must be a finite fraction >= -1",
        });
    }
    Ok(())
}

fn require_term(field: &'static str, value: u32) -> Result<(), ProjectionError> {
    if value == 0 {
        return Err(ProjectionError::InvalidParameter {
            field,
            reason: "must be > 0",
        });
    }
    require_horizon(field, value)
}

fn require_horizon(field: &'static str, value: u32) -> Result<(), ProjectionError> {
    if value > MAX_HORIZON_YEARS {
        return Err(ProjectionError::InvalidParameter {
            field,
            reason: "must be at most 200 years",
        });
    }
    Ok(())
}
