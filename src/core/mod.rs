mod engine;
mod solver;
mod types;

pub use engine::{
    CASH_SAVINGS_SERIES, INVESTED_REMAINDER_SERIES, INVESTED_SAVINGS_SERIES, MORTGAGE_SERIES,
    PRINCIPAL_PAID_SERIES, RENT_SERIES, SALARY_SERIES, monthly_mortgage_payment, mortgage_figures,
    principal_paid_per_year, project_mortgage_vs_rent, project_simple_savings,
};
pub use solver::{GoalSolveConfig, GoalSolveIteration, GoalSolveResult, GoalType, solve_goal};
pub use types::{
    MortgageFigures, MortgageInputs, ProjectionError, ProjectionResult, SavingsInputs, SeriesPoint,
    TimeSeries,
};
