use serde::Serialize;

use super::engine::{INVESTED_SAVINGS_SERIES, project_simple_savings};
use super::types::{ProjectionError, SavingsInputs};

/// Which savings parameter the solver searches over. Both leave the final
/// invested-savings value monotone non-decreasing in the candidate, which
/// is what makes the bounded bisection below valid.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalType {
    RequiredSavingsRate,
    RequiredAnnualReturn,
}

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub goal_type: GoalType,
    pub target_amount: f64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub projected_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveResult {
    pub goal_type: GoalType,
    pub target_amount: f64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub solved_value: Option<f64>,
    pub achieved_amount: Option<f64>,
    pub iterations: Vec<GoalSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// Finds the smallest candidate value within the search bounds for which the
/// invested-savings series reaches `target_amount` by the final projected
/// year, by bisection on the candidate interval.
pub fn solve_goal(
    inputs: &SavingsInputs,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, ProjectionError> {
    validate_config(inputs, config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let low_amount = evaluate_candidate(inputs, config.goal_type, config.search_min)?;
    let high_amount = evaluate_candidate(inputs, config.goal_type, config.search_max)?;

    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    if low_amount + 1e-9 >= config.target_amount {
        solved_value = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Already meets the target at the lower search bound.".to_string();
    } else if high_amount + 1e-9 < config.target_amount {
        feasible = false;
        message = "No feasible value found within the search bounds.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let projected = evaluate_candidate(inputs, config.goal_type, mid)?;
            iterations.push(GoalSolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_value: mid,
                projected_amount: projected,
            });

            if projected + 1e-9 >= config.target_amount {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                solved_value = Some(hi);
                break;
            }
        }
        if solved_value.is_none() {
            solved_value = Some(hi);
        }
        feasible = true;
        message = if converged {
            "Solved the savings goal.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate.".to_string()
        };
    }

    let achieved_amount = match solved_value {
        Some(value) => Some(evaluate_candidate(inputs, config.goal_type, value)?),
        None => None,
    };

    Ok(GoalSolveResult {
        goal_type: config.goal_type,
        target_amount: config.target_amount,
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_value,
        achieved_amount,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn evaluate_candidate(
    base_inputs: &SavingsInputs,
    goal_type: GoalType,
    candidate: f64,
) -> Result<f64, ProjectionError> {
    let mut inputs = base_inputs.clone();
    match goal_type {
        GoalType::RequiredSavingsRate => inputs.savings_rate = candidate,
        GoalType::RequiredAnnualReturn => inputs.annual_return = candidate,
    }

    let result = project_simple_savings(&inputs)?;
    let invested = result
        .series
        .iter()
        .find(|s| s.label == INVESTED_SAVINGS_SERIES);
    Ok(invested
        .and_then(|s| s.points.last())
        .map(|p| p.value)
        .unwrap_or(0.0))
}

fn validate_config(inputs: &SavingsInputs, config: GoalSolveConfig) -> Result<(), ProjectionError> {
    if inputs.period_years == 0 {
        return Err(ProjectionError::InvalidParameter {
            field: "period_years",
            reason: "must be > 0 to solve a goal",
        });
    }
    if !config.target_amount.is_finite() || config.target_amount <= 0.0 {
        return Err(ProjectionError::InvalidParameter {
            field: "target_amount",
            reason: "must be > 0",
        });
    }
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err(ProjectionError::InvalidParameter {
            field: "search_min",
            reason: "search bounds must be finite",
        });
    }
    if config.search_max <= config.search_min {
        return Err(ProjectionError::InvalidParameter {
            field: "search_max",
            reason: "must be greater than search_min",
        });
    }
    match config.goal_type {
        GoalType::RequiredSavingsRate => {
            if config.search_min < 0.0 || config.search_max > 1.0 {
                return Err(ProjectionError::InvalidParameter {
                    field: "search_min",
                    reason: "savings-rate bounds must stay within 0 and 1",
                });
            }
        }
        GoalType::RequiredAnnualReturn => {
            if config.search_min < -1.0 {
                return Err(ProjectionError::InvalidParameter {
                    field: "search_min",
                    reason: "annual-return bounds must be >= -1",
                });
            }
        }
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(ProjectionError::InvalidParameter {
            field: "tolerance",
            reason: "must be > 0",
        });
    }
    if config.max_iterations == 0 {
        return Err(ProjectionError::InvalidParameter {
            field: "max_iterations",
            reason: "must be > 0",
        });
    }
    Ok(())
}
