//! Risk Verdicts
//!
//! Turns a predicted class and optional probability into the verdict shown
//! to the user.

mod decision;

pub use decision::{RiskVerdict, Verdict, VerdictConfig};
