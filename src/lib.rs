//! Wald tests of linear restrictions `R * beta = b` on the coefficients of a fitted
//! seemingly unrelated regression (SUR) model.
//!
//! The model is only needed through its named coefficient vector and the covariance of
//! those coefficients, see [`FittedSur`]. Estimation is left to whatever produced them.

mod align;
mod coef;
mod config;
mod error;
mod matrix;
mod model;
mod restriction;
mod wald;

pub use crate::{
    align::Alignment,
    coef::{coef_table, Coef},
    config::{WaldOptions, DEFAULT_SINGULAR_TOL},
    error::Error,
    matrix::LabeledMatrix,
    model::{equation_names, FittedSur, SurFit},
    restriction::Restriction,
    wald::{wald_betas, wald_test, wald_test_with, wald_tests, wald_tests_with, WaldResult},
};
