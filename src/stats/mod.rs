//! Statistics over the cleaned table: correlation, regression and the
//! histogram helpers used by the plots.

pub mod correlation;
pub mod histogram;
pub mod regression;
