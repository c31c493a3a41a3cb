//! Seasonal ARIMA estimated by conditional sum of squares.

mod diff;
mod model;
mod summary;

pub use diff::{difference, integrate, seasonal_difference, seasonal_integrate};
pub use model::{Sarima, SarimaSpec};
