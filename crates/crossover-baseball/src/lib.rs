// Pitcher crossover analysis: index construction, factor extraction, WHIP
// regression and the crossover solve.

pub mod crossover;
pub mod dataset;
pub mod factor;
pub mod indices;
pub mod observation;
pub mod regression;
pub mod report;
pub mod standardize;
