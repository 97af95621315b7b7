//! Load an ARFF dataset, preview it, split it into train / validation /
//! test subsets (stratified by a categorical column when present) and chart
//! the category frequencies of each subset.

pub mod color;
pub mod config;
pub mod data;
pub mod report;
