pub mod analyzer;
pub mod api_client;
pub mod calculator;
pub mod comparator;
pub mod currency;
pub mod glossary;
pub mod opportunities;
pub mod splash;
pub mod state;
pub mod usage_limit;

pub use crate::domain::model::*;
pub use crate::domain::ports::{Clock, OpportunityQuery, RvcApi, StateStore};
pub use crate::utils::error::Result;
