//! Copper-native record schemas and their update variants.

pub mod activity;
pub mod common;
pub mod company;
pub mod opportunity;
pub mod person;
pub mod task;

pub use activity::{Activity, ActivityUpdate};
pub use common::*;
pub use company::{Company, CompanyUpdate};
pub use opportunity::{Opportunity, OpportunityUpdate};
pub use person::{Person, PersonUpdate};
pub use task::{Task, TaskUpdate};
