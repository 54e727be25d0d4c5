pub mod assignment;
pub mod intake;
pub mod ledger;
pub mod matching;
pub mod rating;
pub mod reassignment;
pub mod registry;
