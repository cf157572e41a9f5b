/// conflict counting and penalized cost shared by the local searches
pub mod conflicts;
