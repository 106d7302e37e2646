pub mod groups;
pub mod hosts;
pub mod inventory;
pub mod sink;
