// Core services
pub mod add_item;
pub mod inventory;
pub mod lookup;
