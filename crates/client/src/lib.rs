pub mod roster;

pub use roster::{toggled_status, ClientError, RosterClient};
