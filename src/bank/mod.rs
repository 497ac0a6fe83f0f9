//! Banking module for the account, its ledger, and the session gate guarding them.
mod account;
mod ledger;
mod session;
mod state;
mod transaction;
mod types;

pub use account::*;
pub use ledger::*;
pub use session::*;
pub use state::*;
pub use transaction::*;
pub use types::*;
