mod balance;
mod expense;
mod money;
mod payment;
mod person;

pub use balance::*;
pub use expense::*;
pub use money::*;
pub use payment::*;
pub use person::*;
