//! The galley: everything between font metrics and output bytes.
//!
//! [`node`] defines the box model; [`pack`] sets glue to hit target
//! dimensions; [`linebreak`] is the optimal paragraph breaker; [`hyphen`]
//! feeds it discretionary breaks; [`math`] lays out math lists; [`align`]
//! builds tables; [`ship`] resolves the finished tree to absolute
//! positions.

pub mod align;
pub mod hyphen;
pub mod linebreak;
pub mod math;
pub mod node;
pub mod pack;
pub mod ship;
