//! Condition evaluator (spec §4.2): binds alert fields into query
//! parameters, issues a parameterised ISIM query, and applies the
//! condition's declared check-kinds to decide whether it is met.

pub mod evaluator;
pub mod isim;

pub use evaluator::{bind_parameters, is_met};
pub use isim::{IsimClient, IsimQueryError, IsimRow, MockIsimClient, ReqwestIsimClient};
