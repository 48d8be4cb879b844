mod instantiate;
mod load;
mod resolve;

pub use instantiate::InstantiateErrorKind;
pub use load::LoadErrorKind;
pub use resolve::{CyclePath, ResolveErrorKind};
