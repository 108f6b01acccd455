//! Per-kind parameters and prepared intersection data.

mod arb;
mod ars;
mod cone;
mod ell;
mod half;
mod tor;

pub use arb::Arb;
pub use ars::Ars;
pub use cone::{Rec, Tgc};
pub use ell::Ell;
pub use half::Half;
pub use tor::Tor;

pub(crate) use arb::ArbSpecific;
pub(crate) use ars::ArsSpecific;
pub(crate) use cone::ConeSpecific;
pub(crate) use ell::EllSpecific;
pub(crate) use half::HalfSpecific;
pub(crate) use tor::TorSpecific;
