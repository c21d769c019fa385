//! Command implementations for the Invitely CLI

use clap::ValueEnum;
use invitely_core::LinkKind;

pub mod assess;
pub mod can_access;
pub mod fingerprint;
pub mod simulate_quota;
pub mod validate;

pub use assess::execute as execute_assess;
pub use can_access::execute as execute_can_access;
pub use fingerprint::execute as execute_fingerprint;
pub use simulate_quota::execute as execute_simulate_quota;
pub use validate::execute as execute_validate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Link kind as accepted on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LinkKindArg {
    Regular,
    Test,
}

impl From<LinkKindArg> for LinkKind {
    fn from(value: LinkKindArg) -> Self {
        match value {
            LinkKindArg::Regular => Self::Regular,
            LinkKindArg::Test => Self::Test,
        }
    }
}
