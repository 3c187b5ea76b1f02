pub(crate) mod data;
pub(crate) mod executable;
mod harvest;
pub(crate) mod lock;
mod orders;
mod pricing;
pub(crate) mod settings;
pub(crate) mod stable;

pub use data::StrategyData;
pub use executable::ExecutableStrategy;
pub use lock::StrategyCell;
pub use settings::StrategySettings;
pub use stable::StableStrategy;
