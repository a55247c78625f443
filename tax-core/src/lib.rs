pub mod calculations;
pub mod models;
pub mod rules;

pub use calculations::compare;
pub use models::*;
pub use rules::{
    ConfigurationGap, DeductionPolicy, ItemizedCaps, RegimeRules, RegimeRulesError, SurchargeTier,
    TaxRulebook,
};
