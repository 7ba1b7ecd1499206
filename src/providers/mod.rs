pub mod cmf;
pub mod relay;
pub mod yahoo_finance;

pub use relay::FallbackClient;
