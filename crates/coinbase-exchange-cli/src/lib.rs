/*
[INPUT]:  Public API exports for coinbase-exchange-cli crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;

pub use config::ExchangeConfig;
