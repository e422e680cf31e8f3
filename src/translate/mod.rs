//! Machine translation: translator trait and the Marian/candle backend.

#[cfg(feature = "marian")]
pub mod marian;
pub mod translator;

#[cfg(feature = "marian")]
pub use marian::MarianTranslator;
pub use translator::{MockTranslator, Translator};
