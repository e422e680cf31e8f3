//! Model asset management: static catalog and lazy downloads.

pub mod catalog;
pub mod download;

pub use catalog::{
    Language, RecognizerModelInfo, SynthesisModelInfo, TranslationModelInfo, recognizer_model,
    synthesis_model, translation_model,
};
pub use download::{
    download_recognizer_model, is_recognizer_model_installed, models_dir, recognizer_model_path,
};
