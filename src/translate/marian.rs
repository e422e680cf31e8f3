//! Marian MT translator using candle.
//!
//! Downloads model artifacts from HuggingFace on first use, then runs greedy
//! Marian decoding. The opus-mt models are small enough for CPU inference on
//! sentence-length input.

use crate::error::{DolmetError, Result};
use crate::models::catalog::TranslationModelInfo;
use crate::translate::translator::Translator;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::marian::{Config as MarianConfig, MTModel};
use hf_hub::api::sync::Api;
use tokenizers::Tokenizer;

/// Maximum number of tokens to generate per utterance.
const MAX_DECODE_TOKENS: usize = 256;

/// Build the opus-mt "base" architecture config shared by both directions.
///
/// Both en-de and de-en checkpoints use a 58101-token shared vocabulary with
/// pad as the decoder start token and eos 0.
fn opus_mt_base_config(vocab_size: usize) -> MarianConfig {
    MarianConfig {
        vocab_size,
        decoder_vocab_size: Some(vocab_size),
        max_position_embeddings: 512,
        encoder_layers: 6,
        encoder_ffn_dim: 2048,
        encoder_attention_heads: 8,
        decoder_layers: 6,
        decoder_ffn_dim: 2048,
        decoder_attention_heads: 8,
        use_cache: true,
        is_encoder_decoder: true,
        activation_function: candle_nn::Activation::Swish,
        d_model: 512,
        decoder_start_token_id: (vocab_size - 1) as u32,
        scale_embedding: true,
        pad_token_id: (vocab_size - 1) as u32,
        eos_token_id: 0,
        forced_eos_token_id: 0,
        share_encoder_decoder_embeddings: true,
    }
}

/// Marian translator that runs greedy decoding via candle.
pub struct MarianTranslator {
    model: MTModel,
    config: MarianConfig,
    source_tokenizer: Tokenizer,
    target_tokenizer: Tokenizer,
    device: Device,
    model_name: String,
}

impl MarianTranslator {
    /// Load a Marian checkpoint from the HuggingFace cache.
    ///
    /// Downloads weights and tokenizers on first call.
    pub fn load(info: &TranslationModelInfo) -> Result<Self> {
        let device = Device::Cpu;
        let api = Api::new().map_err(|e| DolmetError::Other(format!("HF Hub API init: {e}")))?;

        let weights_path = api
            .model(info.hf_repo.to_string())
            .get("model.safetensors")
            .map_err(|e| DolmetError::Other(format!("Download {} weights: {e}", info.hf_repo)))?;

        let tokenizer_repo = api.model(info.tokenizer_repo.to_string());
        let source_tokenizer_path = tokenizer_repo.get(info.source_tokenizer).map_err(|e| {
            DolmetError::Other(format!("Download tokenizer {}: {e}", info.source_tokenizer))
        })?;
        let target_tokenizer_path = tokenizer_repo.get(info.target_tokenizer).map_err(|e| {
            DolmetError::Other(format!("Download tokenizer {}: {e}", info.target_tokenizer))
        })?;

        let source_tokenizer = Tokenizer::from_file(&source_tokenizer_path).map_err(|e| {
            DolmetError::Other(format!(
                "Load tokenizer {}: {e}",
                source_tokenizer_path.display()
            ))
        })?;
        let target_tokenizer = Tokenizer::from_file(&target_tokenizer_path).map_err(|e| {
            DolmetError::Other(format!(
                "Load tokenizer {}: {e}",
                target_tokenizer_path.display()
            ))
        })?;

        let config = opus_mt_base_config(info.vocab_size);

        let tensors = candle_core::safetensors::load(&weights_path, &device).map_err(|e| {
            DolmetError::Other(format!("Load weights {}: {e}", weights_path.display()))
        })?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let model = MTModel::new(&config, vb)
            .map_err(|e| DolmetError::Other(format!("Init Marian model: {e}")))?;

        Ok(Self {
            model,
            config,
            source_tokenizer,
            target_tokenizer,
            device,
            model_name: info.name.to_string(),
        })
    }

    /// Encode input text and run greedy decoding.
    fn generate(&mut self, text: &str) -> Result<String> {
        let encoding = self
            .source_tokenizer
            .encode(text, true)
            .map_err(|e| DolmetError::Translation {
                message: format!("Tokenize: {e}"),
            })?;

        let mut input_ids: Vec<u32> = encoding.get_ids().to_vec();
        input_ids.push(self.config.eos_token_id);
        let input_tensor = Tensor::new(input_ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| DolmetError::Translation {
                message: format!("Create input tensor: {e}"),
            })?;

        let encoder_output = self
            .model
            .encoder()
            .forward(&input_tensor, 0)
            .map_err(|e| DolmetError::Translation {
                message: format!("Encoder forward: {e}"),
            })?;

        // Greedy decode with incremental KV cache.
        // First step: feed the decoder start token. Subsequent steps: feed
        // only the newest token; the cache holds the rest.
        let mut token_ids: Vec<u32> = vec![self.config.decoder_start_token_id];

        for index in 0..MAX_DECODE_TOKENS {
            let context_size = if index >= 1 { 1 } else { token_ids.len() };
            let start_pos = token_ids.len().saturating_sub(context_size);

            let decoder_input = Tensor::new(&token_ids[start_pos..], &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(|e| DolmetError::Translation {
                    message: format!("Create decoder input: {e}"),
                })?;

            let logits = self
                .model
                .decode(&decoder_input, &encoder_output, start_pos)
                .map_err(|e| DolmetError::Translation {
                    message: format!("Decoder forward: {e}"),
                })?;

            // Take last-position logits, then the argmax token
            let seq_len = logits.dim(1).map_err(|e| DolmetError::Translation {
                message: format!("Get logits dim: {e}"),
            })?;
            let next_token = logits
                .get_on_dim(1, seq_len - 1)
                .and_then(|l| l.argmax(candle_core::D::Minus1))
                .and_then(|t| t.reshape(()))
                .and_then(|t| t.to_scalar::<u32>())
                .map_err(|e| DolmetError::Translation {
                    message: format!("Select next token: {e}"),
                })?;

            if next_token == self.config.eos_token_id
                || next_token == self.config.forced_eos_token_id
            {
                break;
            }

            token_ids.push(next_token);
        }

        // Skip the decoder start token for detokenization
        let output = self
            .target_tokenizer
            .decode(&token_ids[1..], true)
            .map_err(|e| DolmetError::Translation {
                message: format!("Detokenize: {e}"),
            })?;

        Ok(output)
    }
}

impl Translator for MarianTranslator {
    fn translate(&mut self, text: &str) -> Result<String> {
        self.model.reset_kv_cache();
        self.generate(text)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opus_mt_config_derives_special_tokens_from_vocab() {
        let config = opus_mt_base_config(58101);
        assert_eq!(config.pad_token_id, 58100);
        assert_eq!(config.decoder_start_token_id, 58100);
        assert_eq!(config.eos_token_id, 0);
        assert_eq!(config.d_model, 512);
    }

    #[test]
    fn marian_translator_is_send() {
        fn assert_send<T: Send + 'static>() {}
        assert_send::<MarianTranslator>();
    }
}
