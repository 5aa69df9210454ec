use anyhow::{anyhow, Result};
use rust_bert::pipelines::sentence_embeddings::{
    SentenceEmbeddingsBuilder, SentenceEmbeddingsModel, SentenceEmbeddingsModelType,
};
use simsimd::SpatialSimilarity;

use crate::settings::EmbeddingModel;

/// Semantic similarity between two normalized texts, in `[0, 100]`.
///
/// Implementations run on the oracle worker thread and are never shared,
/// so they may hold caches behind `&mut self`.
pub trait SimilarityOracle {
    fn similarity(&mut self, left: &str, right: &str) -> Result<f32>;
}

impl From<EmbeddingModel> for SentenceEmbeddingsModelType {
    fn from(model: EmbeddingModel) -> Self {
        match model {
            EmbeddingModel::AllMiniLmL6V2 => SentenceEmbeddingsModelType::AllMiniLmL6V2,
            EmbeddingModel::AllMiniLmL12V2 => SentenceEmbeddingsModelType::AllMiniLmL12V2,
            EmbeddingModel::AllDistilrobertaV1 => SentenceEmbeddingsModelType::AllDistilrobertaV1,
            EmbeddingModel::ParaphraseAlbertSmallV2 => {
                SentenceEmbeddingsModelType::ParaphraseAlbertSmallV2
            }
            EmbeddingModel::SentenceT5Base => SentenceEmbeddingsModelType::SentenceT5Base,
        }
    }
}

pub struct EmbeddingOracle {
    model: SentenceEmbeddingsModel,
    // The job description is the left side of every comparison in a run.
    cached_left: Option<(String, Vec<f32>)>,
}

impl EmbeddingOracle {
    pub fn load(model: EmbeddingModel) -> Result<Self> {
        let model = SentenceEmbeddingsBuilder::remote(model.into()).create_model()?;
        Ok(Self {
            model,
            cached_left: None,
        })
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.model
            .encode(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("model returned no embedding"))
    }

    fn left_embedding(&mut self, text: &str) -> Result<Vec<f32>> {
        if let Some((cached, embedding)) = &self.cached_left {
            if cached == text {
                return Ok(embedding.clone());
            }
        }
        let embedding = self.embed(text)?;
        self.cached_left = Some((text.to_string(), embedding.clone()));
        Ok(embedding)
    }
}

impl SimilarityOracle for EmbeddingOracle {
    fn similarity(&mut self, left: &str, right: &str) -> Result<f32> {
        let left = self.left_embedding(left)?;
        let right = self.embed(right)?;
        let cosine = cosine_similarity(&left, &right)
            .ok_or_else(|| anyhow!("embeddings have mismatched dimensions"))?;
        to_percentage(cosine)
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    f32::cosine(a, b).map(|distance| (1.0 - distance) as f32)
}

/// Scales a cosine similarity to a percentage. Anti-correlated texts floor
/// at zero; non-finite values are rejected.
pub fn to_percentage(cosine: f32) -> Result<f32> {
    if !cosine.is_finite() {
        return Err(anyhow!("similarity is not a finite number"));
    }
    Ok((cosine * 100.0).clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = [0.3_f32, 0.4, 0.5];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(sim.abs() < 1e-3);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        assert!(cosine_similarity(&[1.0, 0.0], &[1.0]).is_none());
    }

    #[test]
    fn test_to_percentage_bounds() {
        assert!((to_percentage(0.5).unwrap() - 50.0).abs() < 1e-4);
        assert_eq!(to_percentage(-0.2).unwrap(), 0.0);
        assert_eq!(to_percentage(1.0000001).unwrap(), 100.0);
        assert!(to_percentage(f32::NAN).is_err());
        assert!(to_percentage(f32::INFINITY).is_err());
    }
}
