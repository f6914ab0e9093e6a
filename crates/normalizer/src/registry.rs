//! Chain → transformer lookup.

use crate::chains::{HaziHinamAdapter, RamiLevyAdapter, ShufersalAdapter, TivTaamAdapter};
use crate::error::RegistryError;
use crate::traits::ChainTransformer;
use common::SupermarketChain;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Routes each supported chain to its transformer.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Clone, Default)]
pub struct TransformerRegistry {
    transformers: HashMap<SupermarketChain, Arc<dyn ChainTransformer>>,
}

impl TransformerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in chain adapter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ShufersalAdapter::new()));
        registry.register(Arc::new(HaziHinamAdapter::new()));
        registry.register(Arc::new(RamiLevyAdapter::new()));
        registry.register(Arc::new(TivTaamAdapter::new()));
        registry
    }

    /// Register a transformer under its own chain, replacing any previous one.
    pub fn register(&mut self, transformer: Arc<dyn ChainTransformer>) {
        let chain = transformer.chain();
        debug!("Registered transformer for {}", chain);
        self.transformers.insert(chain, transformer);
    }

    pub fn get_transformer(
        &self,
        chain: SupermarketChain,
    ) -> Result<Arc<dyn ChainTransformer>, RegistryError> {
        self.transformers
            .get(&chain)
            .cloned()
            .ok_or_else(|| RegistryError::UnsupportedChain(chain.to_string()))
    }

    pub fn is_supported(&self, chain: SupermarketChain) -> bool {
        self.transformers.contains_key(&chain)
    }

    /// Registered chains, sorted.
    pub fn supported_chains(&self) -> Vec<SupermarketChain> {
        let mut chains: Vec<SupermarketChain> = self.transformers.keys().copied().collect();
        chains.sort();
        chains
    }
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("chains", &self.supported_chains())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_chain() {
        let registry = TransformerRegistry::with_defaults();
        assert_eq!(registry.supported_chains(), SupermarketChain::ALL.to_vec());

        for chain in SupermarketChain::ALL {
            assert_eq!(registry.get_transformer(chain).unwrap().chain(), chain);
        }
    }

    #[test]
    fn test_unregistered_chain_fails() {
        let mut registry = TransformerRegistry::new();
        registry.register(Arc::new(ShufersalAdapter::new()));

        let err = registry
            .get_transformer(SupermarketChain::RamiLevy)
            .err()
            .unwrap();
        assert_eq!(err, RegistryError::UnsupportedChain("RAMI_LEVY".to_string()));
        assert!(!registry.is_supported(SupermarketChain::RamiLevy));
    }
}
