use std::collections::HashMap;

use super::mappers::{
    ForumMapper, LongVideoMapper, MarketplaceMapper, MicroPostMapper, SearchMapper,
    ShortVideoMapper, SourceMapper,
};
use crate::pipeline::detect::PlatformSignal;

/// Registry mapping detector signals to their source-specific mappers.
pub struct MapperRegistry {
    mappers: HashMap<PlatformSignal, Box<dyn SourceMapper>>,
}

impl MapperRegistry {
    /// Create a registry with every built-in mapper registered.
    pub fn new() -> Self {
        let mut registry = Self {
            mappers: HashMap::new(),
        };

        registry.register(Box::new(MarketplaceMapper));
        registry.register(Box::new(ShortVideoMapper));
        registry.register(Box::new(LongVideoMapper));
        registry.register(Box::new(ForumMapper));
        registry.register(Box::new(MicroPostMapper));
        registry.register(Box::new(SearchMapper));

        registry
    }

    /// Register a mapper under the signal it reports; replaces any previous
    /// mapper for that signal.
    pub fn register(&mut self, mapper: Box<dyn SourceMapper>) {
        self.mappers.insert(mapper.signal(), mapper);
    }

    /// Get the mapper for a signal. Every signal the detector can produce is
    /// covered by the built-ins, so a miss only happens after a caller
    /// removes or shadows registrations.
    pub fn get(&self, signal: PlatformSignal) -> Option<&dyn SourceMapper> {
        self.mappers.get(&signal).map(|m| m.as_ref())
    }

    /// List all registered signals.
    pub fn list_signals(&self) -> Vec<PlatformSignal> {
        self.mappers.keys().copied().collect()
    }
}

impl Default for MapperRegistry {
    fn default() -> Self {
        Self::new()
    }
}
