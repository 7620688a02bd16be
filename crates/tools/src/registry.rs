use std::sync::Arc;

use crate::capability::Capability;

/// Capabilities in priority order.
///
/// Unlike a name-keyed map, the registry keeps insertion order: the first
/// registered capability is consulted first. Entries are `Arc`s so the
/// registry can be cloned cheaply into request handlers.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: Vec<Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, capability: Box<dyn Capability>) {
        self.capabilities.push(Arc::from(capability));
    }

    #[must_use]
    pub fn with(mut self, capability: impl Capability + 'static) -> Self {
        self.register(Box::new(capability));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Capability> {
        self.capabilities.iter().map(|c| c.as_ref())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Capability> {
        self.iter().find(|c| c.name() == name)
    }

    /// Names in priority order.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::CapabilityOutput,
        anyhow::Result,
        async_trait::async_trait,
    };

    struct Named(&'static str);

    #[async_trait]
    impl Capability for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test capability"
        }

        fn preemption_score(&self, _text: &str) -> f32 {
            0.0
        }

        fn build_prompt(&self, text: &str) -> String {
            text.to_string()
        }

        async fn invoke(&self, prompt: &str) -> Result<CapabilityOutput> {
            Ok(CapabilityOutput::Inline(prompt.to_string()))
        }
    }

    #[test]
    fn keeps_registration_order() {
        let registry = CapabilityRegistry::new()
            .with(Named("zeta"))
            .with(Named("alpha"))
            .with(Named("mid"));
        assert_eq!(registry.names(), ["zeta", "alpha", "mid"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn get_finds_by_name() {
        let registry = CapabilityRegistry::new().with(Named("speech"));
        assert!(registry.get("speech").is_some());
        assert!(registry.get("image").is_none());
        assert!(CapabilityRegistry::new().is_empty());
    }
}
