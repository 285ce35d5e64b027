//! Object-safe client trait

use crate::traits::ChatCapability;

/// A provider client behind the facade.
///
/// Object-safe so the factory can hand out `Box<dyn LlmClient>` selected
/// by model id at runtime, while each implementation stays a plain struct
/// per vendor family.
pub trait LlmClient: ChatCapability {
    /// Stable provider identifier ("anthropic", "openai", ...)
    fn provider_name(&self) -> &'static str;

    /// Clone into a boxed client
    fn clone_box(&self) -> Box<dyn LlmClient>;
}

impl Clone for Box<dyn LlmClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
