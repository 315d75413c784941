use std::collections::HashMap;

use crate::config::DemoConfig;
use crate::hooks::{
    AudioHook, Feature, GifHook, OperationHook, ResizeHook, TextHook, ThumbnailHook,
};

/// Registry of the hooks available to a showcase run
///
/// Hooks are registered by feature; built-in hooks take their parameters
/// (staged input name, scale, timestamp, frame rate) from [`DemoConfig`].
pub struct HookRegistry {
    hooks: HashMap<Feature, Box<dyn OperationHook>>,
}

impl HookRegistry {
    /// Create a registry holding every built-in hook
    pub fn from_config(config: &DemoConfig) -> Self {
        let mut registry = Self {
            hooks: HashMap::new(),
        };

        registry.register(Box::new(TextHook::help()));
        registry.register(Box::new(TextHook::version()));
        registry.register(Box::new(TextHook::license()));
        registry.register(Box::new(ThumbnailHook::new(
            config.staged_name.clone(),
            config.scale.clone(),
            config.thumbnail_timestamp.clone(),
        )));
        registry.register(Box::new(AudioHook::new(config.staged_name.clone())));
        registry.register(Box::new(GifHook::new(
            config.staged_name.clone(),
            config.scale.clone(),
            config.gif_fps,
        )));
        registry.register(Box::new(ResizeHook::new(
            config.staged_name.clone(),
            config.scale.clone(),
        )));

        registry
    }

    /// Register a hook, replacing any hook for the same feature
    pub fn register(&mut self, hook: Box<dyn OperationHook>) {
        self.hooks.insert(hook.feature(), hook);
    }

    pub fn get(&self, feature: Feature) -> Option<&dyn OperationHook> {
        self.hooks.get(&feature).map(|hook| hook.as_ref())
    }

    pub fn has_hook(&self, feature: Feature) -> bool {
        self.hooks.contains_key(&feature)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::from_config(&DemoConfig::default())
    }
}
