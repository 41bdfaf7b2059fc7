use crate::plugins::{DefinitionListPlugin, FootnotePlugin, Plugin};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Which plugin wins when two of them could claim text at the same position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Precedence {
    /// The plugin registered first wins.
    #[default]
    RegistrationOrder,
    /// The plugin registered last wins.
    ReverseRegistrationOrder,
}

/// An ordered set of plugins.
///
/// Plugins are compared by identity: registering the same `Arc` twice is a no-op. Two separately constructed
/// instances of the same plugin type are distinct plugins.
///
/// ```
/// use mdnotion::plugins::{FootnotePlugin, PluginRegistry};
/// use std::sync::Arc;
///
/// let footnotes = Arc::new(FootnotePlugin);
/// let mut registry = PluginRegistry::new();
/// assert!(registry.register(footnotes.clone()));
/// assert!(!registry.register(footnotes));
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Clone)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
    precedence: Precedence,
}

impl PluginRegistry {
    /// An empty registry: the parser behaves like plain CommonMark + GFM.
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            precedence: Precedence::default(),
        }
    }

    /// A registry with the built-in plugins: footnotes, then definition lists.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FootnotePlugin));
        registry.register(Arc::new(DefinitionListPlugin));
        registry
    }

    /// Adds a plugin. Returns `false` if this exact instance is already registered.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> bool {
        if self.plugins.iter().any(|existing| same_instance(existing, &plugin)) {
            log::debug!("plugin {} is already registered", plugin.name());
            return false;
        }
        self.plugins.push(plugin);
        true
    }

    pub fn set_precedence(&mut self, precedence: Precedence) {
        self.precedence = precedence;
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    /// The plugins, highest precedence first.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &dyn Plugin> + '_> {
        let plugins = self.plugins.iter().map(|p| p.as_ref());
        match self.precedence {
            Precedence::RegistrationOrder => Box::new(plugins),
            Precedence::ReverseRegistrationOrder => Box::new(plugins.rev()),
        }
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Debug for PluginRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("precedence", &self.precedence)
            .finish()
    }
}

fn same_instance(a: &Arc<dyn Plugin>, b: &Arc<dyn Plugin>) -> bool {
    // Compare data pointers only; vtable pointers for the same type may differ across codegen units.
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
