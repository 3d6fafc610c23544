pub mod encode;
pub mod frame;
pub mod inspect;

use cellwire_codec::PluginRegistry;

/// Registry holding every bundled filter and comparator.
pub fn bundled_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    cellwire_comparator_binary::register(&mut registry);
    cellwire_filter_prefix::register(&mut registry);
    registry
}
