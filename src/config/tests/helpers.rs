//! Shared test helpers for configuration tests.

use ortho_config::MergeComposer;
use serde_json::Value;

use crate::ScholarDraftConfig;

/// Configuration source, lowest precedence first.
#[derive(Debug, Clone, Copy)]
pub enum Layer {
    Defaults,
    File,
    Environment,
    Cli,
}

/// Composes a [`ScholarDraftConfig`] from layers applied in order.
pub fn compose(layers: &[(Layer, Value)]) -> ScholarDraftConfig {
    let mut composer = MergeComposer::new();
    for (layer, value) in layers.iter().cloned() {
        match layer {
            Layer::Defaults => composer.push_defaults(value),
            Layer::File => composer.push_file(value, None),
            Layer::Environment => composer.push_environment(value),
            Layer::Cli => composer.push_cli(value),
        }
    }

    ScholarDraftConfig::merge_from_layers(composer.layers()).expect("layers should merge")
}
