use crate::types::OutputRecord;
use std::collections::BTreeMap;

/// Select the parameter updates a completed stack contributes downstream.
///
/// For each output whose key appears in `mapping`, emits
/// `mapping[key] -> value`. Outputs without a mapping entry are ignored, so
/// templates may add outputs without breaking older pipelines.
pub fn propagate(
    outputs: &[OutputRecord],
    mapping: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    outputs
        .iter()
        .filter_map(|o| {
            mapping
                .get(&o.key)
                .map(|param_key| (param_key.clone(), o.value.clone()))
        })
        .collect()
}

/// Identity mapping: every output becomes a parameter under its own key.
pub fn propagate_all(outputs: &[OutputRecord]) -> BTreeMap<String, String> {
    outputs
        .iter()
        .map(|o| (o.key.clone(), o.value.clone()))
        .collect()
}
