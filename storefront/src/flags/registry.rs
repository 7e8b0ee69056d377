use serde_json::{Map, Value};

use crate::flags::flag_models::{Flag, FlagValues, ProviderData};

/// Flags shown in the toolbar and the discovery endpoints.
pub const TOOLBAR_FLAGS: [Flag; 2] = [Flag::ShowNewLayout, Flag::EnablePromoBanner];

/// Flags encoded into the flag code, in code order. Both the rewriter and
/// the pages read positions from this list, so reordering it invalidates
/// every code already handed out.
pub const PRECOMPUTE_FLAGS: [Flag; 2] = [Flag::ShowNewLayout, Flag::EnablePromoBanner];

pub fn provider_data() -> ProviderData {
    ProviderData::from_flags(&TOOLBAR_FLAGS)
}

/// Resolves a single flag: the override when it holds an allowed value,
/// otherwise the flag's own decision.
pub fn resolve_flag(flag: Flag, overrides: &Map<String, Value>) -> bool {
    match overrides.get(flag.key()) {
        None | Some(Value::Null) => flag.decide(),
        Some(Value::Bool(value)) if flag.option_index(*value).is_some() => *value,
        Some(other) => {
            tracing::warn!(
                flag = flag.key(),
                value = %other,
                "ignoring override that is not one of the flag's options"
            );
            flag.decide()
        }
    }
}

/// Resolves every flag in `flags`, in order.
pub fn resolve_flags(flags: &[Flag], overrides: &Map<String, Value>) -> FlagValues {
    FlagValues::from_fn(flags, |flag| resolve_flag(flag, overrides))
}
