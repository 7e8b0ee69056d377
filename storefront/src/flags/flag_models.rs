use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// The closed set of flags this storefront knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    ShowNewLayout,
    EnablePromoBanner,
}

/// One allowed value of a flag, with the label shown in the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagOption {
    pub value: bool,
    pub label: &'static str,
}

const BOOLEAN_OPTIONS: [FlagOption; 2] = [
    FlagOption {
        value: true,
        label: "Enabled",
    },
    FlagOption {
        value: false,
        label: "Disabled",
    },
];

impl Flag {
    pub const fn key(self) -> &'static str {
        match self {
            Flag::ShowNewLayout => "showNewLayout",
            Flag::EnablePromoBanner => "enablePromoBanner",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Flag::ShowNewLayout => "Show new product layout design (4-column vs 3-column grid)",
            Flag::EnablePromoBanner => "Display promotional banner on homepage",
        }
    }

    pub fn options(self) -> &'static [FlagOption] {
        match self {
            Flag::ShowNewLayout | Flag::EnablePromoBanner => &BOOLEAN_OPTIONS,
        }
    }

    pub const fn default_value(self) -> bool {
        match self {
            Flag::ShowNewLayout => false,
            Flag::EnablePromoBanner => true,
        }
    }

    /// The flag's decision when no override is present. Must stay pure: the
    /// result is baked into cached pages through the flag code.
    pub fn decide(self) -> bool {
        match self {
            Flag::ShowNewLayout => false,
            Flag::EnablePromoBanner => true,
        }
    }

    /// Position of `value` in this flag's options, if it is an allowed value.
    pub fn option_index(self, value: bool) -> Option<usize> {
        self.options().iter().position(|option| option.value == value)
    }

    pub fn definition(self) -> FlagDefinitionData {
        FlagDefinitionData {
            description: self.description().to_string(),
            options: self.options().to_vec(),
            default_value: Value::Bool(self.default_value()),
        }
    }
}

/// Toolbar-facing description of a single flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagDefinitionData {
    pub description: String,
    pub options: Vec<FlagOption>,
    pub default_value: Value,
}

/// Payload of the flag discovery endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderData {
    pub definitions: BTreeMap<String, FlagDefinitionData>,
    pub hints: Vec<Value>,
}

impl ProviderData {
    pub fn from_flags(flags: &[Flag]) -> Self {
        let definitions = flags
            .iter()
            .map(|flag| (flag.key().to_string(), flag.definition()))
            .collect();

        ProviderData {
            definitions,
            hints: Vec::new(),
        }
    }
}

/// Resolved values for an ordered list of flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagValues {
    flags: Vec<Flag>,
    values: Vec<bool>,
}

impl FlagValues {
    /// Pairs flags with values positionally. Both slices must have the same length.
    pub fn new(flags: &[Flag], values: Vec<bool>) -> Option<Self> {
        if flags.len() != values.len() {
            return None;
        }
        Some(FlagValues {
            flags: flags.to_vec(),
            values,
        })
    }

    /// Evaluates `resolve` once per flag, in order.
    pub fn from_fn(flags: &[Flag], resolve: impl FnMut(Flag) -> bool) -> Self {
        FlagValues {
            flags: flags.to_vec(),
            values: flags.iter().copied().map(resolve).collect(),
        }
    }

    /// Value of `flag`, falling back to its decision if it is not part of this set.
    pub fn get(&self, flag: Flag) -> bool {
        self.flags
            .iter()
            .position(|candidate| *candidate == flag)
            .map(|index| self.values[index])
            .unwrap_or_else(|| flag.decide())
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.values
    }
}
