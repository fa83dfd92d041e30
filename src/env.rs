use std::collections::HashMap;

/// Where environment lookups are answered from.
///
/// `Synthetic` lets tests and embedders pass explicit pairs instead of
/// reading `std::env`.
#[derive(Debug, Clone, Default)]
pub(crate) enum EnvSource {
    #[default]
    Process,
    Synthetic(HashMap<String, String>),
}

impl EnvSource {
    pub fn synthetic(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        EnvSource::Synthetic(vars.into_iter().collect())
    }

    fn get(&self, key: &str) -> Option<String> {
        match self {
            EnvSource::Process => std::env::var(key).ok(),
            EnvSource::Synthetic(vars) => vars.get(key).cloned(),
        }
    }
}

/// Candidate variable names for an option, in lookup order:
/// `{PREFIX}_{name}` as given, then the whole name upper-cased.
///
/// The second candidate is omitted when it equals the first.
pub(crate) fn var_names(prefix: &str, option: &str) -> Vec<String> {
    let given = format!("{prefix}_{option}");
    let upper = given.to_uppercase();
    if upper == given {
        vec![given]
    } else {
        vec![given, upper]
    }
}

/// Find the first candidate variable that is present.
///
/// Returns `(variable name, value)`.
pub(crate) fn lookup(source: &EnvSource, prefix: &str, option: &str) -> Option<(String, String)> {
    var_names(prefix, option)
        .into_iter()
        .find_map(|name| source.get(&name).map(|value| (name, value)))
}
