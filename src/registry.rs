use std::ops::Index;

use tracing::{info, warn};

use crate::descriptor::OptionDescriptor;
use crate::env::{self, EnvSource};
use crate::error::OptionsError;
use crate::report;
use crate::types::OptionKind;

const DEFAULT_MAX_ALIAS_DEPTH: usize = 16;

/// Handle to a registered option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptionId(pub(crate) usize);

/// Builder for a [`Registry`].
///
/// ```ignore
/// let mut registry = Registry::builder().env_prefix("PROJECT_NAME").build();
/// let verbose = registry.register(OptionDescriptor::bool("verbose", false, "chatty output"));
/// registry.parse_args(std::env::args());
/// ```
pub struct RegistryBuilder {
    app_name: Option<String>,
    env_prefix: Option<String>,
    env_enabled: bool,
    env_vars: Option<Vec<(String, String)>>,
    max_alias_depth: usize,
}

impl RegistryBuilder {
    fn new() -> Self {
        Self {
            app_name: None,
            env_prefix: None,
            env_enabled: true,
            env_vars: None,
            max_alias_depth: DEFAULT_MAX_ALIAS_DEPTH,
        }
    }

    /// Set the application name. Derives the env prefix `"{APP_NAME}"`
    /// (uppercased) unless [`env_prefix`](Self::env_prefix) overrides it.
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Override the environment variable prefix. Options are seeded from
    /// `{PREFIX}_{name}`, then `{PREFIX}_{NAME}`.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Disable environment seeding entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Answer environment lookups from these pairs instead of `std::env`.
    pub fn env_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env_vars = Some(vars.into_iter().collect());
        self
    }

    /// Bound on nested alias expansion (default 16).
    pub fn max_alias_depth(mut self, depth: usize) -> Self {
        self.max_alias_depth = depth;
        self
    }

    /// Resolve the effective env prefix (None if env disabled or unnamed).
    fn effective_env_prefix(&self) -> Option<String> {
        if !self.env_enabled {
            return None;
        }
        if let Some(prefix) = &self.env_prefix {
            return Some(prefix.clone());
        }
        self.app_name.as_ref().map(|app| app.to_uppercase())
    }

    pub fn build(self) -> Registry {
        let env_prefix = self.effective_env_prefix();
        let env = match self.env_vars {
            Some(vars) => EnvSource::synthetic(vars),
            None => EnvSource::Process,
        };
        Registry {
            options: Vec::new(),
            env,
            env_prefix,
            max_alias_depth: self.max_alias_depth,
            pass: 0,
            expanding: Vec::new(),
        }
    }
}

/// Ordered collection of option descriptors plus the dispatch state that
/// threads through a parse.
///
/// Registration order drives usage layout and the order in which same-named
/// options receive a value.
pub struct Registry {
    pub(crate) options: Vec<OptionDescriptor>,
    env: EnvSource,
    env_prefix: Option<String>,
    pub(crate) max_alias_depth: usize,
    /// Incremented per top-level dispatch; lists clear on first entry in a pass.
    pub(crate) pass: u64,
    /// Alias names currently being expanded, outermost first.
    pub(crate) expanding: Vec<String>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry with environment seeding disabled.
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref()
    }

    /// Attach a descriptor and seed it from its environment variable.
    /// Groups and aliases are never seeded.
    ///
    /// An environment value that fails the option's grammar is fatal: the
    /// usage listing is printed and the process exits.
    pub fn register(&mut self, descriptor: OptionDescriptor) -> OptionId {
        match self.try_register(descriptor) {
            Ok(id) => id,
            Err(err) => report::abort(self, &err),
        }
    }

    /// Like [`register`](Self::register), but hands back the environment
    /// failure instead of exiting. The descriptor stays registered at its
    /// default value.
    pub fn try_register(&mut self, descriptor: OptionDescriptor) -> Result<OptionId, OptionsError> {
        if descriptor.kind() != OptionKind::Group && self.find(descriptor.name()).is_some() {
            warn!(
                option = descriptor.name(),
                "option registered more than once; every same-named option receives each value"
            );
        }
        let id = OptionId(self.options.len());
        self.options.push(descriptor);
        self.seed_from_env(id.0)?;
        Ok(id)
    }

    fn seed_from_env(&mut self, index: usize) -> Result<(), OptionsError> {
        let Some(prefix) = &self.env_prefix else {
            return Ok(());
        };
        let option = &self.options[index];
        // Aliases only expand from tokens.
        if matches!(
            option.kind(),
            OptionKind::Group | OptionKind::Alias | OptionKind::AliasList
        ) {
            return Ok(());
        }
        let Some((var, value)) = env::lookup(&self.env, prefix, option.name()) else {
            return Ok(());
        };
        info!(
            option = option.name(),
            var = %var,
            value = %value,
            "setting option from environment variable"
        );
        self.apply_single(index, &value, &value)
            .map_err(|err| OptionsError::EnvironmentValueInvalid {
                option: self.options[index].name().to_string(),
                var,
                value: value.clone(),
                hint: err.hint().map_or_else(|| err.to_string(), str::to_string),
            })?;
        self.options[index].mark_set();
        Ok(())
    }

    pub fn get(&self, id: OptionId) -> &OptionDescriptor {
        &self.options[id.0]
    }

    pub fn get_mut(&mut self, id: OptionId) -> &mut OptionDescriptor {
        &mut self.options[id.0]
    }

    /// The first option registered under `name`.
    pub fn find(&self, name: &str) -> Option<&OptionDescriptor> {
        self.matching(name).next().map(|i| &self.options[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionDescriptor> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Indices of every option named `name`, in registration order. Groups
    /// never match.
    pub(crate) fn matching<'a>(&'a self, name: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.options
            .iter()
            .enumerate()
            .filter(move |(_, o)| o.kind() != OptionKind::Group && o.name() == name)
            .map(|(i, _)| i)
    }

    /// Does `token` name a registered option, once leading dashes and any
    /// `=value` are stripped? Never applies a value.
    pub fn matches_an_option(&self, token: &str) -> bool {
        let (name, _) = crate::dispatch::split_token(token);
        self.matching(name).next().is_some()
    }

    /// Return every option to its constructed default.
    pub fn reset(&mut self) {
        for option in &mut self.options {
            option.reset();
        }
        self.expanding.clear();
    }
}

impl Index<OptionId> for Registry {
    type Output = OptionDescriptor;

    fn index(&self, id: OptionId) -> &OptionDescriptor {
        self.get(id)
    }
}
