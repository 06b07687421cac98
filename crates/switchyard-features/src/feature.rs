//! Feature definitions

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::Error;

/// Feature category for filtering and override eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Always enabled; cannot be disabled
    Core,
    /// Switchyard's own opt-in capabilities
    Optional,
    /// Glue for third-party tools
    Integration,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Core, Self::Optional, Self::Integration];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Optional => "optional",
            Self::Integration => "integration",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownCategory {
                name: s.to_string(),
            })
    }
}

/// What a feature resolves to when nothing overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    AlwaysOn,
    OffByDefault,
    /// Off unless the feature's environment flag turns it on
    EnvGated,
}

impl DefaultPolicy {
    pub fn default_enabled(&self) -> bool {
        matches!(self, Self::AlwaysOn)
    }
}

/// A named, toggleable capability with its relations to other features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub name: String,
    pub description: String,
    pub category: Category,
    /// Features that must be enabled before this one
    pub dependencies: Vec<String>,
    /// Features that must not be enabled alongside this one
    pub conflicts: Vec<String>,
    pub default_policy: DefaultPolicy,
}

impl Feature {
    /// Create a feature with no relations.
    ///
    /// Core features default to [`DefaultPolicy::AlwaysOn`], everything else
    /// to [`DefaultPolicy::OffByDefault`].
    pub fn new(name: impl Into<String>, description: impl Into<String>, category: Category) -> Self {
        let default_policy = match category {
            Category::Core => DefaultPolicy::AlwaysOn,
            Category::Optional | Category::Integration => DefaultPolicy::OffByDefault,
        };
        Self {
            name: name.into(),
            description: description.into(),
            category,
            dependencies: Vec::new(),
            conflicts: Vec::new(),
            default_policy,
        }
    }

    /// Add a dependency (builder pattern).
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// Add a conflict (builder pattern).
    pub fn conflicts_with(mut self, name: impl Into<String>) -> Self {
        self.conflicts.push(name.into());
        self
    }

    /// Set the default policy (builder pattern).
    pub fn with_policy(mut self, policy: DefaultPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn is_core(&self) -> bool {
        self.category == Category::Core
    }

    /// The state this feature resolves to with no overrides.
    pub fn default_enabled(&self) -> bool {
        self.is_core() || self.default_policy.default_enabled()
    }

    pub fn declares_conflict(&self, other: &str) -> bool {
        self.conflicts.iter().any(|c| c == other)
    }

    /// Whether this feature and `other` may not be enabled together.
    ///
    /// Either side declaring the conflict is enough.
    pub fn conflicts_with_feature(&self, other: &Feature) -> bool {
        self.name != other.name
            && (self.declares_conflict(&other.name) || other.declares_conflict(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn builder_collects_relations() {
        let feature = Feature::new("plugins", "Plugin loader", Category::Optional)
            .depends_on("hooks")
            .conflicts_with("legacy_plugins")
            .with_policy(DefaultPolicy::EnvGated);

        assert_eq!(feature.dependencies, vec!["hooks"]);
        assert_eq!(feature.conflicts, vec!["legacy_plugins"]);
        assert_eq!(feature.default_policy, DefaultPolicy::EnvGated);
        assert!(!feature.default_enabled());
    }

    #[rstest]
    #[case(Category::Core, DefaultPolicy::OffByDefault, true)]
    #[case(Category::Optional, DefaultPolicy::AlwaysOn, true)]
    #[case(Category::Optional, DefaultPolicy::OffByDefault, false)]
    #[case(Category::Integration, DefaultPolicy::EnvGated, false)]
    fn default_enabled_by_category_and_policy(
        #[case] category: Category,
        #[case] policy: DefaultPolicy,
        #[case] expected: bool,
    ) {
        let feature = Feature::new("f", "", category).with_policy(policy);
        assert_eq!(feature.default_enabled(), expected);
    }

    #[test]
    fn conflicts_are_symmetric() {
        let b = Feature::new("b", "", Category::Optional);
        let c = Feature::new("c", "", Category::Optional).conflicts_with("b");

        assert!(c.conflicts_with_feature(&b));
        assert!(b.conflicts_with_feature(&c));
        assert!(!b.conflicts_with_feature(&b));
    }

    #[rstest]
    #[case("core", Category::Core)]
    #[case("Optional", Category::Optional)]
    #[case(" integration ", Category::Integration)]
    fn category_parses(#[case] input: &str, #[case] expected: Category) {
        assert_eq!(input.parse::<Category>().unwrap(), expected);
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(matches!(
            "plugin".parse::<Category>(),
            Err(Error::UnknownCategory { .. })
        ));
    }
}
