//! Named collection bindings
//!
//! A [`CollectionBinding`] is everything that used to differ between the
//! copy-pasted list screens: which sub-resource to talk to and what to call
//! things in messages.

use msm_repository::CollectionPath;
use serde::{Deserialize, Serialize};

/// Words used when talking about a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionLabels {
    /// Item noun, singular (e.g. `host`)
    pub singular: String,
    /// Item noun, plural (e.g. `hosts`)
    pub plural: String,
    /// Parent noun (e.g. `worker-manager`)
    pub parent: String,
    /// Verb for adding (e.g. `assign`)
    pub add_verb: String,
    /// Past tense of the add verb (e.g. `assigned`)
    pub added: String,
    /// Verb for removing (e.g. `unassign`)
    pub remove_verb: String,
    /// Past tense of the remove verb (e.g. `unassigned`)
    pub removed: String,
}

impl CollectionLabels {
    /// Labels using add/remove verbs
    #[must_use]
    pub fn new(singular: &str, plural: &str, parent: &str) -> Self {
        Self {
            singular: singular.to_string(),
            plural: plural.to_string(),
            parent: parent.to_string(),
            add_verb: "add".to_string(),
            added: "added".to_string(),
            remove_verb: "remove".to_string(),
            removed: "removed".to_string(),
        }
    }

    /// Use assign/unassign verbs
    #[must_use]
    pub fn assignment(mut self) -> Self {
        self.add_verb = "assign".to_string();
        self.added = "assigned".to_string();
        self.remove_verb = "unassign".to_string();
        self.removed = "unassigned".to_string();
        self
    }

    /// Noun for `count` items
    #[inline]
    #[must_use]
    pub fn noun(&self, count: usize) -> &str {
        if count == 1 {
            &self.singular
        } else {
            &self.plural
        }
    }
}

/// Sub-collection endpoint plus its labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionBinding {
    /// Short name (e.g. `worker-manager-hosts`)
    pub name: String,
    /// Endpoint of the sub-collection
    pub path: CollectionPath,
    /// Message vocabulary
    pub labels: CollectionLabels,
}

impl CollectionBinding {
    /// Create binding
    #[must_use]
    pub fn new(name: impl Into<String>, path: CollectionPath, labels: CollectionLabels) -> Self {
        Self {
            name: name.into(),
            path,
            labels,
        }
    }

    /// Hosts assigned to a worker-manager
    #[must_use]
    pub fn worker_manager_hosts() -> Self {
        Self::new(
            "worker-manager-hosts",
            CollectionPath::new("worker-managers", "assigned-hosts"),
            CollectionLabels::new("host", "hosts", "worker-manager").assignment(),
        )
    }

    /// Conditions attached to a host rule
    #[must_use]
    pub fn host_rule_conditions() -> Self {
        Self::new(
            "host-rule-conditions",
            CollectionPath::new("rules/hosts", "conditions"),
            CollectionLabels::new("condition", "conditions", "rule"),
        )
    }

    /// Conditions attached to a service rule
    #[must_use]
    pub fn service_rule_conditions() -> Self {
        Self::new(
            "service-rule-conditions",
            CollectionPath::new("rules/services", "conditions"),
            CollectionLabels::new("condition", "conditions", "rule"),
        )
    }

    /// Services belonging to an app
    #[must_use]
    pub fn app_services() -> Self {
        Self::new(
            "app-services",
            CollectionPath::new("apps", "services"),
            CollectionLabels::new("service", "services", "app"),
        )
    }

    /// Hosts a simulated host metric applies to
    #[must_use]
    pub fn simulated_metric_hosts() -> Self {
        Self::new(
            "simulated-metric-hosts",
            CollectionPath::new("simulated-metrics/hosts", "cloud-hosts"),
            CollectionLabels::new("host", "hosts", "simulated metric"),
        )
    }

    /// Every built-in binding
    #[must_use]
    pub fn presets() -> Vec<Self> {
        vec![
            Self::worker_manager_hosts(),
            Self::host_rule_conditions(),
            Self::service_rule_conditions(),
            Self::app_services(),
            Self::simulated_metric_hosts(),
        ]
    }

    /// Look up a built-in binding by name
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        Self::presets().into_iter().find(|b| b.name == name)
    }
}
