//! Skip/build decisions for one target.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::action::BuildAction;
use crate::cache::CacheStore;
use crate::error::{Error, Result};
use crate::feature::FeatureRegistry;
use crate::fingerprint::{self, Fingerprint};
use crate::graph::{BuildOrder, DependencyGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionKind {
    Skip,
    Build,
}

impl DecisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::Skip => "SKIP",
            DecisionKind::Build => "BUILD",
        }
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one feature in the build order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub feature: String,
    pub kind: DecisionKind,
    /// Fingerprint computed in this run.
    pub fingerprint: Fingerprint,
    /// Fingerprint found in the cache, if any.
    pub previous: Option<Fingerprint>,
}

impl Decision {
    #[inline]
    pub fn is_build(&self) -> bool {
        self.kind == DecisionKind::Build
    }
}

/// Counts over a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub built: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn from_decisions(decisions: &[Decision]) -> Self {
        let built = decisions.iter().filter(|d| d.is_build()).count();
        Self {
            built,
            skipped: decisions.len() - built,
        }
    }

    pub fn total(&self) -> usize {
        self.built + self.skipped
    }
}

/// Resolves a target, fingerprints each feature in order and builds the
/// stale ones.
///
/// Processing is sequential. Any error aborts the run; a feature whose build
/// fails keeps its old cache record.
pub struct BuildOrchestrator<C, A> {
    cache: C,
    action: A,
}

impl<C: CacheStore, A: BuildAction> BuildOrchestrator<C, A> {
    pub fn new(cache: C, action: A) -> Self {
        Self { cache, action }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    /// Runs the build for `target` and returns one decision per feature in
    /// build order.
    ///
    /// # Errors
    ///
    /// Returns the first resolution, hashing, build or cache-write error.
    pub fn run(&self, target: &str, registry: &FeatureRegistry) -> Result<Vec<Decision>> {
        self.run_with(target, registry, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_decision` as each decision is
    /// made, before its build action starts.
    pub fn run_with<F>(
        &self,
        target: &str,
        registry: &FeatureRegistry,
        on_decision: F,
    ) -> Result<Vec<Decision>>
    where
        F: FnMut(&Decision),
    {
        let order = DependencyGraph::new(registry).resolve(target)?;
        self.run_order(&order, registry, on_decision)
    }

    /// Processes an already resolved build order, for callers that need the
    /// order themselves before anything is built.
    pub fn run_order<F>(
        &self,
        order: &BuildOrder,
        registry: &FeatureRegistry,
        mut on_decision: F,
    ) -> Result<Vec<Decision>>
    where
        F: FnMut(&Decision),
    {
        process(
            &self.cache,
            order,
            registry,
            Some(&self.action),
            &mut on_decision,
        )
    }

    /// Computes the decisions a run would make without building anything or
    /// touching the cache.
    pub fn plan(&self, target: &str, registry: &FeatureRegistry) -> Result<Vec<Decision>> {
        plan(&self.cache, target, registry)
    }
}

/// Dry run against `cache`: the decisions a build of `target` would make.
/// Nothing is built and the cache is only read.
pub fn plan<C: CacheStore>(
    cache: &C,
    target: &str,
    registry: &FeatureRegistry,
) -> Result<Vec<Decision>> {
    let order = DependencyGraph::new(registry).resolve(target)?;
    process(cache, &order, registry, None::<&dyn BuildAction>, &mut |_| {})
}

fn read_previous<C: CacheStore>(cache: &C, feature: &str) -> Option<Fingerprint> {
    match cache.read(feature) {
        Ok(previous) => previous,
        Err(e) => {
            warn!(feature, error = %e, "cache read failed, treating as miss");
            None
        }
    }
}

/// Walks `order`, deciding each feature. Without an action this is a dry run.
fn process<C, A>(
    cache: &C,
    order: &BuildOrder,
    registry: &FeatureRegistry,
    action: Option<&A>,
    on_decision: &mut dyn FnMut(&Decision),
) -> Result<Vec<Decision>>
where
    C: CacheStore,
    A: BuildAction + ?Sized,
{
    info!(%order, dry_run = action.is_none(), "build order");

    let mut fingerprints: HashMap<&str, Fingerprint> = HashMap::with_capacity(order.len());
    let mut decisions = Vec::with_capacity(order.len());

    for name in order.iter() {
        let feature = registry.require(name)?;

        let dep_fingerprints = feature
            .depends_on
            .iter()
            .map(|dep| {
                fingerprints
                    .get(dep.as_str())
                    .map(|fp| (dep.as_str(), fp))
                    .ok_or_else(|| Error::UnknownDependency {
                        feature: name.clone(),
                        dependency: dep.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let fingerprint = fingerprint::compute(feature, dep_fingerprints)?;
        let previous = read_previous(cache, name);
        debug!(
            feature = %name,
            fingerprint = %fingerprint,
            previous = ?previous.as_ref().map(Fingerprint::as_str),
            "fingerprinted"
        );

        let kind = if previous.as_ref() == Some(&fingerprint) {
            DecisionKind::Skip
        } else {
            DecisionKind::Build
        };

        let decision = Decision {
            feature: name.clone(),
            kind,
            fingerprint: fingerprint.clone(),
            previous,
        };
        on_decision(&decision);

        match action {
            Some(action) if kind == DecisionKind::Build => {
                info!(feature = %name, "BUILD");
                action.build(feature, &fingerprint)?;
                cache.write(name, &fingerprint)?;
            }
            _ => info!(feature = %name, "{}", kind),
        }

        fingerprints.insert(name.as_str(), fingerprint);
        decisions.push(decision);
    }

    let summary = RunSummary::from_decisions(&decisions);
    info!(
        built = summary.built,
        skipped = summary.skipped,
        "run finished"
    );

    Ok(decisions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(kind: DecisionKind) -> Decision {
        Decision {
            feature: "x".to_string(),
            kind,
            fingerprint: Fingerprint::new("f"),
            previous: None,
        }
    }

    #[test]
    fn summary_counts_kinds() {
        let decisions = vec![
            decision(DecisionKind::Build),
            decision(DecisionKind::Skip),
            decision(DecisionKind::Build),
        ];
        let summary = RunSummary::from_decisions(&decisions);
        assert_eq!(summary.built, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn kinds_render_as_upper_case() {
        assert_eq!(DecisionKind::Skip.to_string(), "SKIP");
        assert_eq!(
            serde_json::to_string(&DecisionKind::Build).unwrap(),
            "\"BUILD\""
        );
    }
}
