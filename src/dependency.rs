//! Static dependency declarations between agents of a fleet

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Which agents must run before `agent_id`, and which of their outputs it
/// relies on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDependency {
    pub agent_id: String,
    pub depends_on: Vec<String>,
    pub required_outputs: Vec<String>,
}

impl AgentDependency {
    /// Repeated entries in `depends_on` are kept once, in first-seen order
    pub fn new(agent_id: &str, depends_on: &[&str], required_outputs: &[&str]) -> Self {
        let mut seen = HashSet::new();
        Self {
            agent_id: agent_id.to_string(),
            depends_on: depends_on
                .iter()
                .filter(|dep| seen.insert(**dep))
                .map(|s| s.to_string())
                .collect(),
            required_outputs: required_outputs.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// An agent with no upstream
    pub fn root(agent_id: &str) -> Self {
        Self::new(agent_id, &[], &[])
    }
}

/// Dependency errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DependencyError {
    #[error("Dependency cycle between: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// Registry of dependencies keyed by agent id
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, AgentDependency>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the dependency entry of an agent
    pub fn add(&mut self, dependency: AgentDependency) {
        self.nodes.insert(dependency.agent_id.clone(), dependency);
    }

    pub fn remove(&mut self, agent_id: &str) -> bool {
        self.nodes.remove(agent_id).is_some()
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentDependency> {
        self.nodes.get(agent_id)
    }

    /// Direct upstream agents
    pub fn dependencies(&self, agent_id: &str) -> Vec<String> {
        self.nodes
            .get(agent_id)
            .map(|d| d.depends_on.clone())
            .unwrap_or_default()
    }

    /// Agents that list `agent_id` as a dependency
    pub fn dependents(&self, agent_id: &str) -> Vec<String> {
        self.nodes
            .values()
            .filter(|d| d.depends_on.iter().any(|dep| dep == agent_id))
            .map(|d| d.agent_id.clone())
            .collect()
    }

    /// Length of the longest dependency chain below an agent; roots are 0.
    /// Cycles are cut at the first revisit.
    pub fn depth(&self, agent_id: &str) -> usize {
        let mut visiting = HashSet::new();
        self.depth_inner(agent_id, &mut visiting)
    }

    fn depth_inner<'a>(&'a self, agent_id: &'a str, visiting: &mut HashSet<&'a str>) -> usize {
        if !visiting.insert(agent_id) {
            return 0;
        }
        let depth = self
            .nodes
            .get(agent_id)
            .map(|node| {
                node.depends_on
                    .iter()
                    .map(|dep| self.depth_inner(dep, visiting) + 1)
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0);
        visiting.remove(agent_id);
        depth
    }

    /// Group `plan` into layers where every agent's in-plan dependencies sit
    /// in an earlier layer. Dependencies outside the plan are ignored. Agents
    /// keep their plan order inside a layer.
    pub fn layers(&self, plan: &[String]) -> Result<Vec<Vec<String>>, DependencyError> {
        let in_plan: HashSet<&str> = plan.iter().map(String::as_str).collect();
        let mut indegree: HashMap<&str, usize> = plan
            .iter()
            .map(|id| {
                let count = self
                    .dependencies(id)
                    .iter()
                    .filter(|dep| in_plan.contains(dep.as_str()))
                    .collect::<HashSet<_>>()
                    .len();
                (id.as_str(), count)
            })
            .collect();

        let mut remaining: Vec<&str> = plan.iter().map(String::as_str).collect();
        let mut layers = Vec::new();

        while !remaining.is_empty() {
            let ready: Vec<&str> = remaining
                .iter()
                .copied()
                .filter(|id| indegree.get(id).copied().unwrap_or(0) == 0)
                .collect();

            if ready.is_empty() {
                return Err(DependencyError::Cycle(
                    remaining.iter().map(|s| s.to_string()).collect(),
                ));
            }

            remaining.retain(|id| !ready.contains(id));
            for done in &ready {
                for dependent in self.dependents(done) {
                    if let Some(count) = indegree.get_mut(dependent.as_str()) {
                        *count = count.saturating_sub(1);
                    }
                }
            }
            layers.push(ready.into_iter().map(String::from).collect());
        }

        Ok(layers)
    }

    /// Entries of `plan` that appear before one of their in-plan dependencies
    pub fn order_violations(&self, plan: &[String]) -> Vec<String> {
        let position: HashMap<&str, usize> = plan
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut violations = Vec::new();
        for (index, agent_id) in plan.iter().enumerate() {
            for dep in self.dependencies(agent_id) {
                if position.get(dep.as_str()).is_some_and(|&p| p > index) {
                    violations.push(format!("{agent_id} is planned before its dependency {dep}"));
                }
            }
        }
        violations
    }

    /// Agent id to dependency list
    pub fn to_json(&self) -> Value {
        let map: serde_json::Map<String, Value> = self
            .nodes
            .values()
            .map(|d| {
                (
                    d.agent_id.clone(),
                    json!({
                        "depends_on": d.depends_on,
                        "required_outputs": d.required_outputs,
                    }),
                )
            })
            .collect();
        Value::Object(map)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn college_graph() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.add(AgentDependency::root("profile_analysis"));
        graph.add(AgentDependency::root("market_intelligence"));
        graph.add(AgentDependency::new(
            "skill_development_strategist",
            &["profile_analysis", "market_intelligence"],
            &["current_skills", "market_trends"],
        ));
        graph.add(AgentDependency::new(
            "career_optimization_planner",
            &["profile_analysis", "market_intelligence", "skill_development_strategist"],
            &["profile_summary", "skill_gaps", "development_plan"],
        ));
        graph.add(AgentDependency::new(
            "opportunity_matcher",
            &["profile_analysis", "career_optimization_planner"],
            &["profile_summary", "career_goals"],
        ));
        graph
    }

    // === Creation Tests ===

    #[test]
    fn test_graph_creation() {
        let graph = DependencyGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 0);
    }

    #[test]
    fn test_add_replaces_entry() {
        let mut graph = DependencyGraph::new();
        graph.add(AgentDependency::new("b", &["a"], &[]));
        graph.add(AgentDependency::root("b"));

        assert_eq!(graph.len(), 1);
        assert!(graph.dependencies("b").is_empty());
    }

    #[test]
    fn test_remove() {
        let mut graph = college_graph();
        assert!(graph.remove("opportunity_matcher"));
        assert!(!graph.remove("opportunity_matcher"));
        assert_eq!(graph.len(), 4);
    }

    // === Relationship Tests ===

    #[test]
    fn test_dependents() {
        let graph = college_graph();
        let dependents = graph.dependents("profile_analysis");
        assert_eq!(dependents.len(), 3);
        assert!(dependents.contains(&"opportunity_matcher".to_string()));
        assert!(graph.dependents("opportunity_matcher").is_empty());
    }

    #[test]
    fn test_depth() {
        let graph = college_graph();
        assert_eq!(graph.depth("profile_analysis"), 0);
        assert_eq!(graph.depth("skill_development_strategist"), 1);
        assert_eq!(graph.depth("career_optimization_planner"), 2);
        assert_eq!(graph.depth("opportunity_matcher"), 3);
        assert_eq!(graph.depth("unknown"), 0);
    }

    // === Layering Tests ===

    #[test]
    fn test_layers_for_full_plan() {
        let graph = college_graph();
        let layers = graph
            .layers(&plan(&[
                "profile_analysis",
                "market_intelligence",
                "skill_development_strategist",
                "career_optimization_planner",
                "opportunity_matcher",
            ]))
            .unwrap();

        assert_eq!(
            layers,
            vec![
                plan(&["profile_analysis", "market_intelligence"]),
                plan(&["skill_development_strategist"]),
                plan(&["career_optimization_planner"]),
                plan(&["opportunity_matcher"]),
            ]
        );
    }

    #[test]
    fn test_layers_ignore_dependencies_outside_plan() {
        let graph = college_graph();
        let layers = graph
            .layers(&plan(&["market_intelligence", "opportunity_matcher"]))
            .unwrap();
        assert_eq!(layers, vec![plan(&["market_intelligence", "opportunity_matcher"])]);
    }

    #[test]
    fn test_layers_detect_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add(AgentDependency::new("a", &["b"], &[]));
        graph.add(AgentDependency::new("b", &["a"], &[]));
        graph.add(AgentDependency::root("c"));

        let err = graph.layers(&plan(&["c", "a", "b"])).unwrap_err();
        assert_eq!(err, DependencyError::Cycle(plan(&["a", "b"])));
        assert_eq!(graph.depth("a"), 2);
    }

    #[test]
    fn test_repeated_dependency_is_not_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add(AgentDependency::root("a"));
        graph.add(AgentDependency::new("b", &["a", "a"], &[]));
        assert_eq!(graph.dependencies("b"), vec!["a".to_string()]);

        let layers = graph.layers(&plan(&["a", "b"])).unwrap();
        assert_eq!(layers, vec![vec!["a".to_string()], vec!["b".to_string()]]);
    }

    #[test]
    fn test_layers_count_distinct_dependencies() {
        let mut graph = DependencyGraph::new();
        graph.add(AgentDependency::root("a"));
        graph.add(AgentDependency {
            agent_id: "b".into(),
            depends_on: vec!["a".into(), "a".into()],
            required_outputs: Vec::new(),
        });

        let layers = graph.layers(&plan(&["a", "b"])).unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[1], vec!["b".to_string()]);
    }

    #[test]
    fn test_empty_plan_has_no_layers() {
        assert!(college_graph().layers(&[]).unwrap().is_empty());
    }

    // === Plan Order Tests ===

    #[test]
    fn test_order_violations() {
        let graph = college_graph();
        assert!(graph
            .order_violations(&plan(&["profile_analysis", "skill_development_strategist"]))
            .is_empty());

        let violations =
            graph.order_violations(&plan(&["skill_development_strategist", "profile_analysis"]));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("before its dependency profile_analysis"));
    }

    #[test]
    fn test_to_json() {
        let json = college_graph().to_json();
        assert_eq!(
            json["opportunity_matcher"]["depends_on"],
            serde_json::json!(["profile_analysis", "career_optimization_planner"])
        );
    }
}
