//! Superclass graph of an environment using petgraph

use std::collections::{HashMap, HashSet};

use petgraph::graph::NodeIndex;
use petgraph::{algo, Graph as PetGraph};
use rbs_parser::TypeName;

use crate::environment::Environment;
use crate::error::{EnvironmentError, EnvironmentResult};

/// Directed graph with an edge from every superclass to its subclasses
#[derive(Debug, Default)]
pub struct SuperclassGraph {
    graph: PetGraph<TypeName, ()>,
    name_to_node: HashMap<TypeName, NodeIndex>,
    superclasses: HashMap<TypeName, TypeName>,
}

impl SuperclassGraph {
    /// Collect the resolved superclass of every class entry
    pub fn build(environment: &Environment) -> EnvironmentResult<Self> {
        let mut graph = Self::default();

        for (name, entry) in environment.entries() {
            if entry.is_module() {
                continue;
            }
            let class_node = graph.get_or_create_node(name);
            if let Some(super_name) = environment.superclass_of(name)? {
                let super_node = graph.get_or_create_node(&super_name);
                graph.graph.add_edge(super_node, class_node, ());
                graph.superclasses.insert(name.clone(), super_name);
            }
        }

        Ok(graph)
    }

    pub fn superclass(&self, name: &TypeName) -> Option<&TypeName> {
        self.superclasses.get(name)
    }

    /// Superclass chain of `name`, nearest first, stopping before any repeated name
    pub fn ancestors(&self, name: &TypeName) -> Vec<TypeName> {
        let mut seen = HashSet::from([name.clone()]);
        let mut chain = Vec::new();
        let mut current = name;

        while let Some(super_name) = self.superclass(current) {
            if !seen.insert(super_name.clone()) {
                break;
            }
            chain.push(super_name.clone());
            current = super_name;
        }

        chain
    }

    /// Class names with every superclass before its subclasses
    pub fn linearize(&self) -> Result<Vec<TypeName>, TypeName> {
        match algo::toposort(&self.graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .map(|node| self.graph[node].clone())
                .collect()),
            Err(cycle_error) => Err(self.graph[cycle_error.node_id()].clone()),
        }
    }

    /// Report the first superclass cycle, located at a declaration on the cycle
    pub fn check_acyclic(&self, environment: &Environment) -> EnvironmentResult<()> {
        let name = match self.linearize() {
            Ok(_) => return Ok(()),
            Err(name) => name,
        };

        let mut cycle = vec![name.to_string()];
        cycle.extend(self.ancestors(&name).iter().map(TypeName::to_string));
        cycle.push(name.to_string());

        let entry = environment
            .get(&name)
            .ok_or_else(|| EnvironmentError::EmptyEntry { name: name.clone() })?;
        let location = entry.primary_declaration()?.location();

        Err(EnvironmentError::CyclicClassHierarchy {
            span: location.source_span(),
            cycle: cycle.join(" < "),
            name,
            location,
        })
    }

    fn get_or_create_node(&mut self, name: &TypeName) -> NodeIndex {
        if let Some(&node) = self.name_to_node.get(name) {
            node
        } else {
            let node = self.graph.add_node(name.clone());
            self.name_to_node.insert(name.clone(), node);
            node
        }
    }
}
