// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Dependency ordering
//!
//! Kahn's algorithm over a `node -> dependencies` map. Among nodes that are
//! ready at the same time the smallest key is emitted first, so the same graph
//! always produces the same order.

use std::collections::{BTreeMap, BTreeSet};

/// Order `dependencies` so that every node comes after everything it depends on
///
/// Dependencies naming a node that is not a key of the map are ignored; callers
/// validate them beforehand.
///
/// # Errors
///
/// If the graph has a cycle, returns the nodes that could not be emitted (the
/// members of every cycle plus everything downstream of one), in key order.
pub fn topological_sort<K>(dependencies: &BTreeMap<K, BTreeSet<K>>) -> Result<Vec<K>, Vec<K>>
where
    K: Ord + Clone,
{
    let mut in_degree: BTreeMap<&K, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&K, Vec<&K>> = BTreeMap::new();

    for (node, deps) in dependencies {
        let known = deps.iter().filter(|dep| dependencies.contains_key(*dep));
        let mut degree = 0;
        for dep in known {
            dependents.entry(dep).or_default().push(node);
            degree += 1;
        }
        in_degree.insert(node, degree);
    }

    let mut ready: BTreeSet<&K> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(&node, _)| node)
        .collect();

    let mut sorted = Vec::with_capacity(dependencies.len());
    while let Some(node) = ready.pop_first() {
        sorted.push(node.clone());

        if let Some(children) = dependents.get(node) {
            for &child in children {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(child);
                    }
                }
            }
        }
    }

    if sorted.len() == dependencies.len() {
        return Ok(sorted);
    }

    let emitted: BTreeSet<&K> = sorted.iter().collect();
    Err(dependencies
        .keys()
        .filter(|node| !emitted.contains(node))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(u32, &[u32])]) -> BTreeMap<u32, BTreeSet<u32>> {
        edges
            .iter()
            .map(|(node, deps)| (*node, deps.iter().copied().collect()))
            .collect()
    }

    #[test]
    fn test_empty_graph() {
        let sorted = topological_sort::<u32>(&BTreeMap::new()).unwrap();
        assert!(sorted.is_empty());
    }

    #[test]
    fn test_chain() {
        let sorted = topological_sort(&graph(&[(0, &[]), (1, &[0]), (2, &[1])])).unwrap();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn test_reverse_registration_chain() {
        // 0 depends on 1 depends on 2: the keys alone would suggest the wrong order.
        let sorted = topological_sort(&graph(&[(0, &[1]), (1, &[2]), (2, &[])])).unwrap();
        assert_eq!(sorted, vec![2, 1, 0]);
    }

    #[test]
    fn test_lowest_ready_first() {
        // 3 and 1 both wait on 2; 0 is independent.
        let sorted =
            topological_sort(&graph(&[(0, &[]), (1, &[2]), (2, &[]), (3, &[2])])).unwrap();
        assert_eq!(sorted, vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_diamond() {
        let sorted =
            topological_sort(&graph(&[(0, &[]), (1, &[0]), (2, &[0]), (3, &[1, 2])])).unwrap();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_cycle_reports_unemitted_nodes() {
        // 1 <-> 2 form a cycle, 3 hangs off it, 0 is fine.
        let result = topological_sort(&graph(&[(0, &[]), (1, &[2]), (2, &[1]), (3, &[1])]));
        assert_eq!(result, Err(vec![1, 2, 3]));
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let result = topological_sort(&graph(&[(0, &[0])]));
        assert_eq!(result, Err(vec![0]));
    }

    #[test]
    fn test_unknown_dependencies_ignored() {
        let sorted = topological_sort(&graph(&[(0, &[42]), (1, &[0])])).unwrap();
        assert_eq!(sorted, vec![0, 1]);
    }

    #[test]
    fn test_string_keys() {
        let mut deps: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        deps.insert("render".into(), ["physics".to_string()].into_iter().collect());
        deps.insert("physics".into(), BTreeSet::new());
        deps.insert("audio".into(), BTreeSet::new());
        let sorted = topological_sort(&deps).unwrap();
        assert_eq!(sorted, vec!["audio", "physics", "render"]);
    }
}
