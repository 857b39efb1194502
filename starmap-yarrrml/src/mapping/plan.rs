//! Execution order over quoted references
//!
//! A map that quotes another must see that map's complete output, so maps
//! are grouped into levels: every map of level `k` only quotes maps of
//! levels `< k`. Maps of one level are independent of each other.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::TriplesMap;
use crate::error::{MappingError, MappingResult};

/// Dependency levels of a mapping specification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    levels: Vec<Vec<String>>,
}

impl ExecutionPlan {
    /// Build the plan with Kahn's algorithm.
    ///
    /// Only quoted references (subject or object) are edges; `mapping:`
    /// objects read the parent's table, not its output. Within a level maps
    /// keep document order.
    pub fn build(maps: &[TriplesMap]) -> MappingResult<Self> {
        let position: HashMap<&str, usize> = maps
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.as_str(), i))
            .collect();

        // deps[i] = quoted maps of i, dependents[j] = maps quoting j
        let mut deps: Vec<Vec<usize>> = vec![Vec::new(); maps.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); maps.len()];
        for (i, map) in maps.iter().enumerate() {
            for quoted in map.quoted_refs() {
                let j = *position.get(quoted.mapping.as_str()).ok_or_else(|| {
                    MappingError::UnknownTriplesMap {
                        mapping: map.name.clone(),
                        reference: quoted.mapping.clone(),
                    }
                })?;
                if !deps[i].contains(&j) {
                    deps[i].push(j);
                    dependents[j].push(i);
                }
            }
        }

        let mut remaining: Vec<usize> = deps.iter().map(Vec::len).collect();
        let mut current: Vec<usize> = (0..maps.len()).filter(|&i| remaining[i] == 0).collect();
        let mut placed = 0;
        let mut levels = Vec::new();

        while !current.is_empty() {
            placed += current.len();
            let mut next = Vec::new();
            for &i in &current {
                for &d in &dependents[i] {
                    remaining[d] -= 1;
                    if remaining[d] == 0 {
                        next.push(d);
                    }
                }
            }
            next.sort_unstable();
            levels.push(current.iter().map(|&i| maps[i].name.clone()).collect());
            current = next;
        }

        if placed < maps.len() {
            let path = cycle_path(maps, &deps, &remaining);
            return Err(MappingError::ReferenceCycle(path));
        }

        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[Vec<String>] {
        &self.levels
    }

    /// Map names in execution order
    pub fn order(&self) -> impl Iterator<Item = &str> + '_ {
        self.levels.iter().flatten().map(String::as_str)
    }
}

/// Walk quoted edges among unplaced maps until a node repeats.
fn cycle_path(maps: &[TriplesMap], deps: &[Vec<usize>], remaining: &[usize]) -> Vec<String> {
    let Some(start) = (0..maps.len()).find(|&i| remaining[i] > 0) else {
        return Vec::new();
    };

    let mut path = vec![start];
    let mut node = start;
    loop {
        // an unplaced map always has at least one unplaced dependency
        let Some(&next) = deps[node].iter().find(|&&d| remaining[d] > 0) else {
            break;
        };
        if let Some(pos) = path.iter().position(|&p| p == next) {
            let mut cycle: Vec<String> =
                path[pos..].iter().map(|&i| maps[i].name.clone()).collect();
            cycle.push(maps[next].name.clone());
            return cycle;
        }
        path.push(next);
        node = next;
    }
    path.into_iter().map(|i| maps[i].name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{
        ObjectSpec, PredicateObjectSpec, QuotedRef, SourceFormat, SourceRef, SubjectSpec, Template,
    };

    fn base(name: &str) -> TriplesMap {
        TriplesMap::new(
            name,
            vec![SourceRef::new("data.csv", SourceFormat::Csv)],
            SubjectSpec::templates(vec![Template::parse("ex:$(id)").unwrap()]),
        )
    }

    fn quoting(name: &str, target: &str) -> TriplesMap {
        TriplesMap::new(
            name,
            vec![SourceRef::new("data.csv", SourceFormat::Csv)],
            SubjectSpec::quoted(QuotedRef::new(target)),
        )
    }

    #[test]
    fn test_levels() {
        let mut obj = base("objectQuoter");
        obj.predicate_objects.push(PredicateObjectSpec::new(
            Template::constant("ex:about"),
            ObjectSpec::Quoted(QuotedRef::new("person")),
        ));
        let maps = vec![obj, quoting("annotation", "person"), base("person"), base("other")];

        let plan = ExecutionPlan::build(&maps).unwrap();
        assert_eq!(
            plan.levels(),
            &[
                vec!["person".to_string(), "other".to_string()],
                vec!["objectQuoter".to_string(), "annotation".to_string()],
            ]
        );
        assert_eq!(plan.order().count(), 4);
    }

    #[test]
    fn test_cycle() {
        let maps = vec![quoting("a", "b"), quoting("b", "a")];
        match ExecutionPlan::build(&maps) {
            Err(MappingError::ReferenceCycle(path)) => {
                assert_eq!(path, vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_quote_is_cycle() {
        let maps = vec![quoting("a", "a")];
        assert!(matches!(
            ExecutionPlan::build(&maps),
            Err(MappingError::ReferenceCycle(_))
        ));
    }

    #[test]
    fn test_unknown_reference() {
        let maps = vec![quoting("a", "missing")];
        assert!(matches!(
            ExecutionPlan::build(&maps),
            Err(MappingError::UnknownTriplesMap { .. })
        ));
    }
}
