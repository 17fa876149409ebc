//! 拓扑排序
//!
//! 显式栈上的深度优先后序遍历。每个节点有三种标记：未访问、在栈上、已完成。
//! 遇到指向"在栈上"节点的边即为循环依赖。

use tracing::{debug, trace};

use crate::error::{CoreError, CoreResult};
use crate::graph::DependencyGraph;
use crate::unit::TranslationUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// 计算编译顺序（单元下标序列）
///
/// 按单元序列顺序选择起点，按每个单元记录的边顺序下降；
/// 每个依赖都排在依赖它的单元之前。
pub fn topological_order(
    units: &[TranslationUnit],
    graph: &DependencyGraph,
) -> CoreResult<Vec<usize>> {
    let mut marks = vec![Mark::Unvisited; units.len()];
    let mut order = Vec::with_capacity(units.len());
    // (节点, 下一条待访问边的位置)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..units.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::OnStack;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let deps = graph.dependencies(node);

            if frame.1 < deps.len() {
                let dep = deps[frame.1];
                frame.1 += 1;
                match marks[dep] {
                    Mark::Unvisited => {
                        marks[dep] = Mark::OnStack;
                        stack.push((dep, 0));
                    }
                    Mark::OnStack => {
                        let cycle = extract_cycle(units, &stack, dep);
                        debug!(target: "bspm::order", len = cycle.len() - 1, "cycle detected");
                        return Err(CoreError::CyclicDependency { cycle });
                    }
                    Mark::Done => {}
                }
            } else {
                stack.pop();
                marks[node] = Mark::Done;
                trace!(target: "bspm::order", position = order.len(), path = %units[node].path.display(), "emit");
                order.push(node);
            }
        }
    }

    debug!(target: "bspm::order", count = order.len(), "order computed");
    Ok(order)
}

/// 从栈中截取环：从重入节点到栈顶，再回到重入节点
fn extract_cycle(
    units: &[TranslationUnit],
    stack: &[(usize, usize)],
    reentered: usize,
) -> Vec<std::path::PathBuf> {
    let start = stack
        .iter()
        .position(|&(node, _)| node == reentered)
        .unwrap_or(0);
    stack[start..]
        .iter()
        .map(|&(node, _)| units[node].path.clone())
        .chain(std::iter::once(units[reentered].path.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Import, UnitKind};
    use std::path::PathBuf;

    fn unit(index: usize, path: &str, module: Option<&str>, imports: &[&str]) -> TranslationUnit {
        let mut u = TranslationUnit::new(path, UnitKind::Interface, index);
        u.declared_module = module.map(str::to_string);
        u.imports = imports.iter().map(|n| Import::module(*n)).collect();
        u
    }

    fn order_paths(units: &[TranslationUnit]) -> CoreResult<Vec<String>> {
        let graph = DependencyGraph::build(units)?;
        let order = topological_order(units, &graph)?;
        Ok(order
            .into_iter()
            .map(|i| units[i].path.display().to_string())
            .collect())
    }

    #[test]
    fn test_dependencies_first() {
        let units = vec![
            unit(0, "main", None, &["b"]),
            unit(1, "b", Some("b"), &["a"]),
            unit(2, "a", Some("a"), &[]),
        ];
        assert_eq!(order_paths(&units).unwrap(), vec!["a", "b", "main"]);
    }

    #[test]
    fn test_independent_units_keep_sequence_order() {
        let units = vec![
            unit(0, "x", None, &[]),
            unit(1, "y", None, &[]),
            unit(2, "z", None, &[]),
        ];
        assert_eq!(order_paths(&units).unwrap(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_diamond_emits_shared_dependency_once() {
        let units = vec![
            unit(0, "top", None, &["left", "right"]),
            unit(1, "left", Some("left"), &["base"]),
            unit(2, "right", Some("right"), &["base"]),
            unit(3, "base", Some("base"), &[]),
        ];
        assert_eq!(
            order_paths(&units).unwrap(),
            vec!["base", "left", "right", "top"]
        );
    }

    #[test]
    fn test_two_cycle_detected() {
        let units = vec![
            unit(0, "a", Some("a"), &["b"]),
            unit(1, "b", Some("b"), &["a"]),
        ];
        let err = order_paths(&units).unwrap_err();
        assert_eq!(
            err,
            CoreError::CyclicDependency {
                cycle: vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("a")]
            }
        );
    }

    #[test]
    fn test_cycle_below_acyclic_prefix() {
        let units = vec![
            unit(0, "main", None, &["p"]),
            unit(1, "p", Some("p"), &["q"]),
            unit(2, "q", Some("q"), &["r"]),
            unit(3, "r", Some("r"), &["p"]),
        ];
        let err = order_paths(&units).unwrap_err();
        assert_eq!(
            err,
            CoreError::CyclicDependency {
                cycle: vec![
                    PathBuf::from("p"),
                    PathBuf::from("q"),
                    PathBuf::from("r"),
                    PathBuf::from("p")
                ]
            }
        );
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        // 深链不依赖递归深度
        let n = 20_000;
        let names: Vec<String> = (0..n).map(|i| format!("m{}", i)).collect();
        let units: Vec<TranslationUnit> = (0..n)
            .map(|i| {
                let mut u = TranslationUnit::new(format!("/p/m{}.cppm", i), UnitKind::Interface, i);
                u.declared_module = Some(names[i].clone());
                if i + 1 < n {
                    u.imports = vec![Import::module(names[i + 1].clone())];
                }
                u
            })
            .collect();

        let graph = DependencyGraph::build(&units).unwrap();
        let order = topological_order(&units, &graph).unwrap();
        assert_eq!(order.len(), n);
        assert_eq!(order[0], n - 1);
        assert_eq!(order[n - 1], 0);
    }

    #[test]
    fn test_empty() {
        let graph = DependencyGraph::build(&[]).unwrap();
        assert!(topological_order(&[], &graph).unwrap().is_empty());
    }
}
