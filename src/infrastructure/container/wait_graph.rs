use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

/// 跨任务的等待关系：正在构造的契约 -> 它当前等待的契约
///
/// 解析链只覆盖单个任务内的重入。两个任务分别构造 A、B 并互相等待时，
/// 只有在这张图上才能看到环。检查和插入在同一把锁内完成。
#[derive(Default)]
pub(crate) struct WaitGraph {
    edges: Mutex<HashMap<&'static str, Vec<&'static str>>>,
}

impl WaitGraph {
    /// 记录 `waiter` 等待 `target`
    ///
    /// 如果从 `target` 出发沿等待关系能回到 `chain` 上的任一契约，返回构成环的
    /// 完整链路，不记录这条边。
    pub(crate) fn enter(
        &self,
        waiter: &'static str,
        target: &'static str,
        chain: &[&'static str],
    ) -> Result<(), Vec<&'static str>> {
        let mut edges = self.edges.lock();

        if let Some(path) = path_to_chain(&edges, target, chain) {
            let back_to = path.last().copied().unwrap_or(target);
            let start = chain.iter().position(|name| *name == back_to).unwrap_or(0);
            let mut cycle = chain[start..].to_vec();
            cycle.extend(path);
            return Err(cycle);
        }

        edges.entry(waiter).or_default().push(target);
        Ok(())
    }

    pub(crate) fn leave(&self, waiter: &'static str, target: &'static str) {
        let mut edges = self.edges.lock();
        if let Some(targets) = edges.get_mut(waiter) {
            if let Some(index) = targets.iter().position(|name| *name == target) {
                targets.swap_remove(index);
            }
            if targets.is_empty() {
                edges.remove(waiter);
            }
        }
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.edges.lock().is_empty()
    }
}

/// 深度优先查找从 `from` 到 `chain` 中某个契约的路径（含两端）
fn path_to_chain(
    edges: &HashMap<&'static str, Vec<&'static str>>,
    from: &'static str,
    chain: &[&'static str],
) -> Option<Vec<&'static str>> {
    let mut visited = HashSet::new();
    let mut stack = vec![vec![from]];

    while let Some(path) = stack.pop() {
        let current = *path.last()?;
        if chain.contains(&current) {
            return Some(path);
        }
        if !visited.insert(current) {
            continue;
        }
        for next in edges.get(current).into_iter().flatten() {
            let mut extended = path.clone();
            extended.push(*next);
            stack.push(extended);
        }
    }
    None
}
