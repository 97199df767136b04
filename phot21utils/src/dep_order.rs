//!
//! # Dependency-Ordering Trait and Helpers
//!

// Std-lib
use std::collections::HashSet;
use std::marker::PhantomData;

///
/// # Dependency-Ordering Trait
///
/// Layout libraries are graphs: cells instantiate other cells, and several
/// processing steps (notably GDS export, which must define every struct
/// before it is referenced) need the cells in dependency order even though
/// they are stored unordered.
///
/// Implementers define a single method, `process`, which visits one `Item`
/// (commonly a pointer to a graph node) and pushes each of its *direct*
/// dependencies onto the provided [DepOrderer]. The orderer recurses
/// depth-first, detects cycles, and accumulates a dependency-ordered vector.
///
/// Typical usage:
///
/// ```text
/// struct CellOrder;
/// impl DepOrder for CellOrder {
///     type Item = Ptr<Cell>;
///     type Error = MyError;
///     fn process(item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), Self::Error> {
///         for dep in item.dependencies() {
///             orderer.push(dep)?;
///         }
///         Ok(())
///     }
///     fn fail() -> Result<(), Self::Error> {
///         Err(MyError::cycle())
///     }
/// }
/// let ordered = CellOrder::order(&[top])?;
/// ```
///
pub trait DepOrder: Sized {
    /// Item Type. Typically pointers or keys to the nodes in the dependency graph.
    type Item: Clone + Eq + std::hash::Hash;
    /// Error Type
    type Error;

    /// Dependency-order all entries in slice `items`
    fn order(items: &[Self::Item]) -> Result<Vec<Self::Item>, Self::Error> {
        DepOrderer::<Self>::order(items)
    }

    /// Process a single `item`, pushing its direct dependencies
    fn process(item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), Self::Error>;
    /// Failure-handler, generally reporting a dependency cycle
    fn fail() -> Result<(), Self::Error>;
}

/// # Dependency Order Helper
/// Should not be used directly; public solely for use in the call-signature
/// of [DepOrder::process].
pub struct DepOrderer<P: DepOrder> {
    /// Ordered, completed items
    stack: Vec<P::Item>,
    /// Completed items, for quick membership tests
    seen: HashSet<P::Item>,
    /// Pending items, for cycle detection
    pending: HashSet<P::Item>,
    // Item-processor phantom reference
    p: PhantomData<P>,
}
impl<P: DepOrder> DepOrderer<P> {
    /// Dependency-order all entries in slice `items`
    pub fn order(items: &[P::Item]) -> Result<Vec<P::Item>, P::Error> {
        let len = items.len();
        let mut this = Self {
            stack: Vec::with_capacity(len),
            seen: HashSet::with_capacity(len),
            pending: HashSet::new(),
            p: PhantomData,
        };
        for item in items.iter() {
            this.push(item)?;
        }
        Ok(this.stack)
    }
    /// Push `item`'s dependencies, and then itself, onto the stack
    pub fn push(&mut self, item: &P::Item) -> Result<(), P::Error> {
        if self.seen.contains(item) {
            return Ok(());
        }
        // An item in the pending-set is an open recursive stack-frame: a cycle.
        if self.pending.contains(item) {
            return P::fail();
        }
        self.pending.insert(item.clone());
        // Process the item, dependencies first
        P::process(item, self)?;
        if !self.pending.remove(item) {
            return P::fail();
        }
        self.seen.insert(item.clone());
        self.stack.push(item.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Toy graph: node name => direct dependencies
    struct Graph(HashMap<&'static str, Vec<&'static str>>);

    thread_local! {
        static GRAPH: std::cell::RefCell<Option<Graph>> = std::cell::RefCell::new(None);
    }

    struct NameOrder;
    impl DepOrder for NameOrder {
        type Item = &'static str;
        type Error = ();
        fn process(item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), ()> {
            let deps: Vec<&'static str> = GRAPH.with(|g| {
                g.borrow()
                    .as_ref()
                    .unwrap()
                    .0
                    .get(item)
                    .cloned()
                    .unwrap_or_default()
            });
            for dep in deps.iter() {
                orderer.push(dep)?;
            }
            Ok(())
        }
        fn fail() -> Result<(), ()> {
            Err(())
        }
    }

    fn set_graph(edges: &[(&'static str, &[&'static str])]) {
        let map = edges
            .iter()
            .map(|(k, v)| (*k, v.to_vec()))
            .collect::<HashMap<_, _>>();
        GRAPH.with(|g| *g.borrow_mut() = Some(Graph(map)));
    }

    #[test]
    fn orders_deps_first() {
        set_graph(&[("top", &["mid1", "mid2"]), ("mid1", &["leaf"]), ("mid2", &["leaf"])]);
        let ordered = NameOrder::order(&["top"]).unwrap();
        assert_eq!(ordered, vec!["leaf", "mid1", "mid2", "top"]);
    }
    #[test]
    fn detects_cycles() {
        set_graph(&[("a", &["b"]), ("b", &["a"])]);
        assert!(NameOrder::order(&["a"]).is_err());
    }
}
