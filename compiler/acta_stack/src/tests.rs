use super::ensure_sufficient_stack;

#[derive(Debug)]
enum Nested {
    Leaf(i64),
    Wrap(Box<Nested>),
}

fn build(depth: usize) -> Nested {
    let mut node = Nested::Leaf(7);
    for _ in 0..depth {
        node = Nested::Wrap(Box::new(node));
    }
    node
}

fn depth_and_leaf(node: &Nested) -> (usize, i64) {
    ensure_sufficient_stack(|| match node {
        Nested::Leaf(v) => (0, *v),
        Nested::Wrap(inner) => {
            let (d, v) = depth_and_leaf(inner);
            (d + 1, v)
        }
    })
}

#[test]
fn test_walks_deeply_nested_tree() {
    let tree = build(200_000);
    assert_eq!(depth_and_leaf(&tree), (200_000, 7));
    // Drop iteratively; the derived drop would recurse.
    let mut cur = tree;
    while let Nested::Wrap(inner) = cur {
        cur = *inner;
    }
}

#[test]
fn test_propagates_results() {
    let r: Result<u8, String> = ensure_sufficient_stack(|| Err("boom".to_string()));
    assert_eq!(r, Err("boom".to_string()));
}
