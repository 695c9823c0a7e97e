// ABOUTME: Structural identity for DOM elements based on their absolute path from the document root.
// ABOUTME: Used to avoid counting one node twice when two selectors reach it.

use dom_query::NodeRef;

/// Returns an absolute, lxml-style path such as `/html/body/div[2]/p`.
///
/// An element gets a `[k]` index only when its parent has more than one
/// element child with the same tag. Non-element nodes appear as `node()[k]`
/// counted over all siblings.
pub fn node_path(node: &NodeRef<'_>) -> String {
    let mut segments = Vec::new();
    let mut current = Some(node.clone());

    while let Some(n) = current {
        if n.is_element() {
            segments.push(element_segment(&n));
        } else if n.is_document() {
            break;
        } else {
            segments.push(format!("node()[{}]", sibling_position(&n)));
        }
        current = n.parent();
    }

    segments.reverse();
    format!("/{}", segments.join("/"))
}

/// Returns true when both handles sit at the same structural position.
pub fn same_node(a: &NodeRef<'_>, b: &NodeRef<'_>) -> bool {
    node_path(a) == node_path(b)
}

fn element_segment(node: &NodeRef<'_>) -> String {
    let name = node
        .node_name()
        .map(|n| n.to_string())
        .unwrap_or_default();

    let mut before = 0;
    let mut sibling = node.prev_sibling();
    while let Some(s) = sibling {
        if has_tag(&s, &name) {
            before += 1;
        }
        sibling = s.prev_sibling();
    }

    let mut after = 0;
    let mut sibling = node.next_sibling();
    while let Some(s) = sibling {
        if has_tag(&s, &name) {
            after += 1;
        }
        sibling = s.next_sibling();
    }

    if before + after == 0 {
        name
    } else {
        format!("{}[{}]", name, before + 1)
    }
}

fn has_tag(node: &NodeRef<'_>, name: &str) -> bool {
    node.is_element() && node.node_name().is_some_and(|n| &*n == name)
}

fn sibling_position(node: &NodeRef<'_>) -> usize {
    let mut position = 1;
    let mut sibling = node.prev_sibling();
    while let Some(s) = sibling {
        position += 1;
        sibling = s.prev_sibling();
    }
    position
}
