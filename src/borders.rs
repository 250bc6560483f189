use crate::model::Edge;
use crate::xml::XmlElement;

pub(crate) const W_PBDR: &str = "w:pBdr";

/// Strips decorative borders from a paragraph or cell properties node.
///
/// With `keep_borders` false, every direct edge entry (`top`, `left`,
/// `bottom`, `right`, `between`) is removed. The `w:pBdr` group is removed
/// either way: keeping borders only protects edges set directly on the node.
pub fn clean_decorative_lines(props: &mut XmlElement, keep_borders: bool) {
    if !keep_borders {
        for edge in Edge::ALL {
            props.remove_children(edge.tag());
        }
    }
    props.remove_children(W_PBDR);
}

/// Removes every element, anywhere below `root`, whose qualified name
/// contains `Bdr`. Returns how many were removed.
pub fn strip_border_elements(root: &mut XmlElement) -> usize {
    root.retain_descendants(&mut |el| !el.name().contains("Bdr"))
}
