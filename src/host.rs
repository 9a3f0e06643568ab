/// The page a [`GalleryModalController`](crate::GalleryModalController) drives.
///
/// Every lookup returns `Option`: an element the page does not provide is an expected
/// absence, and the controller skips whatever effect depended on it. Mutations on a node
/// that cannot take them are silently ignored for the same reason.
pub trait ModalHost {
    type Node: Clone + PartialEq;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// First descendant of `scope` matching `selector`.
    fn query_within(&self, scope: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// All document elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

    fn text_content(&self, node: &Self::Node) -> String;

    fn set_text_content(&mut self, node: &Self::Node, text: &str);

    fn clear_children(&mut self, node: &Self::Node);

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    fn add_class(&mut self, node: &Self::Node, class_name: &str);

    fn remove_class(&mut self, node: &Self::Node, class_name: &str);

    /// Sets an inline style property; an empty value clears it.
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);

    /// Sets an inline style property on the document body.
    fn set_body_style(&mut self, property: &str, value: &str);

    fn focus(&mut self, node: &Self::Node);

    /// Source an image element currently displays.
    fn image_source(&self, node: &Self::Node) -> String {
        self.attribute(node, "src").unwrap_or_default()
    }

    fn set_image_source(&mut self, node: &Self::Node, src: &str) {
        self.set_attribute(node, "src", src);
    }

    fn set_image_alt(&mut self, node: &Self::Node, alt: &str) {
        self.set_attribute(node, "alt", alt);
    }
}
