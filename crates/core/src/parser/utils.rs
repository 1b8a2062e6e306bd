use crate::{
    error::{Error, Result},
    host::{Attribute, TypeRef},
};
use tree_sitter::Node;

pub fn node_text<'s>(node: &Node, source: &'s str) -> Result<&'s str> {
    node.utf8_text(source.as_bytes())
        .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in {}: {e}", node.kind())))
}

/// Text of the node's `name` field
pub fn field_name(node: &Node, source: &str) -> Result<Option<String>> {
    match node.child_by_field_name("name") {
        Some(name) => Ok(Some(node_text(&name, source)?.to_string())),
        None => Ok(None),
    }
}

/// Outer attributes written directly above `node`, in source order, and the
/// zero-based line the item starts on once those attributes are counted.
pub fn attributes_before(node: &Node, source: &str) -> Result<(Vec<Attribute>, u32)> {
    let mut attributes = Vec::new();
    let mut first_line = node.start_position().row as u32;
    let mut sibling = node.prev_sibling();

    while let Some(s) = sibling {
        match s.kind() {
            "attribute_item" => {
                if let Some(attribute) = s.named_child(0) {
                    attributes.push(parse_attribute(&attribute, source)?);
                }
                first_line = s.start_position().row as u32;
            }
            "line_comment" | "block_comment" => {}
            _ => break,
        }
        sibling = s.prev_sibling();
    }

    attributes.reverse();
    Ok((attributes, first_line))
}

/// `attribute` node -> path + argument text without the outer delimiters
pub fn parse_attribute(node: &Node, source: &str) -> Result<Attribute> {
    let path = match node.named_child(0) {
        Some(path) => node_text(&path, source)?.to_string(),
        None => String::new(),
    };
    let arguments = match node.child_by_field_name("arguments") {
        Some(tokens) => Some(strip_delimiters(node_text(&tokens, source)?).to_string()),
        None => None,
    };
    Ok(Attribute { path, arguments })
}

fn strip_delimiters(text: &str) -> &str {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some('(' | '[' | '{'), Some(')' | ']' | '}')) => chars.as_str().trim(),
        _ => text.trim(),
    }
}

/// Segments of a (possibly scoped) path node: `crate::a::B` -> `[crate, a, B]`
pub fn path_segments(node: &Node, source: &str) -> Result<Vec<String>> {
    match node.kind() {
        "scoped_identifier" | "scoped_type_identifier" => {
            let mut segments = match node.child_by_field_name("path") {
                Some(path) => path_segments(&path, source)?,
                None => Vec::new(),
            };
            if let Some(name) = node.child_by_field_name("name") {
                segments.push(node_text(&name, source)?.to_string());
            }
            Ok(segments)
        }
        _ => Ok(vec![node_text(node, source)?.to_string()]),
    }
}

/// Parse a type node into a [`TypeRef`]. Syntax the engine cannot forward
/// becomes [`TypeRef::Unsupported`] carrying the source text.
pub fn parse_type(node: &Node, source: &str) -> Result<TypeRef> {
    let ty = match node.kind() {
        "primitive_type" | "type_identifier" => TypeRef::Path {
            segments: vec![node_text(node, source)?.to_string()],
            arguments: Vec::new(),
        },
        "scoped_type_identifier" => TypeRef::Path {
            segments: path_segments(node, source)?,
            arguments: Vec::new(),
        },
        "generic_type" => {
            let Some(base) = node.child_by_field_name("type") else {
                return unsupported(node, source);
            };
            let mut arguments = Vec::new();
            if let Some(list) = node.child_by_field_name("type_arguments") {
                for argument in list.named_children(&mut list.walk()) {
                    match argument.kind() {
                        "line_comment" | "block_comment" => {}
                        // Lifetime arguments do not survive the trip through `Box<dyn Any>`
                        "lifetime" => return unsupported(node, source),
                        _ => arguments.push(parse_type(&argument, source)?),
                    }
                }
            }
            TypeRef::Path {
                segments: path_segments(&base, source)?,
                arguments,
            }
        }
        "reference_type" => {
            let Some(inner) = node.child_by_field_name("type") else {
                return unsupported(node, source);
            };
            let mutable = node
                .children(&mut node.walk())
                .any(|child| child.kind() == "mutable_specifier");
            TypeRef::Reference {
                mutable,
                inner: Box::new(parse_type(&inner, source)?),
            }
        }
        "dynamic_type" => match node.child_by_field_name("trait") {
            Some(bound)
                if matches!(bound.kind(), "type_identifier" | "scoped_type_identifier") =>
            {
                TypeRef::TraitObject {
                    segments: path_segments(&bound, source)?,
                }
            }
            _ => return unsupported(node, source),
        },
        "unit_type" => TypeRef::Unit,
        _ => return unsupported(node, source),
    };
    Ok(ty)
}

fn unsupported(node: &Node, source: &str) -> Result<TypeRef> {
    Ok(TypeRef::Unsupported(node_text(node, source)?.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RustParser;

    fn first_return_type(source: &str) -> TypeRef {
        let mut parser = RustParser::new().unwrap();
        let tree = parser.parse(source).unwrap();
        let root = tree.root_node();
        let function = root.named_child(0).unwrap();
        let ty = function.child_by_field_name("return_type").unwrap();
        parse_type(&ty, source).unwrap()
    }

    #[test]
    fn test_parse_generic_and_trait_object_types() {
        let ty = first_return_type("fn f() -> Box<dyn std::any::Any> {}");
        assert_eq!(
            ty,
            TypeRef::generic(
                &["Box"],
                vec![TypeRef::TraitObject {
                    segments: vec!["std".into(), "any".into(), "Any".into()]
                }]
            )
        );
    }

    #[test]
    fn test_parse_references_and_unsupported() {
        assert_eq!(
            first_return_type("fn f() -> &'static mut str {}"),
            TypeRef::Reference {
                mutable: true,
                inner: Box::new(TypeRef::path(&["str"])),
            }
        );
        assert_eq!(first_return_type("fn f() -> () {}"), TypeRef::Unit);
        assert_eq!(
            first_return_type("fn f() -> (i32, i32) {}"),
            TypeRef::Unsupported("(i32, i32)".to_string())
        );
        assert_eq!(
            first_return_type("fn f() -> Cow<'static, str> {}"),
            TypeRef::Unsupported("Cow<'static, str>".to_string())
        );
        assert_eq!(
            first_return_type("fn f() -> Option<Cow<'a, str>> {}"),
            TypeRef::generic(
                &["Option"],
                vec![TypeRef::Unsupported("Cow<'a, str>".to_string())]
            )
        );
    }

    #[test]
    fn test_attributes_before_skips_comments() {
        let source = r#"
#[derive(Debug)]
// explain
#[proxy_for(crate::shapes::Vector)]
fn dispatch() {}
"#;
        let mut parser = RustParser::new().unwrap();
        let tree = parser.parse(source).unwrap();
        let root = tree.root_node();
        let function = root
            .named_children(&mut root.walk())
            .find(|n| n.kind() == "function_item")
            .unwrap();

        let (attributes, line) = attributes_before(&function, source).unwrap();
        assert_eq!(line, 1);
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].path, "derive");
        assert_eq!(attributes[0].arguments.as_deref(), Some("Debug"));
        assert_eq!(attributes[1].path, "proxy_for");
        assert_eq!(attributes[1].arguments.as_deref(), Some("crate::shapes::Vector"));
    }
}
