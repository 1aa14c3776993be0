//! Schema types and builders for tfplug
//!
//! This module provides the schema system for declaring resource and provider
//! attributes, including nested attribute objects.

use std::collections::HashMap;

/// AttributeType defines the type system for Terraform attributes
/// This must match Terraform's type system exactly
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Arbitrary precision, see types::Number
    Bool,
    List(Box<AttributeType>),               // Ordered, allows duplicates
    Set(Box<AttributeType>),                // Unordered, no duplicates
    Map(Box<AttributeType>),                // String keys only
    Object(HashMap<String, AttributeType>), // Fixed structure
}

/// Schema is returned by providers and resources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64, // Increment when schema changes require migration
    pub block: Block, // Root block containing all attributes
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }
}

/// Block represents a configuration block
#[derive(Debug, Clone)]
pub struct Block {
    pub version: i64,
    pub attributes: Vec<Attribute>,
    pub description: String,
    pub description_kind: StringKind,
    pub deprecated: bool,
}

/// Attribute represents a single configuration attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub nested_type: Option<NestedType>,
    pub deprecated: bool,
}

/// NestedType for attributes with nested structures
#[derive(Debug, Clone)]
pub struct NestedType {
    pub attributes: Vec<Attribute>,
    pub nesting: ObjectNestingMode,
}

impl NestedType {
    pub fn single(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            nesting: ObjectNestingMode::Single,
        }
    }

    pub fn list(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            nesting: ObjectNestingMode::List,
        }
    }
}

/// ObjectNestingMode for nested attribute objects
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectNestingMode {
    Invalid,
    Single,
    List,
    Set,
    Map,
}

/// StringKind represents the format of string values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StringKind {
    Plain,
    Markdown,
}

/// Builder for Attribute - provides fluent API
pub struct AttributeBuilder {
    attr: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attr: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                nested_type: None,
                deprecated: false,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attr.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attr.required = true;
        self.attr.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attr.optional = true;
        self.attr.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attr.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attr.sensitive = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.attr.deprecated = true;
        self
    }

    pub fn nested_type(mut self, nested: NestedType) -> Self {
        self.attr.nested_type = Some(nested);
        self
    }

    pub fn build(self) -> Attribute {
        self.attr
    }
}

/// Builder for Schema - provides fluent API
pub struct SchemaBuilder {
    version: i64,
    block: Block,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            version: 0,
            block: Block {
                version: 0,
                attributes: Vec::new(),
                description: String::new(),
                description_kind: StringKind::Plain,
                deprecated: false,
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self.block.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.block.attributes.push(attr);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.block.description = desc.to_string();
        self
    }

    pub fn description_kind(mut self, kind: StringKind) -> Self {
        self.block.description_kind = kind;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.block.deprecated = true;
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            version: self.version,
            block: self.block,
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_builder_required_clears_optional() {
        let attr = AttributeBuilder::new("name", AttributeType::String)
            .optional()
            .required()
            .build();

        assert!(attr.required);
        assert!(!attr.optional);
    }

    #[test]
    fn schema_builder_collects_attributes() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("test schema")
            .attribute(
                AttributeBuilder::new("id", AttributeType::Number)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("value", AttributeType::Object(HashMap::new()))
                    .optional()
                    .nested_type(NestedType::single(vec![AttributeBuilder::new(
                        "type",
                        AttributeType::String,
                    )
                    .required()
                    .build()]))
                    .build(),
            )
            .build();

        assert_eq!(schema.version, 1);
        assert_eq!(schema.block.version, 1);
        assert_eq!(schema.block.attributes.len(), 2);
        assert!(schema.attribute("id").unwrap().computed);

        let nested = schema.attribute("value").unwrap().nested_type.as_ref().unwrap();
        assert_eq!(nested.nesting, ObjectNestingMode::Single);
        assert_eq!(nested.attributes[0].name, "type");
    }
}
