//
//  bitbucket-provider
//  cli/schema.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Schema inspection commands
//!
//! Without a type, lists every registered resource and data source. With a
//! type, prints one row per field; nested block fields appear as
//! `block.field`.

use anyhow::{bail, Result};
use clap::Args;

use crate::output::TableBuilder;
use crate::provider::Provider;
use crate::schema::{Field, FieldType, Schema};
use crate::util::truncate;

use super::GlobalOptions;

/// List registered types or describe one
#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Resource or data source type
    pub type_name: Option<String>,

    /// Describe the data source when a resource has the same name
    #[arg(long)]
    pub data: bool,
}

fn flags(field: &Field) -> String {
    let mut flags = vec![field.cardinality.name()];
    if field.force_new {
        flags.push("force-new");
    }
    if field.sensitive {
        flags.push("sensitive");
    }
    flags.join(", ")
}

fn constraint(field: &Field) -> String {
    if let Some(allowed) = &field.allowed {
        return format!("one of {}", allowed.join("|"));
    }
    if let Some(pattern) = &field.pattern {
        return format!("matches {}", pattern.as_str());
    }
    if let Some(default) = &field.default {
        return format!("default {default}");
    }
    match &field.kind {
        FieldType::BlockList {
            max_items: Some(max),
            ..
        } => format!("at most {max}"),
        _ => String::new(),
    }
}

/// One row per field, nested blocks flattened with dotted names.
pub(crate) fn schema_rows(schema: &Schema) -> Vec<Vec<String>> {
    fn walk(fields: &[Field], prefix: &str, rows: &mut Vec<Vec<String>>) {
        for field in fields {
            let name = if prefix.is_empty() {
                field.name.to_string()
            } else {
                format!("{prefix}.{}", field.name)
            };
            rows.push(vec![
                name.clone(),
                field.kind.name().to_string(),
                flags(field),
                constraint(field),
                truncate(field.description, 60),
            ]);
            match &field.kind {
                FieldType::Block(children) | FieldType::BlockList { fields: children, .. } => {
                    walk(children, &name, rows)
                }
                _ => {}
            }
        }
    }

    let mut rows = Vec::new();
    walk(&schema.fields, "", &mut rows);
    rows
}

impl SchemaCommand {
    pub async fn run(&self, _global: &GlobalOptions) -> Result<()> {
        let provider = Provider::new();

        let Some(type_name) = &self.type_name else {
            for name in provider.resource_types() {
                println!("resource  {name}");
            }
            for name in provider.data_source_types() {
                println!("data      {name}");
            }
            return Ok(());
        };

        let schema = match (self.data, provider.resource(type_name), provider.data_source(type_name)) {
            (false, Ok(resource), _) => resource.schema(),
            (_, _, Ok(data_source)) => data_source.schema(),
            (true, Ok(_), Err(e)) => return Err(e.into()),
            (_, Err(_), Err(_)) => bail!("unknown type {type_name:?}; run 'bbtf schema' to list types"),
        };

        TableBuilder::new()
            .headers(["Field", "Type", "Flags", "Constraint", "Description"])
            .rows(schema_rows(&schema))
            .print();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_fields_are_dotted() {
        let provider = Provider::new();
        let schema = provider
            .resource("bitbucket_pipeline_schedule")
            .unwrap()
            .schema();
        let names: Vec<String> = schema_rows(&schema).into_iter().map(|r| r[0].clone()).collect();
        assert!(names.contains(&"target.selector.pattern".to_string()));
    }

    #[test]
    fn test_force_new_and_enum_are_shown() {
        let provider = Provider::new();
        let schema = provider.resource("bitbucket_deployment").unwrap().schema();
        let stage = schema_rows(&schema)
            .into_iter()
            .find(|r| r[0] == "stage")
            .unwrap();
        assert_eq!(stage[2], "required, force-new");
        assert_eq!(stage[3], "one of Test|Staging|Production");
    }
}
