//! Operator subcommands and their execution against the hierarchy engine.
//!
//! Every command produces one JSON value; printing and error reporting
//! are left to `main`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use infratree_adapter_storage_sqlite_sqlx::SqliteDocumentStore;
use infratree_app::services::{
    AncestorResolver, HierarchyService, NestedEntityService, Resolved, RootLookup,
};
use infratree_domain::document::{Document, PARENT_ID};
use infratree_domain::error::{InfraTreeError, ValidationError};
use infratree_domain::id::ObjectId;
use infratree_domain::kind::{Kind, Placement};
use infratree_domain::path::PathStep;
use infratree_domain::validation::ValidationPolicy;
use serde_json::{Value, json};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the database and apply pending migrations.
    Migrate,
    /// Create an entity from a JSON document.
    Create {
        kind: Kind,
        /// JSON file holding the payload, `-` for stdin.
        file: PathBuf,
        /// Parent identifier; required for nested kinds.
        #[arg(long)]
        parent: Option<ObjectId>,
    },
    /// Read one flat entity by identifier.
    Get { kind: Kind, id: ObjectId },
    /// Assemble the subtree below an entity.
    Tree {
        kind: Kind,
        id: ObjectId,
        /// Deepest level to include.
        #[arg(long, default_value = "subdevice1")]
        end: Kind,
    },
    /// Assemble the subtree below a tenant found by name.
    TenantTree {
        name: String,
        #[arg(long, default_value = "subdevice1")]
        end: Kind,
    },
    /// Walk `kind=name` steps down from a root entity.
    Resolve {
        root_kind: Kind,
        /// Tenant name, or the hex identifier of any other root kind.
        root: String,
        steps: Vec<PathStep>,
    },
    /// Delete an entity and everything below it.
    Delete {
        kind: Kind,
        id: ObjectId,
        /// Print the deletion plan without applying it.
        #[arg(long)]
        dry_run: bool,
    },
}

/// The engine services wired over one store.
pub struct Engine {
    flat: HierarchyService<SqliteDocumentStore>,
    nested: NestedEntityService<SqliteDocumentStore>,
    resolver: AncestorResolver<SqliteDocumentStore>,
}

impl Engine {
    #[must_use]
    pub fn new(store: SqliteDocumentStore, policy: ValidationPolicy) -> Self {
        let flat = HierarchyService::new(store.clone(), policy.clone());
        Self {
            nested: NestedEntityService::new(store, policy),
            resolver: AncestorResolver::new(flat.clone()),
            flat,
        }
    }

    /// Run `command` and return its JSON output.
    ///
    /// # Errors
    ///
    /// Engine failures surface as [`InfraTreeError`] inside the returned
    /// error; input that cannot be read or parsed carries its own context.
    pub async fn execute(&self, command: Command) -> anyhow::Result<Value> {
        match command {
            Command::Migrate => Ok(json!({ "migrated": true })),
            Command::Create { kind, file, parent } => {
                let document = read_document(&file)?;
                self.create(kind, document, parent).await
            }
            Command::Get { kind, id } => Ok(Value::Object(self.flat.get_by_id(kind, id).await?)),
            Command::Tree { kind, id, end } => {
                let tree = self.flat.get_hierarchy(kind, id, end).await?;
                Ok(Value::Object(tree.into_document()))
            }
            Command::TenantTree { name, end } => {
                let tree = self.flat.get_tenant_hierarchy(&name, end).await?;
                Ok(Value::Object(tree.into_document()))
            }
            Command::Resolve {
                root_kind,
                root,
                steps,
            } => {
                let lookup = match root_kind {
                    Kind::Tenant => RootLookup::tenant(root),
                    kind => RootLookup::by_id(kind, root),
                };
                Ok(match self.resolver.resolve(&lookup, &steps).await? {
                    Resolved::Entity(document) => Value::Object(document),
                    Resolved::Listing(documents) => {
                        Value::Array(documents.into_iter().map(Value::Object).collect())
                    }
                })
            }
            Command::Delete { kind, id, dry_run } => {
                let plan = if dry_run {
                    self.flat.plan_cascade(kind, id).await?
                } else {
                    self.flat.delete_cascade(kind, id).await?
                };
                Ok(json!({ "dryRun": dry_run, "steps": plan.steps() }))
            }
        }
    }

    async fn create(
        &self,
        kind: Kind,
        mut document: Document,
        parent: Option<ObjectId>,
    ) -> anyhow::Result<Value> {
        let created = match (kind.placement(), parent) {
            (Placement::Nested, Some(parent)) => {
                self.nested.create_nested(kind, parent, document).await?
            }
            (Placement::Nested, None) => {
                let err = InfraTreeError::from(ValidationError::MissingField { field: PARENT_ID });
                return Err(err.into());
            }
            (Placement::Flat, parent) => {
                if let Some(parent) = parent {
                    document.insert(PARENT_ID.to_string(), Value::String(parent.to_hex()));
                }
                self.flat.create(kind, document).await?
            }
        };
        Ok(Value::Object(created))
    }
}

fn read_document(path: &Path) -> anyhow::Result<Document> {
    let raw = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("failed to read payload from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload from {}", path.display()))?
    };
    serde_json::from_str(&raw).context("payload is not a JSON object")
}
