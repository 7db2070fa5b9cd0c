// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask
//!
//! `cargo xtask <command>` (aliased in `.cargo/config.toml`) runs the same
//! steps CI runs:
//!
//! - `ci`: lint, build, test, then `verify-migrations`
//! - `lint`: clippy with warnings denied, the rustfmt check, then rustdoc
//!   with warnings denied for each default workspace package
//! - `test`: every test in the workspace, xtask included
//! - `verify-migrations`: apply, inspect, revert and re-apply the embedded
//!   `SQLite` migrations
//!
//! Only cargo and the stable toolchain are required. The migration check
//! runs against an in-memory database.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::{BTreeMap, BTreeSet};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    if let Err(err) = args.command.run() {
        tracing::error!("{err:?}");
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Copy, Debug, Subcommand)]
enum Command {
    /// Lint, build, test and verify migrations
    CI,

    /// Build every workspace target
    #[command(visible_alias = "b")]
    Build,

    /// Run clippy, the rustfmt check and rustdoc
    #[command(visible_alias = "l")]
    Lint,

    /// Apply rustfmt to the workspace
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run every workspace test
    #[command(visible_alias = "t")]
    Test,

    /// Apply, check, revert and re-apply the `SQLite` migrations
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => cargo(&["build", "--workspace", "--all-targets"]),
            Self::Lint => lint(),
            Self::FixFormatting => cargo(&["fmt", "--all"]),
            Self::Test => cargo(&["test", "--workspace", "--all-targets"]),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

fn ci() -> Result<()> {
    for step in [
        Command::Lint,
        Command::Build,
        Command::Test,
        Command::VerifyMigrations,
    ] {
        tracing::info!("ci step: {step:?}");
        step.run()?;
    }
    Ok(())
}

fn lint() -> Result<()> {
    cargo(&[
        "clippy",
        "--workspace",
        "--all-targets",
        "--",
        "-D",
        "warnings",
    ])?;
    cargo(&["fmt", "--all", "--check"])?;

    let metadata = MetadataCommand::new()
        .exec()
        .wrap_err("failed to read cargo metadata")?;
    for package in metadata.workspace_default_packages() {
        cmd("cargo", ["doc", "--no-deps", "--package", &package.name])
            .env("RUSTDOCFLAGS", "-D warnings")
            .pipe_trace()?;
    }
    Ok(())
}

fn cargo(args: &[&str]) -> Result<()> {
    cmd("cargo", args.iter().copied()).pipe_trace()
}

/// Tables the persistence crate's Diesel schema expects.
const EXPECTED_TABLES: [&str; 14] = [
    "booking_detail_additionals",
    "booking_detail_status_history",
    "booking_details",
    "booking_guests",
    "bookings",
    "hotels",
    "invoices",
    "operators",
    "promos",
    "reserved_codes",
    "room_prices",
    "room_type_additionals",
    "room_types",
    "sessions",
];

/// Partial unique index that keeps at most one cart per agent.
const CART_SINGLETON_INDEX: &str = "idx_bookings_one_cart_per_agent";

/// Verify the `SQLite` migrations
///
/// ## What This Command Does
///
/// 1. Applies the embedded migrations to an in-memory database with
///    foreign keys enforced
/// 2. Introspects the resulting schema (tables, columns, constraints, indexes)
/// 3. Checks every expected table exists and every foreign key resolves
///    to an existing column
/// 4. Checks the cart singleton index is a partial unique index
/// 5. Reverts every migration and checks no table is left behind
/// 6. Re-applies the migrations and checks the schema is identical
///
/// ## Usage
///
/// ```bash
/// cargo xtask verify-migrations
/// ```
fn verify_migrations() -> Result<()> {
    use diesel::Connection;
    use diesel_migrations::{embed_migrations, MigrationHarness};

    #[allow(clippy::items_after_statements)]
    const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
        embed_migrations!("../crates/persistence/migrations");

    tracing::info!("Starting migration verification");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to apply SQLite migrations: {}", e))?;
    tracing::info!("SQLite migrations applied successfully");

    let applied = introspect_sqlite_schema(&mut conn)?;
    check_schema(&applied)?;

    tracing::info!("Reverting all migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to revert SQLite migrations: {}", e))?;
    let reverted = introspect_sqlite_schema(&mut conn)?;
    if !reverted.tables.is_empty() {
        let leftover: Vec<&String> = reverted.tables.keys().collect();
        return Err(color_eyre::eyre::eyre!(
            "Tables left behind after reverting migrations: {leftover:?}"
        ));
    }

    tracing::info!("Re-applying migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to re-apply SQLite migrations: {}", e))?;
    let reapplied = introspect_sqlite_schema(&mut conn)?;
    if reapplied != applied {
        return Err(color_eyre::eyre::eyre!(
            "Schema differs after a revert and re-apply cycle"
        ));
    }

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique_constraints: BTreeSet<UniqueConstraint>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    name: String,
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UniqueConstraint {
    columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    name: String,
    columns: Vec<String>,
    unique: bool,
    partial: bool,
}

/// Introspect `SQLite` schema
#[allow(clippy::too_many_lines)]
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Integer)]
        unique: i32,
        #[diesel(sql_type = Text)]
        origin: String,
        #[diesel(sql_type = Integer)]
        partial: i32,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            unique_constraints: BTreeSet::new(),
            indexes: BTreeSet::new(),
        };

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            let normalized_type = normalize_sqlite_type(&col.r#type);
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    name: col.name.clone(),
                    normalized_type,
                    nullable: col.notnull == 0,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            let column_names: Vec<String> = index_columns.into_iter().map(|c| c.name).collect();

            // Origin 'u' is a UNIQUE column constraint, 'pk' the primary key.
            if idx.origin == "u" {
                table_info.unique_constraints.insert(UniqueConstraint {
                    columns: column_names,
                });
            } else if !idx.name.starts_with("sqlite_autoindex_") {
                table_info.indexes.insert(Index {
                    name: idx.name,
                    columns: column_names,
                    unique: idx.unique != 0,
                    partial: idx.partial != 0,
                });
            }
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Normalize `SQLite` type names to a small comparable vocabulary
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let upper = sqlite_type.to_uppercase();
    if upper.contains("INT") {
        String::from("integer")
    } else if upper.contains("CHAR") || upper.contains("TEXT") || upper.contains("CLOB") {
        String::from("text")
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        String::from("real")
    } else if upper.contains("BOOL") {
        String::from("boolean")
    } else if upper.is_empty() || upper.contains("BLOB") {
        String::from("blob")
    } else {
        upper.to_lowercase()
    }
}

/// Check the applied schema against what the persistence crate expects
fn check_schema(schema: &Schema) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    for expected in EXPECTED_TABLES {
        if !schema.tables.contains_key(expected) {
            errors.push(format!("Missing table: {expected}"));
        }
    }
    for name in schema.tables.keys() {
        if !EXPECTED_TABLES.contains(&name.as_str()) {
            errors.push(format!("Unexpected table: {name}"));
        }
    }

    for (name, table) in &schema.tables {
        if table.primary_keys.is_empty() {
            errors.push(format!("Table {name} has no primary key"));
        }
        for fk in &table.foreign_keys {
            let resolves = schema
                .tables
                .get(&fk.to_table)
                .is_some_and(|target| target.columns.contains_key(&fk.to_column));
            if !resolves {
                errors.push(format!(
                    "Foreign key {name}.{} references missing column {}.{}",
                    fk.from_column, fk.to_table, fk.to_column
                ));
            }
        }
    }

    let cart_index = schema
        .tables
        .get("bookings")
        .and_then(|t| t.indexes.iter().find(|i| i.name == CART_SINGLETON_INDEX));
    match cart_index {
        Some(index) if index.unique && index.partial => {
            tracing::debug!("Cart singleton index columns: {:?}", index.columns);
        }
        Some(_) => errors.push(format!(
            "Index {CART_SINGLETON_INDEX} must be a partial unique index"
        )),
        None => errors.push(format!("Missing index {CART_SINGLETON_INDEX} on bookings")),
    }

    if errors.is_empty() {
        tracing::info!("Schema has {} tables as expected", schema.tables.len());
        return Ok(());
    }

    for error in &errors {
        tracing::error!("{error}");
    }
    Err(color_eyre::eyre::eyre!(
        "Schema verification failed with {} error(s)",
        errors.len()
    ))
}

trait TracedRun {
    /// Runs the expression, logging it first and again if it fails.
    fn pipe_trace(&self) -> Result<()>;
}

impl TracedRun for duct::Expression {
    fn pipe_trace(&self) -> Result<()> {
        tracing::info!("running {self:?}");
        self.run()
            .map(drop)
            .wrap_err_with(|| format!("command failed: {self:?}"))
    }
}
